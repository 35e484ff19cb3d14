use std::process;

use clap::Args;

use fxdescent::report::ComparisonReport;
use fxdescent::Quad;

use super::{parse_initial, print_json, ConfigArgs};

#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub settings: ConfigArgs,
    /// Start point a,b,c,d (overrides the configuration file)
    #[arg(long, value_name = "A,B,C,D", value_parser = parse_initial, allow_hyphen_values = true)]
    pub initial: Option<Quad<i8>>,
    /// Emit a JSON report on stdout
    #[arg(long)]
    pub json: bool,
}

/// Exits with status 1 when the session leaves the reference tolerance.
pub fn cmd_compare(args: CompareArgs) {
    let CompareArgs {
        settings,
        initial,
        json,
    } = args;
    let loaded = settings.resolve();
    let initial = initial.unwrap_or(loaded.initial);

    let cmp = match fxdescent::compare_with_reference(&loaded.config, initial) {
        Ok(cmp) => cmp,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let report = ComparisonReport::new(&cmp);
    if json {
        print_json(report.to_json());
    } else {
        print!("{}", report.format_report());
    }

    if !report.within_tolerance {
        process::exit(1);
    }
}
