use std::process;

use clap::Args;

use fxdescent::report::SessionReport;
use fxdescent::Quad;

use super::{parse_initial, print_json, ConfigArgs};

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub settings: ConfigArgs,
    /// Start point a,b,c,d (overrides the configuration file)
    #[arg(long, value_name = "A,B,C,D", value_parser = parse_initial, allow_hyphen_values = true)]
    pub initial: Option<Quad<i8>>,
    /// Print the per-iteration trace
    #[arg(long)]
    pub trace: bool,
    /// Emit a JSON report on stdout
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_run(args: RunArgs) {
    let RunArgs {
        settings,
        initial,
        trace,
        json,
    } = args;
    let loaded = settings.resolve();
    let initial = initial.unwrap_or(loaded.initial);

    let run = match fxdescent::run_traced(&loaded.config, initial) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let report = SessionReport::new(&loaded.config, &run, trace);
    if json {
        print_json(report.to_json());
    } else {
        print!("{}", report.format_report());
    }
}
