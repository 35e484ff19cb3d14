use std::process;

use clap::Args;

use fxdescent::report::SweepReport;
use fxdescent::sweep::{grid, grid_size, run_grid, MAX_GRID_POINTS};

use super::{print_json, ConfigArgs};

#[derive(Args)]
pub struct SweepArgs {
    #[command(flatten)]
    pub settings: ConfigArgs,
    /// Lowest start value on every axis
    #[arg(long, default_value_t = -4, allow_hyphen_values = true)]
    pub from: i8,
    /// Highest start value on every axis
    #[arg(long, default_value_t = 4, allow_hyphen_values = true)]
    pub to: i8,
    /// Grid spacing
    #[arg(long, default_value_t = 1)]
    pub step: u8,
    /// Print one line per session
    #[arg(short, long)]
    pub verbose: bool,
    /// Emit a JSON report on stdout
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_sweep(args: SweepArgs) {
    let SweepArgs {
        settings,
        from,
        to,
        step,
        verbose,
        json,
    } = args;

    if from > to || step == 0 {
        eprintln!("error: empty grid (--from {} --to {} --step {})", from, to, step);
        process::exit(1);
    }
    let size = grid_size(from, to, step);
    if size > MAX_GRID_POINTS {
        eprintln!(
            "error: grid has {} points, limit is {} (increase --step or narrow the range)",
            size, MAX_GRID_POINTS
        );
        process::exit(1);
    }

    let loaded = settings.resolve();
    let points = grid(from, to, step);
    let results = match run_grid(&loaded.config, &points) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let report = SweepReport::new(&results);
    if json {
        print_json(report.to_json());
    } else {
        print!("{}", report.format_report(verbose));
    }
}
