mod cli;

use clap::{Parser, Subcommand};

use cli::check::CheckArgs;
use cli::compare::CompareArgs;
use cli::init::InitArgs;
use cli::run::RunArgs;
use cli::sweep::SweepArgs;

#[derive(Parser)]
#[command(
    name = "fxdescent",
    version,
    about = "Fixed-point gradient-descent controller"
)]
struct Cli {
    /// Log level for this tool (RUST_LOG overrides)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default session configuration
    Init(InitArgs),
    /// Validate a session configuration
    Check(CheckArgs),
    /// Run one optimization session
    Run(RunArgs),
    /// Run a session next to the floating-point reference model
    Compare(CompareArgs),
    /// Run sessions over a grid of start points in parallel
    Sweep(SweepArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = fxdescent::logging::init(&cli.log_level) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }

    match cli.command {
        Command::Init(args) => cli::init::cmd_init(args),
        Command::Check(args) => cli::check::cmd_check(args),
        Command::Run(args) => cli::run::cmd_run(args),
        Command::Compare(args) => cli::compare::cmd_compare(args),
        Command::Sweep(args) => cli::sweep::cmd_sweep(args),
    }
}
