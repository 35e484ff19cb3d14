use std::path::PathBuf;
use std::process;

use clap::Args;

use fxdescent::ConfigFile;

#[derive(Args)]
pub struct CheckArgs {
    /// Configuration file to validate
    pub config: PathBuf,
}

pub fn cmd_check(args: CheckArgs) {
    let CheckArgs { config } = args;

    let loaded = match ConfigFile::load(&config) {
        Ok(loaded) => loaded,
        Err(_) => process::exit(1),
    };

    let settings = loaded.config;
    let window = settings.window();
    eprintln!("OK: {}", config.display());
    eprintln!("  initial         {}", loaded.initial);
    eprintln!("  learning rates  {}", settings.learning_rates());
    eprintln!("  window          [{}, {}]", window.lower(), window.upper());
    eprintln!("  max iterations  {}", settings.max_iterations());
}
