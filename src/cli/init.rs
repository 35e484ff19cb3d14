use std::path::PathBuf;
use std::process;

use clap::Args;

use fxdescent::config::file::DEFAULT_CONFIG_TOML;

#[derive(Args)]
pub struct InitArgs {
    /// Where to write the configuration (default: fxdescent.toml)
    #[arg(default_value = "fxdescent.toml")]
    pub path: PathBuf,
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn cmd_init(args: InitArgs) {
    let InitArgs { path, force } = args;

    if path.exists() && !force {
        eprintln!(
            "error: '{}' already exists (use --force to overwrite)",
            path.display()
        );
        process::exit(1);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!(
                "error: cannot create directory '{}': {}",
                parent.display(),
                e
            );
            process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, DEFAULT_CONFIG_TOML) {
        eprintln!("error: cannot write '{}': {}", path.display(), e);
        process::exit(1);
    }

    eprintln!("Created {}", path.display());
}
