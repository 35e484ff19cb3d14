pub mod check;
pub mod compare;
pub mod init;
pub mod run;
pub mod sweep;

use std::path::PathBuf;
use std::process;

use clap::Args;

use fxdescent::config::{initial_from_setting, wide_from_setting};
use fxdescent::fixed::PARAM_NAMES;
use fxdescent::{ConfigFile, LoadedConfig, Quad, Wide};

/// Options shared by every command that runs sessions.
#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Session configuration file (TOML)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Learning rates a,b,c,d (multiples of 1/256)
    #[arg(long, value_name = "A,B,C,D", value_parser = parse_rates, allow_hyphen_values = true)]
    pub rates: Option<Quad<Wide>>,
    /// Iteration cap
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<u32>,
}

impl ConfigArgs {
    /// Configuration file (or defaults) with command-line overrides applied.
    /// Exits on invalid input.
    pub fn resolve(&self) -> LoadedConfig {
        let mut loaded = match &self.config {
            Some(path) => match ConfigFile::load(path) {
                Ok(loaded) => loaded,
                Err(_) => process::exit(1),
            },
            None => LoadedConfig::default(),
        };
        if let Some(rates) = self.rates {
            loaded.config = loaded.config.with_learning_rates(rates);
        }
        if let Some(n) = self.max_iterations {
            loaded.config = match loaded.config.with_max_iterations(n) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("error: {}", e);
                    process::exit(1);
                }
            };
        }
        loaded
    }
}

fn split_four(s: &str) -> Result<[&str; 4], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    parts
        .try_into()
        .map_err(|p: Vec<&str>| format!("expected 4 comma-separated values, found {}", p.len()))
}

/// Parse `a,b,c,d` integer start values.
pub fn parse_initial(s: &str) -> Result<Quad<i8>, String> {
    let parts = split_four(s)?;
    let mut values = [0i8; 4];
    for (i, part) in parts.iter().enumerate() {
        let v: i64 = part
            .parse()
            .map_err(|_| format!("'{}' is not an integer", part))?;
        values[i] = initial_from_setting(PARAM_NAMES[i], v).map_err(|e| e.to_string())?;
    }
    Ok(Quad(values))
}

/// Parse `a,b,c,d` learning rates in real units.
pub fn parse_rates(s: &str) -> Result<Quad<Wide>, String> {
    let parts = split_four(s)?;
    let mut values = [Wide::ZERO; 4];
    for (i, part) in parts.iter().enumerate() {
        let v: f64 = part
            .parse()
            .map_err(|_| format!("'{}' is not a number", part))?;
        values[i] = wide_from_setting(&format!("rate {}", PARAM_NAMES[i]), v)
            .map_err(|e| e.to_string())?;
    }
    Ok(Quad(values))
}

/// Print JSON or exit when serialization fails.
pub fn print_json(json: Result<String, serde_json::Error>) {
    match json {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("error: cannot serialize report: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_initial() {
        assert_eq!(parse_initial("0,0,0,0"), Ok(Quad::new(0, 0, 0, 0)));
        assert_eq!(parse_initial("10, -20, 30, -40"), Ok(Quad::new(10, -20, 30, -40)));
        assert!(parse_initial("1,2,3").unwrap_err().contains("found 3"));
        assert!(parse_initial("1,2,3,x").unwrap_err().contains("'x'"));
        assert!(parse_initial("0,0,0,200").is_err());
    }

    #[test]
    fn test_parse_rates() {
        let rates = parse_rates("1.0,0.5,0.25,0.125").unwrap();
        assert_eq!(rates.map(Wide::raw), Quad::new(256, 128, 64, 32));
        assert!(parse_rates("0.1,0.5,0.25,0.125").is_err());
    }
}
