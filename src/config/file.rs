//! TOML configuration files.
//!
//! Values are written in real units (`0.125`, not raw `32`) and must be exact
//! multiples of 1/256. Every field is kept with its source span so that
//! semantic errors (inverted window, inexact rate) point at the offending
//! line, not just at the file.

use std::path::Path;

use serde::Deserialize;
use toml::Spanned;

use super::{
    initial_from_setting, wide_from_setting, ConfigError, SessionConfig, DEFAULT_MAX_ITERATIONS,
};
use crate::diagnostic::{render_diagnostics, Diagnostic};
use crate::fixed::{Quad, Wide, PARAM_NAMES};
use crate::pipeline::ConvergenceWindow;
use crate::span::Span;

/// Written by `fxdescent init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# fxdescent session configuration

[session]
max_iterations = 50
initial = [0, 0, 0, 0]

# Q24.8 learning rates, multiples of 1/256
[learning_rates]
a = 0.5
b = 1.0
c = 0.25
d = 0.125

# Accepted per-step change in objective value
[convergence]
lower = -0.00390625
upper = 0.00390625

[diagnostics]
warn_on_overflow = false
"#;

/// Raw file contents as deserialized.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub session: SessionSection,
    pub learning_rates: RatesSection,
    pub convergence: ConvergenceSection,
    pub diagnostics: DiagnosticsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionSection {
    pub max_iterations: Option<Spanned<i64>>,
    pub initial: Option<Spanned<Vec<Spanned<i64>>>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RatesSection {
    pub a: Option<Spanned<f64>>,
    pub b: Option<Spanned<f64>>,
    pub c: Option<Spanned<f64>>,
    pub d: Option<Spanned<f64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvergenceSection {
    pub lower: Option<Spanned<f64>>,
    pub upper: Option<Spanned<f64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsSection {
    pub warn_on_overflow: Option<bool>,
}

/// A validated configuration plus the session start point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: SessionConfig,
    pub initial: Quad<i8>,
}

impl Default for LoadedConfig {
    fn default() -> Self {
        Self {
            config: SessionConfig::default(),
            initial: Quad::default(),
        }
    }
}

fn span_of<T>(s: &Spanned<T>) -> Span {
    Span::from(s.span())
}

fn error_at(err: ConfigError, span: Span) -> Diagnostic {
    let help = match &err {
        ConfigError::NotRepresentable { nearest, .. } => {
            Some(format!("nearest representable value is {}", nearest))
        }
        ConfigError::InvertedWindow { .. } => Some("swap `lower` and `upper`".to_string()),
        ConfigError::ZeroIterations => Some("use a positive iteration cap".to_string()),
        ConfigError::InitialOutOfRange { .. } => {
            Some("initial values must lie in -128..=127".to_string())
        }
    };
    let diag = Diagnostic::error(err.to_string(), span);
    match help {
        Some(h) => diag.with_help(h),
        None => diag,
    }
}

impl ConfigFile {
    /// Deserialize without semantic checks.
    pub fn from_toml(source: &str) -> Result<Self, Diagnostic> {
        toml::from_str(source).map_err(|e| {
            let span = e.span().map(Span::from).unwrap_or_else(Span::dummy);
            Diagnostic::error(e.message().to_string(), span)
        })
    }

    /// Convert to a validated configuration, collecting every problem.
    pub fn validate(&self) -> Result<LoadedConfig, Vec<Diagnostic>> {
        let mut errors = Vec::new();
        let defaults = SessionConfig::default();

        let max_iterations = match &self.session.max_iterations {
            None => DEFAULT_MAX_ITERATIONS,
            Some(s) => match u32::try_from(*s.get_ref()) {
                Ok(0) => {
                    errors.push(error_at(ConfigError::ZeroIterations, span_of(s)));
                    DEFAULT_MAX_ITERATIONS
                }
                Ok(n) => n,
                Err(_) => {
                    errors.push(
                        Diagnostic::error(
                            format!("max_iterations = {} is out of range", s.get_ref()),
                            span_of(s),
                        )
                        .with_help(format!("use a value in 1..={}", u32::MAX)),
                    );
                    DEFAULT_MAX_ITERATIONS
                }
            },
        };

        let mut initial = Quad::<i8>::default();
        if let Some(list) = &self.session.initial {
            if list.get_ref().len() != 4 {
                errors.push(
                    Diagnostic::error(
                        format!(
                            "initial must have exactly 4 values, found {}",
                            list.get_ref().len()
                        ),
                        span_of(list),
                    )
                    .with_note("parameters are ordered (a, b, c, d)".to_string()),
                );
            } else {
                let mut values = [0i8; 4];
                for (i, v) in list.get_ref().iter().enumerate() {
                    match initial_from_setting(PARAM_NAMES[i], *v.get_ref()) {
                        Ok(x) => values[i] = x,
                        Err(e) => errors.push(error_at(e, span_of(v))),
                    }
                }
                initial = Quad(values);
            }
        }

        let rate_fields = [
            &self.learning_rates.a,
            &self.learning_rates.b,
            &self.learning_rates.c,
            &self.learning_rates.d,
        ];
        let mut rates = defaults.learning_rates().0;
        for (i, field) in rate_fields.into_iter().enumerate() {
            if let Some(s) = field {
                let name = format!("learning_rates.{}", PARAM_NAMES[i]);
                match wide_from_setting(&name, *s.get_ref()) {
                    Ok(w) => rates[i] = w,
                    Err(e) => errors.push(error_at(e, span_of(s))),
                }
            }
        }

        let default_window = ConvergenceWindow::default();
        let mut bound = |field: &Option<Spanned<f64>>, name: &str, fallback: Wide| match field {
            None => fallback,
            Some(s) => match wide_from_setting(name, *s.get_ref()) {
                Ok(w) => w,
                Err(e) => {
                    errors.push(error_at(e, span_of(s)));
                    fallback
                }
            },
        };
        let lower = bound(&self.convergence.lower, "convergence.lower", default_window.lower());
        let upper = bound(&self.convergence.upper, "convergence.upper", default_window.upper());

        if lower > upper {
            let lower_span = self.convergence.lower.as_ref().map(span_of);
            let upper_span = self.convergence.upper.as_ref().map(span_of);
            let span = match (lower_span, upper_span) {
                (Some(l), Some(u)) => l.merge(u),
                (Some(s), None) | (None, Some(s)) => s,
                (None, None) => Span::dummy(),
            };
            errors.push(
                error_at(ConfigError::InvertedWindow { lower, upper }, span)
                    .with_note("the window bounds the signed change current - previous".to_string()),
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let config = SessionConfig::new(Quad(rates), lower, upper, max_iterations)
            .map_err(|e| vec![error_at(e, Span::dummy())])?
            .with_overflow_warnings(self.diagnostics.warn_on_overflow.unwrap_or(false));

        Ok(LoadedConfig { config, initial })
    }

    /// Deserialize and validate without printing anything.
    pub fn parse_silent(source: &str) -> Result<LoadedConfig, Vec<Diagnostic>> {
        Self::from_toml(source).map_err(|d| vec![d])?.validate()
    }

    /// Deserialize and validate, rendering diagnostics to stderr on failure.
    pub fn parse(source: &str, filename: &str) -> Result<LoadedConfig, Vec<Diagnostic>> {
        Self::parse_silent(source).inspect_err(|errors| {
            render_diagnostics(errors, filename, source);
        })
    }

    /// Read, deserialize and validate a configuration file.
    pub fn load(path: &Path) -> Result<LoadedConfig, Vec<Diagnostic>> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            vec![Diagnostic::error(
                format!("cannot read '{}': {}", path.display(), e),
                Span::dummy(),
            )]
        })?;
        Self::parse(&source, &path.display().to_string())
    }
}
