//! Session configuration.
//!
//! Everything the controller treats as a configuration-time constant:
//! learning rates, convergence window and iteration cap. A `SessionConfig`
//! can only be built through validating constructors, so a controller never
//! sees an inverted window or a zero iteration cap.

pub mod file;


pub use file::{ConfigFile, LoadedConfig};

use crate::fixed::{Quad, Wide};
use crate::pipeline::ConvergenceWindow;

/// Iteration cap used when none is configured.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

/// Learning rates 0.5, 1.0, 0.25, 0.125 for `a`, `b`, `c`, `d`.
///
/// `a` and `c` sit below the unit rate at which `x -= 2(x - k)` flips
/// around its minimum instead of approaching it.
pub const DEFAULT_RATES: Quad<Wide> = Quad::new(
    Wide::from_raw(128),
    Wide::from_raw(256),
    Wide::from_raw(64),
    Wide::from_raw(32),
);

/// Configuration-time rejection of a session setup.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("convergence window is inverted: lower bound {lower} exceeds upper bound {upper}")]
    InvertedWindow { lower: Wide, upper: Wide },
    #[error("max_iterations must be at least 1")]
    ZeroIterations,
    #[error("{name} = {value} is not representable in Q24.8 (nearest is {nearest})")]
    NotRepresentable {
        name: String,
        value: f64,
        nearest: f64,
    },
    #[error("initial value {name} = {value} is outside the 8-bit signed range")]
    InitialOutOfRange { name: String, value: i64 },
}

/// Validated configuration for one controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    learning_rates: Quad<Wide>,
    window: ConvergenceWindow,
    max_iterations: u32,
    warn_on_overflow: bool,
}

impl SessionConfig {
    pub fn new(
        learning_rates: Quad<Wide>,
        lower: Wide,
        upper: Wide,
        max_iterations: u32,
    ) -> Result<Self, ConfigError> {
        let window = ConvergenceWindow::new(lower, upper)
            .ok_or(ConfigError::InvertedWindow { lower, upper })?;
        if max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(Self {
            learning_rates,
            window,
            max_iterations,
            warn_on_overflow: false,
        })
    }

    /// Emit a warning log line whenever an iteration saturates.
    pub fn with_overflow_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_overflow = enabled;
        self
    }

    pub fn with_learning_rates(mut self, rates: Quad<Wide>) -> Self {
        self.learning_rates = rates;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Result<Self, ConfigError> {
        if max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        self.max_iterations = max_iterations;
        Ok(self)
    }

    pub fn learning_rates(&self) -> Quad<Wide> {
        self.learning_rates
    }

    pub fn window(&self) -> ConvergenceWindow {
        self.window
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn warn_on_overflow(&self) -> bool {
        self.warn_on_overflow
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            learning_rates: DEFAULT_RATES,
            window: ConvergenceWindow::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            warn_on_overflow: false,
        }
    }
}

/// Convert a real-valued setting to Q24.8, rejecting inexact values.
pub fn wide_from_setting(name: &str, value: f64) -> Result<Wide, ConfigError> {
    Wide::from_f64_exact(value).ok_or_else(|| ConfigError::NotRepresentable {
        name: name.to_string(),
        value,
        nearest: Wide::nearest_f64(value),
    })
}

/// Convert an integer setting to an 8-bit initial parameter.
pub fn initial_from_setting(name: &str, value: i64) -> Result<i8, ConfigError> {
    i8::try_from(value).map_err(|_| ConfigError::InitialOutOfRange {
        name: name.to_string(),
        value,
    })
}
