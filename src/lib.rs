//! Fixed-point gradient-descent controller.
//!
//! A cycle-level software model of a small hardware optimizer: a top-level
//! controller iterates a staged evaluator of
//! `z = (a-2)^2 + b^2 + (c+2)^2 + (2d)^2 - 5` over four Q8.8 parameters,
//! tracks the minimum, and stops on convergence or at an iteration cap.
//! All arithmetic saturates and reports when it does.

pub mod api;
pub mod config;
pub mod controller;
pub mod diagnostic;
pub mod fixed;
pub mod logging;
pub mod pipeline;
pub mod reference;
pub mod report;
pub mod span;
pub mod sweep;
pub mod trace;

pub use api::*;
pub use config::{ConfigError, ConfigFile, LoadedConfig, SessionConfig};
pub use controller::{Controller, ControllerInputs, ControllerOutputs, ControllerState, StallError};
pub use fixed::{DoubleWide, Narrow, Quad, Saturated, Saturation, Wide};
pub use pipeline::{ConvergenceWindow, Evaluation, Evaluator, QuadraticEvaluator};
pub use trace::{IterationRecord, Trace};
