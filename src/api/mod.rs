//! Library entry points used by the command-line tool and by tests.

use crate::config::SessionConfig;
use crate::controller::{Controller, ControllerOutputs, StallError};
use crate::fixed::{Narrow, Quad};
use crate::reference::{self, ReferenceOutcome};
use crate::trace::Trace;

#[cfg(test)]
mod tests;

/// Accepted |fixed - reference| per final parameter (one LSB).
pub const PARAM_TOLERANCE: f64 = 1.0 / 256.0;
/// Accepted |fixed - reference| for the minimum objective value.
pub const OBJECTIVE_TOLERANCE: f64 = 4.0 / 256.0;

/// A finished session with everything needed for reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRun {
    pub initial: Quad<i8>,
    pub outputs: ControllerOutputs,
    /// Parameters after the last update.
    pub final_params: Quad<Narrow>,
    pub cycles: u64,
    pub trace: Trace,
}

/// Run one session to completion.
pub fn run(config: &SessionConfig, initial: Quad<i8>) -> Result<ControllerOutputs, StallError> {
    Controller::new(*config).run(initial)
}

/// Run one session, keeping the per-iteration trace.
pub fn run_traced(config: &SessionConfig, initial: Quad<i8>) -> Result<SessionRun, StallError> {
    let mut ctrl = Controller::new(*config).with_trace();
    let outputs = ctrl.run(initial)?;
    Ok(SessionRun {
        initial,
        outputs,
        final_params: ctrl.session().params,
        cycles: ctrl.cycles(),
        trace: ctrl.take_trace().unwrap_or_default(),
    })
}

/// Fixed-point session next to the floating-point model.
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub fixed: SessionRun,
    pub reference: ReferenceOutcome,
    pub objective_deviation: f64,
    pub param_deviation: [f64; 4],
}

impl Comparison {
    pub fn within_tolerance(&self) -> bool {
        self.objective_deviation <= OBJECTIVE_TOLERANCE
            && self.param_deviation.iter().all(|&d| d <= PARAM_TOLERANCE)
    }

    pub fn max_param_deviation(&self) -> f64 {
        self.param_deviation.iter().copied().fold(0.0, f64::max)
    }
}

/// Run the session and the reference model from the same start point.
pub fn compare_with_reference(
    config: &SessionConfig,
    initial: Quad<i8>,
) -> Result<Comparison, StallError> {
    let fixed = run_traced(config, initial)?;
    let reference = reference::simulate(config, initial);

    let objective_deviation = (fixed.outputs.min_value.to_f64() - reference.best_value).abs();
    let mut param_deviation = [0.0; 4];
    for (i, dev) in param_deviation.iter_mut().enumerate() {
        *dev = (fixed.final_params[i].to_f64() - reference.final_params[i]).abs();
    }

    Ok(Comparison {
        fixed,
        reference,
        objective_deviation,
        param_deviation,
    })
}

pub use crate::sweep::{grid, run_grid as sweep, SweepResult, SweepSummary};
