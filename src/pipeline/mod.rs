//! Function/gradient evaluation pipeline.
//!
//! The controller drives an evaluator through a small signal contract that
//! mirrors a synchronous hardware block: it is clocked once per step, started
//! by a level signal, and reports completion with a `done` flag that stays
//! high for at least one step. Evaluators are chosen at compose time through
//! the `Evaluator` type parameter of the controller; there is no run-time
//! objective selection.

pub mod convergence;
pub mod quadratic;

pub use convergence::{check_convergence, ConvergenceWindow};
pub use quadratic::{EvalStage, QuadraticEvaluator};

use crate::fixed::{Narrow, Quad, Wide};

/// Result of one evaluation at a parameter point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Objective value at the evaluated point.
    pub objective: Wide,
    /// Raw partial derivatives, wide scale.
    pub gradients: Quad<Wide>,
    /// Learning-rate scaled steps to subtract from each parameter.
    pub deltas: Quad<Narrow>,
}

// ─── Evaluator Contract ────────────────────────────────────────────

/// A multi-cycle function/gradient evaluator.
///
/// Implementations must:
/// - advance at most one internal stage per `tick`
/// - raise `done` within a bounded number of ticks after `start` is seen
///   and keep it high while `start` stays asserted
/// - assert `overflow` whenever any internal arithmetic stage saturated
///   during the current evaluation
pub trait Evaluator {
    /// Asynchronous reset: drop in-flight work and return to idle.
    fn reset(&mut self);

    /// One clock step. `params` is sampled when the evaluation starts.
    fn tick(&mut self, start: bool, params: Quad<Narrow>);

    /// Completion flag.
    fn done(&self) -> bool;

    /// Result of the finished evaluation. `None` unless `done()`.
    fn evaluation(&self) -> Option<Evaluation>;

    /// OR of every saturation seen during the current evaluation.
    fn overflow(&self) -> bool;

    /// Short name of the internal state, reported in controller transition
    /// logs and in `StallError`.
    fn state_name(&self) -> &'static str;
}
