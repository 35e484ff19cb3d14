//! The optimization session record.
//!
//! One `Session` is owned by one controller. It is created when start is
//! sampled in Idle, mutated once per iteration by `commit`, and dropped back
//! to its cleared form on reset.

use crate::fixed::{capped_diff, less_than, round_to_integer, Narrow, Quad, Wide};
use crate::pipeline::{ConvergenceWindow, Evaluation};
use crate::trace::IterationRecord;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    /// Current parameter point.
    pub params: Quad<Narrow>,
    /// Lowest objective value seen so far.
    pub best_value: Wide,
    /// Rounded parameters at which `best_value` was seen.
    pub best_params: Quad<i8>,
    /// Completed iterations.
    pub iteration: u32,
    pub converged: bool,
    /// Objective of the previous iteration, `None` before the first.
    pub previous: Option<Wide>,
    /// Sticky: some stage saturated during this session.
    pub overflow: bool,
    /// Iterations in which at least one stage saturated.
    pub overflow_events: u32,
}

impl Session {
    /// Capture the initial point and clear all tracking state.
    pub fn start(initial: Quad<i8>) -> Self {
        Self {
            params: initial.to_narrow(),
            ..Self::default()
        }
    }

    /// Arm minimum tracking: the first real evaluation always improves on
    /// the maximum wide value.
    pub fn init_best(&mut self, initial: Quad<i8>) {
        self.best_value = Wide::MAX;
        self.best_params = initial;
    }

    /// Compare/update for one finished evaluation of `self.params`.
    ///
    /// Order matters and is fixed: convergence check against the previous
    /// objective, strict less-than minimum update with a rounded snapshot of
    /// the evaluated point, capped parameter update, counter increment.
    pub fn commit(
        &mut self,
        eval: &Evaluation,
        eval_overflow: bool,
        window: &ConvergenceWindow,
    ) -> IterationRecord {
        let evaluated = self.params;
        let mut overflow = eval_overflow;

        if let Some(previous) = self.previous {
            self.converged = window.check(eval.objective, previous);
        }

        if less_than(eval.objective, self.best_value) {
            self.best_value = eval.objective;
            self.best_params = evaluated.map(|p| round_to_integer(p).flag_into(&mut overflow));
        }

        self.params = evaluated.zip_with(eval.deltas, |p, delta| {
            capped_diff(p, delta).flag_into(&mut overflow)
        });

        self.iteration += 1;
        self.previous = Some(eval.objective);
        if overflow {
            self.overflow = true;
            self.overflow_events += 1;
        }

        IterationRecord {
            iteration: self.iteration,
            params: evaluated,
            objective: eval.objective,
            deltas: eval.deltas,
            best_value: self.best_value,
            best_params: self.best_params,
            converged: self.converged,
            overflow,
        }
    }
}
