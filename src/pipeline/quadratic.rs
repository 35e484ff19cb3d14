//! Staged evaluator for `z = (a-2)^2 + b^2 + (c+2)^2 + (2d)^2 - 5`.
//!
//! One stage per tick:
//!
//! | stage     | work                                                  |
//! |-----------|-------------------------------------------------------|
//! | Idle      | latch parameters on `start`                           |
//! | Terms     | shifted terms, double-wide squares, objective sum     |
//! | Gradients | `2(a-2)`, `2b`, `2(c+2)`, `8d`                        |
//! | Deltas    | gradient x learning rate, clamped to narrow           |
//! | Done      | hold results while `start` stays high                 |
//!
//! `done` rises on the fourth tick after `start` is first seen.

use tracing::trace;

use super::{Evaluation, Evaluator};
use crate::fixed::{
    add_double, add_sub, clamp_double_to_narrow, clamp_double_to_wide, multiply_double,
    multiply_wide, DoubleWide, Narrow, Quad, Wide,
};

const TWO: Wide = Wide::from_int(2);
const EIGHT: Wide = Wide::from_int(8);
const NEG_FIVE: Wide = Wide::from_int(-5);

/// Ticks from the first `start` sample until `done` is high.
pub const LATENCY: u32 = 4;

/// Internal state of the quadratic evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalStage {
    Idle,
    Terms,
    Gradients,
    Deltas,
    Done,
}

impl EvalStage {
    pub fn name(self) -> &'static str {
        match self {
            EvalStage::Idle => "idle",
            EvalStage::Terms => "terms",
            EvalStage::Gradients => "gradients",
            EvalStage::Deltas => "deltas",
            EvalStage::Done => "done",
        }
    }
}

/// The built-in four-parameter quadratic evaluator.
#[derive(Clone, Debug)]
pub struct QuadraticEvaluator {
    rates: Quad<Wide>,
    stage: EvalStage,
    params: Quad<Narrow>,
    /// Shifted terms `a-2`, `b`, `c+2`, `2d`.
    terms: Quad<Wide>,
    objective: Wide,
    gradients: Quad<Wide>,
    deltas: Quad<Narrow>,
    overflow: bool,
}

impl QuadraticEvaluator {
    pub fn new(rates: Quad<Wide>) -> Self {
        Self {
            rates,
            stage: EvalStage::Idle,
            params: Quad::default(),
            terms: Quad::default(),
            objective: Wide::ZERO,
            gradients: Quad::default(),
            deltas: Quad::default(),
            overflow: false,
        }
    }

    pub fn stage(&self) -> EvalStage {
        self.stage
    }

    pub fn rates(&self) -> Quad<Wide> {
        self.rates
    }

    fn compute_terms(&mut self) {
        let mut flag = false;
        let [a, b, c, d] = self.params.map(Narrow::widen).0;
        self.terms = Quad::new(
            add_sub(a, TWO, true).flag_into(&mut flag),
            b,
            add_sub(c, TWO, false).flag_into(&mut flag),
            multiply_wide(d, TWO).flag_into(&mut flag),
        );

        let sum = self.terms.iter().fold(DoubleWide::ZERO, |acc, &t| {
            add_double(acc, multiply_double(t, t)).flag_into(&mut flag)
        });
        let sum = add_double(sum, DoubleWide::from_wide(NEG_FIVE)).flag_into(&mut flag);
        self.objective = clamp_double_to_wide(sum).flag_into(&mut flag);

        self.overflow |= flag;
        trace!(objective = self.objective.raw(), overflow = flag, "evaluator terms");
    }

    fn compute_gradients(&mut self) {
        let mut flag = false;
        let [ta, tb, tc, _] = self.terms.0;
        let d = self.params[3].widen();
        self.gradients = Quad::new(
            multiply_wide(ta, TWO).flag_into(&mut flag),
            multiply_wide(tb, TWO).flag_into(&mut flag),
            multiply_wide(tc, TWO).flag_into(&mut flag),
            multiply_wide(d, EIGHT).flag_into(&mut flag),
        );
        self.overflow |= flag;
        trace!(gradients = ?self.gradients.map(Wide::raw).0, "evaluator gradients");
    }

    fn compute_deltas(&mut self) {
        let mut flag = false;
        self.deltas = self.gradients.zip_with(self.rates, |g, rate| {
            clamp_double_to_narrow(multiply_double(g, rate)).flag_into(&mut flag)
        });
        self.overflow |= flag;
        trace!(deltas = ?self.deltas.map(Narrow::raw).0, "evaluator deltas");
    }
}

impl Evaluator for QuadraticEvaluator {
    fn reset(&mut self) {
        *self = Self::new(self.rates);
    }

    fn tick(&mut self, start: bool, params: Quad<Narrow>) {
        self.stage = match self.stage {
            EvalStage::Idle if start => {
                self.params = params;
                self.overflow = false;
                EvalStage::Terms
            }
            EvalStage::Idle => EvalStage::Idle,
            EvalStage::Terms => {
                self.compute_terms();
                EvalStage::Gradients
            }
            EvalStage::Gradients => {
                self.compute_gradients();
                EvalStage::Deltas
            }
            EvalStage::Deltas => {
                self.compute_deltas();
                EvalStage::Done
            }
            EvalStage::Done if start => EvalStage::Done,
            EvalStage::Done => EvalStage::Idle,
        };
    }

    fn done(&self) -> bool {
        self.stage == EvalStage::Done
    }

    fn evaluation(&self) -> Option<Evaluation> {
        self.done().then_some(Evaluation {
            objective: self.objective,
            gradients: self.gradients,
            deltas: self.deltas,
        })
    }

    fn overflow(&self) -> bool {
        self.overflow
    }

    fn state_name(&self) -> &'static str {
        self.stage.name()
    }
}
