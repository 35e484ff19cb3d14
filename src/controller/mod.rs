//! Top-level iteration controller.
//!
//! A synchronous state machine clocked by `tick`:
//!
//! ```text
//!   Idle --start--> Init --> Evaluate --done--> CompareUpdate --> Done
//!                               ^                    |
//!                               +----not finished----+
//! ```
//!
//! Evaluate is a multi-step wait: the evaluator is ticked alongside the
//! controller and polled for `done` every step. Reset preempts every state.

pub mod session;


pub use session::Session;

use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::fixed::{Quad, Wide};
use crate::pipeline::{Evaluation, Evaluator, QuadraticEvaluator};
use crate::trace::Trace;

/// Step budget per iteration used by `run` (the built-in evaluator needs
/// `quadratic::LATENCY + 1`).
pub const STEPS_PER_ITERATION_BUDGET: u64 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Init,
    Evaluate,
    CompareUpdate,
    Done,
}

impl ControllerState {
    pub fn name(self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::Init => "init",
            ControllerState::Evaluate => "evaluate",
            ControllerState::CompareUpdate => "compare_update",
            ControllerState::Done => "done",
        }
    }
}

/// Signals sampled on each step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControllerInputs {
    /// Asserted reset (the active-low pin, already inverted).
    pub reset: bool,
    /// Level-triggered start.
    pub start: bool,
    /// Initial parameters, sampled when start is seen in Idle.
    pub initial: Quad<i8>,
}

impl ControllerInputs {
    pub fn start(initial: Quad<i8>) -> Self {
        Self {
            reset: false,
            start: true,
            initial,
        }
    }

    pub fn idle() -> Self {
        Self::default()
    }

    pub fn reset() -> Self {
        Self {
            reset: true,
            ..Self::default()
        }
    }
}

/// Externally visible results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerOutputs {
    /// Completion flag, held until the next start or reset.
    pub done: bool,
    pub min_value: Wide,
    pub optimal: Quad<i8>,
    pub iterations: u32,
    pub converged: bool,
    /// Diagnostic channel: some stage saturated during the session.
    pub overflow: bool,
}

/// The controller ran out of steps before reaching Done.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "controller did not reach done within {steps} steps (stuck in {state}, evaluator {evaluator})"
)]
pub struct StallError {
    pub steps: u64,
    pub state: &'static str,
    pub evaluator: &'static str,
}

/// Iteration controller over a compose-time evaluator.
#[derive(Clone, Debug)]
pub struct Controller<E: Evaluator = QuadraticEvaluator> {
    config: SessionConfig,
    evaluator: E,
    state: ControllerState,
    session: Session,
    initial: Quad<i8>,
    /// Evaluation latched when the evaluator reported done.
    pending: Option<(Evaluation, bool)>,
    done: bool,
    cycles: u64,
    trace: Option<Trace>,
}

impl Controller<QuadraticEvaluator> {
    /// Controller with the built-in quadratic evaluator.
    pub fn new(config: SessionConfig) -> Self {
        let evaluator = QuadraticEvaluator::new(config.learning_rates());
        Self::with_evaluator(config, evaluator)
    }
}

impl<E: Evaluator> Controller<E> {
    pub fn with_evaluator(config: SessionConfig, evaluator: E) -> Self {
        Self {
            config,
            evaluator,
            state: ControllerState::Idle,
            session: Session::default(),
            initial: Quad::default(),
            pending: None,
            done: false,
            cycles: 0,
            trace: None,
        }
    }

    /// Record one `IterationRecord` per committed iteration.
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(Trace::new());
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    pub fn take_trace(&mut self) -> Option<Trace> {
        self.trace.take()
    }

    /// Steps taken since the last reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn outputs(&self) -> ControllerOutputs {
        ControllerOutputs {
            done: self.done,
            min_value: self.session.best_value,
            optimal: self.session.best_params,
            iterations: self.session.iteration,
            converged: self.session.converged,
            overflow: self.session.overflow,
        }
    }

    /// Asynchronous reset: back to Idle, in-flight work discarded.
    pub fn reset(&mut self) {
        if self.state != ControllerState::Idle {
            debug!(from = self.state.name(), "controller reset");
        }
        self.evaluator.reset();
        self.state = ControllerState::Idle;
        self.session = Session::default();
        self.initial = Quad::default();
        self.pending = None;
        self.done = false;
        self.cycles = 0;
        if let Some(trace) = self.trace.as_mut() {
            trace.clear();
        }
    }

    /// One clock step.
    pub fn tick(&mut self, inputs: &ControllerInputs) {
        if inputs.reset {
            self.reset();
            return;
        }
        self.cycles += 1;

        let next = match self.state {
            ControllerState::Idle => {
                self.evaluator.tick(false, self.session.params);
                if inputs.start {
                    self.begin(inputs.initial);
                    ControllerState::Init
                } else {
                    ControllerState::Idle
                }
            }
            ControllerState::Init => {
                self.evaluator.tick(false, self.session.params);
                self.session.init_best(self.initial);
                ControllerState::Evaluate
            }
            ControllerState::Evaluate => {
                self.evaluator.tick(true, self.session.params);
                match self.evaluator.evaluation() {
                    Some(eval) => {
                        self.pending = Some((eval, self.evaluator.overflow()));
                        ControllerState::CompareUpdate
                    }
                    None => ControllerState::Evaluate,
                }
            }
            ControllerState::CompareUpdate => {
                self.evaluator.tick(false, self.session.params);
                self.compare_update()
            }
            ControllerState::Done => {
                self.evaluator.tick(false, self.session.params);
                if inputs.start {
                    ControllerState::Done
                } else {
                    ControllerState::Idle
                }
            }
        };

        if next != self.state {
            debug!(
                from = self.state.name(),
                to = next.name(),
                evaluator = self.evaluator.state_name(),
                cycle = self.cycles,
                "controller transition"
            );
        }
        self.state = next;
    }

    fn begin(&mut self, initial: Quad<i8>) {
        self.initial = initial;
        self.session = Session::start(initial);
        self.pending = None;
        self.done = false;
        if let Some(trace) = self.trace.as_mut() {
            trace.clear();
        }
        debug!(initial = %initial, "session start");
    }

    fn compare_update(&mut self) -> ControllerState {
        let Some((eval, eval_overflow)) = self.pending.take() else {
            // Only reachable if a custom evaluator reported done without a
            // result; evaluate again.
            return ControllerState::Evaluate;
        };

        let record = self
            .session
            .commit(&eval, eval_overflow, &self.config.window());

        if record.overflow && self.config.warn_on_overflow() {
            warn!(
                iteration = record.iteration,
                objective = %record.objective,
                "saturation during iteration"
            );
        }
        debug!(
            iteration = record.iteration,
            objective = record.objective.raw(),
            best = record.best_value.raw(),
            converged = record.converged,
            "iteration committed"
        );
        if let Some(trace) = self.trace.as_mut() {
            trace.push(record);
        }

        if self.session.converged || self.session.iteration >= self.config.max_iterations() {
            self.done = true;
            info!(
                iterations = self.session.iteration,
                converged = self.session.converged,
                min_value = %self.session.best_value,
                optimal = %self.session.best_params,
                overflow = self.session.overflow,
                "session done"
            );
            ControllerState::Done
        } else {
            ControllerState::Evaluate
        }
    }

    /// Hold start high until Done, bounded by `step_limit` steps.
    pub fn run_to_completion(
        &mut self,
        initial: Quad<i8>,
        step_limit: u64,
    ) -> Result<ControllerOutputs, StallError> {
        if self.state == ControllerState::Done {
            self.release();
        }
        let inputs = ControllerInputs::start(initial);
        let mut steps = 0;
        loop {
            self.tick(&inputs);
            steps += 1;
            if self.state == ControllerState::Done {
                return Ok(self.outputs());
            }
            if steps >= step_limit {
                return Err(StallError {
                    steps,
                    state: self.state.name(),
                    evaluator: self.evaluator.state_name(),
                });
            }
        }
    }

    /// `run_to_completion` with a budget derived from the iteration cap.
    pub fn run(&mut self, initial: Quad<i8>) -> Result<ControllerOutputs, StallError> {
        let limit = 2 + self.config.max_iterations() as u64 * STEPS_PER_ITERATION_BUDGET;
        self.run_to_completion(initial, limit)
    }

    /// Deassert start so a finished controller returns to Idle.
    pub fn release(&mut self) {
        self.tick(&ControllerInputs::idle());
    }
}
