//! Parallel sweep over start points.
//!
//! Every start point gets its own controller; sessions share nothing, so
//! they run on rayon's pool and the results come back in input order.

use rayon::prelude::*;
use tracing::debug;

use crate::config::SessionConfig;
use crate::controller::{Controller, ControllerOutputs, StallError};
use crate::fixed::{Quad, Wide};

/// Refuse grids larger than this many start points.
pub const MAX_GRID_POINTS: u64 = 1_000_000;

/// One finished session of a sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepResult {
    pub initial: Quad<i8>,
    pub outputs: ControllerOutputs,
    pub cycles: u64,
    /// Short trace digest.
    pub digest: String,
}

/// Aggregate over a sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepSummary {
    pub sessions: usize,
    pub converged: usize,
    pub overflowed: usize,
    /// Index of the session with the lowest minimum, first one on ties.
    pub best: Option<usize>,
}

impl SweepSummary {
    pub fn from_results(results: &[SweepResult]) -> Self {
        let mut best: Option<(usize, Wide)> = None;
        for (i, r) in results.iter().enumerate() {
            match best {
                Some((_, value)) if r.outputs.min_value >= value => {}
                _ => best = Some((i, r.outputs.min_value)),
            }
        }
        Self {
            sessions: results.len(),
            converged: results.iter().filter(|r| r.outputs.converged).count(),
            overflowed: results.iter().filter(|r| r.outputs.overflow).count(),
            best: best.map(|(i, _)| i),
        }
    }
}

/// Number of points `grid` would produce.
pub fn grid_size(from: i8, to: i8, step: u8) -> u64 {
    if from > to || step == 0 {
        return 0;
    }
    let per_axis = (to as i64 - from as i64) as u64 / step as u64 + 1;
    per_axis.pow(4)
}

/// Cartesian grid over all four parameters, `a` varying slowest.
pub fn grid(from: i8, to: i8, step: u8) -> Vec<Quad<i8>> {
    if from > to || step == 0 {
        return Vec::new();
    }
    let axis: Vec<i8> = (from as i16..=to as i16)
        .step_by(step as usize)
        .map(|v| v as i8)
        .collect();
    let mut points = Vec::with_capacity(axis.len().pow(4));
    for &a in &axis {
        for &b in &axis {
            for &c in &axis {
                for &d in &axis {
                    points.push(Quad::new(a, b, c, d));
                }
            }
        }
    }
    points
}

fn run_point(config: &SessionConfig, initial: Quad<i8>) -> Result<SweepResult, StallError> {
    let mut ctrl = Controller::new(*config).with_trace();
    let outputs = ctrl.run(initial)?;
    let digest = ctrl
        .trace()
        .map(|t| t.short_digest())
        .unwrap_or_default();
    Ok(SweepResult {
        initial,
        outputs,
        cycles: ctrl.cycles(),
        digest,
    })
}

/// Run one session per start point in parallel.
pub fn run_grid(
    config: &SessionConfig,
    points: &[Quad<i8>],
) -> Result<Vec<SweepResult>, StallError> {
    debug!(points = points.len(), "sweep start");
    points
        .par_iter()
        .map(|&initial| run_point(config, initial))
        .collect()
}
