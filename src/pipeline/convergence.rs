//! Convergence-window detector.

use crate::fixed::{add_sub, Wide};

/// Accepted band for the per-step change in objective value.
///
/// The window bounds the signed change `current - previous`, not its
/// magnitude, so an asymmetric window can accept small rises but reject
/// small falls (or the reverse).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvergenceWindow {
    lower: Wide,
    upper: Wide,
}

impl ConvergenceWindow {
    /// Build a window. Returns `None` if `lower > upper`.
    pub fn new(lower: Wide, upper: Wide) -> Option<Self> {
        (lower <= upper).then_some(Self { lower, upper })
    }

    /// Symmetric window `[-half_width, +half_width]`.
    pub fn symmetric(half_width: Wide) -> Option<Self> {
        let lower = add_sub(Wide::ZERO, half_width, true);
        if lower.overflowed() {
            return None;
        }
        Self::new(lower.value, half_width)
    }

    pub fn lower(&self) -> Wide {
        self.lower
    }

    pub fn upper(&self) -> Wide {
        self.upper
    }

    /// Whether zero change is accepted.
    pub fn contains_zero(&self) -> bool {
        self.lower <= Wide::ZERO && Wide::ZERO <= self.upper
    }

    pub fn check(&self, current: Wide, previous: Wide) -> bool {
        check_convergence(current, previous, self.lower, self.upper)
    }
}

impl Default for ConvergenceWindow {
    /// One least-significant bit either side of zero.
    fn default() -> Self {
        Self {
            lower: Wide::from_raw(-1),
            upper: Wide::from_raw(1),
        }
    }
}

/// `lower <= current - previous <= upper`, with the difference saturated.
pub fn check_convergence(current: Wide, previous: Wide, lower: Wide, upper: Wide) -> bool {
    let delta = add_sub(current, previous, true).value;
    lower <= delta && delta <= upper
}
