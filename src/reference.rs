//! Floating-point reference model.
//!
//! Runs the same objective, gradients, minimum tracking and convergence
//! policy as the controller, but in `f64` with no saturation anywhere. The
//! fixed-point session should track this model to within a few LSBs
//! whenever nothing saturates.

use crate::config::SessionConfig;
use crate::fixed::Quad;

/// Objective value at a point.
pub fn objective(p: [f64; 4]) -> f64 {
    let [a, b, c, d] = p;
    (a - 2.0).powi(2) + b * b + (c + 2.0).powi(2) + (2.0 * d).powi(2) - 5.0
}

/// Partial derivatives at a point.
pub fn gradients(p: [f64; 4]) -> [f64; 4] {
    let [a, b, c, d] = p;
    [2.0 * (a - 2.0), 2.0 * b, 2.0 * (c + 2.0), 8.0 * d]
}

/// Round half away from zero, clamped to the integer output range.
fn round_output(x: f64) -> i8 {
    x.round().clamp(i8::MIN as f64, i8::MAX as f64) as i8
}

/// Outcome of one reference session.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceOutcome {
    pub best_value: f64,
    pub best_params: Quad<i8>,
    /// Parameters after the last update.
    pub final_params: [f64; 4],
    pub iterations: u32,
    pub converged: bool,
    /// Objective per iteration, in order.
    pub objectives: Vec<f64>,
}

/// Run one session in floating point.
pub fn simulate(config: &SessionConfig, initial: Quad<i8>) -> ReferenceOutcome {
    let rates = config.learning_rates().map(|r| r.to_f64()).0;
    let window = config.window();
    let (lower, upper) = (window.lower().to_f64(), window.upper().to_f64());

    let mut params = initial.map(f64::from).0;
    let mut best_value = f64::INFINITY;
    let mut best_params = initial;
    let mut previous: Option<f64> = None;
    let mut converged = false;
    let mut iterations = 0;
    let mut objectives = Vec::new();

    while iterations < config.max_iterations() {
        let z = objective(params);
        objectives.push(z);

        if let Some(prev) = previous {
            let diff = z - prev;
            converged = lower <= diff && diff <= upper;
        }
        if z < best_value {
            best_value = z;
            best_params = Quad(params.map(round_output));
        }

        let g = gradients(params);
        for i in 0..4 {
            params[i] -= g[i] * rates[i];
        }

        iterations += 1;
        previous = Some(z);
        if converged {
            break;
        }
    }

    ReferenceOutcome {
        best_value,
        best_params,
        final_params: params,
        iterations,
        converged,
        objectives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::Wide;

    fn contractive() -> SessionConfig {
        SessionConfig::default().with_learning_rates(Quad::new(
            Wide::from_raw(128),
            Wide::from_raw(128),
            Wide::from_raw(64),
            Wide::from_raw(32),
        ))
    }

    #[test]
    fn objective_and_gradient_at_minimum() {
        assert_eq!(objective([2.0, 0.0, -2.0, 0.0]), -5.0);
        assert_eq!(gradients([2.0, 0.0, -2.0, 0.0]), [0.0; 4]);
        assert_eq!(objective([0.0; 4]), 3.0);
    }

    #[test]
    fn rounding_matches_output_rule() {
        assert_eq!(round_output(2.5), 3);
        assert_eq!(round_output(-2.5), -3);
        assert_eq!(round_output(127.9), 127);
        assert_eq!(round_output(-200.0), -128);
    }

    #[test]
    fn contractive_session_converges() {
        let out = simulate(&contractive(), Quad::new(0, 0, 0, 0));
        assert!(out.converged);
        assert_eq!(out.iterations, 7);
        assert_eq!(out.best_params, Quad::new(2, 0, -2, 0));
        assert!((out.best_value + 5.0).abs() < 0.01);
        assert_eq!(out.objectives[0], 3.0);
        assert_eq!(out.objectives[1], -4.0);
    }

    #[test]
    fn default_session_reaches_minimum() {
        let out = simulate(&SessionConfig::default(), Quad::new(0, 0, 0, 0));
        assert!(out.converged);
        assert_eq!(out.iterations, 7);
        assert_eq!(out.best_params, Quad::new(2, 0, -2, 0));
        assert!((out.best_value + 5.0).abs() < 0.01);
    }

    #[test]
    fn unit_rate_oscillates_in_a() {
        let config = SessionConfig::default().with_learning_rates(Quad::new(
            Wide::from_raw(256),
            Wide::from_raw(128),
            Wide::from_raw(64),
            Wide::from_raw(32),
        ));
        let out = simulate(&config, Quad::new(0, 0, 0, 0));
        assert!(out.converged);
        assert_eq!(out.iterations, 7);
        assert_eq!(out.final_params[0], 4.0);
        assert_eq!(out.best_params, Quad::new(0, 0, -2, 0));
        assert!((out.best_value + 1.0).abs() < 0.01);
    }

    #[test]
    fn respects_iteration_cap() {
        let config = contractive().with_max_iterations(3).unwrap();
        let out = simulate(&config, Quad::new(10, -20, 30, -40));
        assert_eq!(out.iterations, 3);
        assert!(!out.converged);
        assert_eq!(out.objectives.len(), 3);
    }
}
