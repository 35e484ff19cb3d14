//! Human-readable and JSON session reports.

use serde::Serialize;

use crate::api::{Comparison, SessionRun, OBJECTIVE_TOLERANCE, PARAM_TOLERANCE};
use crate::config::SessionConfig;
use crate::fixed::Quad;
use crate::sweep::{SweepResult, SweepSummary};
use crate::trace::IterationRecord;

// ─── Data Structures ───────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SettingsReport {
    pub learning_rates: [f64; 4],
    pub window: [f64; 2],
    pub max_iterations: u32,
}

impl SettingsReport {
    pub fn new(config: &SessionConfig) -> Self {
        let window = config.window();
        Self {
            learning_rates: config.learning_rates().map(|r| r.to_f64()).0,
            window: [window.lower().to_f64(), window.upper().to_f64()],
            max_iterations: config.max_iterations(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraceRow {
    pub iteration: u32,
    pub params: [f64; 4],
    pub objective: f64,
    pub best: f64,
    pub converged: bool,
    pub overflow: bool,
}

impl From<&IterationRecord> for TraceRow {
    fn from(r: &IterationRecord) -> Self {
        Self {
            iteration: r.iteration,
            params: r.params.map(|p| p.to_f64()).0,
            objective: r.objective.to_f64(),
            best: r.best_value.to_f64(),
            converged: r.converged,
            overflow: r.overflow,
        }
    }
}

/// Everything `fxdescent run` prints.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionReport {
    pub initial: [i8; 4],
    pub settings: SettingsReport,
    pub min_value: f64,
    pub min_value_raw: i32,
    pub optimal: [i8; 4],
    pub iterations: u32,
    pub converged: bool,
    pub overflow: bool,
    pub cycles: u64,
    pub digest: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceRow>,
    #[serde(skip)]
    table: Option<String>,
}

impl SessionReport {
    pub fn new(config: &SessionConfig, run: &SessionRun, include_trace: bool) -> Self {
        let out = &run.outputs;
        let (trace, table) = if include_trace {
            (
                run.trace.records().iter().map(TraceRow::from).collect(),
                Some(run.trace.render_table()),
            )
        } else {
            (Vec::new(), None)
        };
        Self {
            initial: run.initial.0,
            settings: SettingsReport::new(config),
            min_value: out.min_value.to_f64(),
            min_value_raw: out.min_value.raw(),
            optimal: out.optimal.0,
            iterations: out.iterations,
            converged: out.converged,
            overflow: out.overflow,
            cycles: run.cycles,
            digest: run.trace.digest(),
            trace,
            table,
        }
    }

    pub fn format_report(&self) -> String {
        let mut out = String::new();
        if let Some(table) = &self.table {
            out.push_str(table);
            out.push('\n');
        }
        out.push_str(&format!(
            "Session from {} (max {} iterations)\n",
            Quad(self.initial),
            self.settings.max_iterations
        ));
        out.push_str(&format!(
            "  min value   {:.4} (raw {})\n",
            self.min_value, self.min_value_raw
        ));
        out.push_str(&format!("  optimal     {}\n", Quad(self.optimal)));
        out.push_str(&format!(
            "  iterations  {} ({})\n",
            self.iterations,
            if self.converged {
                "converged"
            } else {
                "iteration cap"
            }
        ));
        out.push_str(&format!("  cycles      {}\n", self.cycles));
        out.push_str(&format!(
            "  overflow    {}\n",
            if self.overflow { "yes" } else { "no" }
        ));
        out.push_str(&format!("  digest      {}\n", &self.digest[..16]));
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Output of `fxdescent compare`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub initial: [i8; 4],
    pub fixed_min: f64,
    pub reference_min: f64,
    pub objective_deviation: f64,
    pub fixed_params: [f64; 4],
    pub reference_params: [f64; 4],
    pub param_deviation: [f64; 4],
    pub fixed_iterations: u32,
    pub reference_iterations: u32,
    pub overflow: bool,
    pub within_tolerance: bool,
}

impl ComparisonReport {
    pub fn new(cmp: &Comparison) -> Self {
        Self {
            initial: cmp.fixed.initial.0,
            fixed_min: cmp.fixed.outputs.min_value.to_f64(),
            reference_min: cmp.reference.best_value,
            objective_deviation: cmp.objective_deviation,
            fixed_params: cmp.fixed.final_params.map(|p| p.to_f64()).0,
            reference_params: cmp.reference.final_params,
            param_deviation: cmp.param_deviation,
            fixed_iterations: cmp.fixed.outputs.iterations,
            reference_iterations: cmp.reference.iterations,
            overflow: cmp.fixed.outputs.overflow,
            within_tolerance: cmp.within_tolerance(),
        }
    }

    pub fn format_report(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<10} {:>12} {:>12} {:>12}\n",
            "value", "fixed", "reference", "deviation"
        ));
        out.push_str(&"-".repeat(49));
        out.push('\n');
        out.push_str(&format!(
            "{:<10} {:>12.6} {:>12.6} {:>12.6}\n",
            "min", self.fixed_min, self.reference_min, self.objective_deviation
        ));
        for (i, name) in crate::fixed::PARAM_NAMES.iter().enumerate() {
            out.push_str(&format!(
                "{:<10} {:>12.6} {:>12.6} {:>12.6}\n",
                name, self.fixed_params[i], self.reference_params[i], self.param_deviation[i]
            ));
        }
        out.push_str(&format!(
            "{:<10} {:>12} {:>12}\n",
            "iterations", self.fixed_iterations, self.reference_iterations
        ));
        out.push_str(&format!(
            "\n{} (tolerance {} per parameter, {} on the minimum)\n",
            if self.within_tolerance {
                "within tolerance"
            } else {
                "OUT OF TOLERANCE"
            },
            PARAM_TOLERANCE,
            OBJECTIVE_TOLERANCE
        ));
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepRow {
    pub initial: [i8; 4],
    pub min_value: f64,
    pub optimal: [i8; 4],
    pub iterations: u32,
    pub converged: bool,
    pub overflow: bool,
    pub digest: String,
}

/// Output of `fxdescent sweep`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SweepReport {
    pub sessions: usize,
    pub converged: usize,
    pub overflowed: usize,
    pub best: Option<SweepRow>,
    pub results: Vec<SweepRow>,
}

impl SweepReport {
    pub fn new(results: &[SweepResult]) -> Self {
        let summary = SweepSummary::from_results(results);
        let rows: Vec<SweepRow> = results
            .iter()
            .map(|r| SweepRow {
                initial: r.initial.0,
                min_value: r.outputs.min_value.to_f64(),
                optimal: r.outputs.optimal.0,
                iterations: r.outputs.iterations,
                converged: r.outputs.converged,
                overflow: r.outputs.overflow,
                digest: r.digest.clone(),
            })
            .collect();
        Self {
            sessions: summary.sessions,
            converged: summary.converged,
            overflowed: summary.overflowed,
            best: summary.best.map(|i| rows[i].clone()),
            results: rows,
        }
    }

    /// Summary lines, plus one line per session when `verbose`.
    pub fn format_report(&self, verbose: bool) -> String {
        let mut out = String::new();
        if verbose {
            for row in &self.results {
                out.push_str(&format!(
                    "{:<24} {:>12.4} {:<20} {:>4} {}\n",
                    Quad(row.initial).to_string(),
                    row.min_value,
                    Quad(row.optimal).to_string(),
                    row.iterations,
                    row.digest
                ));
            }
        }
        out.push_str(&format!(
            "{} sessions, {} converged, {} saturated\n",
            self.sessions, self.converged, self.overflowed
        ));
        if let Some(best) = &self.best {
            out.push_str(&format!(
                "best: {:.4} at {} (from {})\n",
                best.min_value,
                Quad(best.optimal),
                Quad(best.initial)
            ));
        }
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
