//! Per-iteration session trace.
//!
//! A trace is the software stand-in for a waveform dump: one record per
//! committed iteration. Its BLAKE3 digest covers the raw fixed-point
//! encoding of every record, so two runs agree bit-for-bit iff their
//! digests match.

use std::fmt::Write;

use crate::fixed::{Narrow, Quad, Wide, PARAM_NAMES};

const TRACE_VERSION: u8 = 1;

/// State committed by one Compare/Update step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IterationRecord {
    /// 1-based iteration number.
    pub iteration: u32,
    /// Evaluated point (before the update).
    pub params: Quad<Narrow>,
    pub objective: Wide,
    pub deltas: Quad<Narrow>,
    /// Best value after this iteration's minimum update.
    pub best_value: Wide,
    pub best_params: Quad<i8>,
    pub converged: bool,
    /// Any saturation in this iteration's evaluation, rounding or update.
    pub overflow: bool,
}

impl IterationRecord {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.iteration.to_le_bytes());
        for p in self.params.iter() {
            out.extend_from_slice(&p.raw().to_le_bytes());
        }
        out.extend_from_slice(&self.objective.raw().to_le_bytes());
        for d in self.deltas.iter() {
            out.extend_from_slice(&d.raw().to_le_bytes());
        }
        out.extend_from_slice(&self.best_value.raw().to_le_bytes());
        for b in self.best_params.iter() {
            out.extend_from_slice(&b.to_le_bytes());
        }
        out.push(self.converged as u8);
        out.push(self.overflow as u8);
    }
}

/// Ordered list of iteration records for one session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    records: Vec<IterationRecord>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: IterationRecord) {
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    /// BLAKE3 over the versioned raw encoding, as lowercase hex.
    pub fn digest(&self) -> String {
        let mut bytes = Vec::with_capacity(1 + self.records.len() * 38);
        bytes.push(TRACE_VERSION);
        for r in &self.records {
            r.encode(&mut bytes);
        }
        blake3::hash(&bytes).to_hex().to_string()
    }

    /// First 16 hex characters of `digest()`.
    pub fn short_digest(&self) -> String {
        self.digest()[..16].to_string()
    }

    /// Fixed-width text table, one row per iteration.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{:>4}  {:>12}", "iter", "objective");
        for name in PARAM_NAMES {
            let _ = write!(out, "  {:>9}", name);
        }
        let _ = writeln!(out, "  {:>12}  conv  ovf", "best");
        for r in &self.records {
            let _ = write!(out, "{:>4}  {:>12}", r.iteration, r.objective.to_string());
            for p in r.params.iter() {
                let _ = write!(out, "  {:>9}", p.to_string());
            }
            let _ = writeln!(
                out,
                "  {:>12}  {:<4}  {}",
                r.best_value.to_string(),
                if r.converged { "yes" } else { "no" },
                if r.overflow { "yes" } else { "no" },
            );
        }
        out
    }
}
