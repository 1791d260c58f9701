//! Per-family timing for the fortify benchmarks.
//!
//! Samples are bucketed by the rule family of the primitive being checked,
//! so one line per family shows what each decision rule costs.

use std::collections::HashMap;
use std::time::Duration;

use fortify_membrane::{Family, Primitive};

/// Nanoseconds per check, grouped by family.
#[derive(Default)]
pub struct FamilyTimings {
    per_family: HashMap<Family, Vec<f64>>,
    baseline: Vec<f64>,
}

impl FamilyTimings {
    /// One `iter_custom` batch for a checked `primitive`.
    pub fn record(&mut self, primitive: Primitive, iters: u64, dur: Duration) {
        self.per_family
            .entry(primitive.family())
            .or_default()
            .push(ns_per_op(iters, dur));
    }

    /// One batch of the same work done without a check.
    pub fn record_baseline(&mut self, iters: u64, dur: Duration) {
        self.baseline.push(ns_per_op(iters, dur));
    }

    /// `FORTIFY_BENCH` lines, one per family, ordered by family name.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let baseline = median(&self.baseline);
        let mut families: Vec<_> = self.per_family.iter().collect();
        families.sort_by_key(|(family, _)| family.as_str());
        families
            .into_iter()
            .filter_map(|(family, samples)| {
                let med = median(samples)?;
                let worst = samples.iter().copied().fold(f64::MIN, f64::max);
                let mut line = format!(
                    "FORTIFY_BENCH family={} samples={} median_ns_op={med:.3} worst_ns_op={worst:.3}",
                    family.as_str(),
                    samples.len(),
                );
                if let Some(base) = baseline {
                    line.push_str(&format!(" overhead_ns_op={:.3}", med - base));
                }
                Some(line)
            })
            .collect()
    }
}

fn ns_per_op(iters: u64, dur: Duration) -> f64 {
    dur.as_nanos() as f64 / iters.max(1) as f64
}

fn median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted[sorted.len() / 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_share_their_family_line() {
        let mut timings = FamilyTimings::default();
        timings.record(Primitive::Strcpy, 10, Duration::from_nanos(100));
        timings.record(Primitive::Stpcpy, 10, Duration::from_nanos(300));
        timings.record(Primitive::Memcpy, 4, Duration::from_nanos(20));

        let lines = timings.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("FORTIFY_BENCH family=raw_memory samples=1 median_ns_op=5.000"));
        assert!(lines[1].starts_with("FORTIFY_BENCH family=unbounded_copy samples=2"));
        assert!(lines[1].contains("worst_ns_op=30.000"));
        assert!(!lines[1].contains("overhead_ns_op"));
    }

    #[test]
    fn baseline_adds_overhead_column() {
        let mut timings = FamilyTimings::default();
        timings.record(Primitive::Memcpy, 1, Duration::from_nanos(12));
        timings.record_baseline(1, Duration::from_nanos(9));
        assert!(timings.lines()[0].ends_with("overhead_ns_op=3.000"));
    }

    #[test]
    fn empty_timings_print_nothing() {
        assert!(FamilyTimings::default().lines().is_empty());
    }
}
