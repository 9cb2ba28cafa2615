use crate::metrics::baseline::RealWorldTimeTable;
use crate::model::TrafficRecord;
use crate::prelude::{finite_or_zero, ratio_or_zero, ChunkId};
use serde::Serialize;

/// Whether the recommended plan moves more cars per second than reality did.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Verdict {
    Improvement,
    Regression,
}

/// Throughput figures derived from one record. Every field is finite.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChunkMetrics {
    pub chunk: ChunkId,
    pub recommended_total_sec: f64,
    pub total_cars_real: u64,
    pub total_cars_recommended: u64,
    /// `None` when the chunk has no real-world baseline.
    pub real_world_sec: Option<f64>,
    pub eff_real: f64,
    pub eff_recommended: f64,
    /// `eff_recommended - eff_real` in cars per second.
    pub improvement: f64,
}

impl ChunkMetrics {
    /// Derives the figures for `chunk` from its record and the baseline table.
    ///
    /// Missing data degrades to zero; this never fails.
    pub fn derive(record: &TrafficRecord, table: &RealWorldTimeTable, chunk: ChunkId) -> Self {
        let recommended_total_sec: f64 = record
            .recommendations
            .iter()
            .map(|rec| finite_or_zero(rec.duration_sec))
            .sum();
        let total_cars_real: u64 = record.real_world.iter().map(|stat| stat.cars_passed).sum();
        let total_cars_recommended: u64 = record
            .recommendations
            .iter()
            .map(|rec| rec.recommended_count())
            .sum();

        let real_world_sec = table.get(chunk);
        let eff_real = real_world_sec
            .map(|sec| ratio_or_zero(total_cars_real as f64, sec))
            .unwrap_or(0.0);
        let eff_recommended = ratio_or_zero(total_cars_recommended as f64, recommended_total_sec);

        Self {
            chunk,
            recommended_total_sec,
            total_cars_real,
            total_cars_recommended,
            real_world_sec,
            eff_real,
            eff_recommended,
            improvement: eff_recommended - eff_real,
        }
    }

    pub fn verdict(&self) -> Verdict {
        if self.improvement >= 0.0 {
            Verdict::Improvement
        } else {
            Verdict::Regression
        }
    }

    /// A baseline is usable only when it is known and positive.
    pub fn has_baseline(&self) -> bool {
        matches!(self.real_world_sec, Some(sec) if sec > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RealWorldStat, Recommendation};
    use std::collections::BTreeMap;

    fn rec(recommended: &str, duration_sec: f64, counts: &[(&str, u64)]) -> Recommendation {
        Recommendation {
            current: "ID-1".into(),
            recommended: recommended.into(),
            duration_sec,
            all_counts: counts
                .iter()
                .map(|(id, count)| (id.to_string(), *count))
                .collect(),
            all_states: BTreeMap::new(),
        }
    }

    fn record(chunk: ChunkId, recommendations: Vec<Recommendation>, real: &[u64]) -> TrafficRecord {
        TrafficRecord {
            id: None,
            chunk,
            best_frames: Vec::new(),
            recommendations,
            video_path: None,
            real_world: real
                .iter()
                .enumerate()
                .map(|(idx, cars)| RealWorldStat {
                    signal_id: format!("ID-{}", idx + 1),
                    cars_passed: *cars,
                })
                .collect(),
        }
    }

    #[test]
    fn empty_plan_yields_zero_recommended_figures() {
        let record = record(0, Vec::new(), &[50, 50]);
        let metrics = ChunkMetrics::derive(&record, &RealWorldTimeTable::recorded(), 0);
        assert_eq!(metrics.recommended_total_sec, 0.0);
        assert_eq!(metrics.eff_recommended, 0.0);
        assert_eq!(metrics.total_cars_real, 100);
        assert!((metrics.eff_real - 1.0).abs() < 1e-9);
    }

    #[test]
    fn missing_or_non_positive_baseline_yields_zero_real_efficiency() {
        let record = record(9, vec![rec("ID-1", 10.0, &[("ID-1", 20)])], &[30]);

        let missing = ChunkMetrics::derive(&record, &RealWorldTimeTable::recorded(), 9);
        assert_eq!(missing.real_world_sec, None);
        assert_eq!(missing.eff_real, 0.0);
        assert!(!missing.has_baseline());

        let zeroed = RealWorldTimeTable::new(BTreeMap::from([(9, 0.0)]));
        let zero = ChunkMetrics::derive(&record, &zeroed, 9);
        assert_eq!(zero.eff_real, 0.0);
        assert!(zero.improvement.is_finite());

        let negative = RealWorldTimeTable::new(BTreeMap::from([(9, -3.0)]));
        assert_eq!(ChunkMetrics::derive(&record, &negative, 9).eff_real, 0.0);
    }

    #[test]
    fn recommended_cars_only_count_the_recommended_signal() {
        let record = record(
            1,
            vec![
                rec("ID-1", 4.0, &[("ID-1", 5)]),
                rec("ID-2", 6.0, &[("ID-1", 3)]),
            ],
            &[],
        );
        let metrics = ChunkMetrics::derive(&record, &RealWorldTimeTable::recorded(), 1);
        assert_eq!(metrics.total_cars_recommended, 5);
        assert_eq!(metrics.recommended_total_sec, 10.0);
        assert!((metrics.eff_recommended - 0.5).abs() < 1e-9);
    }

    #[test]
    fn improvement_is_an_absolute_difference() {
        let table = RealWorldTimeTable::new(BTreeMap::from([(2, 50.0)]));
        // 100 cars over 50s real, 50 cars over 20s recommended.
        let record = record(2, vec![rec("ID-3", 20.0, &[("ID-3", 50)])], &[60, 40]);
        let metrics = ChunkMetrics::derive(&record, &table, 2);
        assert!((metrics.eff_real - 2.0).abs() < 1e-9);
        assert!((metrics.eff_recommended - 2.5).abs() < 1e-9);
        assert!((metrics.improvement - 0.5).abs() < 1e-9);
        assert_eq!(metrics.verdict(), Verdict::Improvement);
    }

    #[test]
    fn slower_plan_is_a_regression() {
        let table = RealWorldTimeTable::new(BTreeMap::from([(4, 10.0)]));
        let record = record(4, vec![rec("ID-1", 40.0, &[("ID-1", 20)])], &[30]);
        let metrics = ChunkMetrics::derive(&record, &table, 4);
        assert!(metrics.improvement < 0.0);
        assert_eq!(metrics.verdict(), Verdict::Regression);
    }
}
