use crate::metrics::format_fixed;
use crate::model::{SignalState, TrafficRecord};
use crate::prelude::SignalId;

/// One displayed row of the recommended plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRow {
    /// 1-based position in the plan.
    pub position: usize,
    pub current: SignalId,
    pub recommended: SignalId,
    pub duration: String,
    /// Aligned with [`PlanTable::signals`]; `None` renders an empty cell.
    pub counts: Vec<Option<u64>>,
    pub states: Vec<Option<SignalState>>,
}

/// The recommendation table with one count and one state column per signal.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanTable {
    pub signals: Vec<SignalId>,
    pub rows: Vec<PlanRow>,
}

impl PlanTable {
    pub fn from_record(record: &TrafficRecord) -> Self {
        let signals = record.signal_ids();
        let rows = record
            .recommendations
            .iter()
            .enumerate()
            .map(|(idx, rec)| PlanRow {
                position: idx + 1,
                current: rec.current.clone(),
                recommended: rec.recommended.clone(),
                duration: format_fixed(rec.duration_sec),
                counts: signals
                    .iter()
                    .map(|id| rec.all_counts.get(id).copied())
                    .collect(),
                states: signals
                    .iter()
                    .map(|id| rec.all_states.get(id).copied())
                    .collect(),
            })
            .collect();
        Self { signals, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Recommendation;
    use std::collections::BTreeMap;

    #[test]
    fn columns_cover_every_signal_and_gaps_stay_empty() {
        let record = TrafficRecord {
            id: None,
            chunk: 0,
            best_frames: Vec::new(),
            recommendations: vec![
                Recommendation {
                    current: "ID-1".into(),
                    recommended: "ID-2".into(),
                    duration_sec: 7.5,
                    all_counts: BTreeMap::from([("ID-1".to_string(), 2), ("ID-2".to_string(), 6)]),
                    all_states: BTreeMap::from([("ID-2".to_string(), SignalState::Green)]),
                },
                Recommendation {
                    current: "ID-2".into(),
                    recommended: "ID-3".into(),
                    duration_sec: 3.0,
                    all_counts: BTreeMap::from([("ID-3".to_string(), 1)]),
                    all_states: BTreeMap::new(),
                },
            ],
            video_path: None,
            real_world: Vec::new(),
        };

        let table = PlanTable::from_record(&record);
        assert_eq!(table.signals, vec!["ID-1", "ID-2", "ID-3"]);
        assert_eq!(table.rows[0].position, 1);
        assert_eq!(table.rows[0].duration, "7.50");
        assert_eq!(table.rows[0].counts, vec![Some(2), Some(6), None]);
        assert_eq!(
            table.rows[0].states,
            vec![None, Some(SignalState::Green), None]
        );
        assert_eq!(table.rows[1].counts, vec![None, None, Some(1)]);
    }
}
