use crate::prelude::ChunkId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ground-truth elapsed real-world seconds per chunk.
///
/// Supplied as configuration rather than fetched. A chunk absent from the
/// table has no known baseline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RealWorldTimeTable {
    seconds: BTreeMap<ChunkId, f64>,
}

impl RealWorldTimeTable {
    pub fn new(seconds: BTreeMap<ChunkId, f64>) -> Self {
        Self { seconds }
    }

    /// Measured durations of the recorded intersection footage.
    pub fn recorded() -> Self {
        let seconds = [
            (0, 100.0),
            (1, 100.0),
            (2, 100.0),
            (3, 100.0),
            (4, 100.0),
            (5, 101.67),
            (6, 98.33),
            (7, 103.33),
            (8, 91.73),
        ]
        .into_iter()
        .collect();
        Self { seconds }
    }

    pub fn get(&self, chunk: ChunkId) -> Option<f64> {
        self.seconds.get(&chunk).copied()
    }

    pub fn len(&self) -> usize {
        self.seconds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seconds.is_empty()
    }
}

impl Default for RealWorldTimeTable {
    fn default() -> Self {
        Self::recorded()
    }
}
