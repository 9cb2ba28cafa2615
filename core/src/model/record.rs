use crate::prelude::{ChunkId, SignalId};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Light shown by a signal head.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SignalState {
    Red,
    Yellow,
    Green,
}

impl SignalState {
    pub fn label(&self) -> &'static str {
        match self {
            SignalState::Red => "red",
            SignalState::Yellow => "yellow",
            SignalState::Green => "green",
        }
    }
}

/// Best detection snapshot of a signal approach within a chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BestFrame {
    pub id: String,
    /// Base64 JPEG without a `data:` prefix.
    #[serde(default)]
    pub image: Option<String>,
}

impl BestFrame {
    /// Decoded JPEG bytes, or `None` when the payload is absent or not valid base64.
    pub fn image_bytes(&self) -> Option<Vec<u8>> {
        let encoded = self.image.as_deref()?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .ok()
    }
}

/// One row of a recommended signal-timing plan.
///
/// `current` and `recommended` name signal heads; the light of every head
/// during the row is in `all_states`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub current: SignalId,
    pub recommended: SignalId,
    pub duration_sec: f64,
    #[serde(default)]
    pub all_counts: BTreeMap<SignalId, u64>,
    #[serde(default)]
    pub all_states: BTreeMap<SignalId, SignalState>,
}

impl Recommendation {
    /// Count queued at the recommended head, zero when the row does not carry it.
    pub fn recommended_count(&self) -> u64 {
        self.all_counts
            .get(&self.recommended)
            .copied()
            .unwrap_or(0)
    }
}

/// Observed throughput of one signal head during the real-world recording.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealWorldStat {
    #[serde(rename = "id")]
    pub signal_id: SignalId,
    #[serde(rename = "cars_passed_in_real")]
    pub cars_passed: u64,
}

/// Pipeline output for a single chunk. Replaced wholesale when the chunk changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrafficRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub chunk: ChunkId,
    #[serde(default)]
    pub best_frames: Vec<BestFrame>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
    #[serde(default)]
    pub real_world: Vec<RealWorldStat>,
}

impl TrafficRecord {
    /// Sorted union of every signal id mentioned by the plan rows.
    pub fn signal_ids(&self) -> Vec<SignalId> {
        let mut ids: Vec<SignalId> = self
            .recommendations
            .iter()
            .flat_map(|rec| rec.all_counts.keys().chain(rec.all_states.keys()))
            .cloned()
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_parses_pipeline_field_names() {
        let json = r#"{
            "id": "665f",
            "chunk": 3,
            "best_frames": [{"id": "ID-1", "image": "aGVsbG8="}],
            "recommendations": [{
                "current": "ID-1",
                "recommended": "ID-2",
                "duration_sec": 12,
                "all_counts": {"ID-1": 4, "ID-2": 9},
                "all_states": {"ID-1": "red", "ID-2": "green"}
            }],
            "video_path": "chunk_3.mp4",
            "real_world": [{"id": "ID-1", "cars_passed_in_real": 7}]
        }"#;

        let record: TrafficRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.chunk, 3);
        assert_eq!(record.recommendations[0].duration_sec, 12.0);
        assert_eq!(record.recommendations[0].recommended_count(), 9);
        assert_eq!(
            record.recommendations[0].all_states["ID-2"],
            SignalState::Green
        );
        assert_eq!(record.real_world[0].cars_passed, 7);
        assert_eq!(record.best_frames[0].image_bytes().unwrap(), b"hello");
    }

    #[test]
    fn missing_recommended_count_is_zero() {
        let rec = Recommendation {
            current: "ID-1".into(),
            recommended: "ID-2".into(),
            duration_sec: 5.0,
            all_counts: BTreeMap::from([("ID-1".to_string(), 3)]),
            all_states: BTreeMap::new(),
        };
        assert_eq!(rec.recommended_count(), 0);
    }

    #[test]
    fn undecodable_frame_yields_no_image() {
        let frame = BestFrame {
            id: "ID-3".into(),
            image: Some("not base64 !!".into()),
        };
        assert!(frame.image_bytes().is_none());
        let empty = BestFrame {
            id: "ID-4".into(),
            image: None,
        };
        assert!(empty.image_bytes().is_none());
    }
}
