//! Parsing of service payloads into the data model.
//!
//! Everything crossing the service boundary is validated here so that the
//! metrics code only ever sees well-formed records.

use crate::gateway::{GatewayError, GatewayResult};
use crate::model::{TrafficRecord, Violation};
use crate::prelude::ChunkId;
use log::warn;

pub fn parse_chunks(body: &str) -> GatewayResult<Vec<ChunkId>> {
    Ok(serde_json::from_str(body)?)
}

/// Parses one record and checks that it belongs to `expected` with sane durations.
pub fn parse_record(body: &str, expected: ChunkId) -> GatewayResult<TrafficRecord> {
    let record: TrafficRecord = serde_json::from_str(body)?;
    validate_record(&record, expected)?;
    Ok(record)
}

/// Parses a violation list. Rows without an id are keyed by their car id;
/// rows carrying neither cannot be selected and are dropped.
pub fn parse_violations(body: &str) -> GatewayResult<Vec<Violation>> {
    let violations: Vec<Violation> = serde_json::from_str(body)?;
    let total = violations.len();
    let kept: Vec<Violation> = violations
        .into_iter()
        .filter_map(|mut violation| {
            if violation.id.trim().is_empty() {
                violation.id = violation.car_id.trim().to_string();
            }
            (!violation.id.is_empty()).then_some(violation)
        })
        .collect();
    if kept.len() < total {
        warn!(
            "dropped {} violation(s) with neither id nor car id",
            total - kept.len()
        );
    }
    Ok(kept)
}

fn validate_record(record: &TrafficRecord, expected: ChunkId) -> GatewayResult<()> {
    if record.chunk != expected {
        return Err(GatewayError::Invalid(format!(
            "asked for chunk {} but received chunk {}",
            expected, record.chunk
        )));
    }
    for (idx, rec) in record.recommendations.iter().enumerate() {
        if !rec.duration_sec.is_finite() || rec.duration_sec < 0.0 {
            return Err(GatewayError::Invalid(format!(
                "recommendation {} has duration {}",
                idx + 1,
                rec.duration_sec
            )));
        }
    }
    Ok(())
}
