use crate::fixtures::config::FixtureSet;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trafficcore::model::{BestFrame, RealWorldStat, Recommendation, SignalState, TrafficRecord, Violation};

/// Parameters for synthesizing fixtures when no fixture file is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub chunks: u32,
    pub signals: usize,
    pub violations: usize,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            chunks: 9,
            signals: 4,
            violations: 12,
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    fn signal_ids(&self) -> Vec<String> {
        (1..=self.signals.max(1))
            .map(|idx| format!("ID-{}", idx))
            .collect()
    }
}

fn build_plan(rng: &mut StdRng, signals: &[String]) -> Vec<Recommendation> {
    let rows = rng.gen_range(4..=9);
    let mut current = signals[0].clone();
    (0..rows)
        .map(|_| {
            let recommended = signals
                .choose(rng)
                .cloned()
                .unwrap_or_else(|| current.clone());
            let all_counts: BTreeMap<String, u64> = signals
                .iter()
                .map(|id| (id.clone(), rng.gen_range(0..20)))
                .collect();
            let all_states = signals
                .iter()
                .map(|id| {
                    let state = if *id == recommended {
                        SignalState::Green
                    } else if *id == current {
                        SignalState::Yellow
                    } else {
                        SignalState::Red
                    };
                    (id.clone(), state)
                })
                .collect();
            let row = Recommendation {
                current: current.clone(),
                recommended: recommended.clone(),
                duration_sec: rng.gen_range(5..=25) as f64,
                all_counts,
                all_states,
            };
            current = recommended;
            row
        })
        .collect()
}

fn build_record(rng: &mut StdRng, chunk: u32, signals: &[String]) -> TrafficRecord {
    TrafficRecord {
        id: Some(format!("chunk-{:04}", chunk)),
        chunk,
        best_frames: signals
            .iter()
            .map(|id| BestFrame {
                id: id.clone(),
                image: None,
            })
            .collect(),
        recommendations: build_plan(rng, signals),
        video_path: Some(trafficcore::media::real_video_path(chunk)),
        real_world: signals
            .iter()
            .map(|id| RealWorldStat {
                signal_id: id.clone(),
                cars_passed: rng.gen_range(10..60),
            })
            .collect(),
    }
}

fn build_violation(rng: &mut StdRng, index: usize) -> Violation {
    let letters: String = (0..2)
        .map(|_| rng.gen_range(b'A'..=b'Z') as char)
        .collect();
    Violation {
        id: format!("violation-{:03}", index),
        car_id: rng.gen_range(1..40u32).to_string(),
        plate_text: format!("{}-{:04}", letters, rng.gen_range(0..10_000)),
        plate_image: None,
    }
}

/// Seeded synthetic fixtures; the same config always yields the same data.
pub fn build_fixtures(config: &GeneratorConfig) -> FixtureSet {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let signals = config.signal_ids();
    let chunks = (0..config.chunks)
        .map(|chunk| build_record(&mut rng, chunk, &signals))
        .collect();
    let violations = (0..config.violations)
        .map(|index| build_violation(&mut rng, index))
        .collect();
    FixtureSet { chunks, violations }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_requested_shape() {
        let fixtures = build_fixtures(&GeneratorConfig::default());
        assert_eq!(fixtures.chunk_ids(), (0..9).collect::<Vec<_>>());
        assert_eq!(fixtures.violations.len(), 12);
        let record = fixtures.record(0).unwrap();
        assert_eq!(record.real_world.len(), 4);
        for row in &record.recommendations {
            assert_eq!(row.all_states[&row.recommended], SignalState::Green);
            assert!(row.duration_sec >= 5.0);
        }
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let config = GeneratorConfig {
            seed: 13,
            ..Default::default()
        };
        let first = build_fixtures(&config);
        let second = build_fixtures(&config);
        assert_eq!(first.chunks, second.chunks);
        assert_eq!(first.violations, second.violations);
    }
}
