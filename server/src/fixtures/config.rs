use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use trafficcore::model::{TrafficRecord, Violation};
use trafficcore::ChunkId;

/// Everything the service can answer with.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FixtureSet {
    #[serde(default)]
    pub chunks: Vec<TrafficRecord>,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

impl FixtureSet {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading fixtures {}", path_ref.display()))?;
        let fixtures: FixtureSet = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing fixtures {}", path_ref.display()))?;
        fixtures.check()?;
        Ok(fixtures)
    }

    fn check(&self) -> anyhow::Result<()> {
        let mut seen = BTreeSet::new();
        for record in &self.chunks {
            if !seen.insert(record.chunk) {
                bail!("chunk {} appears more than once", record.chunk);
            }
        }
        Ok(())
    }

    /// Distinct chunk ids, ascending.
    pub fn chunk_ids(&self) -> Vec<ChunkId> {
        self.chunks
            .iter()
            .map(|record| record.chunk)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn record(&self, chunk: ChunkId) -> Option<&TrafficRecord> {
        self.chunks.iter().find(|record| record.chunk == chunk)
    }

    pub fn violations_for_car(&self, car_id: &str) -> Vec<Violation> {
        self.violations
            .iter()
            .filter(|violation| violation.car_id == car_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FIXTURES: &str = r#"
chunks:
  - chunk: 3
    recommendations:
      - current: ID-1
        recommended: ID-2
        duration_sec: 10
        all_counts: {ID-1: 4, ID-2: 8}
        all_states: {ID-1: red, ID-2: green}
    real_world:
      - {id: ID-1, cars_passed_in_real: 9}
  - chunk: 1
violations:
  - {id: v1, car_ID: "7", plate_text: "KX-771"}
"#;

    #[test]
    fn load_reads_yaml_and_sorts_chunk_ids() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(FIXTURES.as_bytes()).unwrap();
        let path = temp.into_temp_path();
        let fixtures = FixtureSet::load(&path).unwrap();

        assert_eq!(fixtures.chunk_ids(), vec![1, 3]);
        assert_eq!(
            fixtures.record(3).unwrap().recommendations[0].recommended_count(),
            8
        );
        assert_eq!(fixtures.violations_for_car("7").len(), 1);
        assert!(fixtures.violations_for_car("8").is_empty());
    }

    #[test]
    fn duplicate_chunks_are_refused() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"chunks:\n  - chunk: 2\n  - chunk: 2\n")
            .unwrap();
        let path = temp.into_temp_path();
        assert!(FixtureSet::load(&path).is_err());
    }
}
