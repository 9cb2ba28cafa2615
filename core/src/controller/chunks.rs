use crate::metrics::{ChunkMetrics, RealWorldTimeTable};
use crate::model::TrafficRecord;
use crate::prelude::ChunkId;
use log::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum IndexStatus {
    Loading,
    Ready,
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordStatus {
    /// No chunk selected.
    Idle,
    Loading,
    Ready(TrafficRecord),
    /// No record for the chunk, or the fetch failed.
    Unavailable(String),
}

/// Ticket for one record fetch. Only the newest ticket is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRequest {
    pub chunk: ChunkId,
    pub generation: u64,
}

/// Chunk index, the selected chunk and its record.
#[derive(Debug, Clone)]
pub struct ChunkNavigator {
    index: IndexStatus,
    chunks: Vec<ChunkId>,
    selected: Option<ChunkId>,
    generation: u64,
    record: RecordStatus,
}

impl ChunkNavigator {
    pub fn new() -> Self {
        Self {
            index: IndexStatus::Loading,
            chunks: Vec::new(),
            selected: None,
            generation: 0,
            record: RecordStatus::Idle,
        }
    }

    /// Stores the chunk index and selects its first chunk.
    ///
    /// The service already sorts the ids, so they are kept as received.
    pub fn finish_index(&mut self, outcome: Result<Vec<ChunkId>, String>) -> Option<RecordRequest> {
        match outcome {
            Ok(chunks) => {
                info!("chunk index holds {} chunks", chunks.len());
                self.index = IndexStatus::Ready;
                let first = chunks.first().copied();
                self.chunks = chunks;
                self.selected = None;
                self.record = RecordStatus::Idle;
                first.and_then(|chunk| self.select(chunk))
            }
            Err(err) => {
                warn!("chunk index unavailable: {}", err);
                self.index = IndexStatus::Unavailable(err);
                None
            }
        }
    }

    /// Selects `chunk` and returns the fetch to issue for it.
    ///
    /// Chunks missing from the index and re-selecting the current chunk are no-ops.
    pub fn select(&mut self, chunk: ChunkId) -> Option<RecordRequest> {
        if !self.chunks.contains(&chunk) || self.selected == Some(chunk) {
            return None;
        }
        self.selected = Some(chunk);
        self.generation += 1;
        self.record = RecordStatus::Loading;
        Some(RecordRequest {
            chunk,
            generation: self.generation,
        })
    }

    /// Selects the chunk at `position` in the index.
    pub fn select_position(&mut self, position: usize) -> Option<RecordRequest> {
        let chunk = *self.chunks.get(position)?;
        self.select(chunk)
    }

    /// Stores a fetched record unless a newer selection superseded `request`.
    pub fn finish_record(
        &mut self,
        request: RecordRequest,
        outcome: Result<TrafficRecord, String>,
    ) -> bool {
        if request.generation != self.generation || self.selected != Some(request.chunk) {
            debug!(
                "discarding stale record for chunk {} (generation {})",
                request.chunk, request.generation
            );
            return false;
        }
        self.record = match outcome {
            Ok(record) => RecordStatus::Ready(record),
            Err(err) => {
                warn!("record for chunk {} unavailable: {}", request.chunk, err);
                RecordStatus::Unavailable(err)
            }
        };
        true
    }

    pub fn index_status(&self) -> &IndexStatus {
        &self.index
    }

    pub fn chunks(&self) -> &[ChunkId] {
        &self.chunks
    }

    pub fn selected(&self) -> Option<ChunkId> {
        self.selected
    }

    pub fn selected_position(&self) -> Option<usize> {
        let chunk = self.selected?;
        self.chunks.iter().position(|c| *c == chunk)
    }

    pub fn record_status(&self) -> &RecordStatus {
        &self.record
    }

    pub fn record(&self) -> Option<&TrafficRecord> {
        match &self.record {
            RecordStatus::Ready(record) => Some(record),
            _ => None,
        }
    }

    /// Figures for the selected chunk, once its record is in.
    pub fn metrics(&self, table: &RealWorldTimeTable) -> Option<ChunkMetrics> {
        let chunk = self.selected?;
        self.record()
            .map(|record| ChunkMetrics::derive(record, table, chunk))
    }
}

impl Default for ChunkNavigator {
    fn default() -> Self {
        Self::new()
    }
}
