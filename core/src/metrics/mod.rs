pub mod baseline;
pub mod efficiency;
pub mod format;

pub use baseline::RealWorldTimeTable;
pub use efficiency::{ChunkMetrics, Verdict};
pub use format::{format_clock, format_fixed, format_seconds, UNKNOWN_PLACEHOLDER};
