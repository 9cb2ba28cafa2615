//! View state owned by the dashboard, updated only through the methods here.

pub mod chunks;
pub mod tab;
pub mod table;

pub use chunks::{ChunkNavigator, IndexStatus, RecordRequest, RecordStatus};
pub use tab::Tab;
pub use table::{PlanRow, PlanTable};
