pub mod record;
pub mod violation;

pub use record::{BestFrame, RealWorldStat, Recommendation, SignalState, TrafficRecord};
pub use violation::Violation;
