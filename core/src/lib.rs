//! Core of the traffic signal dashboard.
//!
//! Pure derivations over data fetched from the external optimization pipeline:
//! chunk records and their efficiency figures, paired real/simulated playback,
//! the red-light violation list and the demo session gate.

pub mod controller;
pub mod gateway;
pub mod media;
pub mod metrics;
pub mod model;
pub mod playback;
pub mod prelude;
pub mod session;
pub mod telemetry;
pub mod violations;

pub use prelude::{ChunkId, SignalId};
