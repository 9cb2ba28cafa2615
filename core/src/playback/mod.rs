pub mod handle;
pub mod synchronizer;

pub use handle::{
    EventSink, ListenerToken, MediaEvent, MediaHandle, PlaybackError, PlaybackResult, StreamEvent,
    StreamId,
};
pub use synchronizer::{Command, PlaybackState, PlaybackSynchronizer};
