use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Which side of the comparison a stream plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamId {
    /// Recorded real-world footage.
    Real,
    /// Simulated footage under the recommended plan.
    Simulated,
}

impl StreamId {
    pub fn index(&self) -> usize {
        match self {
            StreamId::Real => 0,
            StreamId::Simulated => 1,
        }
    }
}

/// Notification raised by a media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    Play,
    Pause,
    TimeUpdate(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamEvent {
    pub stream: StreamId,
    pub event: MediaEvent,
}

/// Queue into which a subscribed handle delivers its events.
pub type EventSink = UnboundedSender<StreamEvent>;

/// Receipt for a subscription, needed to release it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(pub u64);

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("no media mounted")]
    NotMounted,
    #[error("play rejected for {stream:?}: {reason}")]
    Rejected { stream: StreamId, reason: String },
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;

/// Control surface of a single media element.
///
/// Commands never report the resulting state directly; a handle announces
/// state changes only through the events it sends to its subscribers.
pub trait MediaHandle {
    /// Requests playback. An `Err` means the runtime refused to start.
    fn play(&mut self) -> PlaybackResult<()>;

    fn pause(&mut self);

    /// Registers `sink` to receive this handle's events tagged with `stream`.
    fn subscribe(&mut self, stream: StreamId, sink: EventSink) -> ListenerToken;

    fn unsubscribe(&mut self, token: ListenerToken);

    /// Gives the handle a chance to advance its own clock by `elapsed`.
    /// Handles driven by an external decoder can ignore this.
    fn poll(&mut self, _elapsed: Duration) {}
}
