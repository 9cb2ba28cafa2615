use crate::playback::handle::{
    ListenerToken, MediaEvent, MediaHandle, PlaybackError, PlaybackResult, StreamEvent, StreamId,
};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Observable state of the paired playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing mounted.
    Idle,
    /// Both streams reported paused, or nothing has played yet.
    Paused,
    /// At least one stream reported playing.
    Playing,
}

/// Command issued to both handles by [`PlaybackSynchronizer::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct StreamStatus {
    playing: bool,
    current_time: f64,
}

const STREAMS: [StreamId; 2] = [StreamId::Real, StreamId::Simulated];

fn all_paused(streams: &[StreamStatus; 2]) -> bool {
    streams.iter().all(|status| !status.playing)
}

/// Transition table. `streams` already reflects `event`.
fn next_state(
    state: PlaybackState,
    streams: &[StreamStatus; 2],
    event: MediaEvent,
) -> PlaybackState {
    match (state, event) {
        (PlaybackState::Idle, _) => PlaybackState::Idle,
        (_, MediaEvent::Play) => PlaybackState::Playing,
        (_, MediaEvent::Pause) if all_paused(streams) => PlaybackState::Paused,
        (current, MediaEvent::Pause) | (current, MediaEvent::TimeUpdate(_)) => current,
    }
}

/// Handles plus their subscriptions. Dropping it releases both subscriptions.
#[derive(Debug)]
struct Session<H: MediaHandle> {
    handles: [H; 2],
    tokens: [ListenerToken; 2],
    streams: [StreamStatus; 2],
    events: UnboundedReceiver<StreamEvent>,
    state: PlaybackState,
    last_rejection: Option<PlaybackError>,
}

impl<H: MediaHandle> Session<H> {
    fn open(real: H, simulated: H) -> Self {
        let (sink, events) = mpsc::unbounded_channel();
        let mut handles = [real, simulated];
        let tokens = [
            handles[0].subscribe(StreamId::Real, sink.clone()),
            handles[1].subscribe(StreamId::Simulated, sink),
        ];
        Self {
            handles,
            tokens,
            streams: [StreamStatus::default(); 2],
            events,
            state: PlaybackState::Paused,
            last_rejection: None,
        }
    }

    fn apply(&mut self, event: StreamEvent) {
        let status = &mut self.streams[event.stream.index()];
        match event.event {
            MediaEvent::Play => status.playing = true,
            MediaEvent::Pause => status.playing = false,
            MediaEvent::TimeUpdate(time) => status.current_time = time,
        }
        let next = next_state(self.state, &self.streams, event.event);
        if next != self.state {
            debug!("playback {:?} -> {:?} on {:?}", self.state, next, event);
            self.state = next;
        }
    }
}

impl<H: MediaHandle> Drop for Session<H> {
    fn drop(&mut self) {
        for (handle, token) in self.handles.iter_mut().zip(self.tokens) {
            handle.unsubscribe(token);
        }
    }
}

/// Keeps a real and a simulated stream paced together behind one play/pause control.
///
/// The session state is derived only from events the handles report, never
/// from the commands issued, so a stream that refuses to start is shown as it is.
/// Clock drift between the streams is not corrected.
#[derive(Debug)]
pub struct PlaybackSynchronizer<H: MediaHandle> {
    session: Option<Session<H>>,
}

impl<H: MediaHandle> PlaybackSynchronizer<H> {
    pub fn new() -> Self {
        Self { session: None }
    }

    /// Takes exclusive ownership of both handles and subscribes to their events.
    /// Any previously mounted pair is released first.
    pub fn mount(&mut self, real: H, simulated: H) {
        self.unmount();
        info!("playback session mounted");
        self.session = Some(Session::open(real, simulated));
    }

    /// Releases the subscriptions and discards the handles.
    pub fn unmount(&mut self) {
        if self.session.take().is_some() {
            info!("playback session unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.session.is_some()
    }

    pub fn state(&self) -> PlaybackState {
        self.session
            .as_ref()
            .map(|session| session.state)
            .unwrap_or(PlaybackState::Idle)
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// Last reported position of `stream`, zero when nothing is mounted.
    pub fn elapsed(&self, stream: StreamId) -> f64 {
        self.session
            .as_ref()
            .map(|session| session.streams[stream.index()].current_time)
            .unwrap_or(0.0)
    }

    /// The mounted handle for `stream`.
    pub fn handle(&self, stream: StreamId) -> Option<&H> {
        self.session
            .as_ref()
            .map(|session| &session.handles[stream.index()])
    }

    /// Mutable access for adjusting a mounted handle, such as a clip length
    /// learned after mounting. Playback state still moves only on events.
    pub fn handle_mut(&mut self, stream: StreamId) -> Option<&mut H> {
        self.session
            .as_mut()
            .map(|session| &mut session.handles[stream.index()])
    }

    /// Most recent refusal to start playback, cleared by the next toggle.
    pub fn last_rejection(&self) -> Option<&PlaybackError> {
        self.session
            .as_ref()
            .and_then(|session| session.last_rejection.as_ref())
    }

    /// Pauses both streams while playing, otherwise asks both to play.
    ///
    /// Returns the command issued. Refusals are logged and kept for display;
    /// the state only moves once the handles report back.
    pub fn toggle(&mut self) -> PlaybackResult<Command> {
        let session = self.session.as_mut().ok_or(PlaybackError::NotMounted)?;
        session.last_rejection = None;
        let command = match session.state {
            PlaybackState::Playing => Command::Pause,
            _ => Command::Play,
        };
        match command {
            Command::Pause => {
                for handle in session.handles.iter_mut() {
                    handle.pause();
                }
            }
            Command::Play => {
                for (handle, stream) in session.handles.iter_mut().zip(STREAMS) {
                    if let Err(err) = handle.play() {
                        warn!("{:?} stream did not start: {}", stream, err);
                        session.last_rejection = Some(err);
                    }
                }
            }
        }
        Ok(command)
    }

    /// Applies a single reported event. Ignored while nothing is mounted.
    pub fn handle_event(&mut self, event: StreamEvent) {
        if let Some(session) = self.session.as_mut() {
            session.apply(event);
        }
    }

    /// Advances the handles' clocks and applies every event they queued.
    pub fn pump(&mut self, elapsed: Duration) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        for handle in session.handles.iter_mut() {
            handle.poll(elapsed);
        }
        while let Ok(event) = session.events.try_recv() {
            session.apply(event);
        }
    }
}

impl<H: MediaHandle> Default for PlaybackSynchronizer<H> {
    fn default() -> Self {
        Self::new()
    }
}
