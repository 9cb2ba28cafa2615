use super::{usable_length, Clip, ClipSource, Listeners};
use log::debug;
use std::time::Duration;
use trafficcore::playback::{
    EventSink, ListenerToken, MediaEvent, MediaHandle, PlaybackError, PlaybackResult, StreamId,
};

/// Clip driven by the UI clock.
///
/// The position advances while playing, bounded by the clip length when
/// known, and the clip raises the same play/pause/timeupdate events a
/// decoder-backed clip does.
#[derive(Debug)]
pub struct ClockMedia {
    stream: StreamId,
    source: ClipSource,
    duration: Option<f64>,
    position: f64,
    playing: bool,
    listeners: Listeners,
}

impl ClockMedia {
    fn emit(&self, event: MediaEvent) {
        self.listeners.emit(self.stream, event);
    }

    fn ended(&self) -> bool {
        matches!(self.duration, Some(d) if self.position >= d)
    }
}

impl Clip for ClockMedia {
    fn open(stream: StreamId, source: ClipSource, duration: Option<f64>) -> Self {
        Self {
            stream,
            source,
            duration: usable_length(duration),
            position: 0.0,
            playing: false,
            listeners: Listeners::default(),
        }
    }

    fn source(&self) -> &ClipSource {
        &self.source
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_duration(&mut self, duration: Option<f64>) {
        self.duration = usable_length(duration);
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

impl MediaHandle for ClockMedia {
    fn play(&mut self) -> PlaybackResult<()> {
        if !self.source.available {
            return Err(PlaybackError::Rejected {
                stream: self.stream,
                reason: format!("{} is not available", self.source.url),
            });
        }
        if self.playing {
            return Ok(());
        }
        if self.ended() {
            self.position = 0.0;
        }
        self.playing = true;
        self.emit(MediaEvent::Play);
        Ok(())
    }

    fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.emit(MediaEvent::Pause);
        }
    }

    fn subscribe(&mut self, stream: StreamId, sink: EventSink) -> ListenerToken {
        self.stream = stream;
        self.listeners.attach(sink)
    }

    fn unsubscribe(&mut self, token: ListenerToken) {
        if self.listeners.release(token) {
            debug!("{} listener released", self.source.url);
        }
    }

    fn poll(&mut self, elapsed: Duration) {
        if !self.playing {
            return;
        }
        self.position += elapsed.as_secs_f64();
        if let Some(duration) = self.duration {
            if self.position >= duration {
                self.position = duration;
                self.emit(MediaEvent::TimeUpdate(self.position));
                self.playing = false;
                self.emit(MediaEvent::Pause);
                return;
            }
        }
        self.emit(MediaEvent::TimeUpdate(self.position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;
    use trafficcore::playback::{PlaybackState, PlaybackSynchronizer, StreamEvent};

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<StreamEvent>) -> Vec<MediaEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event.event);
        }
        events
    }

    fn clip(stream: StreamId, url: &str, duration: Option<f64>) -> ClockMedia {
        ClockMedia::open(stream, ClipSource::remote(url), duration)
    }

    #[test]
    fn clip_pauses_itself_at_the_end() {
        let (tx, mut rx) = unbounded_channel();
        let mut clip = clip(StreamId::Real, "/a.mp4", Some(1.0));
        clip.subscribe(StreamId::Real, tx);

        clip.play().unwrap();
        clip.poll(Duration::from_millis(600));
        clip.poll(Duration::from_millis(600));

        assert_eq!(
            drain(&mut rx),
            vec![
                MediaEvent::Play,
                MediaEvent::TimeUpdate(0.6),
                MediaEvent::TimeUpdate(1.0),
                MediaEvent::Pause,
            ]
        );
    }

    #[test]
    fn missing_clip_refuses_to_play() {
        let source = ClipSource {
            available: false,
            ..ClipSource::remote("/b.mp4")
        };
        let mut clip = ClockMedia::open(StreamId::Simulated, source, None);
        assert!(matches!(
            clip.play(),
            Err(PlaybackError::Rejected {
                stream: StreamId::Simulated,
                ..
            })
        ));
    }

    #[test]
    fn released_clip_stops_notifying() {
        let (tx, mut rx) = unbounded_channel();
        let mut clip = clip(StreamId::Real, "/a.mp4", None);
        let token = clip.subscribe(StreamId::Real, tx);
        clip.unsubscribe(token);
        clip.play().unwrap();
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn late_length_bounds_a_running_clip() {
        let mut clip = clip(StreamId::Simulated, "/sim.mp4", None);
        clip.play().unwrap();
        clip.poll(Duration::from_millis(500));
        clip.set_duration(Some(1.0));
        clip.poll(Duration::from_millis(800));

        assert_eq!(clip.position(), 1.0);
        assert!(!clip.is_playing());

        clip.set_duration(Some(f64::NAN));
        assert_eq!(clip.duration(), None);
    }

    #[test]
    fn shorter_clip_ending_keeps_session_playing() {
        let mut sync = PlaybackSynchronizer::new();
        sync.mount(
            clip(StreamId::Real, "/real.mp4", Some(2.0)),
            clip(StreamId::Simulated, "/sim.mp4", Some(1.0)),
        );
        sync.toggle().unwrap();
        sync.pump(Duration::from_millis(1500));

        assert_eq!(sync.state(), PlaybackState::Playing);
        assert_eq!(sync.elapsed(StreamId::Simulated), 1.0);

        sync.pump(Duration::from_millis(1000));
        assert_eq!(sync.state(), PlaybackState::Paused);
        assert_eq!(sync.elapsed(StreamId::Real), 2.0);
    }
}
