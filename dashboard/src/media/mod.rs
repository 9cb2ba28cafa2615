//! Playable clips behind the [`MediaHandle`] seam.
//!
//! With the `video` feature the dashboard decodes the clips with FFmpeg;
//! without it each clip is a clock that advances with the UI tick.

mod clock;
#[cfg(feature = "video")]
mod video;

pub use clock::ClockMedia;
#[cfg(feature = "video")]
pub use video::VideoMedia;

use iced::widget::image;
use std::path::PathBuf;
use trafficcore::playback::{
    EventSink, ListenerToken, MediaEvent, MediaHandle, StreamEvent, StreamId,
};

#[cfg(feature = "video")]
pub type ActiveClip = VideoMedia;
#[cfg(not(feature = "video"))]
pub type ActiveClip = ClockMedia;

/// Where a clip comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSource {
    /// Address the data service serves the clip at.
    pub url: String,
    /// Copy under the configured media root, when there is one.
    pub local: Option<PathBuf>,
    /// False when a media root is configured but the file is missing.
    pub available: bool,
}

impl ClipSource {
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            local: None,
            available: true,
        }
    }

    /// Local path when present, the URL otherwise.
    pub fn location(&self) -> String {
        match &self.local {
            Some(path) => path.display().to_string(),
            None => self.url.clone(),
        }
    }
}

/// A clip the dashboard can mount, show and steer.
pub trait Clip: MediaHandle {
    fn open(stream: StreamId, source: ClipSource, duration: Option<f64>) -> Self;

    fn source(&self) -> &ClipSource;

    fn duration(&self) -> Option<f64>;

    /// Supplies a length learned after opening. Clips that know their own
    /// length keep it.
    fn set_duration(&mut self, duration: Option<f64>);

    fn position(&self) -> f64;

    fn is_playing(&self) -> bool;

    fn frame(&self) -> Option<&image::Handle> {
        None
    }
}

/// The single event listener a clip carries.
#[derive(Debug, Default)]
struct Listeners {
    current: Option<(ListenerToken, EventSink)>,
    issued: u64,
}

impl Listeners {
    fn attach(&mut self, sink: EventSink) -> ListenerToken {
        self.issued += 1;
        let token = ListenerToken(self.issued);
        self.current = Some((token, sink));
        token
    }

    fn release(&mut self, token: ListenerToken) -> bool {
        if matches!(&self.current, Some((held, _)) if *held == token) {
            self.current = None;
            true
        } else {
            false
        }
    }

    fn emit(&self, stream: StreamId, event: MediaEvent) {
        if let Some((_, sink)) = &self.current {
            // A closed queue means the session is gone; nothing to notify.
            let _ = sink.send(StreamEvent { stream, event });
        }
    }
}

fn usable_length(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d > 0.0)
}
