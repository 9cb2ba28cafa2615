use super::{usable_length, Clip, ClipSource, Listeners};
use ffmpeg_next as ffmpeg;
use iced::widget::image;
use log::{debug, info, warn};
use std::fmt;
use std::time::Duration;
use trafficcore::playback::{
    EventSink, ListenerToken, MediaEvent, MediaHandle, PlaybackError, PlaybackResult, StreamId,
};

/// Container durations are expressed in microseconds.
const CONTAINER_TIME_BASE: f64 = 1_000_000.0;

/// Sequential RGBA frames of the best video stream in a file or URL.
struct FrameReader {
    input: ffmpeg::format::context::Input,
    decoder: ffmpeg::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    stream_index: usize,
    time_base: f64,
    duration: Option<f64>,
    drained: bool,
    finished: bool,
    pending: Option<(f64, image::Handle)>,
}

impl FrameReader {
    fn open(location: &str) -> Result<Self, ffmpeg::Error> {
        ffmpeg::init()?;
        let input = ffmpeg::format::input(location)?;
        let (stream_index, time_base, parameters) = {
            let stream = input
                .streams()
                .best(ffmpeg::media::Type::Video)
                .ok_or(ffmpeg::Error::StreamNotFound)?;
            (
                stream.index(),
                f64::from(stream.time_base()),
                stream.parameters(),
            )
        };
        let decoder = ffmpeg::codec::context::Context::from_parameters(parameters)?
            .decoder()
            .video()?;
        let scaler = ffmpeg::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::format::Pixel::RGBA,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::Flags::BILINEAR,
        )?;
        let duration = usable_length(Some(input.duration() as f64 / CONTAINER_TIME_BASE));
        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            time_base,
            duration,
            drained: false,
            finished: false,
            pending: None,
        })
    }

    fn next_frame(&mut self) -> Result<Option<(f64, image::Handle)>, ffmpeg::Error> {
        let mut decoded = ffmpeg::frame::Video::empty();
        loop {
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return self.convert(&decoded).map(Some);
            }
            if self.drained {
                self.finished = true;
                return Ok(None);
            }
            let next = self
                .input
                .packets()
                .next()
                .map(|(stream, packet)| (stream.index(), packet));
            match next {
                Some((index, packet)) if index == self.stream_index => {
                    self.decoder.send_packet(&packet)?
                }
                Some(_) => {}
                None => {
                    self.decoder.send_eof()?;
                    self.drained = true;
                }
            }
        }
    }

    fn convert(
        &mut self,
        decoded: &ffmpeg::frame::Video,
    ) -> Result<(f64, image::Handle), ffmpeg::Error> {
        let mut rgba = ffmpeg::frame::Video::empty();
        self.scaler.run(decoded, &mut rgba)?;
        let (width, height) = (rgba.width(), rgba.height());
        let row = width as usize * 4;
        let mut pixels = Vec::with_capacity(row * height as usize);
        for line in rgba.data(0).chunks(rgba.stride(0)).take(height as usize) {
            pixels.extend_from_slice(&line[..row]);
        }
        let ticks = decoded.timestamp().or(decoded.pts()).unwrap_or(0);
        Ok((
            ticks as f64 * self.time_base,
            image::Handle::from_rgba(width, height, pixels),
        ))
    }

    /// Latest frame due at `position`, decoding forward as needed.
    fn frame_at(&mut self, position: f64) -> Result<Option<image::Handle>, ffmpeg::Error> {
        let mut latest = None;
        loop {
            if self.pending.is_none() && !self.finished {
                self.pending = self.next_frame()?;
            }
            let due = matches!(&self.pending, Some((at, _)) if *at <= position);
            if !due {
                return Ok(latest);
            }
            latest = self.pending.take().map(|(_, frame)| frame);
        }
    }
}

/// Clip decoded with FFmpeg and paced by the UI tick.
///
/// Frames are decoded up to the playback position on every poll. The
/// container's own length wins over any length supplied by the caller.
pub struct VideoMedia {
    stream: StreamId,
    source: ClipSource,
    reader: Option<FrameReader>,
    failure: Option<String>,
    hint: Option<f64>,
    position: f64,
    playing: bool,
    frame: Option<image::Handle>,
    listeners: Listeners,
}

impl VideoMedia {
    fn emit(&self, event: MediaEvent) {
        self.listeners.emit(self.stream, event);
    }

    fn load(&mut self) {
        self.position = 0.0;
        if !self.source.available {
            self.reader = None;
            self.failure = Some(format!("{} is not available", self.source.url));
            return;
        }
        let location = self.source.location();
        match FrameReader::open(&location) {
            Ok(mut reader) => {
                match reader.frame_at(0.0) {
                    Ok(Some(poster)) => self.frame = Some(poster),
                    Ok(None) => {}
                    Err(err) => debug!("{}: no first frame: {}", location, err),
                }
                info!("opened {}", location);
                self.reader = Some(reader);
                self.failure = None;
            }
            Err(err) => {
                warn!("cannot decode {}: {}", location, err);
                self.reader = None;
                self.failure = Some(format!("{}: {}", location, err));
            }
        }
    }

    fn ended(&self) -> bool {
        let past_end = matches!(self.duration(), Some(d) if self.position >= d);
        past_end || self.reader.as_ref().is_some_and(|reader| reader.finished)
    }
}

impl fmt::Debug for VideoMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoMedia")
            .field("stream", &self.stream)
            .field("source", &self.source)
            .field("failure", &self.failure)
            .field("position", &self.position)
            .field("playing", &self.playing)
            .finish_non_exhaustive()
    }
}

impl Clip for VideoMedia {
    fn open(stream: StreamId, source: ClipSource, duration: Option<f64>) -> Self {
        let mut clip = Self {
            stream,
            source,
            reader: None,
            failure: None,
            hint: usable_length(duration),
            position: 0.0,
            playing: false,
            frame: None,
            listeners: Listeners::default(),
        };
        clip.load();
        clip
    }

    fn source(&self) -> &ClipSource {
        &self.source
    }

    fn duration(&self) -> Option<f64> {
        self.reader
            .as_ref()
            .and_then(|reader| reader.duration)
            .or(self.hint)
    }

    fn set_duration(&mut self, duration: Option<f64>) {
        self.hint = usable_length(duration);
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn frame(&self) -> Option<&image::Handle> {
        self.frame.as_ref()
    }
}

impl MediaHandle for VideoMedia {
    fn play(&mut self) -> PlaybackResult<()> {
        if self.playing {
            return Ok(());
        }
        if self.ended() {
            self.load();
        }
        if self.reader.is_none() {
            return Err(PlaybackError::Rejected {
                stream: self.stream,
                reason: self
                    .failure
                    .clone()
                    .unwrap_or_else(|| format!("{} cannot be decoded", self.source.url)),
            });
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
        if let Some(reader) = self.reader.as_mut() {
            match reader.frame_at(self.position) {
                Ok(Some(frame)) => self.frame = Some(frame),
                Ok(None) => {}
                Err(err) => {
                    warn!("decoding {} stopped: {}", self.source.url, err);
                    reader.finished = true;
                }
            }
        }
        if self.ended() {
            if let Some(duration) = self.duration() {
                self.position = self.position.min(duration);
            }
            self.emit(MediaEvent::TimeUpdate(self.position));
            self.playing = false;
            self.emit(MediaEvent::Pause);
            return;
        }
        self.emit(MediaEvent::TimeUpdate(self.position));
    }
}
