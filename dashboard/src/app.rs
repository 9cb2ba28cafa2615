use crate::config::{DashboardConfig, API_URL_VAR, CONFIG_FILE};
use crate::media::{ActiveClip, Clip};
use iced::{time, Subscription, Task};
use log::warn;
use std::time::Duration;
use trafficcore::controller::{ChunkNavigator, RecordRequest, Tab};
use trafficcore::gateway::FetchGateway;
use trafficcore::media::{real_video_path, simulation_video_path};
use trafficcore::model::{TrafficRecord, Violation};
use trafficcore::playback::{MediaHandle, PlaybackSynchronizer, StreamId};
use trafficcore::session::{CredentialTable, PreferenceStore, SessionGate};
use trafficcore::telemetry::ActivityLog;
use trafficcore::violations::ViolationBrowser;
use trafficcore::ChunkId;

pub const PLAYBACK_TICK: Duration = Duration::from_millis(250);
const LIGHT_TICK: Duration = Duration::from_millis(700);

#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub remember: bool,
    pub show_password: bool,
}

#[derive(Debug)]
pub struct Dashboard {
    pub config: DashboardConfig,
    pub gateway: FetchGateway,
    pub gate: SessionGate,
    pub login: LoginForm,
    pub tab: Tab,
    pub chunks: ChunkNavigator,
    pub playback: PlaybackSynchronizer<ActiveClip>,
    mounted_chunk: Option<ChunkId>,
    pub violations: ViolationBrowser,
    violations_requested: bool,
    pub violation_clip: Option<ActiveClip>,
    pub violation_clip_error: Option<String>,
    pub activity: ActivityLog,
    pub light_phase: usize,
}

#[derive(Debug, Clone)]
pub enum Message {
    LightTick,
    PlaybackTick,
    UsernameChanged(String),
    PasswordChanged(String),
    RememberToggled,
    ShowPasswordToggled,
    SubmitLogin,
    SignOut,
    TabSelected(Tab),
    ReloadChunks,
    ChunksFetched(Result<Vec<ChunkId>, String>),
    ChunkSelected(ChunkId),
    RecordFetched(RecordRequest, Result<TrafficRecord, String>),
    TogglePlayback,
    ReloadViolations,
    ViolationsFetched(Result<Vec<Violation>, String>),
    ViolationSelected(String),
    ToggleViolationClip,
}

impl Dashboard {
    pub fn boot() -> (Self, Task<Message>) {
        let config = DashboardConfig::load_or_default(CONFIG_FILE)
            .unwrap_or_else(|err| {
                warn!("falling back to default config: {:#}", err);
                DashboardConfig::default()
            })
            .with_api_override(std::env::var(API_URL_VAR).ok());
        (Self::new(config), Task::none())
    }

    pub fn new(config: DashboardConfig) -> Self {
        let gate = SessionGate::new(
            CredentialTable::builtin(),
            PreferenceStore::new(config.preferences_path.clone()),
        );
        let remembered = gate.remembered_username();
        let login = LoginForm {
            remember: remembered.is_some(),
            username: remembered.unwrap_or_default(),
            ..Default::default()
        };
        let mut activity = ActivityLog::new();
        activity.record(format!("Data service at {}", config.api_url));
        Self {
            gateway: FetchGateway::new(config.api_url.clone()),
            config,
            gate,
            login,
            tab: Tab::default(),
            chunks: ChunkNavigator::new(),
            playback: PlaybackSynchronizer::new(),
            mounted_chunk: None,
            violations: ViolationBrowser::new(),
            violations_requested: false,
            violation_clip: None,
            violation_clip_error: None,
            activity,
            light_phase: 0,
        }
    }

    pub fn signed_in(&self) -> bool {
        self.gate.user().is_some()
    }

    pub fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::LightTick => {
                state.light_phase = state.light_phase.wrapping_add(1);
                Task::none()
            }
            Message::PlaybackTick => {
                state.playback.pump(PLAYBACK_TICK);
                if let Some(clip) = state.violation_clip.as_mut() {
                    clip.poll(PLAYBACK_TICK);
                }
                Task::none()
            }
            Message::UsernameChanged(value) => {
                state.login.username = value;
                Task::none()
            }
            Message::PasswordChanged(value) => {
                state.login.password = value;
                Task::none()
            }
            Message::RememberToggled => {
                state.login.remember = !state.login.remember;
                Task::none()
            }
            Message::ShowPasswordToggled => {
                state.login.show_password = !state.login.show_password;
                Task::none()
            }
            Message::SubmitLogin => {
                let LoginForm {
                    username,
                    password,
                    remember,
                    ..
                } = &state.login;
                if !state.gate.sign_in(username, password, *remember) {
                    return Task::none();
                }
                state.login.password.clear();
                state.activity.record(format!("Signed in as {}", state.login.username));
                state.chunks = ChunkNavigator::new();
                state.fetch_chunks()
            }
            Message::SignOut => {
                let _ = state.select_tab(Tab::Metrics);
                state.gate.sign_out();
                state.activity.record("Signed out");
                Task::none()
            }
            Message::TabSelected(tab) => state.select_tab(tab),
            Message::ReloadChunks => {
                state.chunks = ChunkNavigator::new();
                state.fetch_chunks()
            }
            Message::ChunksFetched(outcome) => {
                if let Ok(chunks) = &outcome {
                    state
                        .activity
                        .record(format!("Chunk index: {} chunks", chunks.len()));
                }
                let request = state.chunks.finish_index(outcome);
                state.sync_comparison();
                state.fetch_record(request)
            }
            Message::ChunkSelected(chunk) => {
                let request = state.chunks.select(chunk);
                state.sync_comparison();
                state.fetch_record(request)
            }
            Message::RecordFetched(request, outcome) => {
                let failed = outcome.as_ref().err().cloned();
                if state.chunks.finish_record(request, outcome) {
                    match failed {
                        Some(err) => state
                            .activity
                            .record(format!("Chunk {}: no record ({})", request.chunk, err)),
                        None => state
                            .activity
                            .record(format!("Chunk {}: record received", request.chunk)),
                    }
                    state.sync_comparison();
                }
                Task::none()
            }
            Message::TogglePlayback => {
                match state.playback.toggle() {
                    Ok(command) => {
                        state.activity.record(format!("{:?} both streams", command));
                        state.playback.pump(Duration::ZERO);
                    }
                    Err(err) => warn!("toggle ignored: {}", err),
                }
                Task::none()
            }
            Message::ReloadViolations => {
                state.violations_requested = true;
                state.fetch_violations()
            }
            Message::ViolationsFetched(outcome) => {
                if let Ok(list) = &outcome {
                    state
                        .activity
                        .record(format!("Violations: {} recorded", list.len()));
                }
                state.violations.finish_load(outcome);
                state.open_violation_clip();
                Task::none()
            }
            Message::ViolationSelected(id) => {
                if !state.violations.is_selected(&id) && state.violations.select(&id) {
                    state.open_violation_clip();
                }
                Task::none()
            }
            Message::ToggleViolationClip => {
                if let Some(clip) = state.violation_clip.as_mut() {
                    state.violation_clip_error = None;
                    if clip.is_playing() {
                        clip.pause();
                    } else if let Err(err) = clip.play() {
                        warn!("violation clip did not start: {}", err);
                        state.violation_clip_error = Some(err.to_string());
                    }
                }
                Task::none()
            }
        }
    }

    pub fn subscription(state: &Self) -> Subscription<Message> {
        if !state.signed_in() {
            time::every(LIGHT_TICK).map(|_| Message::LightTick)
        } else if state.playback.is_mounted() || state.violation_clip.is_some() {
            time::every(PLAYBACK_TICK).map(|_| Message::PlaybackTick)
        } else {
            Subscription::none()
        }
    }

    fn select_tab(&mut self, tab: Tab) -> Task<Message> {
        if self.tab == tab {
            return Task::none();
        }
        match self.tab {
            Tab::Comparison => {
                self.playback.unmount();
                self.mounted_chunk = None;
            }
            Tab::Violation => {
                self.violation_clip = None;
                self.violation_clip_error = None;
            }
            Tab::Metrics => {}
        }
        self.tab = tab;
        match tab {
            Tab::Comparison => {
                self.sync_comparison();
                Task::none()
            }
            Tab::Violation if !self.violations_requested => {
                self.violations_requested = true;
                self.fetch_violations()
            }
            Tab::Violation => {
                self.open_violation_clip();
                Task::none()
            }
            Tab::Metrics => Task::none(),
        }
    }

    /// Keeps the comparison pointed at the selected chunk.
    ///
    /// Handles are replaced only when the chunk differs from the mounted one,
    /// so a record arriving for the shown chunk keeps positions as they are.
    /// The simulated clip runs for the plan total once the record is known.
    fn sync_comparison(&mut self) {
        if self.tab != Tab::Comparison {
            return;
        }
        match self.chunks.selected() {
            None => {
                self.playback.unmount();
                self.mounted_chunk = None;
            }
            Some(chunk) if self.mounted_chunk != Some(chunk) => self.mount_comparison(chunk),
            Some(_) => {}
        }
        let plan_total = self
            .chunks
            .metrics(&self.config.real_world_times)
            .map(|metrics| metrics.recommended_total_sec);
        if let (Some(total), Some(clip)) =
            (plan_total, self.playback.handle_mut(StreamId::Simulated))
        {
            clip.set_duration(Some(total));
        }
    }

    fn mount_comparison(&mut self, chunk: ChunkId) {
        let real = ActiveClip::open(
            StreamId::Real,
            self.config.clip_source(&real_video_path(chunk)),
            self.config.real_world_times.get(chunk),
        );
        let simulated = ActiveClip::open(
            StreamId::Simulated,
            self.config.clip_source(&simulation_video_path(chunk)),
            None,
        );
        self.playback.mount(real, simulated);
        self.mounted_chunk = Some(chunk);
    }

    /// Opens the clip of the selected violation while its tab is shown.
    fn open_violation_clip(&mut self) {
        self.violation_clip_error = None;
        if self.tab != Tab::Violation {
            return;
        }
        self.violation_clip = self.violations.detail().map(|detail| {
            ActiveClip::open(
                StreamId::Real,
                self.config.clip_source(&detail.video_path),
                None,
            )
        });
    }

    fn fetch_chunks(&self) -> Task<Message> {
        let gateway = self.gateway.clone();
        Task::perform(
            async move { gateway.chunks().await.map_err(|e| e.to_string()) },
            Message::ChunksFetched,
        )
    }

    fn fetch_record(&self, request: Option<RecordRequest>) -> Task<Message> {
        let Some(request) = request else {
            return Task::none();
        };
        let gateway = self.gateway.clone();
        Task::perform(
            async move {
                gateway
                    .record(request.chunk)
                    .await
                    .map_err(|e| e.to_string())
            },
            move |outcome| Message::RecordFetched(request, outcome),
        )
    }

    fn fetch_violations(&mut self) -> Task<Message> {
        self.violations.begin_load();
        let gateway = self.gateway.clone();
        Task::perform(
            async move { gateway.violations().await.map_err(|e| e.to_string()) },
            Message::ViolationsFetched,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;
    use trafficcore::controller::RecordStatus;
    use trafficcore::model::Recommendation;
    use trafficcore::playback::PlaybackState;

    fn signed_in(dir: &std::path::Path) -> Dashboard {
        let config = DashboardConfig {
            preferences_path: dir.join("prefs.json"),
            ..Default::default()
        };
        let mut dashboard = Dashboard::new(config);
        let _ = Dashboard::update(&mut dashboard, Message::UsernameChanged("admin".into()));
        let _ = Dashboard::update(&mut dashboard, Message::PasswordChanged("1234".into()));
        let _ = Dashboard::update(&mut dashboard, Message::SubmitLogin);
        dashboard
    }

    fn record(chunk: ChunkId) -> TrafficRecord {
        TrafficRecord {
            id: None,
            chunk,
            best_frames: Vec::new(),
            recommendations: Vec::new(),
            video_path: None,
            real_world: Vec::new(),
        }
    }

    fn planned_record(chunk: ChunkId, durations: &[f64]) -> TrafficRecord {
        let recommendations = durations
            .iter()
            .map(|duration| Recommendation {
                current: "ID-1".into(),
                recommended: "ID-2".into(),
                duration_sec: *duration,
                all_counts: BTreeMap::new(),
                all_states: BTreeMap::new(),
            })
            .collect();
        TrafficRecord {
            recommendations,
            ..record(chunk)
        }
    }

    fn violation(id: &str, car_id: &str) -> Violation {
        Violation {
            id: id.into(),
            car_id: car_id.into(),
            plate_text: String::new(),
            plate_image: None,
        }
    }

    fn send(dashboard: &mut Dashboard, message: Message) {
        let _ = Dashboard::update(dashboard, message);
    }

    fn clip_url(dashboard: &Dashboard, stream: StreamId) -> Option<String> {
        dashboard
            .playback
            .handle(stream)
            .map(|clip| clip.source().url.clone())
    }

    #[test]
    fn wrong_password_stays_on_login() {
        let dir = tempdir().unwrap();
        let config = DashboardConfig {
            preferences_path: dir.path().join("prefs.json"),
            ..Default::default()
        };
        let mut dashboard = Dashboard::new(config);
        let _ = Dashboard::update(&mut dashboard, Message::UsernameChanged("admin".into()));
        let _ = Dashboard::update(&mut dashboard, Message::PasswordChanged("wrong".into()));
        let _ = Dashboard::update(&mut dashboard, Message::SubmitLogin);

        assert!(!dashboard.signed_in());
        assert!(dashboard.gate.error().is_some());
        assert_eq!(dashboard.login.password, "wrong");
    }

    #[test]
    fn remembered_username_prefills_the_form() {
        let dir = tempdir().unwrap();
        let mut first = signed_in(dir.path());
        let _ = Dashboard::update(&mut first, Message::RememberToggled);
        let _ = Dashboard::update(&mut first, Message::SignOut);
        let _ = Dashboard::update(&mut first, Message::PasswordChanged("1234".into()));
        let _ = Dashboard::update(&mut first, Message::SubmitLogin);

        let reopened = Dashboard::new(DashboardConfig {
            preferences_path: dir.path().join("prefs.json"),
            ..Default::default()
        });
        assert_eq!(reopened.login.username, "admin");
        assert!(reopened.login.remember);
        assert!(reopened.login.password.is_empty());
    }

    #[test]
    fn comparison_tab_owns_a_session_only_while_shown() {
        let dir = tempdir().unwrap();
        let mut dashboard = signed_in(dir.path());
        let _ = Dashboard::update(&mut dashboard, Message::ChunksFetched(Ok(vec![0, 1])));

        let _ = Dashboard::update(&mut dashboard, Message::TabSelected(Tab::Comparison));
        assert_eq!(dashboard.playback.state(), PlaybackState::Paused);

        let _ = Dashboard::update(&mut dashboard, Message::TogglePlayback);
        assert!(dashboard.playback.is_playing());

        let _ = Dashboard::update(&mut dashboard, Message::TabSelected(Tab::Metrics));
        assert_eq!(dashboard.playback.state(), PlaybackState::Idle);
    }

    #[test]
    fn stale_record_does_not_replace_newer_selection() {
        let dir = tempdir().unwrap();
        let mut dashboard = signed_in(dir.path());
        let _ = Dashboard::update(&mut dashboard, Message::ChunksFetched(Ok(vec![0, 1])));
        let first = RecordRequest {
            chunk: 0,
            generation: 1,
        };
        let _ = Dashboard::update(&mut dashboard, Message::ChunkSelected(1));
        let _ = Dashboard::update(&mut dashboard, Message::RecordFetched(first, Ok(record(0))));

        assert_eq!(dashboard.chunks.selected(), Some(1));
        assert_eq!(dashboard.chunks.record_status(), &RecordStatus::Loading);
    }

    #[test]
    fn violations_load_once_on_first_visit() {
        let dir = tempdir().unwrap();
        let mut dashboard = signed_in(dir.path());
        let _ = Dashboard::update(&mut dashboard, Message::TabSelected(Tab::Violation));
        let _ = Dashboard::update(
            &mut dashboard,
            Message::ViolationsFetched(Err("connection refused".into())),
        );
        let _ = Dashboard::update(&mut dashboard, Message::TabSelected(Tab::Metrics));
        let _ = Dashboard::update(&mut dashboard, Message::TabSelected(Tab::Violation));

        assert!(matches!(
            dashboard.violations.status(),
            trafficcore::violations::BrowserStatus::Unavailable(_)
        ));
    }

    #[test]
    fn comparison_handles_follow_the_selected_chunk() {
        let dir = tempdir().unwrap();
        let mut dashboard = signed_in(dir.path());
        send(&mut dashboard, Message::ChunksFetched(Ok(vec![0, 1])));
        send(&mut dashboard, Message::TabSelected(Tab::Comparison));

        assert_eq!(
            clip_url(&dashboard, StreamId::Real).as_deref(),
            Some("http://127.0.0.1:8000/chunk_0_real_h264.mp4")
        );
        assert_eq!(
            clip_url(&dashboard, StreamId::Simulated).as_deref(),
            Some("http://127.0.0.1:8000/chunk_0_simulation_h264.mp4")
        );

        send(&mut dashboard, Message::TogglePlayback);
        send(&mut dashboard, Message::PlaybackTick);
        send(&mut dashboard, Message::ChunkSelected(1));

        assert_eq!(dashboard.playback.state(), PlaybackState::Paused);
        assert_eq!(dashboard.playback.elapsed(StreamId::Real), 0.0);
        assert_eq!(
            clip_url(&dashboard, StreamId::Real).as_deref(),
            Some("http://127.0.0.1:8000/chunk_1_real_h264.mp4")
        );
        assert_eq!(
            clip_url(&dashboard, StreamId::Simulated).as_deref(),
            Some("http://127.0.0.1:8000/chunk_1_simulation_h264.mp4")
        );
    }

    #[test]
    fn record_for_the_shown_chunk_keeps_paused_positions() {
        let dir = tempdir().unwrap();
        let mut dashboard = signed_in(dir.path());
        send(&mut dashboard, Message::ChunksFetched(Ok(vec![0])));
        send(&mut dashboard, Message::TabSelected(Tab::Comparison));
        send(&mut dashboard, Message::TogglePlayback);
        for _ in 0..8 {
            send(&mut dashboard, Message::PlaybackTick);
        }
        send(&mut dashboard, Message::TogglePlayback);
        assert_eq!(dashboard.playback.state(), PlaybackState::Paused);
        assert_eq!(dashboard.playback.elapsed(StreamId::Real), 2.0);

        let request = RecordRequest {
            chunk: 0,
            generation: 1,
        };
        send(
            &mut dashboard,
            Message::RecordFetched(request, Ok(planned_record(0, &[1.5, 1.5]))),
        );

        assert_eq!(dashboard.playback.state(), PlaybackState::Paused);
        assert_eq!(dashboard.playback.elapsed(StreamId::Real), 2.0);
        assert_eq!(dashboard.playback.elapsed(StreamId::Simulated), 2.0);
        assert_eq!(
            dashboard
                .playback
                .handle(StreamId::Simulated)
                .and_then(|clip| clip.duration()),
            Some(3.0)
        );
    }

    #[test]
    fn record_while_playing_bounds_the_simulated_clip() {
        let dir = tempdir().unwrap();
        let mut dashboard = signed_in(dir.path());
        send(&mut dashboard, Message::ChunksFetched(Ok(vec![0])));
        send(&mut dashboard, Message::TabSelected(Tab::Comparison));
        send(&mut dashboard, Message::TogglePlayback);

        let request = RecordRequest {
            chunk: 0,
            generation: 1,
        };
        send(
            &mut dashboard,
            Message::RecordFetched(request, Ok(planned_record(0, &[0.5, 0.5]))),
        );
        assert!(dashboard.playback.is_playing());

        for _ in 0..8 {
            send(&mut dashboard, Message::PlaybackTick);
        }
        assert_eq!(dashboard.playback.elapsed(StreamId::Simulated), 1.0);
        assert_eq!(dashboard.playback.elapsed(StreamId::Real), 2.0);
        assert!(dashboard.playback.is_playing());
    }

    #[test]
    fn violation_clip_follows_the_selection() {
        let dir = tempdir().unwrap();
        let mut dashboard = signed_in(dir.path());
        send(&mut dashboard, Message::TabSelected(Tab::Violation));
        send(
            &mut dashboard,
            Message::ViolationsFetched(Ok(vec![violation("a", "2"), violation("b", "1")])),
        );

        let url = |dashboard: &Dashboard| {
            dashboard
                .violation_clip
                .as_ref()
                .map(|clip| clip.source().url.clone())
        };
        assert_eq!(
            url(&dashboard).as_deref(),
            Some("http://127.0.0.1:8000/violations/car_1_violation_h264.mp4")
        );

        send(&mut dashboard, Message::ViolationSelected("a".into()));
        assert_eq!(
            url(&dashboard).as_deref(),
            Some("http://127.0.0.1:8000/violations/car_2_violation_h264.mp4")
        );

        send(&mut dashboard, Message::ToggleViolationClip);
        send(&mut dashboard, Message::PlaybackTick);
        assert_eq!(
            dashboard.violation_clip.as_ref().map(|clip| clip.position()),
            Some(0.25)
        );

        send(&mut dashboard, Message::TabSelected(Tab::Metrics));
        assert!(dashboard.violation_clip.is_none());
    }
}
