use crate::app::{Dashboard, Message};
use crate::canvas::{accent, signal_color, EfficiencyBars, TrafficLight};
use crate::media::Clip;
use iced::{
    widget::{
        button, column,
        image::{Handle, Image},
        row, scrollable, text, text_input, Canvas, Column, Container, Row,
    },
    Alignment, Color, Element, Length,
};
use trafficcore::controller::{IndexStatus, PlanTable, RecordStatus, Tab};
use trafficcore::metrics::{format_clock, format_fixed, format_seconds, ChunkMetrics, Verdict};
use trafficcore::model::{SignalState, TrafficRecord};
use trafficcore::playback::StreamId;
use trafficcore::violations::BrowserStatus;

const MUTED: Color = Color::from_rgb(0.55, 0.57, 0.62);

pub fn view(state: &Dashboard) -> Element<'_, Message> {
    if state.signed_in() {
        dashboard_view(state)
    } else {
        login_view(state)
    }
}

fn login_view(state: &Dashboard) -> Element<'_, Message> {
    let logo = Canvas::new(TrafficLight {
        phase: state.light_phase,
    })
    .width(Length::Fixed(56.0))
    .height(Length::Fixed(150.0));

    let feedback = state.gate.error().unwrap_or("");

    let form = column![
        logo,
        text("Sign in to Smart Traffic").size(26),
        text("Username").size(14),
        text_input("johndoe", &state.login.username)
            .on_input(Message::UsernameChanged)
            .on_submit(Message::SubmitLogin)
            .padding(6),
        text("Password").size(14),
        row![
            text_input("password", &state.login.password)
                .on_input(Message::PasswordChanged)
                .on_submit(Message::SubmitLogin)
                .secure(!state.login.show_password)
                .padding(6),
            button(if state.login.show_password { "Hide" } else { "Show" })
                .on_press(Message::ShowPasswordToggled)
                .padding(6),
        ]
        .spacing(6),
        button(if state.login.remember {
            "[x] Remember me"
        } else {
            "[ ] Remember me"
        })
        .on_press(Message::RememberToggled)
        .padding(6),
        text(feedback).size(14).color(signal_color(SignalState::Red)),
        button("Sign In")
            .on_press(Message::SubmitLogin)
            .padding(10)
            .width(Length::Fill),
        text("Smart Traffic System").size(11).color(MUTED),
    ]
    .spacing(10)
    .padding(24)
    .align_x(Alignment::Center)
    .width(Length::Fixed(360.0));

    Container::new(form)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

fn navbar(state: &Dashboard) -> Element<'_, Message> {
    let tabs = Tab::ALL.iter().fold(Row::new().spacing(12), |row, tab| {
        let label = if *tab == state.tab {
            format!("[{}]", tab.label().to_uppercase())
        } else {
            tab.label().to_uppercase()
        };
        row.push(
            button(text(label).size(14))
                .on_press(Message::TabSelected(*tab))
                .padding(8),
        )
    });
    row![
        tabs,
        text(format!("Operator: {}", state.gate.user().unwrap_or("-"))).size(14),
        button("Sign out").on_press(Message::SignOut).padding(8),
    ]
    .spacing(24)
    .align_y(Alignment::Center)
    .padding(12)
    .into()
}

fn dashboard_view(state: &Dashboard) -> Element<'_, Message> {
    let body = match state.tab {
        Tab::Metrics => metrics_view(state),
        Tab::Comparison => comparison_view(state),
        Tab::Violation => violation_view(state),
    };

    let layout = row![
        Container::new(scrollable(body))
            .padding(16)
            .width(Length::Fill),
        activity_panel(state),
    ]
    .spacing(20)
    .align_y(Alignment::Start);

    column![navbar(state), layout]
        .spacing(8)
        .padding(12)
        .into()
}

fn chunk_selector(state: &Dashboard) -> Element<'_, Message> {
    let selected = state.chunks.selected();
    let buttons = state
        .chunks
        .chunks()
        .iter()
        .fold(Row::new().spacing(6), |row, chunk| {
            let label = if Some(*chunk) == selected {
                format!("[{}]", chunk)
            } else {
                chunk.to_string()
            };
            row.push(
                button(text(label).size(14))
                    .on_press(Message::ChunkSelected(*chunk))
                    .padding(6),
            )
        });
    column![
        text(format!(
            "Select Chunk: {}",
            selected.map(|c| c.to_string()).unwrap_or_else(|| "-".into())
        ))
        .size(18),
        buttons,
    ]
    .spacing(8)
    .into()
}

/// Placeholder for the chunk index while it is not usable, if so.
fn index_notice(state: &Dashboard) -> Option<Element<'_, Message>> {
    match state.chunks.index_status() {
        IndexStatus::Loading => Some(text("Loading chunk index …").size(18).into()),
        IndexStatus::Unavailable(err) => Some(
            column![
                text(format!("Chunk index unavailable: {}", err)).size(16),
                button("Retry").on_press(Message::ReloadChunks).padding(8),
            ]
            .spacing(10)
            .into(),
        ),
        IndexStatus::Ready if state.chunks.chunks().is_empty() => {
            Some(text("No chunks recorded yet").size(18).into())
        }
        IndexStatus::Ready => None,
    }
}

fn metrics_view(state: &Dashboard) -> Element<'_, Message> {
    if let Some(notice) = index_notice(state) {
        return notice;
    }

    let content: Element<'_, Message> = match state.chunks.record_status() {
        RecordStatus::Idle | RecordStatus::Loading => text("Loading data …").size(16).into(),
        RecordStatus::Unavailable(err) => text(format!("No record for this chunk ({})", err))
            .size(16)
            .into(),
        RecordStatus::Ready(record) => match state.chunks.metrics(&state.config.real_world_times) {
            Some(metrics) => record_view(record, metrics),
            None => text("Loading data …").size(16).into(),
        },
    };

    column![chunk_selector(state), content]
        .spacing(16)
        .into()
}

fn figure_column<'a>(
    title: &'a str,
    seconds: String,
    cars: u64,
    efficiency: f64,
) -> Column<'a, Message> {
    column![
        text(title).size(12).color(MUTED),
        text(format!("{} s", seconds)).size(30),
        text(format!("Cars: {}", cars)).size(14),
        text(format!("Eff: {} cars/s", format_fixed(efficiency))).size(14),
    ]
    .spacing(4)
    .align_x(Alignment::Center)
    .width(Length::Fixed(170.0))
}

fn record_view(record: &TrafficRecord, metrics: ChunkMetrics) -> Element<'_, Message> {
    let verdict_color = match metrics.verdict() {
        Verdict::Improvement => signal_color(SignalState::Green),
        Verdict::Regression => signal_color(SignalState::Red),
    };

    let summary = row![
        figure_column(
            "REAL-WORLD TIME",
            format_seconds(metrics.real_world_sec),
            metrics.total_cars_real,
            metrics.eff_real,
        ),
        column![
            text("Improvement").size(14).color(MUTED),
            text(format!("{} cars/s", format_fixed(metrics.improvement)))
                .size(18)
                .color(verdict_color),
            Canvas::new(EfficiencyBars {
                real: metrics.eff_real,
                recommended: metrics.eff_recommended,
            })
            .width(Length::Fixed(120.0))
            .height(Length::Fixed(80.0)),
        ]
        .spacing(6)
        .align_x(Alignment::Center),
        figure_column(
            "RECOMMENDED TIME",
            format_fixed(metrics.recommended_total_sec),
            metrics.total_cars_recommended,
            metrics.eff_recommended,
        ),
    ]
    .spacing(40)
    .align_y(Alignment::Center);

    let frames = if record.best_frames.is_empty() {
        Row::new().push(text("No frames for this chunk").size(12))
    } else {
        record
            .best_frames
            .iter()
            .fold(Row::new().spacing(12), |row, frame| {
                let picture: Element<'_, Message> = match frame.image_bytes() {
                    Some(bytes) => Image::new(Handle::from_bytes(bytes))
                        .width(Length::Fixed(180.0))
                        .height(Length::Fixed(120.0))
                        .into(),
                    None => text("no image").size(12).color(MUTED).into(),
                };
                row.push(
                    column![text(frame.id.as_str()).size(14), picture]
                        .spacing(4)
                        .align_x(Alignment::Center),
                )
            })
    };

    column![
        text("Performance Summary").size(22),
        summary,
        text("Best Frames").size(22),
        frames,
        text("Recommendations").size(22),
        plan_table(PlanTable::from_record(record)),
    ]
    .spacing(14)
    .into()
}

fn cell<'a>(content: String, width: f32) -> Element<'a, Message> {
    Container::new(text(content).size(13))
        .width(Length::Fixed(width))
        .into()
}

fn plan_table<'a>(table: PlanTable) -> Element<'a, Message> {
    if table.rows.is_empty() {
        return text("No recommendations for this chunk").size(12).into();
    }

    let mut header = Row::new()
        .push(cell("#".into(), 30.0))
        .push(cell("Current".into(), 80.0))
        .push(cell("Recommended".into(), 110.0))
        .push(cell("Duration (s)".into(), 100.0));
    for id in &table.signals {
        header = header.push(cell(format!("{} Cnt", id), 80.0));
    }
    for id in &table.signals {
        header = header.push(cell(format!("{} State", id), 90.0));
    }

    table
        .rows
        .into_iter()
        .fold(Column::new().spacing(4).push(header), |col, plan_row| {
            let mut line = Row::new()
                .push(cell(plan_row.position.to_string(), 30.0))
                .push(cell(plan_row.current, 80.0))
                .push(cell(plan_row.recommended, 110.0))
                .push(cell(plan_row.duration, 100.0));
            for count in plan_row.counts {
                line = line.push(cell(
                    count.map(|c| c.to_string()).unwrap_or_default(),
                    80.0,
                ));
            }
            for state in plan_row.states {
                let entry: Element<'a, Message> = match state {
                    Some(state) => Container::new(
                        text(state.label()).size(13).color(signal_color(state)),
                    )
                    .width(Length::Fixed(90.0))
                    .into(),
                    None => cell(String::new(), 90.0),
                };
                line = line.push(entry);
            }
            col.push(line)
        })
        .into()
}

/// Latest decoded frame of a clip, or where it is loaded from.
fn clip_picture<'a, C: Clip>(clip: Option<&'a C>, width: f32) -> Element<'a, Message> {
    match clip {
        Some(clip) => match clip.frame() {
            Some(frame) => Image::new(frame.clone())
                .width(Length::Fixed(width))
                .into(),
            None => text(clip.source().location()).size(12).color(MUTED).into(),
        },
        None => text("no clip").size(12).color(MUTED).into(),
    }
}

fn comparison_view(state: &Dashboard) -> Element<'_, Message> {
    if let Some(notice) = index_notice(state) {
        return notice;
    }
    let Some(chunk) = state.chunks.selected() else {
        return chunk_selector(state);
    };

    let stream_panel = |title: &'static str, stream: StreamId| {
        column![
            text(title).size(18),
            clip_picture(state.playback.handle(stream), 420.0),
            text(format_clock(state.playback.elapsed(stream))).size(34),
        ]
        .spacing(6)
        .align_x(Alignment::Center)
        .width(Length::FillPortion(1))
    };

    let playing = state.playback.is_playing();
    let rejection = state
        .playback
        .last_rejection()
        .map(|err| err.to_string())
        .unwrap_or_default();

    column![
        chunk_selector(state),
        text(format!("Video Comparison: chunk {}", chunk)).size(22),
        row![
            stream_panel("Real world", StreamId::Real),
            stream_panel("Simulation", StreamId::Simulated),
        ]
        .spacing(24),
        button(if playing { "Pause Both" } else { "Play Both" })
            .on_press(Message::TogglePlayback)
            .padding(10),
        text(rejection).size(12).color(MUTED),
    ]
    .spacing(16)
    .align_x(Alignment::Center)
    .into()
}

fn violation_view(state: &Dashboard) -> Element<'_, Message> {
    match state.violations.status() {
        BrowserStatus::Loading => return text("Loading violations …").size(16).into(),
        BrowserStatus::Unavailable(err) => {
            return column![
                text(format!("Violations unavailable: {}", err)).size(16),
                button("Retry").on_press(Message::ReloadViolations).padding(8),
            ]
            .spacing(10)
            .into()
        }
        BrowserStatus::Ready if state.violations.violations().is_empty() => {
            return text("No violations recorded.").size(16).into()
        }
        BrowserStatus::Ready => {}
    }

    let cars = state.violations.violations().iter().fold(
        Column::new().spacing(6).push(text("Cars").size(18)),
        |col, violation| {
            let car = if violation.car_id.is_empty() {
                "unknown"
            } else {
                violation.car_id.as_str()
            };
            let label = if state.violations.is_selected(&violation.id) {
                format!("> Car {}", car)
            } else {
                format!("Car {}", car)
            };
            col.push(
                button(text(label).size(14))
                    .on_press(Message::ViolationSelected(violation.id.clone()))
                    .padding(6)
                    .width(Length::Fill),
            )
        },
    );

    let details: Element<'_, Message> = match state.violations.detail() {
        Some(detail) => {
            let plate: Element<'_, Message> = match detail.violation.plate_bytes() {
                Some(bytes) => Image::new(Handle::from_bytes(bytes))
                    .width(Length::Fixed(240.0))
                    .into(),
                None => text("no plate image").size(12).color(MUTED).into(),
            };
            column![
                text("Violation Details").size(22),
                plate,
                text(detail.violation.plate_text.as_str()).size(26),
                text(format!("Car ID: {}", detail.violation.car_id)).size(14),
                text("Ticket issued automatically")
                    .size(14)
                    .color(signal_color(SignalState::Red)),
                text(format!("First name: {}", detail.person.first)).size(14),
                text(format!("Last name: {}", detail.person.last)).size(14),
                text(format!("Phone: {}", detail.person.phone)).size(14),
                text("Placeholder driver details, not an identity lookup")
                    .size(11)
                    .color(MUTED),
                violation_clip(state),
            ]
            .spacing(8)
            .align_x(Alignment::Center)
            .into()
        }
        None => text("Select a car").size(14).into(),
    };

    row![
        Container::new(scrollable(cars)).width(Length::Fixed(220.0)),
        Container::new(details).width(Length::Fill),
    ]
    .spacing(24)
    .into()
}

fn violation_clip(state: &Dashboard) -> Element<'_, Message> {
    let playing = state
        .violation_clip
        .as_ref()
        .is_some_and(|clip| clip.is_playing());
    let position = state
        .violation_clip
        .as_ref()
        .map(|clip| clip.position())
        .unwrap_or(0.0);
    column![
        text("Violation clip").size(16).color(accent()),
        clip_picture(state.violation_clip.as_ref(), 360.0),
        row![
            button(if playing { "Pause" } else { "Play" })
                .on_press(Message::ToggleViolationClip)
                .padding(6),
            text(format_clock(position)).size(16),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
        text(state.violation_clip_error.clone().unwrap_or_default())
            .size(12)
            .color(MUTED),
    ]
    .spacing(6)
    .align_x(Alignment::Center)
    .into()
}

fn activity_panel(state: &Dashboard) -> Element<'_, Message> {
    let (fetched, errors) = state.gateway.counters().snapshot();
    let entries = if state.activity.is_empty() {
        Column::new().push(text("No activity yet").size(12))
    } else {
        state
            .activity
            .recent()
            .fold(Column::new().spacing(4), |col, entry| {
                col.push(text(entry).size(12))
            })
    };

    column![
        text("Activity log").size(16),
        text(format!("Fetches: {} ok / {} failed", fetched, errors)).size(12),
        Container::new(scrollable(entries).height(Length::Fixed(360.0))).padding(6),
    ]
    .spacing(8)
    .padding(16)
    .width(Length::Fixed(280.0))
    .into()
}
