use app::Dashboard;
use iced::Theme;

mod app;
mod canvas;
mod config;
mod media;
mod view;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Dashboard::boot, Dashboard::update, view::view)
        .title(application_title)
        .subscription(Dashboard::subscription)
        .theme(application_theme)
        .run()
}

fn application_title(state: &Dashboard) -> String {
    match state.chunks.selected() {
        Some(chunk) if state.signed_in() => format!("Smart Traffic - chunk {}", chunk),
        _ => "Smart Traffic".into(),
    }
}

fn application_theme(_: &Dashboard) -> Theme {
    Theme::Dark
}
