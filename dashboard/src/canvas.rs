use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Point, Rectangle, Renderer, Size, Theme,
};
use trafficcore::model::SignalState;

use crate::app::Message;

const RED: Color = Color::from_rgb(0.91, 0.22, 0.2);
const YELLOW: Color = Color::from_rgb(0.98, 0.76, 0.16);
const GREEN: Color = Color::from_rgb(0.2, 0.78, 0.35);
const BLUE: Color = Color::from_rgb(0.18, 0.52, 0.96);

/// Red, yellow, green, yellow.
const CYCLE: [SignalState; 4] = [
    SignalState::Red,
    SignalState::Yellow,
    SignalState::Green,
    SignalState::Yellow,
];

pub fn signal_color(state: SignalState) -> Color {
    match state {
        SignalState::Red => RED,
        SignalState::Yellow => YELLOW,
        SignalState::Green => GREEN,
    }
}

pub fn accent() -> Color {
    BLUE
}

/// Animated three-lamp logo on the sign-in screen.
#[derive(Debug, Clone, Copy)]
pub struct TrafficLight {
    pub phase: usize,
}

impl TrafficLight {
    pub fn active(&self) -> SignalState {
        CYCLE[self.phase % CYCLE.len()]
    }
}

impl canvas::Program<Message> for TrafficLight {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.07, 0.08, 0.1),
        );

        let active = self.active();
        let lamp_height = bounds.height / 3.0;
        let radius = (bounds.width.min(lamp_height) / 2.0 - 6.0).max(2.0);
        for (idx, lamp) in [SignalState::Red, SignalState::Yellow, SignalState::Green]
            .into_iter()
            .enumerate()
        {
            let center = Point::new(bounds.width / 2.0, lamp_height * (idx as f32 + 0.5));
            let color = signal_color(lamp);
            let color = if lamp == active {
                color
            } else {
                Color { a: 0.25, ..color }
            };
            frame.fill(&Path::circle(center, radius), color);
        }

        vec![frame.into_geometry()]
    }
}

/// Side-by-side cars/s bars for the real and recommended plans.
#[derive(Debug, Clone, Copy)]
pub struct EfficiencyBars {
    pub real: f64,
    pub recommended: f64,
}

impl canvas::Program<Message> for EfficiencyBars {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.05, 0.05, 0.05),
        );

        let peak = self.real.max(self.recommended).max(f64::EPSILON) as f32;
        let slot = bounds.width / 2.0;
        let bar_width = slot * 0.5;
        let baseline = bounds.height - 4.0;
        for (idx, (value, color)) in [(self.real, RED), (self.recommended, GREEN)]
            .into_iter()
            .enumerate()
        {
            let height = (value as f32 / peak).clamp(0.0, 1.0) * (bounds.height - 8.0);
            let x = slot * idx as f32 + (slot - bar_width) / 2.0;
            frame.fill_rectangle(
                Point::new(x, baseline - height),
                Size::new(bar_width, height),
                color,
            );
        }

        let axis = Path::line(Point::new(0.0, baseline), Point::new(bounds.width, baseline));
        frame.stroke(
            &axis,
            Stroke::default()
                .with_width(1.0)
                .with_color(Color::from_rgb(0.35, 0.35, 0.45)),
        );

        vec![frame.into_geometry()]
    }
}
