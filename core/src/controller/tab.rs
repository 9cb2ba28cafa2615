#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Metrics,
    Comparison,
    Violation,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Metrics, Tab::Comparison, Tab::Violation];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Metrics => "metrics",
            Tab::Comparison => "comparison",
            Tab::Violation => "violation",
        }
    }
}
