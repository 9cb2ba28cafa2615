use log::info;
use std::collections::VecDeque;

const DEFAULT_CAPACITY: usize = 20;

/// Bounded on-screen activity history. Every entry is also logged.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(message);
    }

    /// Newest first.
    pub fn recent(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}
