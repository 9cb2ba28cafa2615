use crate::media::violation_video_path;
use crate::model::Violation;
use crate::violations::person::{person_for, Person};
use log::{info, warn};

/// Load state of the violation list.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserStatus {
    Loading,
    Ready,
    /// The fetch failed; only a new `load` recovers.
    Unavailable(String),
}

/// Everything the detail pane shows for the selected violation.
#[derive(Debug, Clone, PartialEq)]
pub struct ViolationDetail<'a> {
    pub violation: &'a Violation,
    pub person: Person,
    pub video_path: String,
}

/// Sorted violation list plus the current selection.
#[derive(Debug, Clone)]
pub struct ViolationBrowser {
    status: BrowserStatus,
    violations: Vec<Violation>,
    selected: Option<String>,
}

impl ViolationBrowser {
    pub fn new() -> Self {
        Self {
            status: BrowserStatus::Loading,
            violations: Vec::new(),
            selected: None,
        }
    }

    /// Marks a fetch as started.
    pub fn begin_load(&mut self) {
        self.status = BrowserStatus::Loading;
    }

    /// Stores the outcome of a fetch.
    ///
    /// The list is ordered by `car_id` as plain strings, so `"10"` sorts
    /// before `"2"`. The first entry becomes the selection.
    pub fn finish_load(&mut self, outcome: Result<Vec<Violation>, String>) {
        match outcome {
            Ok(mut violations) => {
                violations.sort_by(|a, b| a.car_id.cmp(&b.car_id));
                info!("loaded {} violations", violations.len());
                self.selected = violations.first().map(|v| v.id.clone());
                self.violations = violations;
                self.status = BrowserStatus::Ready;
            }
            Err(err) => {
                warn!("violation list unavailable: {}", err);
                self.violations.clear();
                self.selected = None;
                self.status = BrowserStatus::Unavailable(err);
            }
        }
    }

    /// Selects the violation with `id`; unknown ids leave the selection as is.
    pub fn select(&mut self, id: &str) -> bool {
        if self.violations.iter().any(|v| v.id == id) {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn status(&self) -> &BrowserStatus {
        &self.status
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    pub fn current(&self) -> Option<&Violation> {
        let id = self.selected.as_deref()?;
        self.violations.iter().find(|v| v.id == id)
    }

    pub fn detail(&self) -> Option<ViolationDetail<'_>> {
        self.current().map(|violation| ViolationDetail {
            violation,
            person: person_for(&violation.car_id),
            video_path: violation_video_path(&violation.car_id),
        })
    }
}

impl Default for ViolationBrowser {
    fn default() -> Self {
        Self::new()
    }
}
