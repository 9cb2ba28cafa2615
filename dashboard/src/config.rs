use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use crate::media::ClipSource;
use trafficcore::media::media_url;
use trafficcore::metrics::RealWorldTimeTable;

pub const CONFIG_FILE: &str = "dashboard.yaml";
pub const API_URL_VAR: &str = "TRAFFIC_API_URL";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base address of the pipeline data service.
    pub api_url: String,
    /// Base address of the static clips, the service itself when unset.
    pub media_url: Option<String>,
    /// Local copy of the clips; when set, clips missing here refuse to play.
    pub media_root: Option<PathBuf>,
    pub preferences_path: PathBuf,
    pub real_world_times: RealWorldTimeTable,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".into(),
            media_url: None,
            media_root: None,
            preferences_path: PathBuf::from(".dashboard/preferences.json"),
            real_world_times: RealWorldTimeTable::recorded(),
        }
    }
}

impl DashboardConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading dashboard config {}", path_ref.display()))?;
        let config: DashboardConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing dashboard config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Loads `path` when it exists, defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Applies the `TRAFFIC_API_URL` override.
    pub fn with_api_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
            self.api_url = url;
        }
        self
    }

    pub fn media_base(&self) -> &str {
        self.media_url.as_deref().unwrap_or(&self.api_url)
    }

    /// Whether the clip at a convention path can be played.
    pub fn clip_available(&self, path: &str) -> bool {
        match &self.media_root {
            Some(root) => root.join(path.trim_start_matches('/')).is_file(),
            None => true,
        }
    }

    /// Resolves a convention path to the served URL and any local copy.
    pub fn clip_source(&self, path: &str) -> ClipSource {
        let local = self
            .media_root
            .as_ref()
            .map(|root| root.join(path.trim_start_matches('/')))
            .filter(|file| file.is_file());
        ClipSource {
            url: media_url(self.media_base(), path),
            local,
            available: self.clip_available(path),
        }
    }
}
