use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The only client-side persisted state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remembered_user: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum PreferenceError {
    #[error("preference file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed preference file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON file holding [`Preferences`].
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the preferences; a missing file means defaults.
    pub fn load(&self) -> Result<Preferences, PreferenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Preferences::default())
            }
            Err(source) => {
                return Err(PreferenceError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&contents).map_err(|source| PreferenceError::Format {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, prefs: &Preferences) -> Result<(), PreferenceError> {
        let io_err = |source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let body = serde_json::to_string_pretty(prefs).map_err(|source| PreferenceError::Format {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, body).map_err(io_err)
    }

    pub fn save_remembered_user(&self, user: Option<String>) -> Result<(), PreferenceError> {
        let mut prefs = self.load().unwrap_or_default();
        prefs.remembered_user = user;
        self.save(&prefs)
    }
}
