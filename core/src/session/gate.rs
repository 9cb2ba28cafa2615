//! Demo sign-in gate.
//!
//! A fixed table of plain-text credentials decides which top-level view is
//! shown. There is no hashing, lockout or session expiry: this is not an
//! access-control mechanism.

use crate::session::preferences::PreferenceStore;
use log::{info, warn};

pub const SIGN_IN_ERROR: &str = "Invalid username or password";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct CredentialTable {
    entries: Vec<Credential>,
}

impl CredentialTable {
    pub fn new(entries: Vec<Credential>) -> Self {
        Self { entries }
    }

    /// The operator accounts shipped with the dashboard.
    pub fn builtin() -> Self {
        let entries = [
            ("nafe", "0597785625"),
            ("abood", "0597785625"),
            ("ody", "0597785625"),
            ("admin", "1234"),
        ]
        .into_iter()
        .map(|(username, password)| Credential {
            username: username.into(),
            password: password.into(),
        })
        .collect();
        Self { entries }
    }

    /// True iff the pair exactly matches an entry.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.username == username && entry.password == password)
    }
}

impl Default for CredentialTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Login form state in front of the dashboard.
#[derive(Debug)]
pub struct SessionGate {
    table: CredentialTable,
    store: PreferenceStore,
    user: Option<String>,
    error: Option<String>,
}

impl SessionGate {
    pub fn new(table: CredentialTable, store: PreferenceStore) -> Self {
        Self {
            table,
            store,
            user: None,
            error: None,
        }
    }

    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.table.authenticate(username, password)
    }

    /// Username remembered from a previous sign-in, used to pre-fill the form.
    pub fn remembered_username(&self) -> Option<String> {
        match self.store.load() {
            Ok(prefs) => prefs.remembered_user,
            Err(err) => {
                warn!("ignoring unreadable preferences: {}", err);
                None
            }
        }
    }

    /// Checks the pair and, on success, enters the dashboard.
    ///
    /// With `remember` the username (never the password) is persisted;
    /// without it any remembered username is cleared. A mismatch only sets
    /// the error message.
    pub fn sign_in(&mut self, username: &str, password: &str, remember: bool) -> bool {
        if !self.authenticate(username, password) {
            self.error = Some(SIGN_IN_ERROR.to_string());
            return false;
        }

        let remembered = remember.then(|| username.to_string());
        if let Err(err) = self.store.save_remembered_user(remembered) {
            warn!("could not persist remembered user: {}", err);
        }
        info!("operator {} signed in", username);
        self.error = None;
        self.user = Some(username.to_string());
        true
    }

    pub fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            info!("operator {} signed out", user);
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn gate_in(dir: &std::path::Path) -> SessionGate {
        SessionGate::new(
            CredentialTable::builtin(),
            PreferenceStore::new(dir.join("prefs.json")),
        )
    }

    #[test]
    fn builtin_table_matches_exact_pairs_only() {
        let table = CredentialTable::builtin();
        assert!(table.authenticate("admin", "1234"));
        assert!(table.authenticate("ody", "0597785625"));
        assert!(!table.authenticate("admin", "wrong"));
        assert!(!table.authenticate("Admin", "1234"));
        assert!(!table.authenticate("", ""));
    }

    #[test]
    fn failed_sign_in_only_sets_the_error() {
        let dir = tempdir().unwrap();
        let mut gate = gate_in(dir.path());

        assert!(!gate.sign_in("admin", "wrong", true));
        assert_eq!(gate.error(), Some(SIGN_IN_ERROR));
        assert_eq!(gate.user(), None);
        assert_eq!(gate.remembered_username(), None);
        assert!(!dir.path().join("prefs.json").exists());
    }

    #[test]
    fn remember_me_persists_username_only() {
        let dir = tempdir().unwrap();
        let mut gate = gate_in(dir.path());

        assert!(gate.sign_in("admin", "1234", true));
        assert_eq!(gate.user(), Some("admin"));
        assert_eq!(gate.error(), None);

        let reopened = gate_in(dir.path());
        assert_eq!(reopened.remembered_username(), Some("admin".into()));
        let raw = std::fs::read_to_string(dir.path().join("prefs.json")).unwrap();
        assert!(!raw.contains("1234"));
    }

    #[test]
    fn signing_in_without_remember_clears_the_preference() {
        let dir = tempdir().unwrap();
        let mut gate = gate_in(dir.path());
        gate.sign_in("nafe", "0597785625", true);
        gate.sign_out();
        assert_eq!(gate.user(), None);

        gate.sign_in("nafe", "0597785625", false);
        assert_eq!(gate.remembered_username(), None);
    }
}
