pub mod gate;
pub mod preferences;

pub use gate::{Credential, CredentialTable, SessionGate, SIGN_IN_ERROR};
pub use preferences::{PreferenceError, PreferenceStore, Preferences};
