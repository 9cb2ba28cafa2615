pub mod browser;
pub mod person;

pub use browser::{BrowserStatus, ViolationBrowser, ViolationDetail};
pub use person::{person_for, Person};
