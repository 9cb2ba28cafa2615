pub mod config;
pub mod generator;

pub use config::FixtureSet;
pub use generator::{build_fixtures, GeneratorConfig};
