pub mod routes;

pub use routes::{build_routes, SharedFixtures};
