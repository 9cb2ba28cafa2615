pub mod client;
pub mod payload;

pub use client::FetchGateway;
pub use payload::{parse_chunks, parse_record, parse_violations};

/// Failures of the read-only data service.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service answered {status} for {url}")]
    Status { status: u16, url: String },
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("rejected payload: {0}")]
    Invalid(String),
    #[error("invalid service address {0}")]
    Address(String),
}

impl GatewayError {
    /// True when the service has no data for the request, as opposed to failing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::Status { status: 404, .. })
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
