use crate::gateway::payload::{parse_chunks, parse_record, parse_violations};
use crate::gateway::{GatewayError, GatewayResult};
use crate::model::{TrafficRecord, Violation};
use crate::prelude::ChunkId;
use crate::telemetry::FetchCounters;
use log::debug;
use reqwest::Url;
use std::sync::Arc;

/// Read-only client of the pipeline data service.
///
/// No timeout is applied: a request that never resolves leaves its view loading.
#[derive(Debug, Clone)]
pub struct FetchGateway {
    base_url: String,
    client: reqwest::Client,
    counters: Arc<FetchCounters>,
}

impl FetchGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            counters: Arc::new(FetchCounters::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn counters(&self) -> &FetchCounters {
        &self.counters
    }

    /// Ascending chunk ids, in the order the service sent them.
    pub async fn chunks(&self) -> GatewayResult<Vec<ChunkId>> {
        let body = self.get_text(&["chunks"]).await?;
        self.tally(parse_chunks(&body))
    }

    pub async fn record(&self, chunk: ChunkId) -> GatewayResult<TrafficRecord> {
        let segment = chunk.to_string();
        let body = self.get_text(&[segment.as_str()]).await?;
        self.tally(parse_record(&body, chunk))
    }

    pub async fn violations(&self) -> GatewayResult<Vec<Violation>> {
        let body = self.get_text(&["violations"]).await?;
        self.tally(parse_violations(&body))
    }

    pub async fn violations_for_car(&self, car_id: &str) -> GatewayResult<Vec<Violation>> {
        let body = self.get_text(&["violations", car_id]).await?;
        self.tally(parse_violations(&body))
    }

    /// Joins `segments` onto the base address, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| GatewayError::Address(format!("{}: {}", self.base_url, err)))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Address(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_text(&self, segments: &[&str]) -> GatewayResult<String> {
        let outcome = async {
            let url = self.endpoint(segments)?;
            debug!("GET {}", url);
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(GatewayError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            Ok::<String, GatewayError>(response.text().await?)
        }
        .await;
        if outcome.is_err() {
            self.counters.record_error();
        }
        outcome
    }

    fn tally<T>(&self, parsed: GatewayResult<T>) -> GatewayResult<T> {
        match &parsed {
            Ok(_) => self.counters.record_fetched(),
            Err(_) => self.counters.record_error(),
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn car_id_is_one_encoded_segment() {
        let gateway = FetchGateway::new("http://127.0.0.1:8000/");
        let url = gateway.endpoint(&["violations", "12/../a b?"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/violations/12%2F..%2Fa%20b%3F"
        );
    }

    #[test]
    fn base_path_is_kept() {
        let gateway = FetchGateway::new("http://10.0.0.5:8000/api");
        assert_eq!(
            gateway.endpoint(&["3"]).unwrap().as_str(),
            "http://10.0.0.5:8000/api/3"
        );
    }

    #[test]
    fn unparsable_base_is_an_address_error() {
        let gateway = FetchGateway::new("not a url");
        assert!(matches!(
            gateway.endpoint(&["chunks"]),
            Err(GatewayError::Address(_))
        ));
    }
}
