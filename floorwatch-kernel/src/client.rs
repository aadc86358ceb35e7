//! HTTP client for the remote machines API.
//!
//! Four read-only endpoints, all `GET`:
//! - `/machines`
//! - `/machines/{id}`
//! - `/machines?type={H|M|L}`
//! - `/machines?machineFailure=1`
//!
//! Query filters are hints to the server. Callers still filter what comes
//! back. Failures are logged here and returned; there is no retry.

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::ingest::{parse_machine_json, parse_machines_json};
use crate::models::{MachineRecord, MachineType};
use reqwest::Url;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct MachinesClient {
    http: reqwest::Client,
    base: Url,
}

impl MachinesClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let base = Url::parse(config.base_url.trim())
            .map_err(|e| FetchError::Url(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::Url(config.base_url.clone()));
        }
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /machines`
    pub async fn fetch_all(&self) -> Result<Vec<MachineRecord>, FetchError> {
        let url = self.endpoint(&[], None)?;
        self.fetch_list(url).await
    }

    /// `GET /machines/{id}`, id encoded as one path segment
    pub async fn fetch_by_id(&self, id: &str) -> Result<MachineRecord, FetchError> {
        let url = self.endpoint(&[id], None)?;
        let body = self.get_text(&url).await?;
        parse_machine_json(&body).map_err(|e| {
            error!(%url, error = %e, "malformed machine payload");
            FetchError::Payload(e)
        })
    }

    /// `GET /machines?type=..`
    pub async fn fetch_by_type(
        &self,
        machine_type: MachineType,
    ) -> Result<Vec<MachineRecord>, FetchError> {
        let url = self.endpoint(&[], Some(("type", machine_type.code())))?;
        self.fetch_list(url).await
    }

    /// `GET /machines?machineFailure=1`
    pub async fn fetch_with_failures(&self) -> Result<Vec<MachineRecord>, FetchError> {
        let url = self.endpoint(&[], Some(("machineFailure", "1")))?;
        self.fetch_list(url).await
    }

    fn endpoint(&self, extra: &[&str], query: Option<(&str, &str)>) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| FetchError::Url(self.base.to_string()))?;
            segments.pop_if_empty().push("machines");
            for segment in extra {
                segments.push(segment);
            }
        }
        if let Some((key, value)) = query {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    async fn fetch_list(&self, url: Url) -> Result<Vec<MachineRecord>, FetchError> {
        let body = self.get_text(&url).await?;
        let records = parse_machines_json(&body).map_err(|e| {
            error!(%url, error = %e, "malformed machines payload");
            FetchError::Payload(e)
        })?;
        debug!(%url, records = records.len(), "machines fetched");
        Ok(records)
    }

    async fn get_text(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            error!(%url, error = %e, "machines API unreachable");
            FetchError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(%url, status = status.as_u16(), "machines API returned an error status");
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| {
            error!(%url, error = %e, "failed to read machines API body");
            FetchError::Transport(e)
        })
    }
}

/// Race `fetch` against `cancel`. Cancellation wins ties.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fetch: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::Cancelled),
        result = fetch => result,
    }
}
