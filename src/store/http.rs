use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::FetchConfig;
use crate::models::{SessionDetail, SessionId, SessionSummary};

use super::{SessionStore, StoreError};

/// Client for the REST session store of the upload service.
///
/// `GET {base}/sessions/` lists sessions; `GET {base}/sessions/{id}` returns
/// one session with its `blood_tests`.
pub struct HttpSessionStore {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpSessionStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, StoreError> {
        Self::new(&config.store_url, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StoreError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::ResponseParsing(e.to_string()))
    }

    fn map_send_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_connect() {
            StoreError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            StoreError::Timeout(self.timeout.as_secs())
        } else {
            StoreError::HttpClient(e.to_string())
        }
    }
}

impl SessionStore for HttpSessionStore {
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, StoreError> {
        let rows: Vec<serde_json::Value> = self.get_json("/sessions/").await?;
        Ok(rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| match serde_json::from_value::<SessionSummary>(row) {
                Ok(summary) => Some(summary),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping malformed session listing row");
                    None
                }
            })
            .collect())
    }

    async fn get_session_detail(&self, session_id: SessionId) -> Result<SessionDetail, StoreError> {
        match self.get_json(&format!("/sessions/{session_id}")).await {
            Err(StoreError::Status { status: 404, .. }) => Err(StoreError::NotFound(session_id)),
            other => other,
        }
    }
}
