use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;
use tracing::debug;

use crate::model::QueryOutcome;

/// Performs one GET against a fully-formed URL.
///
/// Implementations return HTTP error statuses as [`QueryOutcome::HttpError`]
/// and reserve `Err` for failures below HTTP (bad URL, DNS, refused
/// connection, truncated body).
#[async_trait]
pub trait ServiceClient: Send + Sync + Debug {
    async fn query_service(&self, url: &str) -> Result<QueryOutcome>;
}

/// [`ServiceClient`] backed by reqwest with its default policies.
#[derive(Debug, Clone, Default)]
pub struct HttpServiceClient {
    http: Client,
}

impl HttpServiceClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

#[async_trait]
impl ServiceClient for HttpServiceClient {
    async fn query_service(&self, url: &str) -> Result<QueryOutcome> {
        debug!("making GET request to {url}");

        let res = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to `{url}`"))?;

        match res.error_for_status() {
            Ok(res) => {
                let status = res.status().as_u16();
                let body = res
                    .bytes()
                    .await
                    .with_context(|| format!("Failed to read response body from `{url}`"))?;

                debug!(status, bytes = body.len(), "request to {url} succeeded");
                Ok(QueryOutcome::Success {
                    status,
                    body: body.to_vec(),
                })
            }
            Err(err) => match err.status() {
                Some(status) => {
                    debug!(status = status.as_u16(), "request to {url} returned an HTTP error");
                    Ok(QueryOutcome::HttpError {
                        status: status.as_u16(),
                    })
                }
                None => Err(err).with_context(|| format!("Request to `{url}` failed")),
            },
        }
    }
}
