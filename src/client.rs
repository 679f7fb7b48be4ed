//! HTTP consumer of the Activity Service.
//!
//! One shared `reqwest` client with the configured timeout; path
//! segments are percent-encoded before transmission and query values
//! go through reqwest's query serializer. Error bodies are decoded
//! leniently: `detail`, else `message`, else a per-call fallback.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::catalog::ActivityCatalog;
use crate::config::Config;
use crate::error::{BoardError, Result};

const FETCH_FALLBACK: &str = "Failed to load activities";
const SIGNUP_FALLBACK: &str = "An error occurred";
const REMOVAL_FALLBACK: &str = "Failed to remove participant";

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// Lenient shape for error bodies and for removal confirmations,
/// where a malformed body degrades to an empty object.
#[derive(Debug, Default, Deserialize)]
struct LooseBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct ActivityClient {
    http: reqwest::Client,
    base_url: String,
}

impl ActivityClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.service.timeout_ms))
            .build()?;
        Ok(Self {
            http,
            base_url: config.service.url.trim_end_matches('/').to_string(),
        })
    }

    /// GET /activities: the full catalog, replaced wholesale by the
    /// caller on every successful fetch.
    pub async fn fetch_activities(&self) -> Result<ActivityCatalog> {
        let url = format!("{}/activities", self.base_url);
        debug!(%url, "fetching activity catalog");
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(service_error(resp, FETCH_FALLBACK).await);
        }
        let body = resp.text().await?;
        let catalog: ActivityCatalog = serde_json::from_str(&body)?;
        Ok(catalog)
    }

    /// POST /activities/{name}/signup?email=, returning the server's
    /// confirmation message.
    pub async fn sign_up(&self, activity: &str, email: &str) -> Result<String> {
        let url = self.signup_url(activity);
        debug!(%url, %email, "submitting signup");
        let resp = self
            .http
            .post(&url)
            .query(&[("email", email)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(service_error(resp, SIGNUP_FALLBACK).await);
        }
        let body = resp.text().await?;
        let parsed: MessageBody = serde_json::from_str(&body)?;
        Ok(parsed.message)
    }

    /// DELETE /activities/{name}/signup?email=. A success body that
    /// fails to decode is treated as empty; the caller synthesizes the
    /// confirmation text.
    pub async fn unregister(&self, activity: &str, email: &str) -> Result<Option<String>> {
        let url = self.signup_url(activity);
        debug!(%url, %email, "removing participant");
        let resp = self
            .http
            .delete(&url)
            .query(&[("email", email)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(service_error(resp, REMOVAL_FALLBACK).await);
        }
        let body = resp.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<LooseBody>(&body).unwrap_or_default();
        Ok(parsed.message)
    }

    fn signup_url(&self, activity: &str) -> String {
        format!(
            "{}/activities/{}/signup",
            self.base_url,
            urlencoding::encode(activity)
        )
    }
}

async fn service_error(resp: reqwest::Response, fallback: &str) -> BoardError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<LooseBody>(&body).unwrap_or_default();
    let detail = parsed
        .detail
        .or(parsed.message)
        .unwrap_or_else(|| fallback.to_string());
    BoardError::Service { status, detail }
}
