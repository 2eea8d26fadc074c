//! HTTP client for a remote provider bridge.
//!
//! The bridge exposes the provider contract over plain JSON:
//!
//! - `GET {base}/search?keyword=...` → array of school entries
//! - `GET {base}/schools/{code}/timetable` → nested timetable structure
//! - `GET {base}/schools/{code}/classtime` → period start/end times

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::error::ProviderError;
use super::{ProviderSession, TimetableProvider};
use crate::timetable::value_kind;

/// Configuration for the remote provider.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the provider bridge
    pub base_url: String,
    /// Per-request HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// Create a new config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: 30,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Provider backed by a remote HTTP bridge.
///
/// The underlying `reqwest::Client` is shared by all sessions.
#[derive(Debug, Clone)]
pub struct RemoteProvider {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteProvider {
    /// Create a new remote provider.
    pub fn new(config: RemoteConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TimetableProvider for RemoteProvider {
    async fn open_session(&self) -> Result<Box<dyn ProviderSession>, ProviderError> {
        Ok(Box::new(RemoteSession {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            school: None,
        }))
    }
}

struct RemoteSession {
    http: reqwest::Client,
    base_url: String,
    school: Option<u32>,
}

impl RemoteSession {
    fn school_url(&self, resource: &str) -> Result<String, ProviderError> {
        let code = self.school.ok_or(ProviderError::SchoolNotSet)?;
        Ok(format!("{}/schools/{}/{}", self.base_url, code, resource))
    }

    async fn get_json(&self, request: reqwest::RequestBuilder) -> Result<Value, ProviderError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Json {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ProviderSession for RemoteSession {
    fn set_school(&mut self, code: u32) -> Result<(), ProviderError> {
        self.school = Some(code);
        Ok(())
    }

    async fn search(&mut self, keyword: &str) -> Result<Vec<Value>, ProviderError> {
        let url = format!("{}/search", self.base_url);
        let value = self
            .get_json(self.http.get(&url).query(&[("keyword", keyword)]))
            .await?;

        match value {
            Value::Array(items) => Ok(items),
            other => Err(ProviderError::Json {
                message: format!("expected an array of schools, got {}", value_kind(&other)),
            }),
        }
    }

    async fn timetable(&mut self) -> Result<Value, ProviderError> {
        let url = self.school_url("timetable")?;
        self.get_json(self.http.get(&url)).await
    }

    async fn class_times(&mut self) -> Result<Value, ProviderError> {
        let url = self.school_url("classtime")?;
        self.get_json(self.http.get(&url)).await
    }
}
