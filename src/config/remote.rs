use crate::core::http::{decode_body, FetchRequest, HttpFetcher, ResponseFormat, DEFAULT_TIMEOUT};
use crate::domain::model::Config;
use crate::domain::ports::ConfigSource;
use crate::utils::error::{JrcError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use serde_json::Value;

pub const CONFIG_SERVER_URL: &str = "CONFIG_SERVER_URL";

/// Client for the configuration service.
#[derive(Debug, Clone)]
pub struct ConfigClient {
    base_url: String,
    fetcher: HttpFetcher,
}

impl ConfigClient {
    /// Reads the service location from `CONFIG_SERVER_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_env_var(CONFIG_SERVER_URL)
    }

    pub fn from_env_var(name: &str) -> Result<Self> {
        match std::env::var(name) {
            Ok(url) if !url.trim().is_empty() => Self::new(url),
            _ => Err(JrcError::missing_env(name)),
        }
    }

    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        validate_url(CONFIG_SERVER_URL, &base_url)?;
        Ok(Self {
            base_url,
            fetcher: HttpFetcher::new()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Raw JSON answer for any responder endpoint.
    pub async fn call_responder(&self, endpoint: &str) -> Result<Value> {
        let url = self.url_for(endpoint);
        let request = FetchRequest::new(url.clone()).timeout(DEFAULT_TIMEOUT);
        let response = self.fetcher.send(&request).await?;

        let status = response.status();
        let body = response.text().await?;
        if status.as_u16() == 200 {
            return decode_body(&url, &body, ResponseFormat::Json);
        }
        tracing::warn!("Configuration service returned {} for {}", status, url);
        Err(JrcError::ConfigServerError { url, body })
    }

    pub async fn get_config(&self, name: &str) -> Result<Config> {
        let mut response = self.call_responder(&format!("config/{}", name)).await?;
        match response.get_mut("config") {
            Some(config) => Ok(Config::new(config.take())),
            None => Err(JrcError::MissingConfigError {
                field: format!("config/{}: config", name),
            }),
        }
    }
}

#[async_trait]
impl ConfigSource for ConfigClient {
    async fn get_config(&self, name: &str) -> Result<Config> {
        ConfigClient::get_config(self, name).await
    }
}
