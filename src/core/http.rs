use crate::utils::error::{JrcError, Result};
use crate::utils::xml::xml_to_json;
use reqwest::{Client, Response};
use serde_json::{Map, Value};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Xml,
}

/// A single GET against some web API.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
    pub format: ResponseFormat,
    /// Statuses answered with an empty object instead of an error.
    pub allow: Vec<u16>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            format: ResponseFormat::Json,
            allow: vec![404],
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    pub fn allow(mut self, statuses: &[u16]) -> Self {
        self.allow = statuses.to_vec();
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jrc-common/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Sends the request and returns the raw response, whatever its status.
    pub async fn send(&self, request: &FetchRequest) -> Result<Response> {
        let mut builder = self.client.get(&request.url).timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        tracing::debug!("GET {}", request.url);
        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                JrcError::Timeout {
                    url: request.url.clone(),
                }
            } else {
                JrcError::ApiError(e)
            }
        })
    }

    /// Decoded body on 200, `{}` on an allowed status, an error otherwise.
    pub async fn fetch(&self, request: FetchRequest) -> Result<Value> {
        let response = self.send(&request).await?;
        let status = response.status();
        tracing::debug!("{} -> {}", request.url, status);

        if status.as_u16() == 200 {
            let body = response.text().await?;
            return decode_body(&request.url, &body, request.format);
        }
        if request.allow.contains(&status.as_u16()) {
            return Ok(Value::Object(Map::new()));
        }
        Err(JrcError::HttpStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            url: request.url,
        })
    }
}

pub(crate) fn decode_body(url: &str, body: &str, format: ResponseFormat) -> Result<Value> {
    match format {
        ResponseFormat::Json => serde_json::from_str(body).map_err(|e| JrcError::DecodeError {
            url: url.to_string(),
            message: e.to_string(),
        }),
        ResponseFormat::Xml => xml_to_json(body).map_err(|e| JrcError::XmlError {
            url: url.to_string(),
            message: e.to_string(),
        }),
    }
}
