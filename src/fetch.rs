use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// The request never got a response.
    #[error("network error: {0}")]
    Network(String),

    #[error("http {status} {status_text}")]
    Status {
        status: u16,
        status_text: String,
        message: Option<String>,
    },

    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl HttpError {
    pub fn status(status: u16, status_text: impl Into<String>) -> Self {
        HttpError::Status {
            status,
            status_text: status_text.into(),
            message: None,
        }
    }

    /// The single line written into the store's error slot.
    pub fn user_message(&self) -> String {
        match self {
            HttpError::Network(msg) => format!("Error: {msg}"),
            HttpError::Status { status: 404, .. } => "Statistics not found".to_string(),
            HttpError::Status {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            HttpError::Status {
                status,
                status_text,
                ..
            } => format!("Error Code: {status}, Message: {status_text}"),
            HttpError::Unknown(msg) => format!("Unexpected error: {msg}"),
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::Unknown(format!("invalid response body: {err}"))
    }
}

/// Read-only access to the statistics API.
///
/// `path` is relative to the API root (e.g. `/statistics/all`); `params`
/// become the query string.
pub trait DataFetch: Send + Sync {
    fn fetch(&self, path: &str, params: &[(&str, String)]) -> Result<Value, HttpError>;
}

pub struct HttpFetcher {
    client: &'static Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(client: &'static Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl DataFetch for HttpFetcher {
    fn fetch(&self, path: &str, params: &[(&str, String)]) -> Result<Value, HttpError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .send()
            .map_err(classify_transport_error)?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|err| HttpError::Network(err.to_string()))?;
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                message: extract_message(&body),
            });
        }

        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(trimmed)?)
    }
}

fn classify_transport_error(err: reqwest::Error) -> HttpError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        HttpError::Network(err.to_string())
    } else {
        HttpError::Unknown(err.to_string())
    }
}

/// Pulls a server supplied `message` out of an error body, if it has one.
pub fn extract_message(body: &str) -> Option<String> {
    let root: Value = serde_json::from_str(body.trim()).ok()?;
    root.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
