use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. The timeout of the first call wins.
pub fn http_client(timeout: Duration) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build http client")
    })
}
