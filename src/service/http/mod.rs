use std::time::Duration;

use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client,
};

const USER_AGENT: &str = concat!("medic-assistant/", env!("CARGO_PKG_VERSION"));

/// Shared outbound client for the completion endpoint and the guideline feed.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));

    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(30))
        .default_headers(headers)
        .build()
}
