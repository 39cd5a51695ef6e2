// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::ArxivConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &ArxivConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a URL with query parameters and return the body of a successful response.
pub async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<String> {
    let text = client
        .get(url)
        .query(query)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}
