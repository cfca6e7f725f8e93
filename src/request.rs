use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct StatusResponse {
    value: StatusValue,
}

#[derive(Debug, Deserialize)]
struct StatusValue {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    message: String,
}

/// Polls the WebDriver `/status` endpoint until it reports ready or `wait` runs out.
pub async fn wait_for_driver(client: &Client, webdriver_url: &str, wait: Duration) -> Result<()> {
    let url = format!("{}/status", webdriver_url.trim_end_matches('/'));
    let deadline = Instant::now() + wait;

    loop {
        match request_status(client, &url).await {
            Ok(status) if status.ready => return Ok(()),
            Ok(status) => debug!("WebDriver not ready: {}", status.message),
            Err(e) => debug!("WebDriver status request failed: {e}"),
        }
        if Instant::now() >= deadline {
            return Err(Error::DriverUnavailable(webdriver_url.into()));
        }
        sleep(Duration::from_millis(500)).await;
    }
}

async fn request_status(client: &Client, url: &str) -> Result<StatusValue> {
    let res = client.get(url).send().await?.error_for_status()?;
    let status: StatusResponse = res.json().await?;
    Ok(status.value)
}
