//! Device inventory over plain HTTP.
//!
//! The fleet list comes from an external inventory service; this console
//! only reads it. Failures surface in the status bar and the list can be
//! re-fetched on demand.

use serde::Deserialize;
use thiserror::Error;

/// Reported availability of a device in the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    #[default]
    Offline,
}

impl DeviceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "online",
            DeviceStatus::Offline => "offline",
        }
    }
}

/// One device in the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: DeviceStatus,
}

/// Errors from the inventory fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("inventory returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to decode device list: {0}")]
    Decode(String),

    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

/// Fetch the device list from `{base_url}/devices`.
///
/// # Example
///
/// ```no_run
/// use fleetwatch::fetch::fetch_devices;
///
/// # tokio_test::block_on(async {
/// let client = reqwest::Client::new();
/// let devices = fetch_devices(&client, "http://127.0.0.1:8000").await.unwrap();
/// println!("{} devices", devices.len());
/// # });
/// ```
pub async fn fetch_devices(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<Vec<Device>, FetchError> {
    let url = format!("{}/devices", base_url.trim_end_matches('/'));

    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    let devices = response.json::<Vec<Device>>().await?;
    Ok(devices)
}
