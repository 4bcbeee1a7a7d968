// Public dashboard endpoints
//
// Unauthenticated read-only API consumed by the floor-map view:
// config, status snapshot, recent logs and health.

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::client::NocClient;
use crate::error::Error;
use crate::models::{ApiConfig, ApiLogEntry, ApiStatus, DeviceTypeLabel, HealthResponse, LogsResponse};

/// `/api/config` as sent; any of the three maps may be absent on a
/// misconfigured server.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    floor_maps: Option<IndexMap<String, String>>,
    #[serde(default)]
    floor_labels: Option<IndexMap<String, String>>,
    #[serde(default)]
    device_types: Option<IndexMap<String, DeviceTypeLabel>>,
}

impl TryFrom<RawConfig> for ApiConfig {
    type Error = Error;

    fn try_from(raw: RawConfig) -> Result<Self, Error> {
        Ok(Self {
            floor_maps: raw.floor_maps.ok_or(Error::IncompleteConfig {
                missing: "floor_maps",
            })?,
            floor_labels: raw.floor_labels.ok_or(Error::IncompleteConfig {
                missing: "floor_labels",
            })?,
            device_types: raw.device_types.ok_or(Error::IncompleteConfig {
                missing: "device_types",
            })?,
        })
    }
}

impl NocClient {
    /// Fetch floor maps, floor labels and device types.
    ///
    /// `GET /api/config`
    pub async fn get_config(&self) -> Result<ApiConfig, Error> {
        let raw: RawConfig = self.get("/api/config").await?;
        let config = ApiConfig::try_from(raw)?;
        debug!(
            floors = config.floor_maps.len(),
            types = config.device_types.len(),
            "loaded server config"
        );
        Ok(config)
    }

    /// Fetch the current device status snapshot.
    ///
    /// `GET /api/status`. A body carrying `"status": "error"` is reported
    /// as an API error even if the HTTP status was 2xx.
    pub async fn get_status(&self) -> Result<ApiStatus, Error> {
        let status: ApiStatus = self.get("/api/status").await?;
        if status.status.as_deref() == Some("error") {
            return Err(Error::Api {
                status: 500,
                message: status.error.unwrap_or_else(|| "unknown server error".into()),
            });
        }
        Ok(status)
    }

    /// Fetch the most recent status-change events, newest first.
    ///
    /// `GET /api/logs`
    pub async fn get_logs(&self) -> Result<Vec<ApiLogEntry>, Error> {
        let resp: LogsResponse = self.get("/api/logs").await?;
        Ok(resp.logs)
    }

    /// `GET /api/health`
    pub async fn health(&self) -> Result<HealthResponse, Error> {
        self.get("/api/health").await
    }
}
