//! Mock Synoptic client for testing without API access.
//!
//! Loads captured time-series payloads from JSON files and serves them
//! as if they were live API responses.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::StationDataSource;
use crate::domain::{StationId, StationTimeSeries, UnitSettings};

use super::convert::normalize_response;
use super::error::SynopticError;
use super::types::TimeSeriesResponse;

/// Mock Synoptic client that serves data from JSON files.
///
/// Payloads are normalized on every call, so the requested units and window
/// apply just as they would against the live endpoint.
#[derive(Debug, Clone)]
pub struct MockSynopticClient {
    /// Pre-loaded payloads, keyed by station.
    payloads: Arc<RwLock<HashMap<StationId, TimeSeriesResponse>>>,
}

impl MockSynopticClient {
    /// Create a new mock client by loading JSON files from a directory.
    ///
    /// Expects files named `{STID}.json` (e.g. `CLN.json`, `WBB.json`).
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, SynopticError> {
        Ok(Self::from_payloads(load_dir(data_dir.as_ref())?))
    }

    /// Create a mock client from already-parsed payloads.
    pub fn from_payloads(payloads: HashMap<StationId, TimeSeriesResponse>) -> Self {
        Self {
            payloads: Arc::new(RwLock::new(payloads)),
        }
    }

    /// Fetch observations for one station from the loaded payloads.
    ///
    /// Mimics [`SynopticClient::fetch_station_data`](super::SynopticClient::fetch_station_data):
    /// samples outside `[start, end]` are dropped, unknown stations are an
    /// upstream 404.
    pub async fn fetch_station_data(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        station_id: &StationId,
        units: UnitSettings,
    ) -> Result<StationTimeSeries, SynopticError> {
        if start > end {
            return Err(SynopticError::InvalidRequest(format!(
                "start {start} is after end {end}"
            )));
        }

        let payloads = self.payloads.read().await;

        let payload = payloads.get(station_id).ok_or_else(|| {
            let mut available: Vec<&str> = payloads.keys().map(StationId::as_str).collect();
            available.sort_unstable();
            SynopticError::Upstream {
                status: 404,
                message: format!(
                    "No mock data for station {station_id}. Available: {available:?}"
                ),
            }
        })?;

        debug!(station = %station_id, "serving mock time series");

        let series = normalize_response(payload, station_id, units)?;
        Ok(series.retain_between(start, end))
    }

    /// List available stations in the mock data, sorted.
    pub async fn available_stations(&self) -> Vec<StationId> {
        let payloads = self.payloads.read().await;
        let mut stations: Vec<StationId> = payloads.keys().cloned().collect();
        stations.sort();
        stations
    }

    /// Reload mock data from disk.
    ///
    /// On failure the previously loaded data is kept.
    pub async fn reload(&self, data_dir: impl AsRef<Path>) -> Result<(), SynopticError> {
        let fresh = load_dir(data_dir.as_ref())?;
        *self.payloads.write().await = fresh;
        Ok(())
    }
}

impl StationDataSource for MockSynopticClient {
    fn fetch_station_data(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        station_id: &StationId,
        units: UnitSettings,
    ) -> impl Future<Output = Result<StationTimeSeries, SynopticError>> + Send {
        MockSynopticClient::fetch_station_data(self, start, end, station_id, units)
    }
}

fn load_dir(data_dir: &Path) -> Result<HashMap<StationId, TimeSeriesResponse>, SynopticError> {
    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        SynopticError::Configuration(format!("failed to read mock data directory {data_dir:?}: {e}"))
    })?;

    let mut payloads = HashMap::new();

    for entry in entries {
        let entry = entry.map_err(|e| {
            SynopticError::Configuration(format!("failed to read directory entry: {e}"))
        })?;

        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        // "CLN.json" -> "CLN"
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| SynopticError::Configuration(format!("invalid filename: {path:?}")))?;

        let station = StationId::parse(stem).map_err(|e| {
            SynopticError::Configuration(format!("invalid station in filename {path:?}: {e}"))
        })?;

        let json = std::fs::read_to_string(&path)
            .map_err(|e| SynopticError::Configuration(format!("failed to read {path:?}: {e}")))?;

        let payload: TimeSeriesResponse = serde_json::from_str(&json)
            .map_err(|e| SynopticError::malformed(format!("{path:?}: {e}"), Some(&json)))?;

        payloads.insert(station, payload);
    }

    if payloads.is_empty() {
        return Err(SynopticError::Configuration(format!(
            "no mock payload files found in {data_dir:?}"
        )));
    }

    Ok(payloads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    use crate::synoptic::fixtures::{collins_payload, response_from};

    fn mock_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("CLN.json"), collins_payload().to_string()).unwrap();
        std::fs::write(dir.path().join("README.txt"), "not a payload").unwrap();
        dir
    }

    fn cln() -> StationId {
        StationId::parse("CLN").unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 3, 5, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn load_mock_data() {
        let dir = mock_dir();
        let client = MockSynopticClient::new(dir.path()).unwrap();

        assert_eq!(client.available_stations().await, vec![cln()]);
    }

    #[tokio::test]
    async fn fetch_whole_window() {
        let dir = mock_dir();
        let client = MockSynopticClient::new(dir.path()).unwrap();

        let series = client
            .fetch_station_data(at(0), at(23), &cln(), UnitSettings::metric())
            .await
            .unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.station_name(), "Alta - Collins");
    }

    #[tokio::test]
    async fn fetch_filters_to_window() {
        let client = MockSynopticClient::from_payloads(HashMap::from([(
            cln(),
            response_from(collins_payload()),
        )]));

        let series = client
            .fetch_station_data(at(8), at(8), &cln(), UnitSettings::metric())
            .await
            .unwrap();

        assert_eq!(series.times(), &[at(8)]);
        assert_eq!(series.temps().unwrap(), &[None]);

        let empty = client
            .fetch_station_data(at(12), at(13), &cln(), UnitSettings::metric())
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn unknown_station_returns_404() {
        let dir = mock_dir();
        let client = MockSynopticClient::new(dir.path()).unwrap();
        let unknown = StationId::parse("XYZ").unwrap();

        let err = client
            .fetch_station_data(at(0), at(23), &unknown, UnitSettings::metric())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("CLN"));
    }

    #[tokio::test]
    async fn reversed_window_rejected() {
        let dir = mock_dir();
        let client = MockSynopticClient::new(dir.path()).unwrap();

        let err = client
            .fetch_station_data(at(9), at(7), &cln(), UnitSettings::metric())
            .await
            .unwrap_err();

        assert!(matches!(err, SynopticError::InvalidRequest(_)));
    }

    #[test]
    fn empty_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = MockSynopticClient::new(dir.path()).unwrap_err();
        assert!(matches!(err, SynopticError::Configuration(_)));
    }

    #[test]
    fn missing_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = MockSynopticClient::new(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, SynopticError::Configuration(_)));
    }

    #[test]
    fn invalid_json_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("CLN.json"), "{not json").unwrap();
        let err = MockSynopticClient::new(dir.path()).unwrap_err();
        assert!(matches!(err, SynopticError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn reload_picks_up_new_stations() {
        let dir = mock_dir();
        let client = MockSynopticClient::new(dir.path()).unwrap();

        let mut wbb = collins_payload();
        wbb["STATION"][0]["STID"] = "WBB".into();
        std::fs::write(dir.path().join("WBB.json"), wbb.to_string()).unwrap();

        client.reload(dir.path()).await.unwrap();

        let stations = client.available_stations().await;
        assert_eq!(stations.len(), 2);
        assert!(stations.contains(&StationId::parse("WBB").unwrap()));
    }

    #[tokio::test]
    async fn failed_reload_keeps_old_data() {
        let dir = mock_dir();
        let client = MockSynopticClient::new(dir.path()).unwrap();

        let empty = tempfile::tempdir().unwrap();
        assert!(client.reload(empty.path()).await.is_err());
        assert_eq!(client.available_stations().await, vec![cln()]);
    }

    #[tokio::test]
    async fn shared_across_clones() {
        let dir = mock_dir();
        let client = MockSynopticClient::new(dir.path()).unwrap();
        let clone = client.clone();

        let mut wbb = collins_payload();
        wbb["STATION"][0]["STID"] = "WBB".into();
        std::fs::write(dir.path().join("WBB.json"), wbb.to_string()).unwrap();
        client.reload(dir.path()).await.unwrap();

        assert_eq!(clone.available_stations().await.len(), 2);
    }
}
