//! Synoptic time-series HTTP client.
//!
//! Provides async methods for querying station observations from the
//! Synoptic Data API. Handles credentials, request building, status mapping
//! and conversion to domain types. Failures are returned, never retried.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::domain::{StationId, StationTimeSeries, UnitSettings, format_timestamp};

use crate::StationDataSource;
use super::convert::{empty_series, normalize_response, requested_variables};
use super::error::{SynopticError, truncate_body};
use super::types::TimeSeriesResponse;

/// Default endpoint for station time series.
const DEFAULT_BASE_URL: &str = "https://api.synopticdata.com/v2/stations/timeseries";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "SYNOPTIC_TOKEN";

/// Environment variable overriding the endpoint.
pub const BASE_URL_ENV: &str = "SYNOPTIC_BASE_URL";

/// Environment variable overriding the timeout, in whole seconds.
pub const TIMEOUT_ENV: &str = "SYNOPTIC_TIMEOUT_SECS";

/// Configuration for the Synoptic client.
#[derive(Clone)]
pub struct SynopticConfig {
    /// API token sent as the `token` query parameter
    pub token: String,
    /// Time-series endpoint (defaults to production Synoptic)
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl SynopticConfig {
    /// Create a new config with the given API token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read the config from `SYNOPTIC_TOKEN`, `SYNOPTIC_BASE_URL` and
    /// `SYNOPTIC_TIMEOUT_SECS`.
    ///
    /// A missing or blank token is a configuration error rather than an
    /// empty credential.
    pub fn from_env() -> Result<Self, SynopticError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SynopticError> {
        let token = lookup(TOKEN_ENV)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SynopticError::Configuration(format!("{TOKEN_ENV} is not set")))?;

        let mut config = Self::new(token.trim());

        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }

        if let Some(secs) = lookup(TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                SynopticError::Configuration(format!("{TIMEOUT_ENV} must be whole seconds, got {secs:?}"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Set a custom base URL (for testing or a proxy).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for SynopticConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynopticConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Synoptic time-series API client.
///
/// Holds only immutable configuration and a pooled HTTP client, so clones
/// are cheap and concurrent calls do not interfere.
#[derive(Clone)]
pub struct SynopticClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl SynopticClient {
    /// Create a new client with the given configuration.
    ///
    /// Fails with [`SynopticError::Configuration`] if the token is blank or
    /// the base URL does not parse, before any request is attempted.
    pub fn new(config: SynopticConfig) -> Result<Self, SynopticError> {
        let token = config.token.trim();
        if token.is_empty() {
            return Err(SynopticError::Configuration(
                "API token is empty".to_string(),
            ));
        }

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SynopticError::Configuration(format!("invalid base URL {:?}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SynopticError::Configuration(format!(
                "invalid base URL {:?}",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("synoptic-client/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| SynopticError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            token: token.to_string(),
        })
    }

    /// Create a client from the environment (see [`SynopticConfig::from_env`]).
    pub fn from_env() -> Result<Self, SynopticError> {
        Self::new(SynopticConfig::from_env()?)
    }

    /// Build the full request URL without sending it.
    ///
    /// The URL embeds the token; do not log it.
    pub fn request_url(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        station_id: &StationId,
        units: UnitSettings,
    ) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("token", &self.token)
            .append_pair("stid", station_id.as_str())
            .append_pair("start", &format_timestamp(&start))
            .append_pair("end", &format_timestamp(&end))
            .append_pair("obtimezone", "utc")
            .append_pair("units", &units.to_query())
            .append_pair("vars", &requested_variables());
        url
    }

    /// Fetch and normalize observations for one station.
    ///
    /// `start == end` is a single-point query. The returned record uses
    /// `units` for every converted series.
    ///
    /// # Errors
    ///
    /// * [`SynopticError::InvalidRequest`] if `start > end`
    /// * [`SynopticError::Network`] on transport failure or timeout
    /// * [`SynopticError::Upstream`] on a non-success HTTP status, or a
    ///   `SUMMARY.RESPONSE_CODE` other than success or no-results (the
    ///   latter yields an empty record)
    /// * [`SynopticError::MalformedResponse`] if the payload cannot be
    ///   normalized
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

        let url = self.request_url(start, end, station_id, units);

        debug!(
            station = %station_id,
            start = %format_timestamp(&start),
            end = %format_timestamp(&end),
            "requesting station time series"
        );

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(station = %station_id, status = status.as_u16(), "upstream rejected request");
            return Err(SynopticError::Upstream {
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        let body = response.text().await?;

        debug!(station = %station_id, bytes = body.len(), "received station time series");

        let payload: TimeSeriesResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(
                station = %station_id,
                shape = %payload_shape(&body),
                error = %e,
                "malformed time-series payload"
            );
            SynopticError::malformed(e.to_string(), Some(&body))
        })?;

        if let Some(summary) = payload.summary.as_ref().filter(|s| !s.is_ok()) {
            if summary.is_no_results() {
                debug!(station = %station_id, "no observations in window");
                return empty_series(&payload, station_id, units)
                    .map_err(|e| SynopticError::malformed(e.to_string(), Some(&body)));
            }

            let message = summary
                .response_message
                .clone()
                .unwrap_or_else(|| format!("response code {:?}", summary.response_code));
            let code = summary
                .response_code
                .and_then(|code| u16::try_from(code).ok())
                .unwrap_or(status.as_u16());
            warn!(station = %station_id, code, %message, "upstream reported failure");
            return Err(SynopticError::Upstream {
                status: code,
                message,
            });
        }

        normalize_response(&payload, station_id, units).map_err(|e| {
            warn!(
                station = %station_id,
                shape = %payload_shape(&body),
                error = %e,
                "time-series payload failed normalization"
            );
            SynopticError::malformed(e.to_string(), Some(&body))
        })
    }

    /// Like [`fetch_station_data`](Self::fetch_station_data), validating a
    /// raw station identifier first.
    pub async fn fetch_station_data_str(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        station_id: &str,
        units: UnitSettings,
    ) -> Result<StationTimeSeries, SynopticError> {
        let station_id =
            StationId::parse(station_id).map_err(|e| SynopticError::InvalidRequest(e.to_string()))?;
        self.fetch_station_data(start, end, &station_id, units).await
    }
}

impl fmt::Debug for SynopticClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynopticClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl StationDataSource for SynopticClient {
    fn fetch_station_data(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        station_id: &StationId,
        units: UnitSettings,
    ) -> impl Future<Output = Result<StationTimeSeries, SynopticError>> + Send {
        SynopticClient::fetch_station_data(self, start, end, station_id, units)
    }
}

/// Describe the top-level structure of a payload for diagnostics, without
/// echoing its values.
fn payload_shape(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => {
            let mut parts: Vec<String> = Vec::with_capacity(map.len());
            for (key, value) in &map {
                let stations = value.as_array().filter(|_| key == "STATION");
                match stations.and_then(|s| s.first()).and_then(|s| s.get("OBSERVATIONS")) {
                    Some(serde_json::Value::Object(obs)) => {
                        let keys: Vec<&str> = obs.keys().map(String::as_str).collect();
                        parts.push(format!("{key}[OBSERVATIONS: {}]", keys.join(",")));
                    }
                    _ => parts.push(key.clone()),
                }
            }
            format!("{{{}}}", parts.join(", "))
        }
        Ok(other) => format!("non-object JSON ({})", json_kind(&other)),
        Err(_) => "not JSON".to_string(),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
