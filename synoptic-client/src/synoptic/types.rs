//! Synoptic time-series response DTOs.
//!
//! These types map directly to the JSON returned by
//! `/v2/stations/timeseries`. Observations are kept as raw JSON values so
//! the conversion step can report exactly which key and sample is wrong.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;

/// Top-level response from the time-series endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct TimeSeriesResponse {
    /// One entry per matched station. Omitted when nothing matched.
    #[serde(default)]
    pub station: Vec<StationDto>,

    /// Request outcome as reported by the API.
    pub summary: Option<Summary>,

    /// Unit labels keyed by variable name, shared by all stations.
    #[serde(default)]
    pub units: HashMap<String, String>,
}

/// Request outcome block.
///
/// Synoptic answers most logical failures (bad token, unknown station) with
/// HTTP 200 and a non-OK `RESPONSE_CODE` here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Summary {
    /// `1` on success.
    pub response_code: Option<i64>,

    /// Human-readable outcome, e.g. `"OK"` or `"No stations found"`.
    pub response_message: Option<String>,

    /// Number of stations returned.
    pub number_of_objects: Option<u64>,
}

impl Summary {
    /// Response code meaning success.
    pub const OK: i64 = 1;

    /// Response code for a valid request that matched no observations.
    pub const NO_RESULTS: i64 = 2;

    /// Whether the summary reports success. A missing code counts as success.
    pub fn is_ok(&self) -> bool {
        self.response_code.is_none_or(|code| code == Self::OK)
    }

    /// Whether the request was valid but the window held no observations.
    pub fn is_no_results(&self) -> bool {
        self.response_code == Some(Self::NO_RESULTS)
    }
}

/// One station in the response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct StationDto {
    /// Station identifier.
    pub stid: String,

    /// Human-readable station name.
    pub name: Option<String>,

    /// Observation arrays keyed by `date_time` or `<variable>_set_<n>[d]`.
    pub observations: Option<BTreeMap<String, Value>>,

    /// Per-station unit labels, overriding the response-level ones.
    #[serde(default)]
    pub units: HashMap<String, String>,
}

impl TimeSeriesResponse {
    /// The unit label reported for `variable`, station-level first.
    pub fn unit_for<'a>(&'a self, station: &'a StationDto, variable: &str) -> Option<&'a str> {
        station
            .units
            .get(variable)
            .or_else(|| self.units.get(variable))
            .map(String::as_str)
    }
}
