//! Conversion from Synoptic DTOs to domain types.
//!
//! This module turns a raw time-series response into a validated
//! [`StationTimeSeries`]. It performs no I/O so it can be exercised directly
//! against captured payloads.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, trace};

use crate::domain::{
    Conversion, DomainError, SeriesField, StationId, StationTimeSeries, UnitCategory,
    UnitSettings, WindDir, parse_observation_time,
};

use super::types::{StationDto, TimeSeriesResponse};

/// Observation key holding the timestamps.
const DATE_TIME_KEY: &str = "date_time";

/// Derived cardinal direction strings, used when bearings are absent.
const CARDINAL_VARIABLE: &str = "wind_cardinal_direction";

/// Upstream variable for wind bearings in degrees.
const WIND_DIRECTION_VARIABLE: &str = "wind_direction";

/// Synoptic variable feeding each numeric field, and the unit setting that
/// governs it.
const NUMERIC_VARIABLES: [(SeriesField, &str, UnitCategory); 11] = [
    (SeriesField::Temps, "air_temp", UnitCategory::Temperature),
    (SeriesField::WindSpeeds, "wind_speed", UnitCategory::Speed),
    (SeriesField::WindGusts, "wind_gust", UnitCategory::Speed),
    (SeriesField::Swes, "snow_water_equiv", UnitCategory::Precip),
    (SeriesField::SnowDepths, "snow_depth", UnitCategory::Precip),
    (
        SeriesField::SweIntervals,
        "precip_accum_one_hour",
        UnitCategory::Precip,
    ),
    (SeriesField::SnowIntervals, "snow_interval", UnitCategory::Precip),
    (SeriesField::RelHumids, "relative_humidity", UnitCategory::Fixed),
    (SeriesField::LwRads, "incoming_radiation_lw", UnitCategory::Fixed),
    (SeriesField::SwRads, "solar_radiation", UnitCategory::Fixed),
    (SeriesField::SnowTemps, "snow_temp", UnitCategory::Temperature),
];

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The response does not contain the requested station
    #[error("station {requested} not in response (found: {found:?})")]
    StationNotFound {
        requested: String,
        found: Vec<String>,
    },

    /// An observation entry is not an array
    #[error("{key}: expected an array")]
    NotAnArray { key: String },

    /// A timestamp could not be parsed
    #[error("date_time[{index}]: invalid timestamp {value}")]
    InvalidTimestamp { index: usize, value: String },

    /// A sample is neither null nor a number
    #[error("{key}[{index}]: invalid value {value}")]
    InvalidValue {
        key: String,
        index: usize,
        value: String,
    },

    /// A series does not line up with the timestamps
    #[error("{key}: expected {expected} samples, found {found}")]
    LengthMismatch {
        key: String,
        expected: usize,
        found: usize,
    },

    /// The assembled record violates a domain invariant
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Every Synoptic variable this client maps, comma separated, for the
/// `vars` query parameter.
pub fn requested_variables() -> String {
    NUMERIC_VARIABLES
        .iter()
        .map(|(_, variable, _)| *variable)
        .chain([WIND_DIRECTION_VARIABLE, CARDINAL_VARIABLE])
        .collect::<Vec<_>>()
        .join(",")
}

/// Normalize a time-series response for one station.
///
/// Variables missing from the response leave their field absent. Samples
/// that are `null` (or empty strings) become per-sample `None`. Any shape
/// problem fails the whole conversion; partial records are never returned.
pub fn normalize_response(
    response: &TimeSeriesResponse,
    station_id: &StationId,
    units: UnitSettings,
) -> Result<StationTimeSeries, ConversionError> {
    let station = select_station(response, station_id)?;

    let observations = station
        .observations
        .as_ref()
        .ok_or(ConversionError::MissingField("OBSERVATIONS"))?;

    let times = parse_times(observations)?;
    let expected = times.len();

    let mut builder = StationTimeSeries::builder(
        units,
        station_id.clone(),
        station.name.clone().unwrap_or_default(),
        times,
    )?;

    for (field, variable, category) in NUMERIC_VARIABLES {
        let Some(key) = select_key(observations, variable) else {
            trace!(%field, variable, "variable not reported");
            continue;
        };

        let mut values = parse_numeric(key, &observations[key], expected)?;

        let conversion = match response.unit_for(station, variable) {
            Some(label) => Conversion::between(category, label, &units).unwrap_or_else(|| {
                debug!(variable, label, "unrecognised unit label, using values as-is");
                Conversion::Identity
            }),
            None => Conversion::Identity,
        };
        if conversion != Conversion::Identity {
            for value in values.iter_mut().flatten() {
                *value = conversion.apply(*value);
            }
        }

        builder = builder.numeric(field, values)?;
    }

    if let Some(dirs) = parse_wind_dirs(observations, expected)? {
        builder = builder.wind_dirs(dirs)?;
    }

    Ok(builder.build())
}

/// The record for a request that matched no observations.
///
/// Every series is absent. The station name is kept if the response still
/// lists the station.
pub fn empty_series(
    response: &TimeSeriesResponse,
    station_id: &StationId,
    units: UnitSettings,
) -> Result<StationTimeSeries, ConversionError> {
    let name = response
        .station
        .iter()
        .find(|s| station_id.matches(&s.stid))
        .and_then(|s| s.name.clone())
        .unwrap_or_default();
    Ok(StationTimeSeries::builder(units, station_id.clone(), name, Vec::new())?.build())
}

/// Pick the station object for `station_id`.
///
/// A lone station is accepted even if its STID differs in form, since the
/// API resolves aliases.
fn select_station<'a>(
    response: &'a TimeSeriesResponse,
    station_id: &StationId,
) -> Result<&'a StationDto, ConversionError> {
    if let Some(station) = response.station.iter().find(|s| station_id.matches(&s.stid)) {
        return Ok(station);
    }

    match response.station.as_slice() {
        [] => Err(ConversionError::MissingField("STATION")),
        [only] => Ok(only),
        many => Err(ConversionError::StationNotFound {
            requested: station_id.to_string(),
            found: many.iter().map(|s| s.stid.clone()).collect(),
        }),
    }
}

fn parse_times(
    observations: &BTreeMap<String, Value>,
) -> Result<Vec<chrono::DateTime<chrono::Utc>>, ConversionError> {
    let raw = observations
        .get(DATE_TIME_KEY)
        .ok_or(ConversionError::MissingField(DATE_TIME_KEY))?;
    let raw = raw.as_array().ok_or_else(|| ConversionError::NotAnArray {
        key: DATE_TIME_KEY.to_string(),
    })?;

    raw.iter()
        .enumerate()
        .map(|(index, value)| {
            value
                .as_str()
                .and_then(|s| parse_observation_time(s).ok())
                .ok_or_else(|| ConversionError::InvalidTimestamp {
                    index,
                    value: value.to_string(),
                })
        })
        .collect()
}

/// Find the preferred observation key for a variable.
///
/// Keys look like `air_temp_set_1` (measured) or `air_temp_set_1d`
/// (derived). The lowest set number wins, measured before derived.
fn select_key<'a>(observations: &'a BTreeMap<String, Value>, variable: &str) -> Option<&'a str> {
    observations
        .keys()
        .filter_map(|key| {
            let rest = key.strip_prefix(variable)?.strip_prefix("_set_")?;
            let (digits, derived) = match rest.strip_suffix('d') {
                Some(digits) => (digits, true),
                None => (rest, false),
            };
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let set: u32 = digits.parse().ok()?;
            Some(((set, derived), key.as_str()))
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, key)| key)
}

fn series_array<'a>(
    key: &str,
    value: &'a Value,
    expected: usize,
) -> Result<&'a [Value], ConversionError> {
    let array = value.as_array().ok_or_else(|| ConversionError::NotAnArray {
        key: key.to_string(),
    })?;
    if array.len() != expected {
        return Err(ConversionError::LengthMismatch {
            key: key.to_string(),
            expected,
            found: array.len(),
        });
    }
    Ok(array)
}

fn parse_numeric(
    key: &str,
    value: &Value,
    expected: usize,
) -> Result<Vec<Option<f64>>, ConversionError> {
    series_array(key, value, expected)?
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            parse_sample(sample).ok_or_else(|| ConversionError::InvalidValue {
                key: key.to_string(),
                index,
                value: sample.to_string(),
            })
        })
        .collect()
}

/// `Some(None)` for a missing sample, `Some(Some(v))` for a finite number,
/// `None` if the sample is unusable.
fn parse_sample(sample: &Value) -> Option<Option<f64>> {
    let number = match sample {
        Value::Null => return Some(None),
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if s.trim().is_empty() => return Some(None),
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(Some(number))
}

fn parse_wind_dirs(
    observations: &BTreeMap<String, Value>,
    expected: usize,
) -> Result<Option<Vec<Option<WindDir>>>, ConversionError> {
    if let Some(key) = select_key(observations, WIND_DIRECTION_VARIABLE) {
        let degrees = parse_numeric(key, &observations[key], expected)?;
        let dirs = degrees
            .into_iter()
            .map(|d| d.and_then(WindDir::from_degrees))
            .collect();
        return Ok(Some(dirs));
    }

    if let Some(key) = select_key(observations, CARDINAL_VARIABLE) {
        let dirs = series_array(key, &observations[key], expected)?
            .iter()
            .enumerate()
            .map(|(index, sample)| match sample {
                Value::Null => Ok(None),
                Value::String(s) if s.trim().is_empty() => Ok(None),
                Value::String(s) => s.parse::<WindDir>().map(Some).map_err(|_| {
                    ConversionError::InvalidValue {
                        key: key.to_string(),
                        index,
                        value: sample.to_string(),
                    }
                }),
                _ => Err(ConversionError::InvalidValue {
                    key: key.to_string(),
                    index,
                    value: sample.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Some(dirs));
    }

    Ok(None)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::synoptic::fixtures::response_from;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use serde_json::json;

    /// Strategy for one sample: a reading or a gap.
    fn sample() -> impl Strategy<Value = Option<f64>> {
        prop::option::of(-100.0f64..100.0)
    }

    /// Build observations for `n` timestamps where each mapped variable is
    /// either absent or fully populated.
    fn observations(n: usize) -> impl Strategy<Value = (Vec<bool>, Vec<Vec<Option<f64>>>)> {
        (
            prop::collection::vec(any::<bool>(), NUMERIC_VARIABLES.len()),
            prop::collection::vec(
                prop::collection::vec(sample(), n),
                NUMERIC_VARIABLES.len(),
            ),
        )
    }

    fn payload(present: &[bool], columns: &[Vec<Option<f64>>], n: usize) -> Value {
        let base = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let mut obs = serde_json::Map::new();
        obs.insert(
            DATE_TIME_KEY.to_string(),
            json!((0..n)
                .map(|i| (base + Duration::minutes(15 * i as i64)).to_rfc3339())
                .collect::<Vec<_>>()),
        );
        for (i, (_, variable, _)) in NUMERIC_VARIABLES.iter().enumerate() {
            if present[i] {
                obs.insert(format!("{variable}_set_1"), json!(columns[i]));
            }
        }
        json!({"STATION": [{"STID": "CLN", "OBSERVATIONS": obs}]})
    }

    proptest! {
        /// Every present field has one entry per timestamp
        #[test]
        fn present_fields_aligned(
            (n, (present, columns)) in (0usize..24).prop_flat_map(|n| (Just(n), observations(n)))
        ) {
            let response = response_from(payload(&present, &columns, n));
            let stid = StationId::parse("CLN").unwrap();
            let series = normalize_response(&response, &stid, UnitSettings::metric()).unwrap();

            prop_assert_eq!(series.len(), n);
            for field in series.present_fields() {
                prop_assert_eq!(series.numeric(field).map(<[_]>::len), Some(n));
            }
        }

        /// A variable omitted from the payload is absent, never a run of gaps
        #[test]
        fn omitted_is_absent(
            (n, (present, columns)) in (1usize..12).prop_flat_map(|n| (Just(n), observations(n)))
        ) {
            let response = response_from(payload(&present, &columns, n));
            let stid = StationId::parse("CLN").unwrap();
            let series = normalize_response(&response, &stid, UnitSettings::metric()).unwrap();

            for (i, (field, _, _)) in NUMERIC_VARIABLES.iter().enumerate() {
                prop_assert_eq!(series.numeric(*field).is_some(), present[i]);
            }
        }

        /// Gaps stay gaps and readings stay readings, in place
        #[test]
        fn gaps_preserved(
            (n, (present, columns)) in (1usize..12).prop_flat_map(|n| (Just(n), observations(n)))
        ) {
            let response = response_from(payload(&present, &columns, n));
            let stid = StationId::parse("CLN").unwrap();
            let series = normalize_response(&response, &stid, UnitSettings::metric()).unwrap();

            for (i, (field, _, _)) in NUMERIC_VARIABLES.iter().enumerate() {
                if let Some(values) = series.numeric(*field) {
                    for (got, want) in values.iter().zip(&columns[i]) {
                        prop_assert_eq!(got.is_some(), want.is_some());
                    }
                }
            }
        }
    }
}
