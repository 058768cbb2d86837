//! Captured-style Synoptic payloads shared by the tests.

use serde_json::{Value, json};

use super::types::TimeSeriesResponse;

/// Three hourly observations from a snow study plot, in metric units.
pub(crate) fn collins_payload() -> Value {
    json!({
        "STATION": [{
            "STID": "CLN",
            "NAME": "Alta - Collins",
            "ELEVATION": "9662",
            "OBSERVATIONS": {
                "date_time": [
                    "2023-03-05T07:00:00Z",
                    "2023-03-05T08:00:00Z",
                    "2023-03-05T09:00:00Z"
                ],
                "air_temp_set_1": [-5.0, null, -4.5],
                "wind_speed_set_1": [2.0, 3.5, null],
                "wind_direction_set_1": [0.0, 95.0, null],
                "wind_gust_set_1": [5.0, 7.5, 6.0],
                "snow_depth_set_1": [1500.0, 1510.0, 1512.0],
                "relative_humidity_set_1": [80.0, 85.0, 90.0]
            }
        }],
        "SUMMARY": {
            "RESPONSE_CODE": 1,
            "RESPONSE_MESSAGE": "OK",
            "NUMBER_OF_OBJECTS": 1
        },
        "UNITS": {
            "air_temp": "Celsius",
            "wind_speed": "m/s",
            "wind_gust": "m/s",
            "wind_direction": "Degrees",
            "snow_depth": "Millimeters",
            "relative_humidity": "%",
            "elevation": "ft"
        }
    })
}

pub(crate) fn response_from(payload: Value) -> TimeSeriesResponse {
    serde_json::from_value(payload).expect("fixture payload should deserialize")
}
