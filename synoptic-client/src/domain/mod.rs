//! Domain types for station time-series data.
//!
//! This module contains the validated value types the client produces:
//! unit settings, compass directions, station identifiers and the
//! normalized time-series record. All types enforce their invariants at
//! construction time, so code that receives them can trust their validity.

mod error;
mod series;
mod station;
mod time;
mod units;
mod wind;

pub use error::DomainError;
pub use series::{NumericSeries, SeriesField, StationTimeSeries, StationTimeSeriesBuilder};
pub use station::{InvalidStationId, StationId};
pub use time::{TimeError, format_timestamp, parse_observation_time};
pub use units::{
    AltimeterUnit, Conversion, HeightUnit, InvalidUnit, PrecipUnit, PressureUnit, SpeedUnit,
    TemperatureUnit, UnitCategory, UnitSettings,
};
pub use wind::{InvalidWindDir, WindDir};
