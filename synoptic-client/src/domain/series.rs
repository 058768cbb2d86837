//! Normalized station time series.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DomainError, StationId, UnitSettings, WindDir};

/// One optional measurement series in a [`StationTimeSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeriesField {
    Temps,
    WindSpeeds,
    WindDirs,
    WindGusts,
    Swes,
    SnowDepths,
    SweIntervals,
    SnowIntervals,
    RelHumids,
    LwRads,
    SwRads,
    SnowTemps,
}

impl SeriesField {
    /// Every field, in record order.
    pub const ALL: [SeriesField; 12] = [
        SeriesField::Temps,
        SeriesField::WindSpeeds,
        SeriesField::WindDirs,
        SeriesField::WindGusts,
        SeriesField::Swes,
        SeriesField::SnowDepths,
        SeriesField::SweIntervals,
        SeriesField::SnowIntervals,
        SeriesField::RelHumids,
        SeriesField::LwRads,
        SeriesField::SwRads,
        SeriesField::SnowTemps,
    ];

    /// The field name as it appears in serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesField::Temps => "temps",
            SeriesField::WindSpeeds => "wind_speeds",
            SeriesField::WindDirs => "wind_dirs",
            SeriesField::WindGusts => "wind_gusts",
            SeriesField::Swes => "swes",
            SeriesField::SnowDepths => "snow_depths",
            SeriesField::SweIntervals => "swe_intervals",
            SeriesField::SnowIntervals => "snow_intervals",
            SeriesField::RelHumids => "rel_humids",
            SeriesField::LwRads => "lw_rads",
            SeriesField::SwRads => "sw_rads",
            SeriesField::SnowTemps => "snow_temps",
        }
    }

    /// Whether the field holds numbers (everything except wind direction).
    pub fn is_numeric(&self) -> bool {
        !matches!(self, SeriesField::WindDirs)
    }
}

impl fmt::Display for SeriesField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric series: one entry per timestamp, `None` where no measurement
/// was recorded.
pub type NumericSeries = Vec<Option<f64>>;

/// Time-aligned measurements for one station.
///
/// Every present series has exactly `times().len()` entries in the same
/// order as `times()`. A series accessor returning `None` means the station
/// does not report that parameter at all; a `None` entry inside a series
/// means the parameter exists but no value was recorded at that timestamp.
///
/// Built with [`StationTimeSeries::builder`], immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationTimeSeries {
    units: UnitSettings,
    station_id: StationId,
    station_name: String,
    times: Vec<DateTime<Utc>>,
    temps: Option<NumericSeries>,
    wind_speeds: Option<NumericSeries>,
    wind_dirs: Option<Vec<Option<WindDir>>>,
    wind_gusts: Option<NumericSeries>,
    swes: Option<NumericSeries>,
    snow_depths: Option<NumericSeries>,
    swe_intervals: Option<NumericSeries>,
    snow_intervals: Option<NumericSeries>,
    rel_humids: Option<NumericSeries>,
    lw_rads: Option<NumericSeries>,
    sw_rads: Option<NumericSeries>,
    snow_temps: Option<NumericSeries>,
}

impl StationTimeSeries {
    /// Start building a record over the given timestamps.
    ///
    /// Timestamps must be in non-decreasing order.
    pub fn builder(
        units: UnitSettings,
        station_id: StationId,
        station_name: impl Into<String>,
        times: Vec<DateTime<Utc>>,
    ) -> Result<StationTimeSeriesBuilder, DomainError> {
        if let Some(i) = times.windows(2).position(|w| w[1] < w[0]) {
            return Err(DomainError::UnorderedTimes(i + 1));
        }

        Ok(StationTimeSeriesBuilder {
            inner: StationTimeSeries {
                units,
                station_id,
                station_name: station_name.into(),
                times,
                temps: None,
                wind_speeds: None,
                wind_dirs: None,
                wind_gusts: None,
                swes: None,
                snow_depths: None,
                swe_intervals: None,
                snow_intervals: None,
                rel_humids: None,
                lw_rads: None,
                sw_rads: None,
                snow_temps: None,
            },
        })
    }

    pub fn units(&self) -> &UnitSettings {
        &self.units
    }

    pub fn station_id(&self) -> &StationId {
        &self.station_id
    }

    pub fn station_name(&self) -> &str {
        &self.station_name
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    /// Number of timestamps.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn temps(&self) -> Option<&[Option<f64>]> {
        self.temps.as_deref()
    }

    pub fn wind_speeds(&self) -> Option<&[Option<f64>]> {
        self.wind_speeds.as_deref()
    }

    pub fn wind_dirs(&self) -> Option<&[Option<WindDir>]> {
        self.wind_dirs.as_deref()
    }

    pub fn wind_gusts(&self) -> Option<&[Option<f64>]> {
        self.wind_gusts.as_deref()
    }

    /// Snow water equivalent of the snowpack.
    pub fn swes(&self) -> Option<&[Option<f64>]> {
        self.swes.as_deref()
    }

    pub fn snow_depths(&self) -> Option<&[Option<f64>]> {
        self.snow_depths.as_deref()
    }

    /// Snow water equivalent of new snow within each interval.
    pub fn swe_intervals(&self) -> Option<&[Option<f64>]> {
        self.swe_intervals.as_deref()
    }

    /// New snow depth within each interval.
    pub fn snow_intervals(&self) -> Option<&[Option<f64>]> {
        self.snow_intervals.as_deref()
    }

    pub fn rel_humids(&self) -> Option<&[Option<f64>]> {
        self.rel_humids.as_deref()
    }

    /// Incoming longwave radiation, averaged over each interval.
    pub fn lw_rads(&self) -> Option<&[Option<f64>]> {
        self.lw_rads.as_deref()
    }

    /// Incoming shortwave radiation, averaged over each interval.
    pub fn sw_rads(&self) -> Option<&[Option<f64>]> {
        self.sw_rads.as_deref()
    }

    pub fn snow_temps(&self) -> Option<&[Option<f64>]> {
        self.snow_temps.as_deref()
    }

    /// Look up a numeric series by field. Always `None` for `WindDirs`.
    pub fn numeric(&self, field: SeriesField) -> Option<&[Option<f64>]> {
        self.numeric_slot(field).and_then(|slot| slot.as_deref())
    }

    /// Fields the station reported, in record order.
    pub fn present_fields(&self) -> Vec<SeriesField> {
        SeriesField::ALL
            .into_iter()
            .filter(|field| match field {
                SeriesField::WindDirs => self.wind_dirs.is_some(),
                _ => self.numeric(*field).is_some(),
            })
            .collect()
    }

    /// Keep only the samples with `start <= time <= end`.
    ///
    /// Present series stay present (possibly empty) and stay aligned.
    pub fn retain_between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let keep: Vec<bool> = self
            .times
            .iter()
            .map(|t| *t >= start && *t <= end)
            .collect();

        filter_by(&mut self.times, &keep);
        if let Some(dirs) = self.wind_dirs.as_mut() {
            filter_by(dirs, &keep);
        }
        for field in SeriesField::ALL {
            if let Some(Some(series)) = self.numeric_slot_mut(field) {
                filter_by(series, &keep);
            }
        }

        self
    }

    fn numeric_slot(&self, field: SeriesField) -> Option<&Option<NumericSeries>> {
        match field {
            SeriesField::Temps => Some(&self.temps),
            SeriesField::WindSpeeds => Some(&self.wind_speeds),
            SeriesField::WindGusts => Some(&self.wind_gusts),
            SeriesField::Swes => Some(&self.swes),
            SeriesField::SnowDepths => Some(&self.snow_depths),
            SeriesField::SweIntervals => Some(&self.swe_intervals),
            SeriesField::SnowIntervals => Some(&self.snow_intervals),
            SeriesField::RelHumids => Some(&self.rel_humids),
            SeriesField::LwRads => Some(&self.lw_rads),
            SeriesField::SwRads => Some(&self.sw_rads),
            SeriesField::SnowTemps => Some(&self.snow_temps),
            SeriesField::WindDirs => None,
        }
    }

    fn numeric_slot_mut(&mut self, field: SeriesField) -> Option<&mut Option<NumericSeries>> {
        match field {
            SeriesField::Temps => Some(&mut self.temps),
            SeriesField::WindSpeeds => Some(&mut self.wind_speeds),
            SeriesField::WindGusts => Some(&mut self.wind_gusts),
            SeriesField::Swes => Some(&mut self.swes),
            SeriesField::SnowDepths => Some(&mut self.snow_depths),
            SeriesField::SweIntervals => Some(&mut self.swe_intervals),
            SeriesField::SnowIntervals => Some(&mut self.snow_intervals),
            SeriesField::RelHumids => Some(&mut self.rel_humids),
            SeriesField::LwRads => Some(&mut self.lw_rads),
            SeriesField::SwRads => Some(&mut self.sw_rads),
            SeriesField::SnowTemps => Some(&mut self.snow_temps),
            SeriesField::WindDirs => None,
        }
    }
}

fn filter_by<T>(values: &mut Vec<T>, keep: &[bool]) {
    let mut flags = keep.iter();
    values.retain(|_| flags.next().copied().unwrap_or(false));
}

/// Builder for [`StationTimeSeries`] that checks series lengths as they are
/// added.
#[derive(Debug)]
pub struct StationTimeSeriesBuilder {
    inner: StationTimeSeries,
}

impl StationTimeSeriesBuilder {
    /// Attach a numeric series.
    pub fn numeric(mut self, field: SeriesField, values: NumericSeries) -> Result<Self, DomainError> {
        if !field.is_numeric() {
            return Err(DomainError::NotNumeric(field));
        }
        self.check_len(field, values.len())?;
        if let Some(slot) = self.inner.numeric_slot_mut(field) {
            *slot = Some(values);
        }
        Ok(self)
    }

    /// Attach the wind direction series.
    pub fn wind_dirs(mut self, values: Vec<Option<WindDir>>) -> Result<Self, DomainError> {
        self.check_len(SeriesField::WindDirs, values.len())?;
        self.inner.wind_dirs = Some(values);
        Ok(self)
    }

    fn check_len(&self, field: SeriesField, found: usize) -> Result<(), DomainError> {
        let expected = self.inner.times.len();
        if found != expected {
            return Err(DomainError::LengthMismatch {
                field,
                expected,
                found,
            });
        }
        Ok(())
    }

    pub fn build(self) -> StationTimeSeries {
        self.inner
    }
}
