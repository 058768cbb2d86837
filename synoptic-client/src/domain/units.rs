//! Unit-of-measure settings.
//!
//! Each request carries a [`UnitSettings`] which is sent upstream as the
//! Synoptic `units` query parameter and, when the provider reports a
//! different unit for a variable, applied again during normalization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown unit code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {category} unit: {value:?}")]
pub struct InvalidUnit {
    category: &'static str,
    value: String,
}

/// Declares a closed unit enum with its wire codes.
macro_rules! unit_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $category:literal {
            $($variant:ident => $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The code used in the Synoptic `units` query parameter.
            pub fn as_code(&self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_code())
            }
        }

        impl FromStr for $name {
            type Err = InvalidUnit;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($code) {
                        return Ok($name::$variant);
                    }
                )+
                Err(InvalidUnit {
                    category: $category,
                    value: s.to_string(),
                })
            }
        }
    };
}

unit_enum! {
    /// Temperature unit.
    TemperatureUnit, "temperature" {
        C => "C",
        F => "F",
        K => "K",
    }
}

unit_enum! {
    /// Wind speed unit.
    SpeedUnit, "speed" {
        Mph => "mph",
        Kph => "kph",
    }
}

unit_enum! {
    /// Pressure unit.
    PressureUnit, "pressure" {
        In => "in",
        Mm => "mm",
    }
}

unit_enum! {
    /// Height unit (station elevation).
    HeightUnit, "height" {
        Ft => "ft",
        M => "m",
    }
}

unit_enum! {
    /// Precipitation and snow depth unit.
    PrecipUnit, "precipitation" {
        In => "in",
        Mm => "mm",
        Cm => "cm",
    }
}

unit_enum! {
    /// Altimeter setting unit.
    AltimeterUnit, "altimeter" {
        Pa => "pa",
        Inhg => "inhg",
    }
}

/// The caller's chosen measurement units for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitSettings {
    pub temp: TemperatureUnit,
    pub speed: SpeedUnit,
    pub pres: PressureUnit,
    pub height: HeightUnit,
    pub precip: PrecipUnit,
    pub alti: AltimeterUnit,
}

impl UnitSettings {
    /// Metric preset: C, kph, mm, m, mm, pa.
    pub fn metric() -> Self {
        Self {
            temp: TemperatureUnit::C,
            speed: SpeedUnit::Kph,
            pres: PressureUnit::Mm,
            height: HeightUnit::M,
            precip: PrecipUnit::Mm,
            alti: AltimeterUnit::Pa,
        }
    }

    /// English preset: F, mph, in, ft, in, inhg.
    pub fn english() -> Self {
        Self {
            temp: TemperatureUnit::F,
            speed: SpeedUnit::Mph,
            pres: PressureUnit::In,
            height: HeightUnit::Ft,
            precip: PrecipUnit::In,
            alti: AltimeterUnit::Inhg,
        }
    }

    /// Render as the Synoptic `units` query value,
    /// e.g. `temp|C,speed|kph,pres|mm,height|m,precip|mm,alti|pa`.
    pub fn to_query(&self) -> String {
        format!(
            "temp|{},speed|{},pres|{},height|{},precip|{},alti|{}",
            self.temp, self.speed, self.pres, self.height, self.precip, self.alti
        )
    }
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self::metric()
    }
}

/// Which unit setting governs a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitCategory {
    Temperature,
    Speed,
    Precip,
    /// Percentages, radiation, bearings: never converted.
    Fixed,
}

/// A numeric conversion from a reported unit to a requested one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    Identity,
    Temperature {
        from: TemperatureUnit,
        to: TemperatureUnit,
    },
    Scale(f64),
}

impl Conversion {
    /// Work out how to convert values reported as `reported` into the unit
    /// `units` requests for `category`.
    ///
    /// Returns `None` when the reported label is not recognised; callers
    /// should then trust that the provider already converted.
    pub fn between(category: UnitCategory, reported: &str, units: &UnitSettings) -> Option<Self> {
        let conversion = match category {
            UnitCategory::Fixed => Conversion::Identity,
            UnitCategory::Temperature => {
                let from = parse_temperature_label(reported)?;
                if from == units.temp {
                    Conversion::Identity
                } else {
                    Conversion::Temperature {
                        from,
                        to: units.temp,
                    }
                }
            }
            UnitCategory::Speed => {
                let from = speed_label_in_mps(reported)?;
                Conversion::scale(from / speed_unit_in_mps(units.speed))
            }
            UnitCategory::Precip => {
                let from = length_label_in_mm(reported)?;
                Conversion::scale(from / precip_unit_in_mm(units.precip))
            }
        };
        Some(conversion)
    }

    fn scale(factor: f64) -> Self {
        if (factor - 1.0).abs() < 1e-12 {
            Conversion::Identity
        } else {
            Conversion::Scale(factor)
        }
    }

    /// Apply the conversion to one value.
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            Conversion::Identity => value,
            Conversion::Scale(factor) => value * factor,
            Conversion::Temperature { from, to } => from_kelvin(to_kelvin(value, from), to),
        }
    }
}

fn to_kelvin(value: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::K => value,
        TemperatureUnit::C => value + 273.15,
        TemperatureUnit::F => (value - 32.0) * 5.0 / 9.0 + 273.15,
    }
}

fn from_kelvin(kelvin: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::K => kelvin,
        TemperatureUnit::C => kelvin - 273.15,
        TemperatureUnit::F => (kelvin - 273.15) * 9.0 / 5.0 + 32.0,
    }
}

fn speed_unit_in_mps(unit: SpeedUnit) -> f64 {
    match unit {
        SpeedUnit::Mph => 0.44704,
        SpeedUnit::Kph => 1000.0 / 3600.0,
    }
}

fn precip_unit_in_mm(unit: PrecipUnit) -> f64 {
    match unit {
        PrecipUnit::Mm => 1.0,
        PrecipUnit::Cm => 10.0,
        PrecipUnit::In => 25.4,
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_ascii_lowercase().replace(['°', ' '], "")
}

fn parse_temperature_label(label: &str) -> Option<TemperatureUnit> {
    match normalize_label(label).as_str() {
        "c" | "celsius" | "degc" => Some(TemperatureUnit::C),
        "f" | "fahrenheit" | "degf" => Some(TemperatureUnit::F),
        "k" | "kelvin" => Some(TemperatureUnit::K),
        _ => None,
    }
}

fn speed_label_in_mps(label: &str) -> Option<f64> {
    match normalize_label(label).as_str() {
        "m/s" | "mps" | "meters/second" => Some(1.0),
        "mph" | "miles/hour" => Some(speed_unit_in_mps(SpeedUnit::Mph)),
        "km/h" | "kph" | "kilometers/hour" => Some(speed_unit_in_mps(SpeedUnit::Kph)),
        "knots" | "knot" | "kts" | "kt" => Some(1852.0 / 3600.0),
        _ => None,
    }
}

fn length_label_in_mm(label: &str) -> Option<f64> {
    match normalize_label(label).as_str() {
        "mm" | "millimeters" | "millimetres" => Some(1.0),
        "cm" | "centimeters" | "centimetres" => Some(10.0),
        "in" | "inches" => Some(25.4),
        "m" | "meters" | "metres" => Some(1000.0),
        _ => None,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn temperature_label(unit: TemperatureUnit) -> &'static str {
        match unit {
            TemperatureUnit::C => "Celsius",
            TemperatureUnit::F => "Fahrenheit",
            TemperatureUnit::K => "Kelvin",
        }
    }

    fn precip_label(unit: PrecipUnit) -> &'static str {
        match unit {
            PrecipUnit::Mm => "Millimeters",
            PrecipUnit::Cm => "Centimeters",
            PrecipUnit::In => "Inches",
        }
    }

    fn with_temp(temp: TemperatureUnit) -> UnitSettings {
        UnitSettings {
            temp,
            ..UnitSettings::metric()
        }
    }

    fn with_precip(precip: PrecipUnit) -> UnitSettings {
        UnitSettings {
            precip,
            ..UnitSettings::metric()
        }
    }

    proptest! {
        /// Converting a temperature there and back returns the input.
        #[test]
        fn temperature_roundtrip(
            value in -100.0f64..100.0,
            a in prop::sample::select(TemperatureUnit::ALL),
            b in prop::sample::select(TemperatureUnit::ALL),
        ) {
            let there = Conversion::between(UnitCategory::Temperature, temperature_label(a), &with_temp(b)).unwrap();
            let back = Conversion::between(UnitCategory::Temperature, temperature_label(b), &with_temp(a)).unwrap();
            prop_assert!((back.apply(there.apply(value)) - value).abs() < 1e-9);
        }

        /// Converting a depth there and back returns the input.
        #[test]
        fn precip_roundtrip(
            value in 0.0f64..10_000.0,
            a in prop::sample::select(PrecipUnit::ALL),
            b in prop::sample::select(PrecipUnit::ALL),
        ) {
            let there = Conversion::between(UnitCategory::Precip, precip_label(a), &with_precip(b)).unwrap();
            let back = Conversion::between(UnitCategory::Precip, precip_label(b), &with_precip(a)).unwrap();
            prop_assert!((back.apply(there.apply(value)) - value).abs() < 1e-6);
        }

        /// Percentages and radiation pass through untouched whatever the label.
        #[test]
        fn fixed_is_identity(value in -1e6f64..1e6, label in "\\PC{0,8}") {
            let c = Conversion::between(UnitCategory::Fixed, &label, &UnitSettings::english()).unwrap();
            prop_assert_eq!(c.apply(value), value);
        }
    }
}
