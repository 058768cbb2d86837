//! Compass wind directions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Width of one compass sector in degrees.
const SECTOR_DEGREES: f64 = 360.0 / 16.0;

/// Error returned when parsing an unknown compass abbreviation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid wind direction: {0:?}")]
pub struct InvalidWindDir(String);

/// One of the 16 compass points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WindDir {
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

impl WindDir {
    /// All points, clockwise from north.
    pub const ALL: [WindDir; 16] = [
        WindDir::N,
        WindDir::Nne,
        WindDir::Ne,
        WindDir::Ene,
        WindDir::E,
        WindDir::Ese,
        WindDir::Se,
        WindDir::Sse,
        WindDir::S,
        WindDir::Ssw,
        WindDir::Sw,
        WindDir::Wsw,
        WindDir::W,
        WindDir::Wnw,
        WindDir::Nw,
        WindDir::Nnw,
    ];

    /// Bin a bearing in degrees into the nearest compass point.
    ///
    /// Each point covers a 22.5° sector centred on its bearing, so `N` spans
    /// `[348.75, 11.25)`. Bearings outside `[0, 360)` wrap. Returns `None` for
    /// NaN or infinite input.
    ///
    /// # Examples
    ///
    /// ```
    /// use synoptic_client::domain::WindDir;
    ///
    /// assert_eq!(WindDir::from_degrees(0.0), Some(WindDir::N));
    /// assert_eq!(WindDir::from_degrees(350.0), Some(WindDir::N));
    /// assert_eq!(WindDir::from_degrees(225.0), Some(WindDir::Sw));
    /// assert_eq!(WindDir::from_degrees(f64::NAN), None);
    /// ```
    pub fn from_degrees(degrees: f64) -> Option<Self> {
        if !degrees.is_finite() {
            return None;
        }
        let bearing = degrees.rem_euclid(360.0);
        let sector = ((bearing + SECTOR_DEGREES / 2.0) / SECTOR_DEGREES).floor() as usize;
        Some(Self::ALL[sector % 16])
    }

    /// Centre bearing of this point in degrees.
    pub fn degrees(&self) -> f64 {
        self.index() as f64 * SECTOR_DEGREES
    }

    fn index(&self) -> usize {
        *self as usize
    }

    /// The compass abbreviation, e.g. `"NNE"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            WindDir::N => "N",
            WindDir::Nne => "NNE",
            WindDir::Ne => "NE",
            WindDir::Ene => "ENE",
            WindDir::E => "E",
            WindDir::Ese => "ESE",
            WindDir::Se => "SE",
            WindDir::Sse => "SSE",
            WindDir::S => "S",
            WindDir::Ssw => "SSW",
            WindDir::Sw => "SW",
            WindDir::Wsw => "WSW",
            WindDir::W => "W",
            WindDir::Wnw => "WNW",
            WindDir::Nw => "NW",
            WindDir::Nnw => "NNW",
        }
    }
}

impl fmt::Display for WindDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindDir {
    type Err = InvalidWindDir;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|dir| dir.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| InvalidWindDir(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinal_points() {
        assert_eq!(WindDir::from_degrees(0.0), Some(WindDir::N));
        assert_eq!(WindDir::from_degrees(90.0), Some(WindDir::E));
        assert_eq!(WindDir::from_degrees(180.0), Some(WindDir::S));
        assert_eq!(WindDir::from_degrees(270.0), Some(WindDir::W));
    }

    #[test]
    fn sector_boundaries() {
        assert_eq!(WindDir::from_degrees(11.24), Some(WindDir::N));
        assert_eq!(WindDir::from_degrees(11.25), Some(WindDir::Nne));
        assert_eq!(WindDir::from_degrees(348.74), Some(WindDir::Nnw));
        assert_eq!(WindDir::from_degrees(348.75), Some(WindDir::N));
    }

    #[test]
    fn wraps_out_of_range() {
        assert_eq!(WindDir::from_degrees(360.0), Some(WindDir::N));
        assert_eq!(WindDir::from_degrees(-90.0), Some(WindDir::W));
        assert_eq!(WindDir::from_degrees(450.0), Some(WindDir::E));
    }

    #[test]
    fn non_finite_is_none() {
        assert_eq!(WindDir::from_degrees(f64::NAN), None);
        assert_eq!(WindDir::from_degrees(f64::INFINITY), None);
    }

    #[test]
    fn parse_abbreviations() {
        for dir in WindDir::ALL {
            assert_eq!(dir.as_str().parse::<WindDir>().unwrap(), dir);
        }
        assert_eq!("nne".parse::<WindDir>().unwrap(), WindDir::Nne);
        assert!("NORTH".parse::<WindDir>().is_err());
        assert!("".parse::<WindDir>().is_err());
    }

    #[test]
    fn serde_uses_abbreviations() {
        assert_eq!(serde_json::to_string(&WindDir::Wnw).unwrap(), "\"WNW\"");
        let dir: WindDir = serde_json::from_str("\"SSE\"").unwrap();
        assert_eq!(dir, WindDir::Sse);
    }
}
