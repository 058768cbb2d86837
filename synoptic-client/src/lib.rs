//! Weather-station time-series client.
//!
//! Fetches observations for one station over a time window from the
//! Synoptic Data API and normalizes them into a [`StationTimeSeries`]:
//! parallel, time-aligned series in the caller's chosen units.
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use synoptic_client::{StationId, SynopticClient, UnitSettings};
//!
//! # async fn run() -> Result<(), synoptic_client::SynopticError> {
//! let client = SynopticClient::from_env()?;
//! let station = StationId::parse("CLN").expect("valid station id");
//! let end = Utc::now();
//! let series = client
//!     .fetch_station_data(end - Duration::hours(24), end, &station, UnitSettings::english())
//!     .await?;
//! println!("{} observations from {}", series.len(), series.station_name());
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use chrono::{DateTime, Utc};

pub mod domain;
pub mod synoptic;

pub use domain::{StationId, StationTimeSeries, UnitSettings, WindDir};
pub use synoptic::{MockSynopticClient, SynopticClient, SynopticConfig, SynopticError};

/// Source of station observations.
///
/// Implemented by the live [`SynopticClient`] and by [`MockSynopticClient`],
/// so code that consumes observations can be tested without the network.
pub trait StationDataSource {
    /// Fetch observations for `station_id` between `start` and `end`
    /// inclusive, converted to `units`.
    fn fetch_station_data(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        station_id: &StationId,
        units: UnitSettings,
    ) -> impl Future<Output = Result<StationTimeSeries, SynopticError>> + Send;
}
