//! Synoptic Data time-series client.
//!
//! This module provides an HTTP client for the Synoptic Data weather API,
//! which serves observations from surface weather stations.
//!
//! Key characteristics of Synoptic:
//! - Authentication is a `token` query parameter, not a header
//! - Failures often arrive as HTTP 200 with a non-OK `SUMMARY.RESPONSE_CODE`;
//!   code 2 is not a failure but an empty window
//! - Each variable can be reported in several numbered sets
//!   (`air_temp_set_1`, `air_temp_set_2`); derived sets end in `d`
//! - Missing samples are `null` inside an otherwise present array

mod client;
mod convert;
mod error;
#[cfg(test)]
mod fixtures;
mod mock;
mod types;

pub use client::{BASE_URL_ENV, SynopticClient, SynopticConfig, TIMEOUT_ENV, TOKEN_ENV};
pub use convert::{ConversionError, empty_series, normalize_response, requested_variables};
pub use error::SynopticError;
pub use mock::MockSynopticClient;
pub use types::{StationDto, Summary, TimeSeriesResponse};
