//! Federal Reserve Economic Data (FRED) access.
//!
//! Covers the economic indicators used for context text and the Economic
//! Policy Uncertainty indices, both served by the same API.

pub mod client;
pub mod frame;
pub mod series;

pub use client::{
    FredClient, ObservationQuery, PLACEHOLDER_API_KEY, SortOrder, is_usable_api_key,
    parse_observations, parse_series_info,
};
pub use frame::{frame_points, observations_frame, tag_series};
pub use series::{
    DEFAULT_INDICATORS, DEFAULT_POLICY_SERIES, Indicator, Observation, PolicySeries, SeriesInfo,
};
