use serde::{Deserialize, Serialize};

/// A forecast never carries more than five day entries.
pub const MAX_FORECAST_DAYS: usize = 5;

/// One weather observation as served to clients.
///
/// Numeric fields are zero when the upstream response omitted them; a genuine
/// zero reading and a missing field are indistinguishable on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub description: String,
    pub icon_id: String,
    /// Unix seconds of the observation.
    pub timestamp: i64,
}

/// Forecast envelope: an ordered run of day entries plus their count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub day_count: usize,
    pub days: Vec<WeatherRecord>,
}

impl Forecast {
    /// Truncates to `MAX_FORECAST_DAYS` and keeps `day_count` consistent
    /// with the entries actually carried.
    pub fn new(mut days: Vec<WeatherRecord>) -> Self {
        days.truncate(MAX_FORECAST_DAYS);
        Self {
            day_count: days.len(),
            days,
        }
    }
}
