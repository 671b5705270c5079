use crate::error::ApiError;
use crate::model::{Forecast, WeatherRecord, MAX_FORECAST_DAYS};
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use std::time::Duration;

/// Seam between the router and the external weather provider. The production
/// implementation talks to OpenWeatherMap; tests substitute their own.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, city: &str, country: &str)
        -> Result<WeatherRecord, ApiError>;
    async fn forecast(&self, city: &str, country: &str) -> Result<Forecast, ApiError>;
}

type HttpClient = Client<HttpConnector, Empty<Bytes>>;

/// OpenWeatherMap client. One GET per fetch, bounded by a request timeout.
pub struct OpenWeatherClient {
    client: HttpClient,
    host: String,
    port: u16,
    api_key: String,
    timeout: Duration,
}

impl OpenWeatherClient {
    pub fn new(host: String, port: u16, api_key: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            host,
            port,
            api_key,
            timeout,
        }
    }

    /// Issue one GET and collect the full body. Returns the status and
    /// payload; timeouts and transport errors map to `Upstream`.
    async fn fetch(&self, path_and_query: &str) -> Result<(u16, Bytes), ApiError> {
        let uri = format!("http://{}:{}{}", self.host, self.port, path_and_query);
        let request = hyper::Request::builder()
            .method(hyper::Method::GET)
            .uri(&uri)
            .body(Empty::new())
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| ApiError::Upstream(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| ApiError::Upstream(e.to_string()))?
                .to_bytes();
            Ok::<_, ApiError>((status, body))
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                ApiError::Upstream(format!("no response within {}ms", self.timeout.as_millis()))
            })?
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_weather(
        &self,
        city: &str,
        country: &str,
    ) -> Result<WeatherRecord, ApiError> {
        tracing::info!(city, country, "fetching current weather upstream");

        // City names are passed through literally, matching the server-side
        // query handling: no percent-encoding.
        let path = format!(
            "/data/2.5/weather?q={},{}&appid={}&units=metric",
            city, country, self.api_key
        );
        let (status, body) = self.fetch(&path).await?;
        check_status(status, city)?;
        Ok(parse_current(&body, city, country))
    }

    async fn forecast(&self, city: &str, country: &str) -> Result<Forecast, ApiError> {
        tracing::info!(city, country, "fetching forecast upstream");

        // cnt=40 asks for the full five days of 3-hour slots.
        let path = format!(
            "/data/2.5/forecast?q={},{}&appid={}&units=metric&cnt=40",
            city, country, self.api_key
        );
        let (status, body) = self.fetch(&path).await?;
        check_status(status, city)?;
        Ok(parse_forecast(&body, city, country))
    }
}

/// Provider-side error mapping: not-found and bad-credentials are typed,
/// anything else non-success is a generic upstream failure.
fn check_status(status: u16, city: &str) -> Result<(), ApiError> {
    match status {
        200 => Ok(()),
        404 => Err(ApiError::CityNotFound(city.to_string())),
        401 => Err(ApiError::InvalidCredentials),
        other => Err(ApiError::Upstream(format!("provider returned status {other}"))),
    }
}

// Provider payload shapes. Every field defaults so a missing field yields
// zero/empty instead of a parse error; reordered or extra fields are ignored.

#[derive(Debug, Default, Deserialize)]
struct CurrentPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    sys: SysPayload,
    #[serde(default)]
    main: MainPayload,
    #[serde(default)]
    wind: WindPayload,
    #[serde(default)]
    weather: Vec<ConditionPayload>,
    #[serde(default)]
    dt: i64,
}

#[derive(Debug, Default, Deserialize)]
struct SysPayload {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Default, Deserialize)]
struct MainPayload {
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    humidity: f64,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Default, Deserialize)]
struct WindPayload {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct ConditionPayload {
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct ForecastPayload {
    #[serde(default)]
    list: Vec<SlotPayload>,
    #[serde(default)]
    city: CityPayload,
}

#[derive(Debug, Default, Deserialize)]
struct CityPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Default, Deserialize)]
struct SlotPayload {
    #[serde(default)]
    dt: i64,
    #[serde(default)]
    main: MainPayload,
    #[serde(default)]
    wind: WindPayload,
    #[serde(default)]
    weather: Vec<ConditionPayload>,
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn or_fallback(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Build a record from a current-weather payload. An unparseable body
/// degrades to the all-defaults payload rather than failing the request.
fn parse_current(body: &[u8], city: &str, country: &str) -> WeatherRecord {
    let payload: CurrentPayload = serde_json::from_slice(body).unwrap_or_default();
    let condition = payload.weather.into_iter().next().unwrap_or_default();

    WeatherRecord {
        city: or_fallback(payload.name, city),
        country: or_fallback(payload.sys.country, country),
        temperature: payload.main.temp,
        humidity: payload.main.humidity,
        wind_speed: payload.wind.speed,
        pressure: payload.main.pressure,
        description: condition.description,
        icon_id: condition.icon,
        timestamp: if payload.dt != 0 { payload.dt } else { unix_now() },
    }
}

/// Build a forecast from the 3-hour slot list: every 8th slot is 24h apart,
/// so the stride yields one entry per day, capped at five.
fn parse_forecast(body: &[u8], city: &str, country: &str) -> Forecast {
    let payload: ForecastPayload = serde_json::from_slice(body).unwrap_or_default();
    let city_name = or_fallback(payload.city.name, city);
    let country_code = or_fallback(payload.city.country, country);

    let days: Vec<WeatherRecord> = payload
        .list
        .into_iter()
        .step_by(8)
        .take(MAX_FORECAST_DAYS)
        .map(|slot| {
            let condition = slot.weather.into_iter().next().unwrap_or_default();
            WeatherRecord {
                city: city_name.clone(),
                country: country_code.clone(),
                temperature: slot.main.temp,
                humidity: slot.main.humidity,
                wind_speed: slot.wind.speed,
                pressure: slot.main.pressure,
                description: condition.description,
                icon_id: condition.icon,
                timestamp: if slot.dt != 0 { slot.dt } else { unix_now() },
            }
        })
        .collect();

    Forecast::new(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT: &str = r#"{
        "name": "Stockholm",
        "sys": {"country": "SE"},
        "main": {"temp": 15.5, "humidity": 65, "pressure": 1013},
        "wind": {"speed": 3.2},
        "weather": [{"description": "light rain", "icon": "10d"}],
        "dt": 1700000000
    }"#;

    #[test]
    fn parses_full_current_payload() {
        let record = parse_current(CURRENT.as_bytes(), "stockholm", "XX");
        assert_eq!(record.city, "Stockholm");
        assert_eq!(record.country, "SE");
        assert_eq!(record.temperature, 15.5);
        assert_eq!(record.humidity, 65.0);
        assert_eq!(record.wind_speed, 3.2);
        assert_eq!(record.pressure, 1013.0);
        assert_eq!(record.description, "light rain");
        assert_eq!(record.icon_id, "10d");
        assert_eq!(record.timestamp, 1_700_000_000);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let record = parse_current(br#"{"name": "Kiruna"}"#, "Kiruna", "SE");
        assert_eq!(record.temperature, 0.0);
        assert_eq!(record.humidity, 0.0);
        assert_eq!(record.pressure, 0.0);
        assert_eq!(record.wind_speed, 0.0);
        assert_eq!(record.description, "");
        assert_eq!(record.icon_id, "");
        // Country falls back to the requested one
        assert_eq!(record.country, "SE");
    }

    #[test]
    fn extra_and_reordered_fields_are_ignored() {
        let body = br#"{"wind": {"speed": 5.0, "gust": 9.1}, "name": "Oslo", "unknown": [1,2]}"#;
        let record = parse_current(body, "Oslo", "NO");
        assert_eq!(record.wind_speed, 5.0);
        assert_eq!(record.city, "Oslo");
    }

    #[test]
    fn garbage_body_degrades_to_defaults() {
        let record = parse_current(b"not json at all", "Oslo", "NO");
        assert_eq!(record.city, "Oslo");
        assert_eq!(record.temperature, 0.0);
    }

    fn slot(dt: i64, temp: f64) -> String {
        format!(
            r#"{{"dt": {dt}, "main": {{"temp": {temp}}}, "wind": {{"speed": 1.0}}, "weather": [{{"description": "clear", "icon": "01d"}}]}}"#
        )
    }

    fn forecast_body(slots: usize) -> String {
        let list: Vec<String> = (0..slots)
            .map(|i| slot(1_700_000_000 + i as i64 * 10_800, 10.0 + i as f64))
            .collect();
        format!(
            r#"{{"list": [{}], "city": {{"name": "Stockholm", "country": "SE"}}}}"#,
            list.join(",")
        )
    }

    #[test]
    fn forecast_takes_one_slot_per_day() {
        let forecast = parse_forecast(forecast_body(40).as_bytes(), "x", "y");
        assert_eq!(forecast.day_count, 5);
        // Slots 0, 8, 16, 24, 32 — 24 hours apart
        assert_eq!(forecast.days[0].temperature, 10.0);
        assert_eq!(forecast.days[1].temperature, 18.0);
        assert_eq!(
            forecast.days[1].timestamp - forecast.days[0].timestamp,
            86_400
        );
        assert_eq!(forecast.days[0].city, "Stockholm");
    }

    #[test]
    fn forecast_never_exceeds_five_days() {
        let forecast = parse_forecast(forecast_body(120).as_bytes(), "x", "y");
        assert_eq!(forecast.day_count, 5);
        assert_eq!(forecast.days.len(), 5);
    }

    #[test]
    fn short_forecast_keeps_what_it_has() {
        let forecast = parse_forecast(forecast_body(3).as_bytes(), "x", "y");
        assert_eq!(forecast.day_count, 1);
    }

    #[test]
    fn status_mapping() {
        assert!(check_status(200, "Oslo").is_ok());
        assert!(matches!(
            check_status(404, "Nowhereland"),
            Err(ApiError::CityNotFound(c)) if c == "Nowhereland"
        ));
        assert!(matches!(
            check_status(401, "Oslo"),
            Err(ApiError::InvalidCredentials)
        ));
        assert!(matches!(check_status(500, "Oslo"), Err(ApiError::Upstream(_))));
    }
}
