use crate::cache::Cache;
use crate::error::ApiError;
use crate::http::{error_response, parse_request, Method, Request, Response};
use crate::upstream::WeatherProvider;
use bytes::Bytes;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use weather_cache::CacheKey;

pub const KNOWN_ROUTES: [&str; 3] = [
    "GET /",
    "GET /weather?city=CITY&country=COUNTRY",
    "GET /forecast?city=CITY&country=COUNTRY",
];

/// Per-request orchestration: parse, look up the cache, fall back to the
/// upstream provider on a miss, cache the result, build the response.
///
/// Current weather and forecasts are cached in separate stores so the same
/// (city, country) key can hold both.
pub struct Handler<P> {
    weather: Cache,
    forecasts: Cache,
    provider: P,
    default_country: String,
    ttl: Duration,
    sweep_every: u64,
    served: AtomicU64,
}

impl<P: WeatherProvider> Handler<P> {
    pub fn new(
        weather: Cache,
        forecasts: Cache,
        provider: P,
        default_country: String,
        ttl: Duration,
        sweep_every: u64,
    ) -> Self {
        Self {
            weather,
            forecasts,
            provider,
            default_country,
            ttl,
            sweep_every,
            served: AtomicU64::new(0),
        }
    }

    /// Handle one raw request. Always produces a complete response; every
    /// error is folded into the JSON error envelope.
    pub async fn handle(&self, raw: &[u8]) -> Response {
        let response = match parse_request(raw) {
            Ok(request) => match self.route(&request).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!(error = %err, status = err.status(), "request failed");
                    self.error_to_response(err)
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "malformed request");
                error_response(&err)
            }
        };

        self.maybe_sweep();
        response
    }

    async fn route(&self, request: &Request) -> Result<Response, ApiError> {
        match (&request.method, request.path.as_str()) {
            (Method::Get, "/weather") => self.weather_endpoint(request).await,
            (Method::Get, "/forecast") => self.forecast_endpoint(request).await,
            (Method::Get, "/") => Ok(service_description()),
            _ => Err(ApiError::RouteNotFound(request.path.clone())),
        }
    }

    async fn weather_endpoint(&self, request: &Request) -> Result<Response, ApiError> {
        let (city, country) = self.city_country(request)?;
        let key = CacheKey::new(city, country);

        if let Some(payload) = self.weather.lookup(&key) {
            tracing::debug!(key = %key, "weather cache hit");
            return Ok(Response::json(200, payload).with_header("X-Cache", "HIT"));
        }

        let record = self.provider.current_weather(&key.city, &key.country).await?;
        let payload = to_payload(&record)?;
        self.weather.store(key.clone(), payload.clone(), self.ttl);
        tracing::debug!(key = %key, "weather cache miss, stored fresh fetch");

        Ok(Response::json(200, payload).with_header("X-Cache", "MISS"))
    }

    async fn forecast_endpoint(&self, request: &Request) -> Result<Response, ApiError> {
        let (city, country) = self.city_country(request)?;
        let key = CacheKey::new(city, country);

        if let Some(payload) = self.forecasts.lookup(&key) {
            tracing::debug!(key = %key, "forecast cache hit");
            return Ok(Response::json(200, payload).with_header("X-Cache", "HIT"));
        }

        let forecast = self.provider.forecast(&key.city, &key.country).await?;
        let payload = to_payload(&forecast)?;
        self.forecasts.store(key.clone(), payload.clone(), self.ttl);
        tracing::debug!(key = %key, days = forecast.day_count, "forecast cache miss, stored fresh fetch");

        Ok(Response::json(200, payload).with_header("X-Cache", "MISS"))
    }

    fn city_country<'a>(&'a self, request: &'a Request) -> Result<(&'a str, &'a str), ApiError> {
        let city = request
            .param("city")
            .ok_or(ApiError::MissingParameter("city"))?;
        let country = request.param("country").unwrap_or(&self.default_country);
        Ok((city, country))
    }

    fn error_to_response(&self, err: ApiError) -> Response {
        // Unknown routes get a hint listing what the server does serve
        if let ApiError::RouteNotFound(path) = &err {
            let body = serde_json::json!({
                "error": true,
                "code": 404,
                "message": format!("unknown endpoint: {path}"),
                "routes": KNOWN_ROUTES,
            });
            return Response::json(404, body.to_string());
        }
        error_response(&err)
    }

    /// Sweep both stores after every `sweep_every` served requests.
    fn maybe_sweep(&self) {
        if self.sweep_every == 0 {
            return;
        }
        let served = self.served.fetch_add(1, Ordering::Relaxed) + 1;
        if served % self.sweep_every == 0 {
            let removed = self.weather.sweep_expired() + self.forecasts.sweep_expired();
            if removed > 0 {
                tracing::info!(removed, served, "swept expired cache entries");
            }
        }
    }
}

fn to_payload<T: Serialize>(value: &T) -> Result<Bytes, ApiError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Static capability description for `GET /`. Never touches cache or
/// upstream.
fn service_description() -> Response {
    let body = serde_json::json!({
        "service": "weather-server",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "HTTP/JSON weather API with TTL-cached OpenWeatherMap data",
        "endpoints": [
            {
                "method": "GET",
                "path": "/weather",
                "parameters": "city (required), country (optional)",
                "example": "/weather?city=Stockholm&country=SE",
            },
            {
                "method": "GET",
                "path": "/forecast",
                "parameters": "city (required), country (optional)",
                "example": "/forecast?city=Stockholm&country=SE",
            },
        ],
        "countryCodes": "ISO 3166-1 alpha-2 (SE, GB, US, FR, ...)",
    });
    Response::json(200, body.to_string())
}
