use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_host")]
    pub host: String,
    #[serde(default = "default_upstream_port")]
    pub port: u16,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// 0 = unbounded store, anything else bounds the entry count.
    #[serde(default)]
    pub capacity: usize,
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Sweep expired entries after every N served requests. 0 disables.
    #[serde(default = "default_sweep_every")]
    pub sweep_every_requests: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    /// ISO 3166-1 alpha-2 country code used when the client omits `country`.
    #[serde(default = "default_country")]
    pub default_country: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Config {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            cache: CacheConfig::default(),
            weather: WeatherConfig::default(),
        }
    }

    /// The environment variable wins over the config file, so the key never
    /// has to live on disk.
    pub fn api_key(&self) -> String {
        std::env::var("OPENWEATHER_API_KEY").unwrap_or_else(|_| self.upstream.api_key.clone())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: default_upstream_host(),
            port: default_upstream_port(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 0,
            ttl_seconds: default_ttl(),
            sweep_every_requests: default_sweep_every(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            default_country: default_country(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}
fn default_upstream_host() -> String {
    "api.openweathermap.org".to_string()
}
fn default_upstream_port() -> u16 {
    80
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_ttl() -> u64 {
    1800
}
fn default_sweep_every() -> u64 {
    10
}
fn default_country() -> String {
    "SE".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.upstream.host, "api.openweathermap.org");
        assert_eq!(config.cache.ttl_seconds, 1800);
        assert_eq!(config.cache.capacity, 0);
        assert_eq!(config.weather.default_country, "SE");
    }

    #[test]
    fn partial_file_overrides() {
        let config: Config = toml::from_str(
            r#"
            [cache]
            ttl_seconds = 60
            capacity = 100

            [weather]
            default_country = "GB"
            "#,
        )
        .unwrap();
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.cache.capacity, 100);
        assert_eq!(config.weather.default_country, "GB");
        // Untouched sections keep their defaults
        assert_eq!(config.upstream.timeout_ms, 5000);
    }
}
