use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub ui: UiConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,        // Root of the delay service
    pub timeout_seconds: u64,    // Per-request timeout
    pub routes_top_n: usize,     // Rows fetched for the routes dialog
    pub performers_top_n: usize, // Rows fetched for the performers dialog
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UiConfig {
    pub tick_rate_ms: u64, // Input poll / redraw interval
}

impl Config {
    /// Loads config.toml from the root directory.
    /// If it doesn't exist, creates a default one.
    pub fn load() -> Self {
        let config_path = "config.toml";

        if let Ok(content) = fs::read_to_string(config_path) {
            match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => warn!("Failed to parse config.toml: {}. Using defaults.", e),
            }
        }

        let default_config = Config::default();

        // Save default config to disk for the user to edit later
        let toml_string = toml::to_string_pretty(&default_config).unwrap();
        if fs::write(config_path, toml_string).is_err() {
            warn!("Could not write default config.toml to disk.");
        }

        info!("Loaded default configuration.");
        default_config
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
                timeout_seconds: 10,
                routes_top_n: 10,
                performers_top_n: 5,
            },
            ui: UiConfig { tick_rate_ms: 200 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(parsed.api.timeout_seconds, 10);
        assert_eq!(parsed.api.routes_top_n, 10);
        assert_eq!(parsed.api.performers_top_n, 5);
        assert_eq!(parsed.ui.tick_rate_ms, 200);
    }

    #[test]
    fn user_config_overrides_every_field() {
        let parsed: Config = toml::from_str(
            r#"
            [api]
            base_url = "http://delay.internal:9000"
            timeout_seconds = 3
            routes_top_n = 25
            performers_top_n = 7

            [ui]
            tick_rate_ms = 100
            "#,
        )
        .unwrap();

        assert_eq!(parsed.api.base_url, "http://delay.internal:9000");
        assert_eq!(parsed.api.timeout_seconds, 3);
        assert_eq!(parsed.api.routes_top_n, 25);
        assert_eq!(parsed.api.performers_top_n, 7);
        assert_eq!(parsed.ui.tick_rate_ms, 100);
    }
}
