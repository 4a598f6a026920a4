//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; handlers only ever see the cached
//! `Config` inside `AppState`.

use chrono::NaiveTime;
use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Shelter opening time (pickups/deliveries must not be earlier)
    pub shelter_opens_at: NaiveTime,
    /// Shelter closing time (pickups/deliveries must not be later)
    pub shelter_closes_at: NaiveTime,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            shelter_opens_at: parse_hours("SHELTER_OPENS_AT", "09:00")?,
            shelter_closes_at: parse_hours("SHELTER_CLOSES_AT", "18:00")?,
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            shelter_opens_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            shelter_closes_at: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        }
    }
}

/// Parse an "HH:MM" opening-hours variable, falling back to a default.
fn parse_hours(var: &'static str, default: &str) -> Result<NaiveTime, ConfigError> {
    let raw = env::var(var).unwrap_or_else(|_| default.to_string());
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| ConfigError::Invalid(var))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 8080);
        // Defaults apply when the hours variables are unset
        assert_eq!(
            config.shelter_opens_at,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(
            config.shelter_closes_at,
            NaiveTime::from_hms_opt(18, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_hours_parsing() {
        // Unset variable falls back to the default
        let opens = parse_hours("SHELTER_TEST_UNSET_VAR", "08:30").unwrap();
        assert_eq!(opens, NaiveTime::from_hms_opt(8, 30, 0).unwrap());

        env::set_var("SHELTER_TEST_BAD_VAR", "9am");
        let err = parse_hours("SHELTER_TEST_BAD_VAR", "09:00").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("SHELTER_TEST_BAD_VAR")));
    }
}
