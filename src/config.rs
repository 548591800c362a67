//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; handlers only ever see the cached
//! `Config` held in `AppState`.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL, used for the CORS allow-list
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Path of the JSON database document
    pub db_path: String,
    /// OTP delivery webhook base URL; the submitted email is appended.
    /// When unset, the OTP channel goes straight to its local fallback code.
    pub otp_webhook_url: Option<String>,
    /// Gemini API key for goal generation; when unset the built-in goal
    /// list is used.
    pub gemini_api_key: Option<String>,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// For local development, set the keys in a `.env` file; the external
    /// collaborators (OTP delivery, goal generation) are optional and the
    /// flows degrade to their local fallbacks without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            db_path: env::var("DB_PATH").unwrap_or_else(|_| "data/wellness_db.json".to_string()),
            otp_webhook_url: env::var("OTP_WEBHOOK_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            gemini_api_key: env::var("GEMINI_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            db_path: String::new(),
            otp_webhook_url: None,
            gemini_api_key: None,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
