use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use session_token::{SessionTokenCodec, SigningSecret, DEFAULT_TTL_SECONDS};

use crate::error::{ApiError, Result};

/// Environment variable holding the HMAC signing key.
pub const SECRET_ENV_VAR: &str = "SESSION_TOKEN_SECRET";
/// Shorter keys still work but are logged as weak at startup.
pub const MIN_RECOMMENDED_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of tokens issued by `/session/refresh`.
    pub ttl_seconds: i64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

impl ServerConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ServerConfig = toml::from_str(content)
            .map_err(|e| ApiError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// `SERVER_HOST`, `SERVER_PORT` and `SESSION_TTL_SECONDS` win over the file.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.http.host = host;
        }
        if let Some(port) = env_override("SERVER_PORT")? {
            self.http.port = port;
        }
        if let Some(ttl) = env_override("SESSION_TTL_SECONDS")? {
            self.session.ttl_seconds = ttl;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.session.ttl_seconds <= 0 {
            return Err(ApiError::Config(format!(
                "session.ttl_seconds must be positive, got {}",
                self.session.ttl_seconds
            )));
        }
        Ok(())
    }
}

fn env_override<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ApiError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

pub fn signing_secret_from_env() -> Option<SigningSecret> {
    std::env::var(SECRET_ENV_VAR)
        .ok()
        .and_then(SigningSecret::new)
}

/// Builds the process-wide codec once, reporting secret problems up front.
/// A missing secret does not stop the server: every issue/verify fails closed.
pub fn codec_from_env() -> SessionTokenCodec {
    let secret = signing_secret_from_env();
    match &secret {
        None => log::warn!(
            "{} is not set; session tokens can be neither issued nor verified",
            SECRET_ENV_VAR
        ),
        Some(secret) if secret.byte_len() < MIN_RECOMMENDED_SECRET_LEN => log::warn!(
            "{} is only {} bytes; use at least {}",
            SECRET_ENV_VAR,
            secret.byte_len(),
            MIN_RECOMMENDED_SECRET_LEN
        ),
        Some(_) => {}
    }
    SessionTokenCodec::new(secret)
}
