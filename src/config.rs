//! Server configuration module
//! Loads the process-wide configuration once at startup from an optional
//! JSON file and environment variables (environment wins).

use crate::constants::{
    DEFAULT_AUTH_MIN_DURATION_MS, DEFAULT_CONFIG_FILE, DEFAULT_DATABASE_URL, DEFAULT_HOST,
    DEFAULT_PORT, DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS,
};
use crate::error::{Result, TokenGateError};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// User store location (`memory`, `sqlite::memory:`, `sqlite://<path>` or a bare path)
    pub database_url: String,
    /// JWT secret for token signing/validation
    pub jwt_secret: String,
    /// How long an issued token stays valid
    pub token_validity: Duration,
    /// Minimum duration of a failed credential check
    pub auth_min_duration: Duration,
    /// Development mode (relaxes nothing, only changes startup warnings)
    pub development_mode: bool,
    /// TLS configuration
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
    /// Enable TLS
    pub enable_tls: bool,
}

/// Values read from the JSON configuration file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub token_ttl_secs: Option<u64>,
    pub auth_min_duration_ms: Option<u64>,
    pub development_mode: Option<bool>,
    pub enable_tls: Option<bool>,
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
}

impl FileConfig {
    /// Parse a configuration file
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TokenGateError::ConfigError(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            TokenGateError::ConfigError(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Locate the configuration file: `TOKEN_GATE_CONFIG` if set (must exist),
    /// otherwise `config.json` in the working directory if present.
    pub fn discover<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TOKEN_GATE_CONFIG") {
            return Self::from_path(Path::new(&path));
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            log::info!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
            return Self::from_path(default_path);
        }

        Ok(Self::default())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        panic!("ServerConfig::default() is not allowed for security reasons. Use ServerConfig::from_env() instead.");
    }
}

impl ServerConfig {
    /// Validate that a secret meets security requirements
    fn validate_jwt_secret(secret: &str) -> Result<()> {
        if secret.len() < 32 {
            return Err(TokenGateError::ConfigError(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        // Check for insecure default or example values
        let insecure_patterns = [
            "your-secret-key",
            "change-this",
            "changeme",
            "example",
            "default",
            "secret",
            "password",
            "12345",
        ];

        let lowered = secret.to_lowercase();
        for pattern in &insecure_patterns {
            if lowered.contains(pattern) {
                return Err(TokenGateError::ConfigError(format!(
                    "JWT secret contains insecure pattern '{}'. Please use a secure random value generated with: openssl rand -base64 32",
                    pattern
                )));
            }
        }

        // Ensure some complexity
        if secret.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TokenGateError::ConfigError(
                "JWT secret should contain mixed characters (letters, numbers, symbols)"
                    .to_string(),
            ));
        }

        Ok(())
    }

    fn validate_token_ttl(secs: u64) -> Result<()> {
        if secs == 0 || secs > MAX_TOKEN_TTL_SECS {
            return Err(TokenGateError::ConfigError(format!(
                "Token TTL must be between 1 and {} seconds, got {}",
                MAX_TOKEN_TTL_SECS, secs
            )));
        }
        Ok(())
    }

    /// Load configuration from the config file (if any) and environment variables
    pub fn from_env() -> Result<Self> {
        let lookup = |key: &str| env::var(key).ok();
        let file = FileConfig::discover(lookup)?;
        Self::from_sources(file, lookup)
    }

    /// Build a configuration from an explicit key/value source, ignoring config files
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_sources(FileConfig::default(), lookup)
    }

    /// Merge file values with a key/value source; the source wins
    pub fn from_sources<F>(file: FileConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("TOKEN_GATE_HOST")
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = parse_var(&lookup, "TOKEN_GATE_PORT")?
            .or(file.port)
            .unwrap_or(DEFAULT_PORT);

        let database_url = lookup("TOKEN_GATE_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .or(file.database_url)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let jwt_secret = lookup("TOKEN_GATE_JWT_SECRET")
            .or_else(|| lookup("JWT_SECRET"))
            .or(file.jwt_secret)
            .ok_or_else(|| {
                TokenGateError::ConfigError(
                    "JWT_SECRET environment variable is required for security. \
                     Generate one with: openssl rand -base64 32"
                        .to_string(),
                )
            })?;

        let token_ttl_secs = parse_var(&lookup, "TOKEN_GATE_TOKEN_TTL_SECS")?
            .or(file.token_ttl_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        let auth_min_duration_ms = parse_var(&lookup, "TOKEN_GATE_AUTH_MIN_DURATION_MS")?
            .or(file.auth_min_duration_ms)
            .unwrap_or(DEFAULT_AUTH_MIN_DURATION_MS);

        let development_mode = parse_flag(&lookup, "TOKEN_GATE_DEVELOPMENT_MODE")?
            .or(file.development_mode)
            .unwrap_or(false); // SECURITY: Default to false (production mode)

        // TLS configuration
        let enable_tls = parse_flag(&lookup, "TOKEN_GATE_ENABLE_TLS")?
            .or(file.enable_tls)
            .unwrap_or(false);
        let tls_cert_path = lookup("TOKEN_GATE_TLS_CERT_PATH").or(file.tls_cert_path);
        let tls_key_path = lookup("TOKEN_GATE_TLS_KEY_PATH").or(file.tls_key_path);

        if enable_tls {
            match (&tls_cert_path, &tls_key_path) {
                (Some(cert_path), Some(key_path)) => {
                    if !Path::new(cert_path).exists() {
                        return Err(TokenGateError::ConfigError(format!(
                            "TLS certificate file does not exist: {}",
                            cert_path
                        )));
                    }
                    if !Path::new(key_path).exists() {
                        return Err(TokenGateError::ConfigError(format!(
                            "TLS private key file does not exist: {}",
                            key_path
                        )));
                    }
                }
                _ => {
                    return Err(TokenGateError::ConfigError(
                        "TLS is enabled but TOKEN_GATE_TLS_CERT_PATH or TOKEN_GATE_TLS_KEY_PATH is not set".to_string(),
                    ));
                }
            }
        }

        Self::validate_jwt_secret(&jwt_secret)?;
        Self::validate_token_ttl(token_ttl_secs)?;

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            token_validity: Duration::from_secs(token_ttl_secs),
            auth_min_duration: Duration::from_millis(auth_min_duration_ms),
            development_mode,
            enable_tls,
            tls_cert_path,
            tls_key_path,
        })
    }
}

/// Parse an optional typed variable; a present but malformed value is an error
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            TokenGateError::ConfigError(format!("Invalid value for {}: '{}' ({})", key, raw, e))
        }),
        None => Ok(None),
    }
}

fn parse_flag<F>(lookup: &F, key: &str) -> Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            other => Err(TokenGateError::ConfigError(format!(
                "Invalid boolean for {}: '{}'",
                key, other
            ))),
        },
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const GOOD_SECRET: &str = "k9Vq2xLr7TzW4bNp1sYd8HfJ3mQc6GuE";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    #[should_panic(expected = "ServerConfig::default() is not allowed for security reasons")]
    fn test_default_panics() {
        let _ = ServerConfig::default();
    }

    #[test]
    fn test_defaults_applied() {
        let config = ServerConfig::from_lookup(lookup_from(&[("JWT_SECRET", GOOD_SECRET)])).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.token_validity, Duration::from_secs(DEFAULT_TOKEN_TTL_SECS));
        assert!(!config.development_mode);
        assert!(!config.enable_tls);
    }

    #[test]
    fn test_requires_secret() {
        let result = ServerConfig::from_lookup(lookup_from(&[]));
        assert!(result.unwrap_err().to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = FileConfig {
            port: Some(9000),
            host: Some("127.0.0.1".to_string()),
            jwt_secret: Some(GOOD_SECRET.to_string()),
            ..FileConfig::default()
        };
        let config =
            ServerConfig::from_sources(file, lookup_from(&[("TOKEN_GATE_PORT", "9100")])).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_malformed_port_is_an_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", GOOD_SECRET),
            ("TOKEN_GATE_PORT", "eighty"),
        ]));
        assert!(result.unwrap_err().to_string().contains("TOKEN_GATE_PORT"));
    }

    #[test]
    fn test_token_ttl_bounds() {
        for bad in ["0", "99999999"] {
            let result = ServerConfig::from_lookup(lookup_from(&[
                ("JWT_SECRET", GOOD_SECRET),
                ("TOKEN_GATE_TOKEN_TTL_SECS", bad),
            ]));
            assert!(result.is_err(), "TTL {} should be rejected", bad);
        }
    }

    #[test]
    fn test_weak_secrets_rejected() {
        for weak in [
            "short1!",
            "my-password-is-long-enough-1234567890",
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJ",
        ] {
            let result = ServerConfig::from_lookup(lookup_from(&[("JWT_SECRET", weak)]));
            assert!(result.is_err(), "secret {:?} should be rejected", weak);
        }
    }

    #[test]
    fn test_tls_requires_paths() {
        let result = ServerConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", GOOD_SECRET),
            ("TOKEN_GATE_ENABLE_TLS", "true"),
        ]));
        assert!(result.unwrap_err().to_string().contains("TLS"));
    }

    #[test]
    fn test_file_rejects_unknown_keys() {
        let parsed: std::result::Result<FileConfig, _> =
            serde_json::from_str(r#"{"port": 8080, "prot": 1}"#);
        assert!(parsed.is_err());
    }
}
