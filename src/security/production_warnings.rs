//! Production mode warnings for insecure configurations

use std::time::Duration;

use crate::config::ServerConfig;
use crate::storage::StorageConfig;

/// Longest token validity that does not trigger a warning in production
const LONG_TOKEN_VALIDITY: Duration = Duration::from_secs(24 * 3600);

/// Production warning types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductionWarning {
    /// Development mode is enabled in production
    DevelopmentModeEnabled,
    /// Users are kept in memory only
    VolatileUserStore { database_url: String },
    /// TLS/SSL not enabled
    InsecureTLS,
    /// Tokens live longer than a day
    LongTokenValidity { secs: u64 },
}

impl ProductionWarning {
    pub fn message(&self) -> String {
        match self {
            Self::DevelopmentModeEnabled => {
                "Development mode is enabled in production environment".to_string()
            }
            Self::VolatileUserStore { database_url } => format!(
                "User store '{}' is not persistent; registered users are lost on restart",
                database_url
            ),
            Self::InsecureTLS => {
                "TLS is disabled; bearer tokens travel in clear text unless a proxy terminates TLS"
                    .to_string()
            }
            Self::LongTokenValidity { secs } => format!(
                "Tokens are valid for {} seconds and cannot be revoked before expiry",
                secs
            ),
        }
    }
}

/// Production environment detector
pub struct ProductionChecker {
    is_production: bool,
    environment: String,
}

impl ProductionChecker {
    /// Detect the environment from `RUST_ENV` or `ENVIRONMENT`
    pub fn from_env() -> Self {
        let environment = std::env::var("RUST_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "development".to_string());
        Self::new(environment)
    }

    pub fn new(environment: String) -> Self {
        let is_production = matches!(
            environment.to_lowercase().as_str(),
            "production" | "prod" | "release"
        );

        Self {
            is_production,
            environment,
        }
    }

    /// Check if we're running in production
    pub fn is_production(&self) -> bool {
        self.is_production
    }

    /// Get the current environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Everything in `config` that should not ship to production.
    /// Empty outside production.
    pub fn check_production_readiness(&self, config: &ServerConfig) -> Vec<ProductionWarning> {
        let mut warnings = Vec::new();

        if !self.is_production {
            return warnings;
        }

        if config.development_mode {
            warnings.push(ProductionWarning::DevelopmentModeEnabled);
        }

        let persistent = StorageConfig::parse(&config.database_url)
            .map(|storage| storage.is_persistent())
            .unwrap_or(false);
        if !persistent {
            warnings.push(ProductionWarning::VolatileUserStore {
                database_url: config.database_url.clone(),
            });
        }

        if !config.enable_tls {
            warnings.push(ProductionWarning::InsecureTLS);
        }

        if config.token_validity > LONG_TOKEN_VALIDITY {
            warnings.push(ProductionWarning::LongTokenValidity {
                secs: config.token_validity.as_secs(),
            });
        }

        warnings
    }

    /// Log every readiness warning at error level; returns how many were found
    pub fn log_warnings(&self, config: &ServerConfig) -> usize {
        let warnings = self.check_production_readiness(config);
        for warning in &warnings {
            log::error!("PRODUCTION WARNING: {}", warning.message());
        }
        warnings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> ServerConfig {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(move |key: &str| {
            if key == "JWT_SECRET" {
                return Some("k9Vq2xLr7TzW4bNp1sYd8HfJ3mQc6GuE".to_string());
            }
            pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn test_no_warnings_outside_production() {
        let checker = ProductionChecker::new("development".to_string());
        let cfg = config(&[("TOKEN_GATE_DATABASE_URL", "memory")]);
        assert!(checker.check_production_readiness(&cfg).is_empty());
        assert!(!checker.is_production());
    }

    #[test]
    fn test_production_warnings() {
        let checker = ProductionChecker::new("Production".to_string());
        let cfg = config(&[
            ("TOKEN_GATE_DATABASE_URL", "memory"),
            ("TOKEN_GATE_DEVELOPMENT_MODE", "true"),
            ("TOKEN_GATE_TOKEN_TTL_SECS", "172800"),
        ]);
        let warnings = checker.check_production_readiness(&cfg);
        assert!(warnings.contains(&ProductionWarning::DevelopmentModeEnabled));
        assert!(warnings.contains(&ProductionWarning::InsecureTLS));
        assert!(warnings.contains(&ProductionWarning::LongTokenValidity { secs: 172800 }));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ProductionWarning::VolatileUserStore { .. })));
    }

    #[test]
    fn test_persistent_store_not_flagged() {
        let checker = ProductionChecker::new("prod".to_string());
        let cfg = config(&[("TOKEN_GATE_DATABASE_URL", "sqlite://users.db")]);
        let warnings = checker.check_production_readiness(&cfg);
        assert_eq!(warnings, vec![ProductionWarning::InsecureTLS]);
    }
}
