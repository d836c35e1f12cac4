//! Configuration management utilities

use serde::{Deserialize, Serialize};

/// Environment variable naming the deployment environment
pub const ENVIRONMENT_VAR: &str = "SECTOR_PULSE_ENV";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "sector-pulse".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Build the configuration, taking the environment label from `SECTOR_PULSE_ENV`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(environment) = std::env::var(ENVIRONMENT_VAR) {
            if !environment.trim().is_empty() {
                config.environment = environment.trim().to_string();
            }
        }
        config
    }

    /// Whether this is a production deployment
    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "prod" | "production")
    }
}
