//! Configuration schema, defaults, and layered loading.
//!
//! Precedence: defaults < config file < environment

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Number of staged delay steps in a simulated transfer. Protocol constant,
/// not derived from payload size.
pub const TRANSFER_DELAY_STEPS: u32 = 10;

/// Per-endpoint simulated latencies.
pub mod latency {
    use std::time::Duration;

    pub const LOGIN: Duration = Duration::from_millis(800);
    pub const PROFILE: Duration = Duration::from_millis(500);
    pub const USER_LIST: Duration = Duration::from_millis(500);
    pub const USER_GET: Duration = Duration::from_millis(300);
    pub const USER_CREATE: Duration = Duration::from_millis(800);
    pub const TASKS: Duration = Duration::from_millis(500);
    pub const TRANSFER_STEP: Duration = Duration::from_millis(200);
}

pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "mockdrop")
        .map(|p| p.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("mockdrop.toml"))
}

/// Simulated-latency switch. The step counts and durations stay protocol
/// constants; `Instant` keeps the step sequence but drops the waits so the
/// contract is testable without wall-clock sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayProfile {
    #[default]
    Standard,
    Instant,
}

impl DelayProfile {
    pub async fn sleep(self, base: Duration) {
        if self == DelayProfile::Standard {
            tokio::time::sleep(base).await;
        }
    }
}

/// The single identity the login endpoint accepts, checked by equality.
/// A deliberately simplified stand-in, not a security boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySettings {
    pub email: String,
    pub password: String,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            email: "admin@example.com".to_string(),
            password: "password".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    pub port: u16,
    pub delays: DelayProfile,
    pub identity: IdentitySettings,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8787,
            delays: DelayProfile::Standard,
            identity: IdentitySettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub base_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787".to_string(),
        }
    }
}

/// Fully resolved application configuration after all layers merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub client: ClientSettings,
}

impl AppConfig {
    /// Rejects configurations the server or client cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.server.bind.trim().is_empty(),
            "Invalid config: server.bind must not be empty"
        );
        ensure!(
            !self.server.identity.email.trim().is_empty(),
            "Invalid config: server.identity.email must not be empty"
        );
        ensure!(
            !self.server.identity.password.is_empty(),
            "Invalid config: server.identity.password must not be empty"
        );
        ensure!(
            !self.client.base_url.trim().is_empty(),
            "Invalid config: client.base_url must not be empty"
        );
        Ok(())
    }
}

/// Loads config from defaults/file/env.
pub fn load_config() -> Result<AppConfig> {
    let path = config_path();

    let config: AppConfig = Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("MOCKDROP_").split("__"))
        .extract()
        .context("Failed to load configuration")?;

    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.server.delays, DelayProfile::Standard);
    }

    #[test]
    fn empty_identity_is_rejected() {
        let mut config = AppConfig::default();
        config.server.identity.email = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn instant_profile_does_not_sleep() {
        let start = std::time::Instant::now();
        DelayProfile::Instant.sleep(Duration::from_secs(5)).await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
