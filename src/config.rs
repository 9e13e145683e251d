use std::time::Duration;

use config::{Config as ConfigLib, ConfigError, Environment};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::{
    bot::DEFAULT_POLL_TIMEOUT_SECS,
    lookup::DEFAULT_TIMEOUT,
    models::VehicleId,
    sweep::scheduler::{DEFAULT_CRON, DEFAULT_UTC_OFFSET_SECS},
    telegram::DEFAULT_API_BASE,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub rtoc: RtocConfig,
    pub schedule: ScheduleConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    /// Chat id of the single operator allowed to issue commands
    pub master_id: i64,
    pub api_base: String,
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RtocConfig {
    pub api_url: String,
    #[serde(deserialize_with = "deserialize_vehicle_list")]
    pub vehicles: Vec<VehicleId>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Six-field cron expression evaluated in the `utc_offset_secs` offset
    pub cron: String,
    pub utc_offset_secs: i32,
    pub sweep_cooldown_secs: u64,
    pub on_demand_cooldown_secs: u64,
    pub summary: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    pub max_attempts: u32,
    pub retry_backoff_secs: u64,
}

impl RtocConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ScheduleConfig {
    pub fn sweep_cooldown(&self) -> Duration {
        Duration::from_secs(self.sweep_cooldown_secs)
    }

    pub fn on_demand_cooldown(&self) -> Duration {
        Duration::from_secs(self.on_demand_cooldown_secs)
    }
}

impl NotifyConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }
}

fn deserialize_vehicle_list<'de, D>(deserializer: D) -> Result<Vec<VehicleId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(VehicleId::parse_list(&raw))
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        // Build the config
        let config = ConfigLib::builder()
            // Set default values
            .set_default("telegram.api_base", DEFAULT_API_BASE)?
            .set_default("telegram.poll_timeout_secs", DEFAULT_POLL_TIMEOUT_SECS)?
            .set_default("rtoc.timeout_secs", DEFAULT_TIMEOUT.as_secs())?
            .set_default("schedule.cron", DEFAULT_CRON)?
            .set_default("schedule.utc_offset_secs", DEFAULT_UTC_OFFSET_SECS)?
            .set_default("schedule.sweep_cooldown_secs", 30 * 60)?
            .set_default("schedule.on_demand_cooldown_secs", 10 * 60)?
            .set_default("schedule.summary", false)?
            .set_default("notify.max_attempts", 1)?
            .set_default("notify.retry_backoff_secs", 5)?
            // Override config values via environment variables
            // The environment variables should be prefixed with 'APP_' and use '__' as a separator
            // Example: APP_TELEGRAM__MASTER_ID=123456
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.bot_token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Message("telegram.bot_token must not be empty".into()));
        }
        if self.rtoc.api_url.trim().is_empty() {
            return Err(ConfigError::Message("rtoc.api_url must not be empty".into()));
        }
        if self.rtoc.vehicles.is_empty() {
            return Err(ConfigError::Message(
                "rtoc.vehicles must list at least one vehicle".into(),
            ));
        }
        if self.notify.max_attempts == 0 {
            return Err(ConfigError::Message("notify.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}
