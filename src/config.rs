use std::env;

use chrono::NaiveTime;
use serde::Deserialize;

use crate::scheduling::SchedulingPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub scheduling: SchedulingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin of the marketplace dashboard, used for CORS.
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    /// Start of the bookable day, "HH:MM". Read from BUSINESS_OPEN.
    pub business_open: NaiveTime,
    /// End of the bookable day, "HH:MM". Read from BUSINESS_CLOSE.
    pub business_close: NaiveTime,
    /// Candidate slot step in minutes. Read from SLOT_STEP_MINUTES.
    pub slot_step_minutes: i64,
    /// How many months ahead an appointment may be booked.
    pub horizon_months: u32,
    /// Minimum hours before the current start for a reschedule.
    pub edit_lead_hours: i64,
    /// Minimum hours before the start for a cancellation.
    pub cancel_lead_hours: i64,
}

impl SchedulingConfig {
    pub fn policy(&self) -> SchedulingPolicy {
        SchedulingPolicy {
            business_open: self.business_open,
            business_close: self.business_close,
            slot_step_minutes: self.slot_step_minutes,
            horizon_months: self.horizon_months,
            edit_lead_hours: self.edit_lead_hours,
            cancel_lead_hours: self.cancel_lead_hours,
        }
    }
}

fn parse_time(var: &str, default: &str) -> Result<NaiveTime, ConfigError> {
    let raw = env::var(var).unwrap_or_else(|_| default.to_string());
    NaiveTime::parse_from_str(&raw, "%H:%M").map_err(|_| ConfigError::InvalidValue(var.to_string()))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
                frontend_url: env::var("FRONTEND_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://data/app.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
            scheduling: SchedulingConfig {
                business_open: parse_time("BUSINESS_OPEN", "08:00")?,
                business_close: parse_time("BUSINESS_CLOSE", "18:00")?,
                slot_step_minutes: env::var("SLOT_STEP_MINUTES")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
                horizon_months: env::var("BOOKING_HORIZON_MONTHS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .unwrap_or(3),
                edit_lead_hours: env::var("EDIT_LEAD_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .unwrap_or(24),
                cancel_lead_hours: env::var("CANCEL_LEAD_HOURS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .unwrap_or(2),
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                frontend_url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://data/app.db".to_string(),
                max_connections: 5,
            },
            scheduling: SchedulingConfig {
                business_open: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                business_close: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                slot_step_minutes: 30,
                horizon_months: 3,
                edit_lead_hours: 24,
                cancel_lead_hours: 2,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_business_rules() {
        let config = Config::default();
        let policy = config.scheduling.policy();
        assert_eq!(policy.business_open, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(policy.business_close, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(policy.slot_step_minutes, 30);
        assert_eq!(policy.horizon_months, 3);
        assert_eq!(policy.edit_lead_hours, 24);
        assert_eq!(policy.cancel_lead_hours, 2);
    }
}
