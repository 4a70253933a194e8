//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a serde default so an empty file
//! yields the standard policy.

pub mod lockout;
pub mod logging;
pub mod password;
pub mod session;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::lockout::LockoutConfig;
pub use self::logging::LoggingConfig;
pub use self::password::PasswordPolicyConfig;
pub use self::session::SessionConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Longest standard lock accepted: one year.
pub const MAX_LOCKOUT_DURATION_MINUTES: i64 = 525_600;
/// Longest absolute session lifetime accepted: one year.
pub const MAX_SESSION_TIMEOUT_HOURS: i64 = 8_760;
/// Longest grace period accepted.
pub const MAX_GRACE_PERIOD_DAYS: i64 = 365;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay) and `ACCTGUARD__*` variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Failed-login lockout settings.
    #[serde(default)]
    pub lockout: LockoutConfig,
    /// Password expiration settings.
    #[serde(default)]
    pub password: PasswordPolicyConfig,
    /// Session registry settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Background sweep settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with an environment-specific overlay
    /// and environment variables prefixed with `ACCTGUARD__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ACCTGUARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Rejects settings that would make the policies meaningless.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.lockout.max_failed_attempts == 0 {
            return Err(AppError::configuration(
                "lockout.max_failed_attempts must be at least 1",
            ));
        }
        if self.lockout.security_threshold < self.lockout.max_failed_attempts {
            return Err(AppError::configuration(
                "lockout.security_threshold must not be below lockout.max_failed_attempts",
            ));
        }
        check_range(
            "lockout.lockout_duration_minutes",
            self.lockout.lockout_duration_minutes,
            MAX_LOCKOUT_DURATION_MINUTES,
        )?;
        check_range(
            "session.absolute_timeout_hours",
            self.session.absolute_timeout_hours,
            MAX_SESSION_TIMEOUT_HOURS,
        )?;
        check_range(
            "password.grace_period_days",
            self.password.grace_period_days,
            MAX_GRACE_PERIOD_DAYS,
        )?;
        if self.session.max_concurrent_sessions == 0 {
            return Err(AppError::configuration(
                "session.max_concurrent_sessions must be at least 1",
            ));
        }
        if self.session.token_bytes < 32 {
            return Err(AppError::configuration(
                "session.token_bytes must be at least 32 (256 bits)",
            ));
        }
        Ok(())
    }
}

fn check_range(name: &str, value: i64, max: i64) -> Result<(), AppError> {
    if value <= 0 || value > max {
        return Err(AppError::configuration(format!(
            "{name} must be between 1 and {max}, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_policy_constants() {
        let config = AppConfig::default();
        assert_eq!(config.lockout.max_failed_attempts, 5);
        assert_eq!(config.lockout.security_threshold, 10);
        assert_eq!(config.lockout.lockout_duration_minutes, 30);
        assert_eq!(config.password.admin_role, "Admin");
        assert_eq!(config.password.admin_expiration_days, 60);
        assert_eq!(config.password.default_expiration_days, 90);
        assert_eq!(config.password.grace_period_days, 7);
        assert_eq!(config.session.max_concurrent_sessions, 3);
        assert_eq!(config.session.absolute_timeout_hours, 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str("", config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.session.token_bytes, 32);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_toml_overrides_section() {
        let toml = r#"
            [lockout]
            max_failed_attempts = 3

            [session]
            max_concurrent_sessions = 1
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.lockout.max_failed_attempts, 3);
        assert_eq!(config.lockout.lockout_duration_minutes, 30);
        assert_eq!(config.session.max_concurrent_sessions, 1);
    }

    #[test]
    fn test_validate_rejects_short_tokens() {
        let mut config = AppConfig::default();
        config.session.token_bytes = 16;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nonpositive_durations() {
        let mut config = AppConfig::default();
        config.lockout.lockout_duration_minutes = -30;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.session.absolute_timeout_hours = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.password.grace_period_days = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_durations() {
        let mut config = AppConfig::default();
        config.lockout.lockout_duration_minutes = i64::MAX / 60;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);

        let mut config = AppConfig::default();
        config.session.absolute_timeout_hours = MAX_SESSION_TIMEOUT_HOURS + 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.password.grace_period_days = MAX_GRACE_PERIOD_DAYS;
        assert!(config.validate().is_ok());
    }
}
