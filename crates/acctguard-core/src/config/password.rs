//! Password expiration configuration.

use serde::{Deserialize, Serialize};

/// Password expiration and grace-period policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicyConfig {
    /// Role name that receives the shorter window. Compared case-sensitively.
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
    /// Expiration window for the admin role, in days.
    #[serde(default = "default_admin_days")]
    pub admin_expiration_days: u64,
    /// Expiration window for every other role, in days.
    #[serde(default = "default_days")]
    pub default_expiration_days: u64,
    /// Length of the post-expiration grace period, in days.
    #[serde(default = "default_grace_days")]
    pub grace_period_days: i64,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            admin_role: default_admin_role(),
            admin_expiration_days: default_admin_days(),
            default_expiration_days: default_days(),
            grace_period_days: default_grace_days(),
        }
    }
}

fn default_admin_role() -> String {
    "Admin".to_string()
}

fn default_admin_days() -> u64 {
    60
}

fn default_days() -> u64 {
    90
}

fn default_grace_days() -> i64 {
    7
}
