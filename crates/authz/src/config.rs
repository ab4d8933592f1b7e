use adminjet_models::RateLimits;

/// Engine configuration. Constructed once at process start and handed to
/// [`crate::AuthzEngine::new`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of random bytes behind each issued key secret.
    pub key_secret_bytes: usize,
    /// Limits applied to keys issued without explicit overrides.
    pub default_rate_limits: RateLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            key_secret_bytes: 32,
            default_rate_limits: RateLimits::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            key_secret_bytes: defaults.key_secret_bytes,
            default_rate_limits: RateLimits {
                requests_per_minute: env_u32(
                    "ADMINJET_DEFAULT_REQUESTS_PER_MINUTE",
                    defaults.default_rate_limits.requests_per_minute,
                ),
                requests_per_hour: env_u32(
                    "ADMINJET_DEFAULT_REQUESTS_PER_HOUR",
                    defaults.default_rate_limits.requests_per_hour,
                ),
                requests_per_day: env_u32(
                    "ADMINJET_DEFAULT_REQUESTS_PER_DAY",
                    defaults.default_rate_limits.requests_per_day,
                ),
            },
        }
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
