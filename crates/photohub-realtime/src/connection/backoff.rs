//! Reconnect delay policy.

use std::time::Duration;

use photohub_core::config::RealtimeConfig;

/// Delay schedule between reconnect attempts.
///
/// With `multiplier <= 1.0` the delay is flat. Larger multipliers grow the
/// delay per consecutive failure, capped at `max_delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Growth factor per consecutive failure.
    pub multiplier: f64,
    /// Ceiling.
    pub max_delay: Duration,
}

impl ReconnectPolicy {
    /// A flat delay.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            base_delay: delay,
            multiplier: 1.0,
            max_delay: delay,
        }
    }

    /// Build the policy from configuration.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self {
            base_delay: config.reconnect_delay(),
            multiplier: config.reconnect_multiplier,
            max_delay: config.max_reconnect_delay(),
        }
    }

    /// Delay before retry number `attempt` (0-based, reset after each
    /// successful connection).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if !(self.multiplier.is_finite() && self.multiplier > 1.0) {
            return self.base_delay;
        }

        let ceiling = self.max_delay.max(self.base_delay);
        let scaled = self.base_delay.as_secs_f64() * self.multiplier.powi(attempt.min(32) as i32);
        if scaled >= ceiling.as_secs_f64() {
            ceiling
        } else {
            Duration::from_secs_f64(scaled)
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_config(&RealtimeConfig::default())
    }
}
