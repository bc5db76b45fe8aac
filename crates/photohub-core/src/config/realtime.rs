//! Realtime notification connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Realtime (WebSocket) notification client configuration.
///
/// The defaults reproduce a flat two-second reconnect delay. Setting
/// `reconnect_multiplier` above `1.0` turns it into capped exponential
/// backoff bounded by `max_reconnect_delay_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Delay before the first reconnect attempt, in milliseconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Growth factor applied per consecutive failed attempt.
    #[serde(default = "default_reconnect_multiplier")]
    pub reconnect_multiplier: f64,
    /// Upper bound for the reconnect delay, in milliseconds.
    #[serde(default = "default_max_reconnect_delay")]
    pub max_reconnect_delay_ms: u64,
    /// Handshake timeout in seconds; a slower handshake counts as a failure.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Minimum access token length required before connecting.
    #[serde(default = "default_min_token_length")]
    pub min_token_length: usize,
    /// Inbound frames larger than this are discarded.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl RealtimeConfig {
    /// Base reconnect delay.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Reconnect delay ceiling.
    pub fn max_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.max_reconnect_delay_ms)
    }

    /// Handshake timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay(),
            reconnect_multiplier: default_reconnect_multiplier(),
            max_reconnect_delay_ms: default_max_reconnect_delay(),
            connect_timeout_seconds: default_connect_timeout(),
            min_token_length: default_min_token_length(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

fn default_reconnect_delay() -> u64 {
    2000
}

fn default_reconnect_multiplier() -> f64 {
    1.0
}

fn default_max_reconnect_delay() -> u64 {
    30_000
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_min_token_length() -> usize {
    10
}

fn default_max_message_bytes() -> usize {
    65_536
}
