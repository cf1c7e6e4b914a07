//! Submission configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::poll::PollConfig;

/// Default number of submissions that may run at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 16;

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

/// Timing and concurrency knobs of the submission protocol.
///
/// Serializes with millisecond fields; missing fields take their defaults:
///
/// ```json
/// {"reveal_wait_ms": 2000, "ack_interval_ms": 1000, "ack_timeout_ms": 10000,
///  "confirm_interval_ms": 60000, "confirm_timeout_ms": 900000, "max_concurrent": 16}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitConfig {
    /// Settle delay between commit and reveal.
    #[serde(rename = "reveal_wait_ms", with = "millis")]
    pub reveal_wait: Duration,
    #[serde(rename = "ack_interval_ms", with = "millis")]
    pub ack_interval: Duration,
    #[serde(rename = "ack_timeout_ms", with = "millis")]
    pub ack_timeout: Duration,
    #[serde(rename = "confirm_interval_ms", with = "millis")]
    pub confirm_interval: Duration,
    #[serde(rename = "confirm_timeout_ms", with = "millis")]
    pub confirm_timeout: Duration,
    /// Worker pool size.
    pub max_concurrent: usize,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        let ack = PollConfig::acknowledge();
        let confirm = PollConfig::confirm();
        Self {
            reveal_wait: Duration::from_millis(2000),
            ack_interval: ack.interval,
            ack_timeout: ack.timeout,
            confirm_interval: confirm.interval,
            confirm_timeout: confirm.timeout,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

impl SubmitConfig {
    pub fn with_reveal_wait(mut self, wait: Duration) -> Self {
        self.reveal_wait = wait;
        self
    }

    pub fn with_ack_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.ack_interval = interval;
        self.ack_timeout = timeout;
        self
    }

    pub fn with_confirm_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.confirm_interval = interval;
        self.confirm_timeout = timeout;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn ack_poll(&self) -> PollConfig {
        PollConfig::new(self.ack_interval, self.ack_timeout)
    }

    pub fn confirm_poll(&self) -> PollConfig {
        PollConfig::new(self.confirm_interval, self.confirm_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SubmitConfig::default();
        assert_eq!(config.reveal_wait, Duration::from_secs(2));
        assert_eq!(config.ack_poll(), PollConfig::acknowledge());
        assert_eq!(config.confirm_poll().timeout, Duration::from_secs(900));
        assert_eq!(config.max_concurrent, 16);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SubmitConfig =
            serde_json::from_str(r#"{"ack_timeout_ms": 30000, "max_concurrent": 4}"#).unwrap();
        assert_eq!(config.ack_timeout, Duration::from_secs(30));
        assert_eq!(config.ack_interval, Duration::from_secs(1));
        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.reveal_wait, Duration::from_secs(2));
    }

    #[test]
    fn test_serializes_millis() {
        let config = SubmitConfig::default().with_reveal_wait(Duration::from_millis(250));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["reveal_wait_ms"], 250);
        assert_eq!(json["confirm_interval_ms"], 60_000);
    }
}
