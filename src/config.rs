//! Process configuration

use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;

/// Cosmetic pause before a reply is rendered, in milliseconds. State is
/// never delayed by this, only the renderer notification.
const DEFAULT_TYPING_DELAY_MS: u64 = 600;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub typing_delay: Duration,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults
    /// for missing or unparsable values.
    pub fn from_env() -> Self {
        Self {
            port: parse_or(std::env::var("DESKBOT_PORT").ok(), DEFAULT_PORT),
            typing_delay: Duration::from_millis(parse_or(
                std::env::var("DESKBOT_TYPING_DELAY_MS").ok(),
                DEFAULT_TYPING_DELAY_MS,
            )),
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|value| value.parse().ok()).unwrap_or(default)
}
