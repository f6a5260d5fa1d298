//! Centralized configuration for card-replay.
//!
//! All environment variables are loaded and validated at startup to fail fast
//! on misconfiguration rather than halfway through a replay.

use std::env;
use std::fmt;

use card_domain::gesture::{SwipeConfig, DEFAULT_DELETED_MESSAGE, DEFAULT_MIN_FLING_VELOCITY};

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration error for {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Replay configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Log format
    pub log_format: LogFormat,
    /// Fling speed (px/s) above which a release deletes the card (default: 500)
    pub min_fling_velocity: f64,
    /// Width of the list container in px (default: 640)
    pub container_width: f64,
    /// Width of each card in px (default: 448)
    pub card_width: f64,
    /// Toast shown after a swipe deletes a card
    pub deleted_message: String,
    /// Domain used to render short links (default: dub.sh)
    pub shortlink_domain: String,
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Log format
        let log_format =
            LogFormat::from_str(&lookup("LOG_FORMAT").unwrap_or_else(|| "pretty".into()));

        let min_fling_velocity =
            parse_px(&lookup, "MIN_FLING_VELOCITY", DEFAULT_MIN_FLING_VELOCITY)?;
        if min_fling_velocity < 0.0 {
            return Err(ConfigError {
                field: "MIN_FLING_VELOCITY",
                message: "Must not be negative".into(),
            });
        }

        let container_width = parse_px(&lookup, "CONTAINER_WIDTH", 640.0)?;
        let card_width = parse_px(&lookup, "CARD_WIDTH", 448.0)?;
        if container_width <= 0.0 {
            return Err(ConfigError {
                field: "CONTAINER_WIDTH",
                message: "Must be greater than zero".into(),
            });
        }
        if card_width <= 0.0 || card_width > container_width {
            return Err(ConfigError {
                field: "CARD_WIDTH",
                message: format!(
                    "Must be greater than zero and at most CONTAINER_WIDTH ({})",
                    container_width
                ),
            });
        }

        let deleted_message = lookup("DELETE_MESSAGE")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DELETED_MESSAGE.into());

        // Shortlink domain
        let shortlink_domain = lookup("SHORTLINK_DOMAIN")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "dub.sh".into());

        Ok(Self {
            log_format,
            min_fling_velocity,
            container_width,
            card_width,
            deleted_message,
            shortlink_domain,
        })
    }

    pub fn swipe(&self) -> SwipeConfig {
        SwipeConfig {
            min_fling_velocity: self.min_fling_velocity,
            deleted_message: self.deleted_message.clone(),
        }
    }
}

fn parse_px<F>(lookup: &F, field: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(field) else {
        return Ok(default);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ConfigError {
            field,
            message: format!("Invalid number '{}'", raw),
        }),
    }
}
