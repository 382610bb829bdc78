//! Extension wiring the Radio Aristocrats sources into aristoconfig
//!
//! The [`AristocratsConfigExt`] trait adds typed accessors for the feed and
//! artwork sources to `aristoconfig::Config`, and the clients gain
//! `from_config` constructors built on top of it.
//!
//! # Example
//!
//! ```no_run
//! use aristoconfig::get_config;
//! use aristoradio::AristocratsConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//!
//! let every = config.get_poll_interval()?;
//! let channel = config.get_default_channel()?;
//! println!("Polling {channel} every {every:?}");
//! # Ok(())
//! # }
//! ```

use crate::artwork::{ArtworkClient, DEFAULT_API_BASE};
use crate::client::{AristocratsClient, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::models::Channel;
use anyhow::Result;
use aristoconfig::Config;
use serde_yaml::Value;
use std::time::Duration;
use tracing::{info, warn};

/// Default delay between two now-playing polls
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 4;

/// Shortest accepted polling interval
pub const MIN_POLL_INTERVAL_SECS: u64 = 3;

/// Longest accepted polling interval
pub const MAX_POLL_INTERVAL_SECS: u64 = 5;

const SOURCE_PATH: [&str; 2] = ["sources", "aristocrats"];
const LASTFM_PATH: [&str; 2] = ["sources", "lastfm"];

fn key<'a>(base: &[&'a str; 2], leaf: &'a str) -> [&'a str; 3] {
    [base[0], base[1], leaf]
}

/// Radio Aristocrats settings on top of `aristoconfig::Config`
///
/// Boolean getters persist their default when the key is absent.
pub trait AristocratsConfigExt {
    /// Whether now-playing polling is enabled
    fn get_aristocrats_enabled(&self) -> Result<bool>;

    fn set_aristocrats_enabled(&self, enabled: bool) -> Result<()>;

    /// Channel loaded at start-up
    fn get_default_channel(&self) -> Result<Channel>;

    fn set_default_channel(&self, channel: Channel) -> Result<()>;

    /// Polling interval, clamped to 3..=5 seconds
    fn get_poll_interval(&self) -> Result<Duration>;

    fn set_poll_interval_secs(&self, secs: u64) -> Result<()>;

    /// Timeout applied to every feed and artwork request
    fn get_request_timeout(&self) -> Result<Duration>;

    /// Whether artwork lookups are enabled
    fn get_lastfm_enabled(&self) -> Result<bool>;

    fn set_lastfm_enabled(&self, enabled: bool) -> Result<()>;

    /// Artwork API key (empty when not configured)
    fn get_lastfm_api_key(&self) -> Result<String>;

    fn set_lastfm_api_key(&self, key: &str) -> Result<()>;

    fn get_lastfm_api_base(&self) -> Result<String>;

    /// Interface language: `auto`, `uk` or `ru`
    fn get_player_language(&self) -> Result<String>;
}

impl AristocratsConfigExt for Config {
    fn get_aristocrats_enabled(&self) -> Result<bool> {
        match self.get_value(&key(&SOURCE_PATH, "enabled")) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => {
                self.set_aristocrats_enabled(true)?;
                Ok(true)
            }
        }
    }

    fn set_aristocrats_enabled(&self, enabled: bool) -> Result<()> {
        self.set_value(&key(&SOURCE_PATH, "enabled"), Value::Bool(enabled))
    }

    fn get_default_channel(&self) -> Result<Channel> {
        let raw = self.get_string(&key(&SOURCE_PATH, "default_channel"), "stream")?;
        match raw.parse::<Channel>() {
            Ok(channel) => Ok(channel),
            Err(e) => {
                warn!(value = %raw, error = %e, "Invalid default channel, using Stream");
                Ok(Channel::Stream)
            }
        }
    }

    fn set_default_channel(&self, channel: Channel) -> Result<()> {
        let code = serde_yaml::to_value(channel)?;
        self.set_value(&key(&SOURCE_PATH, "default_channel"), code)
    }

    fn get_poll_interval(&self) -> Result<Duration> {
        let secs = self.get_u64(
            &key(&SOURCE_PATH, "poll_interval_secs"),
            DEFAULT_POLL_INTERVAL_SECS,
        )?;
        let clamped = secs.clamp(MIN_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS);
        if clamped != secs {
            warn!(
                configured = secs,
                used = clamped,
                "Poll interval out of range, clamping"
            );
        }
        Ok(Duration::from_secs(clamped))
    }

    fn set_poll_interval_secs(&self, secs: u64) -> Result<()> {
        self.set_value(
            &key(&SOURCE_PATH, "poll_interval_secs"),
            Value::Number(secs.into()),
        )
    }

    fn get_request_timeout(&self) -> Result<Duration> {
        let secs = self.get_u64(
            &key(&SOURCE_PATH, "request_timeout_secs"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        Ok(Duration::from_secs(secs.max(1)))
    }

    fn get_lastfm_enabled(&self) -> Result<bool> {
        match self.get_value(&key(&LASTFM_PATH, "enabled")) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => {
                self.set_lastfm_enabled(true)?;
                Ok(true)
            }
        }
    }

    fn set_lastfm_enabled(&self, enabled: bool) -> Result<()> {
        self.set_value(&key(&LASTFM_PATH, "enabled"), Value::Bool(enabled))
    }

    fn get_lastfm_api_key(&self) -> Result<String> {
        // Env overrides are YAML-parsed, so an all-digit key arrives as a number
        match self.get_value(&key(&LASTFM_PATH, "api_key")) {
            Ok(Value::String(s)) => Ok(s.trim().to_string()),
            Ok(Value::Number(n)) => Ok(n.to_string()),
            _ => Ok(String::new()),
        }
    }

    fn set_lastfm_api_key(&self, api_key: &str) -> Result<()> {
        self.set_value(
            &key(&LASTFM_PATH, "api_key"),
            Value::String(api_key.to_string()),
        )
    }

    fn get_lastfm_api_base(&self) -> Result<String> {
        self.get_string(&key(&LASTFM_PATH, "api_base"), DEFAULT_API_BASE)
    }

    fn get_player_language(&self) -> Result<String> {
        self.get_string(&["player", "language"], "auto")
    }
}

impl AristocratsClient {
    /// Build a feed client from the configured timeout
    pub async fn from_config(config: &Config) -> crate::Result<Self> {
        let timeout = config.get_request_timeout()?;
        Self::builder().timeout(timeout).build().await
    }
}

impl ArtworkClient {
    /// Build an artwork client when lookups are enabled and a key is set
    ///
    /// Returns `Ok(None)` otherwise; callers then always show the default
    /// artwork.
    pub fn from_config(config: &Config) -> crate::Result<Option<Self>> {
        if !config.get_lastfm_enabled()? {
            info!("Artwork lookups disabled by configuration");
            return Ok(None);
        }

        let api_key = config.get_lastfm_api_key()?;
        if api_key.is_empty() {
            info!("No artwork API key configured, artwork lookups disabled");
            return Ok(None);
        }

        let client = Self::builder()
            .api_base(config.get_lastfm_api_base()?)
            .api_key(api_key)
            .timeout(config.get_request_timeout()?)
            .build()?;
        Ok(Some(client))
    }
}
