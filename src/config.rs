//! Environment configuration
//!
//! Every setting is read from a `STREAMER_`-prefixed environment variable,
//! e.g. `STREAMER_NOTIFICATIONS_ENABLED=false`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const ENV_PREFIX: &str = "STREAMER_";

fn default_app_name() -> String {
    "Spotify Streamer".to_string()
}

fn default_notifications_enabled() -> bool {
    true
}

fn default_poll_slow_ms() -> u64 {
    250
}

fn default_poll_fast_ms() -> u64 {
    100
}

fn default_preview_duration_ms() -> u32 {
    30_000
}

fn default_prepare_delay_ms() -> u64 {
    400
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".logs")
}

fn default_share_hashtag() -> String {
    " #SpotifyStreamer".to_string()
}

fn default_seek_step_ms() -> u32 {
    5_000
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_notifications_enabled")]
    pub notifications_enabled: bool,
    /// Now-playing poll period while idle, paused or in error.
    #[serde(default = "default_poll_slow_ms")]
    pub poll_slow_ms: u64,
    /// Now-playing poll period while playing.
    #[serde(default = "default_poll_fast_ms")]
    pub poll_fast_ms: u64,
    #[serde(default = "default_preview_duration_ms")]
    pub preview_duration_ms: u32,
    #[serde(default = "default_prepare_delay_ms")]
    pub prepare_delay_ms: u64,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_share_hashtag")]
    pub share_hashtag: String,
    #[serde(default = "default_seek_step_ms")]
    pub seek_step_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            notifications_enabled: default_notifications_enabled(),
            poll_slow_ms: default_poll_slow_ms(),
            poll_fast_ms: default_poll_fast_ms(),
            preview_duration_ms: default_preview_duration_ms(),
            prepare_delay_ms: default_prepare_delay_ms(),
            log_dir: default_log_dir(),
            share_hashtag: default_share_hashtag(),
            seek_step_ms: default_seek_step_ms(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .context("invalid STREAMER_* environment variable")?;

        anyhow::ensure!(
            config.poll_fast_ms > 0 && config.poll_slow_ms > 0,
            "poll periods must be positive"
        );
        Ok(config)
    }

    pub fn poll_slow(&self) -> Duration {
        Duration::from_millis(self.poll_slow_ms)
    }

    pub fn poll_fast(&self) -> Duration {
        Duration::from_millis(self.poll_fast_ms)
    }

    pub fn prepare_delay(&self) -> Duration {
        Duration::from_millis(self.prepare_delay_ms)
    }
}
