//! Bridge configuration.

use interpreter::EngineFlags;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings of a [`crate::BridgeContext`].
///
/// # Examples
///
/// ```
/// use bridge::BridgeConfig;
///
/// let config = BridgeConfig::default()
///     .with_time_limit(2)
///     .with_blessing(true)
///     .with_bless_prefix("Guest::");
/// assert_eq!(config.time_limit, 2);
///
/// let loaded = BridgeConfig::from_json(r#"{"time_limit": 2, "enable_blessing": true, "bless_prefix": "Guest::"}"#).unwrap();
/// assert_eq!(loaded, config);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Wall-clock budget of a top-level evaluation in seconds, `0` for none
    pub time_limit: u64,
    /// Engine flag string, e.g. `"--stack-limit=128 --expose-gc"`
    pub flags: String,
    /// Convert guest objects carrying `__hostPackage` into host instances
    pub enable_blessing: bool,
    /// Prefix of synthesized host class names
    pub bless_prefix: String,
}

impl BridgeConfig {
    /// Sets the time budget in seconds.
    pub fn with_time_limit(mut self, seconds: u64) -> Self {
        self.time_limit = seconds;
        self
    }

    /// Sets the engine flag string.
    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = flags.into();
        self
    }

    /// Enables or disables reverse classing.
    pub fn with_blessing(mut self, enabled: bool) -> Self {
        self.enable_blessing = enabled;
        self
    }

    /// Sets the prefix of synthesized class names.
    pub fn with_bless_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.bless_prefix = prefix.into();
        self
    }

    /// Loads a configuration from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the configuration as pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The evaluation budget, `None` when unlimited.
    pub fn budget(&self) -> Option<Duration> {
        (self.time_limit > 0).then(|| Duration::from_secs(self.time_limit))
    }

    /// Engine flags parsed from [`BridgeConfig::flags`].
    pub fn engine_flags(&self) -> EngineFlags {
        EngineFlags::parse(&self.flags)
    }
}
