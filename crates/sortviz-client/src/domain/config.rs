//! Client configuration types.
//!
//! [`ClientConfig`] is the single source of truth for all runtime settings.
//! It can be built from defaults, loaded from a TOML file by the
//! infrastructure layer, and then overridden by CLI flags.
//!
//! # TOML layout
//!
//! Every field is optional; missing fields take the defaults below.
//!
//! ```toml
//! server_url = "ws://localhost:8080/websocket"
//!
//! [reconnect]
//! max_attempts = 5
//! base_delay_ms = 3000
//!
//! [dispatch]
//! send_cooldown_ms = 100
//!
//! [benchmark]
//! settle_delay_ms = 300
//! advance_delay_ms = 1000
//! retry_delay_ms = 500
//! dataset_policy = "shared"
//!
//! [teaching]
//! max_elements = 100
//! step_interval_ms = 500
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// All runtime configuration for the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket endpoint of the sorting service.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub teaching: TeachingConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            reconnect: ReconnectPolicy::default(),
            dispatch: DispatchConfig::default(),
            benchmark: BenchmarkConfig::default(),
            teaching: TeachingConfig::default(),
        }
    }
}

/// Bounded linear backoff for reconnection.
///
/// The delay before attempt *k* (1-based) is `base_delay * k`.  After
/// `max_attempts` failed attempts the session gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl ReconnectPolicy {
    /// Delay to wait before reconnect attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(u64::from(attempt)))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// Outbound queue settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Minimum spacing between two transmits.
    #[serde(default = "default_send_cooldown_ms")]
    pub send_cooldown_ms: u64,
}

impl DispatchConfig {
    pub fn send_cooldown(&self) -> Duration {
        Duration::from_millis(self.send_cooldown_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_cooldown_ms: default_send_cooldown_ms(),
        }
    }
}

/// Which input each algorithm of a benchmark suite sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetPolicy {
    /// One dataset is generated when the suite starts and every algorithm
    /// sorts it, so the timings are directly comparable.
    #[default]
    Shared,
    /// A fresh dataset with the same parameters is generated before every
    /// algorithm after the first.
    RegeneratePerAlgorithm,
}

impl fmt::Display for DatasetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DatasetPolicy::Shared => "shared",
            DatasetPolicy::RegeneratePerAlgorithm => "regenerate-per-algorithm",
        })
    }
}

impl FromStr for DatasetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(DatasetPolicy::Shared),
            "regenerate" | "regenerate-per-algorithm" => Ok(DatasetPolicy::RegeneratePerAlgorithm),
            other => Err(format!("unknown dataset policy: {other}")),
        }
    }
}

/// Benchmark pipeline timing and dataset policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Pause between choosing an algorithm and sending its request.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Pause between a recorded result and the next algorithm.
    #[serde(default = "default_advance_delay_ms")]
    pub advance_delay_ms: u64,
    /// Pause before re-sending a request whose transmit failed.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default)]
    pub dataset_policy: DatasetPolicy,
}

impl BenchmarkConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            advance_delay_ms: default_advance_delay_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            dataset_policy: DatasetPolicy::default(),
        }
    }
}

/// Teaching-mode limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeachingConfig {
    /// Largest dataset a teaching run accepts.
    #[serde(default = "default_max_elements")]
    pub max_elements: usize,
    /// Default delay the service waits between streamed steps.
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u32,
}

impl Default for TeachingConfig {
    fn default() -> Self {
        Self {
            max_elements: default_max_elements(),
            step_interval_ms: default_step_interval_ms(),
        }
    }
}

// ── Serde default value functions ─────────────────────────────────────────────

fn default_server_url() -> String {
    "ws://localhost:8080/websocket".to_string()
}
fn default_max_attempts() -> u32 {
    5
}
fn default_base_delay_ms() -> u64 {
    3000
}
fn default_send_cooldown_ms() -> u64 {
    100
}
fn default_settle_delay_ms() -> u64 {
    300
}
fn default_advance_delay_ms() -> u64 {
    1000
}
fn default_retry_delay_ms() -> u64 {
    500
}
fn default_max_elements() -> usize {
    100
}
fn default_step_interval_ms() -> u32 {
    500
}

// ── Tests ─────────────────────────────────────────────────────────────────────
