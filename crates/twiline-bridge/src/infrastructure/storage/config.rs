//! TOML configuration for the bridge.
//!
//! The file is passed on the command line (default `twiline.toml` in the
//! working directory).  The controller address is the only thing the bridge
//! cannot guess, so `[bus] host` and `port` are required; every timing knob
//! has a default.  Example:
//!
//! ```toml
//! [bus]
//! host = "192.168.1.80"
//! port = 3001
//!
//! [[lights]]
//! reference = "L1"
//! name = "Kitchen light"
//!
//! [[blinds]]
//! reference = "B1"
//! name = "Living room blind"
//! ```
//!
//! Fields annotated with `#[serde(default = "some_fn")]` fall back to the
//! return value of `some_fn()` when absent, so a minimal file keeps working
//! as new knobs are added.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use twiline_core::{AccessoryKind, DeviceDescriptor};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level bridge configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    pub bus: BusConfig,
    #[serde(default)]
    pub lights: Vec<DeviceEntry>,
    #[serde(default)]
    pub switches: Vec<DeviceEntry>,
    #[serde(default)]
    pub scenes: Vec<DeviceEntry>,
    #[serde(default)]
    pub windows: Vec<DeviceEntry>,
    #[serde(default)]
    pub blinds: Vec<DeviceEntry>,
}

/// Connection and timing settings for the TWILINE controller socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusConfig {
    /// Hostname or IP of the controller.
    pub host: String,
    /// TCP port of the controller's socket interface.
    pub port: u16,
    /// Delay between a connection loss and the next connect attempt.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Minimum spacing between consecutive outbound messages.
    #[serde(default = "default_write_interval_ms")]
    pub write_interval_ms: u64,
    /// How long a stateless switch press lasts before the automatic release.
    #[serde(default = "default_switch_press_ms")]
    pub switch_press_ms: u64,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// One configured device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceEntry {
    /// TWILINE reference of the device, unique across the whole file.
    pub reference: String,
    /// Human-readable display name.
    pub name: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_reconnect_delay_ms() -> u64 {
    5000
}
fn default_write_interval_ms() -> u64 {
    50
}
fn default_switch_press_ms() -> u64 {
    500
}
fn default_log_level() -> String {
    "info".to_string()
}

impl BusConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn write_interval(&self) -> Duration {
        Duration::from_millis(self.write_interval_ms)
    }

    pub fn switch_press(&self) -> Duration {
        Duration::from_millis(self.switch_press_ms)
    }
}

impl BridgeConfig {
    /// Flattens the per-kind tables into one descriptor list, in file order
    /// within each kind.
    pub fn devices(&self) -> Vec<DeviceDescriptor> {
        let kinds = [
            (&self.lights, AccessoryKind::Light),
            (&self.switches, AccessoryKind::Switch),
            (&self.scenes, AccessoryKind::Scene),
            (&self.windows, AccessoryKind::Window),
            (&self.blinds, AccessoryKind::Blind),
        ];
        kinds
            .into_iter()
            .flat_map(|(entries, kind)| {
                entries.iter().map(move |entry| DeviceDescriptor {
                    reference: entry.reference.clone(),
                    name: entry.name.clone(),
                    kind,
                })
            })
            .collect()
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads the bridge configuration from `path`.
///
/// There is no usable default for the controller address, so a missing file
/// is an error rather than a fallback.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: BridgeConfig = toml::from_str(&content)?;
    Ok(config)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
