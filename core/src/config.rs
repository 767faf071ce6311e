//! Bridge configuration (`<base_path>/config.toml`)
//!
//! Every section and field is optional in the file; missing values fall back
//! to the defaults below.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use emubridge_shared::{CONFIG_FILE_NAME, DEFAULT_MAX_CONTROLLERS, DeviceOptions, GraphicsConfiguration};

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub input: InputConfig,
    /// Defaults for `device_initialize` when a Rust host passes none
    #[serde(default)]
    pub device: DeviceOptions,
    /// Defaults for `graphics_initialize` when a Rust host passes none
    #[serde(default)]
    pub graphics: GraphicsConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive (default: "info"); `RUST_LOG` takes precedence
    #[serde(default = "default_filter")]
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Number of virtual controller slots (default: 4, range: 1-8)
    #[serde(default = "default_max_controllers")]
    pub max_controllers: usize,
}

fn default_filter() -> String {
    "info".to_string()
}
fn default_max_controllers() -> usize {
    DEFAULT_MAX_CONTROLLERS
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_controllers: default_max_controllers(),
        }
    }
}

/// Platform data directory used when the host supplies no base path.
///
/// On Linux: `~/.local/share/emubridge`
/// On macOS: `~/Library/Application Support/org.emubridge.EmuBridge`
///
/// Returns `None` if the home directory cannot be determined.
pub fn default_base_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "emubridge", "EmuBridge")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Path of the config file under `base_path`
pub fn config_path(base_path: &Path) -> PathBuf {
    base_path.join(CONFIG_FILE_NAME)
}

/// Load `config.toml` from `base_path`.
///
/// A missing file yields the defaults; an unreadable or malformed file is an
/// error.
pub fn load(base_path: &Path) -> Result<BridgeConfig> {
    let path = config_path(base_path);
    if !path.exists() {
        return Ok(BridgeConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Write `config.toml` under `base_path`, creating the directory if needed.
pub fn save(base_path: &Path, config: &BridgeConfig) -> Result<()> {
    std::fs::create_dir_all(base_path)
        .with_context(|| format!("creating {}", base_path.display()))?;
    let content = toml::to_string_pretty(config).context("serializing config")?;
    let path = config_path(base_path);
    std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))
}
