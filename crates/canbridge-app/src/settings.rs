use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use canbridge_core::{BridgeConfig, BusConfig, BusMode, SerialConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid settings in {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bridge: BridgeSettings,
    pub listen: ListenSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    pub can_interface: String,
    pub bitrate: u32,
    pub listen_only: bool,
    pub serial_port: String,
    pub baud_rate: u32,
    pub receive_timeout_ms: u64,
    pub pacing_delay_ms: Option<u64>,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        let bus = BusConfig::default();
        let config = BridgeConfig::default();
        Self {
            can_interface: bus.interface,
            bitrate: bus.bitrate,
            listen_only: false,
            serial_port: "/dev/ttyS0".to_string(),
            baud_rate: config.serial.baud_rate,
            receive_timeout_ms: config.receive_timeout.as_millis() as u64,
            pacing_delay_ms: config.pacing_delay.map(|d| d.as_millis() as u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenSettings {
    pub serial_port: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    /// `host:port` to copy every raw packet to over UDP.
    pub udp_forward: Option<String>,
    pub history_len: usize,
    /// Seconds between history reports in the log. 0 turns reports off.
    pub report_interval_s: u64,
    /// Report raw values in hex instead of volts.
    pub report_hex: bool,
    /// Only report samples from this CAN id.
    pub report_can_id: Option<u16>,
    /// Rewritten with the history as JSON at every report.
    pub history_file: Option<PathBuf>,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            serial_port: "/dev/ttyTHS1".to_string(),
            baud_rate: canbridge_core::transport::DEFAULT_BAUD_RATE,
            read_timeout_ms: 1000,
            udp_forward: None,
            history_len: canbridge_decode::DEFAULT_HISTORY_LEN,
            report_interval_s: 60,
            report_hex: false,
            report_can_id: None,
            history_file: None,
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("canbridge").join("settings.json"))
    }

    /// Loads `path`, or the default location when `path` is `None`.
    ///
    /// A missing file at the default location means default settings; an
    /// explicit path has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::read(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => {
                    log::debug!("no settings file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    fn read(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("loaded settings from {}", path.display());
        Ok(settings)
    }
}

impl BridgeSettings {
    pub fn to_config(&self) -> BridgeConfig {
        BridgeConfig {
            receive_timeout: Duration::from_millis(self.receive_timeout_ms),
            pacing_delay: self.pacing_delay_ms.map(Duration::from_millis),
            bus: BusConfig {
                interface: self.can_interface.clone(),
                bitrate: self.bitrate,
                mode: if self.listen_only { BusMode::ListenOnly } else { BusMode::Normal },
                ..Default::default()
            },
            serial: SerialConfig {
                port_name: self.serial_port.clone(),
                baud_rate: self.baud_rate,
                ..Default::default()
            },
        }
    }
}

impl ListenSettings {
    pub fn report_interval(&self) -> Option<Duration> {
        (self.report_interval_s > 0).then(|| Duration::from_secs(self.report_interval_s))
    }

    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig {
            port_name: self.serial_port.clone(),
            baud_rate: self.baud_rate,
            timeout: Duration::from_millis(self.read_timeout_ms),
            ..Default::default()
        }
    }
}
