use std::time::Duration;

use crate::bus::BusConfig;
use crate::error::BridgeError;
use crate::transport::SerialConfig;

pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(1000);
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Longest a single iteration waits for a frame.
    pub receive_timeout: Duration,
    /// Sleep after every iteration. `None` runs iterations back to back.
    pub pacing_delay: Option<Duration>,
    pub bus: BusConfig,
    pub serial: SerialConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            pacing_delay: Some(DEFAULT_PACING_DELAY),
            bus: BusConfig::default(),
            serial: SerialConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// A zero receive timeout is rejected: several drivers read it as
    /// "block forever".
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.receive_timeout.is_zero() {
            return Err(BridgeError::Config("receive timeout must be non-zero"));
        }
        Ok(())
    }
}
