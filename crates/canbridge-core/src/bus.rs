use std::time::Duration;

use crate::error::{DriverError, ReceiveError};
use crate::frame::BusFrame;

pub const DEFAULT_BITRATE: u32 = 500_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusMode {
    /// Acknowledging participant. The bridge still never transmits.
    Normal,
    ListenOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceFilter {
    AcceptAll,
}

/// Bus parameters resolved once, before the bridge starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    /// Interface name, for drivers that address the controller by name.
    pub interface: String,
    pub bitrate: u32,
    pub mode: BusMode,
    pub filter: AcceptanceFilter,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            interface: "can0".to_string(),
            bitrate: DEFAULT_BITRATE,
            mode: BusMode::Normal,
            filter: AcceptanceFilter::AcceptAll,
        }
    }
}

/// Receive side of a CAN controller driver.
pub trait BusInterface {
    fn install(&mut self, config: &BusConfig) -> Result<(), DriverError>;

    fn start(&mut self) -> Result<(), DriverError>;

    /// Blocks until a frame arrives or `timeout` elapses.
    fn receive(&mut self, timeout: Duration) -> Result<BusFrame, ReceiveError>;
}

impl<B: BusInterface + ?Sized> BusInterface for Box<B> {
    fn install(&mut self, config: &BusConfig) -> Result<(), DriverError> {
        (**self).install(config)
    }

    fn start(&mut self) -> Result<(), DriverError> {
        (**self).start()
    }

    fn receive(&mut self, timeout: Duration) -> Result<BusFrame, ReceiveError> {
        (**self).receive(timeout)
    }
}
