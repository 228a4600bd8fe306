use std::io;

use thiserror::Error;

/// Failure reported by a bus driver.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("driver in invalid state: {0}")]
    InvalidState(&'static str),
    #[error("frame source disconnected")]
    Disconnected,
    #[error("driver error code {0}")]
    Code(i32),
    #[error("bus I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Why a bounded receive produced no frame.
#[derive(Debug, Error)]
pub enum ReceiveError {
    #[error("receive timed out")]
    Timeout,
    #[error(transparent)]
    Driver(#[from] DriverError),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("serial write failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid bridge configuration: {0}")]
    Config(&'static str),
    #[error("bus driver install failed: {0}")]
    Install(#[source] DriverError),
}
