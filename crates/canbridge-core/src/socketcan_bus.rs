//! Linux SocketCAN driver.
//!
//! The bit rate belongs to the network interface (`ip link set can0 type can
//! bitrate 500000`), so `install` only checks and reports it.

use std::io;
use std::time::Duration;

use socketcan::{CanSocket, Socket, SocketOptions};

use crate::bus::{BusConfig, BusInterface, BusMode};
use crate::error::{DriverError, ReceiveError};
use crate::frame::BusFrame;

/// SO_RCVTIMEO rounds to microseconds and treats zero as "no timeout".
const MIN_READ_TIMEOUT: Duration = Duration::from_micros(1);

fn effective_timeout(timeout: Duration) -> Duration {
    timeout.max(MIN_READ_TIMEOUT)
}

#[derive(Default)]
pub struct SocketCanBus {
    socket: Option<CanSocket>,
    started: bool,
    read_timeout: Option<Duration>,
}

impl SocketCanBus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BusInterface for SocketCanBus {
    fn install(&mut self, config: &BusConfig) -> Result<(), DriverError> {
        if self.socket.is_some() {
            return Err(DriverError::InvalidState("already installed"));
        }
        let socket = CanSocket::open(&config.interface)?;
        socket.set_filter_accept_all()?;
        if config.mode == BusMode::ListenOnly {
            log::warn!(
                "{}: listen-only mode must be set on the interface, the socket cannot enforce it",
                config.interface
            );
        }
        log::info!(
            "{}: opened, expecting {} bit/s configured on the interface",
            config.interface,
            config.bitrate
        );
        self.socket = Some(socket);
        Ok(())
    }

    fn start(&mut self) -> Result<(), DriverError> {
        if self.socket.is_none() {
            return Err(DriverError::InvalidState("not installed"));
        }
        self.started = true;
        Ok(())
    }

    fn receive(&mut self, timeout: Duration) -> Result<BusFrame, ReceiveError> {
        let socket = match (&self.socket, self.started) {
            (Some(socket), true) => socket,
            _ => return Err(DriverError::InvalidState("not started").into()),
        };
        let timeout = effective_timeout(timeout);
        if self.read_timeout != Some(timeout) {
            socket.set_read_timeout(timeout).map_err(DriverError::from)?;
            self.read_timeout = Some(timeout);
        }
        match socket.read_frame() {
            Ok(frame) => BusFrame::from_embedded(&frame).ok_or_else(|| {
                let e = io::Error::new(io::ErrorKind::InvalidData, "frame longer than 8 bytes");
                DriverError::Io(e).into()
            }),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Err(ReceiveError::Timeout)
            }
            Err(e) => Err(DriverError::Io(e).into()),
        }
    }
}
