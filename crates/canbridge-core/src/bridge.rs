//! The bridge loop: one bus frame in, one wire packet out.

use std::thread;

use log::{debug, error, info, warn};

use crate::bus::BusInterface;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, DriverError, ReceiveError, TransportError};
use crate::frame::BusFrame;
use crate::packet::WirePacket;
use crate::transport::SerialTransport;

/// What a single iteration did.
#[derive(Debug)]
pub enum Iteration {
    Forwarded(WirePacket),
    Timeout,
    DriverError(DriverError),
    /// The packet was dropped, possibly after part of it reached the wire.
    WriteFailed { packet: WirePacket, error: TransportError },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub frames_received: u64,
    pub packets_written: u64,
    pub timeouts: u64,
    pub driver_errors: u64,
    pub write_failures: u64,
}

/// A running bridge. Only [`Bridge::init`] creates one, after the bus driver
/// was installed.
pub struct Bridge<B, T> {
    bus: B,
    transport: T,
    config: BridgeConfig,
    degraded: bool,
    stats: BridgeStats,
}

impl<B: BusInterface, T: SerialTransport> Bridge<B, T> {
    /// Installs and starts the bus driver.
    ///
    /// An install failure is final: the handles are dropped and there is no
    /// retry. A start failure is logged and the bridge runs without data.
    /// An invalid configuration is refused before the driver is touched.
    pub fn init(mut bus: B, transport: T, config: BridgeConfig) -> Result<Self, BridgeError> {
        config.validate()?;
        info!(
            "installing bus driver on {} ({} bit/s, {:?})",
            config.bus.interface, config.bus.bitrate, config.bus.mode
        );
        if let Err(e) = bus.install(&config.bus) {
            error!("failed to install bus driver: {e}");
            return Err(BridgeError::Install(e));
        }

        let degraded = match bus.start() {
            Ok(()) => {
                info!("bus driver started");
                false
            }
            Err(e) => {
                error!("failed to start bus driver: {e}; no frames will be forwarded");
                true
            }
        };

        Ok(Self {
            bus,
            transport,
            config,
            degraded,
            stats: BridgeStats::default(),
        })
    }

    /// Runs one iteration: acquire, reduce, encode, write.
    pub fn step(&mut self) -> Iteration {
        let frame = match self.acquire() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                self.stats.timeouts += 1;
                return Iteration::Timeout;
            }
            Err(e) => {
                self.stats.driver_errors += 1;
                warn!("failed to receive bus frame: {e}");
                return Iteration::DriverError(e);
            }
        };
        self.stats.frames_received += 1;
        debug!(
            "frame id=0x{:X} len={} data={}",
            frame.raw_id(),
            frame.len(),
            hex::encode_upper(frame.payload())
        );

        let packet = WirePacket::from_frame(&frame);
        match self.transport.write(packet.as_ref()) {
            Ok(()) => {
                self.stats.packets_written += 1;
                debug!("sent {packet}");
                Iteration::Forwarded(packet)
            }
            Err(error) => {
                self.stats.write_failures += 1;
                warn!("dropped {packet}: {error}");
                Iteration::WriteFailed { packet, error }
            }
        }
    }

    /// Loops forever. The only way out is a reset of the device or process.
    pub fn run(mut self) -> ! {
        info!(
            "bridging frames to {} (receive timeout {:?})",
            self.config.serial.port_name, self.config.receive_timeout
        );
        loop {
            self.step();
            if let Some(delay) = self.config.pacing_delay {
                thread::sleep(delay);
            }
        }
    }

    /// A timeout is not an error, just no frame this time.
    fn acquire(&mut self) -> Result<Option<BusFrame>, DriverError> {
        match self.bus.receive(self.config.receive_timeout) {
            Ok(frame) => Ok(Some(frame)),
            Err(ReceiveError::Timeout) => Ok(None),
            Err(ReceiveError::Driver(e)) => Err(e),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_parts(self) -> (B, T) {
        (self.bus, self.transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusConfig;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Replays scripted receive outcomes, then times out forever.
    #[derive(Default)]
    struct ScriptedBus {
        script: VecDeque<Result<BusFrame, ReceiveError>>,
        fail_install: bool,
        fail_start: bool,
        installs: usize,
    }

    impl BusInterface for ScriptedBus {
        fn install(&mut self, _config: &BusConfig) -> Result<(), DriverError> {
            self.installs += 1;
            if self.fail_install {
                Err(DriverError::Code(0x103))
            } else {
                Ok(())
            }
        }

        fn start(&mut self) -> Result<(), DriverError> {
            if self.fail_start {
                Err(DriverError::InvalidState("bus off"))
            } else {
                Ok(())
            }
        }

        fn receive(&mut self, _timeout: Duration) -> Result<BusFrame, ReceiveError> {
            self.script.pop_front().unwrap_or(Err(ReceiveError::Timeout))
        }
    }

    fn bridge_with(script: Vec<Result<BusFrame, ReceiveError>>) -> Bridge<ScriptedBus, Vec<u8>> {
        let bus = ScriptedBus {
            script: script.into(),
            ..Default::default()
        };
        Bridge::init(bus, Vec::new(), BridgeConfig::default()).unwrap()
    }

    #[test]
    fn forwards_a_frame() {
        let mut bridge = bridge_with(vec![Ok(BusFrame::standard(0x123, &[0x45, 0x67]).unwrap())]);
        match bridge.step() {
            Iteration::Forwarded(packet) => assert_eq!(packet.as_bytes(), &[0x01, 0x23, 0x45, 0x67]),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(bridge.transport(), &vec![0x01, 0x23, 0x45, 0x67]);
    }

    #[test]
    fn timeout_writes_nothing() {
        let mut bridge = bridge_with(vec![Err(ReceiveError::Timeout)]);
        assert!(matches!(bridge.step(), Iteration::Timeout));
        assert!(bridge.transport().is_empty());
        assert_eq!(bridge.stats().timeouts, 1);
    }

    #[test]
    fn driver_error_is_not_fatal() {
        let mut bridge = bridge_with(vec![
            Err(DriverError::Code(-1).into()),
            Ok(BusFrame::standard(0x7FF, &[0x09]).unwrap()),
        ]);
        assert!(matches!(bridge.step(), Iteration::DriverError(DriverError::Code(-1))));
        assert!(bridge.transport().is_empty());
        assert!(matches!(bridge.step(), Iteration::Forwarded(_)));
        assert_eq!(bridge.transport(), &vec![0x07, 0xFF, 0x00, 0x09]);
    }

    #[test]
    fn install_failure_is_fatal() {
        let bus = ScriptedBus {
            fail_install: true,
            ..Default::default()
        };
        let result = Bridge::init(bus, Vec::new(), BridgeConfig::default());
        assert!(matches!(result, Err(BridgeError::Install(DriverError::Code(0x103)))));
    }

    #[test]
    fn zero_timeout_is_refused_before_install() {
        let config = BridgeConfig {
            receive_timeout: Duration::ZERO,
            ..Default::default()
        };
        match Bridge::init(ScriptedBus::default(), Vec::new(), config) {
            Err(BridgeError::Config(_)) => {}
            Err(e) => panic!("unexpected error {e}"),
            Ok(_) => panic!("zero timeout accepted"),
        }
    }

    #[test]
    fn start_failure_degrades() {
        let bus = ScriptedBus {
            fail_start: true,
            ..Default::default()
        };
        let mut bridge = Bridge::init(bus, Vec::new(), BridgeConfig::default()).unwrap();
        assert!(bridge.is_degraded());
        assert_eq!(bridge.bus().installs, 1);
        assert!(matches!(bridge.step(), Iteration::Timeout));
    }

    #[test]
    fn stats_count_each_outcome() {
        let mut bridge = bridge_with(vec![
            Ok(BusFrame::standard(1, &[]).unwrap()),
            Err(ReceiveError::Timeout),
            Err(DriverError::Disconnected.into()),
            Ok(BusFrame::standard(2, &[1, 2, 3]).unwrap()),
        ]);
        for _ in 0..4 {
            bridge.step();
        }
        assert_eq!(
            bridge.stats(),
            BridgeStats {
                frames_received: 2,
                packets_written: 2,
                timeouts: 1,
                driver_errors: 1,
                write_failures: 0,
            }
        );
    }
}
