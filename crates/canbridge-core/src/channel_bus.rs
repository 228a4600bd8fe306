//! A bus fed from inside the process.
//!
//! Frames pushed through a [`FrameInjector`] come out of [`ChannelBus::receive`]
//! in order. Dropping every injector makes the bus report a driver error.

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, SendError, Sender};

use crate::bus::{BusConfig, BusInterface};
use crate::error::{DriverError, ReceiveError};
use crate::frame::BusFrame;

#[derive(Debug, Clone)]
pub struct FrameInjector {
    tx: Sender<BusFrame>,
}

impl FrameInjector {
    /// Hands back the frame if the bus was dropped.
    pub fn send(&self, frame: BusFrame) -> Result<(), BusFrame> {
        self.tx.send(frame).map_err(|SendError(frame)| frame)
    }
}

#[derive(Debug)]
pub struct ChannelBus {
    rx: Receiver<BusFrame>,
    installed: bool,
    started: bool,
}

pub fn channel_bus() -> (FrameInjector, ChannelBus) {
    let (tx, rx) = unbounded::<BusFrame>();
    (FrameInjector { tx }, ChannelBus::new(rx))
}

impl ChannelBus {
    fn new(rx: Receiver<BusFrame>) -> Self {
        Self {
            rx,
            installed: false,
            started: false,
        }
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl BusInterface for ChannelBus {
    fn install(&mut self, config: &BusConfig) -> Result<(), DriverError> {
        if self.installed {
            return Err(DriverError::InvalidState("already installed"));
        }
        log::debug!("channel bus installed ({} bit/s nominal)", config.bitrate);
        self.installed = true;
        Ok(())
    }

    fn start(&mut self) -> Result<(), DriverError> {
        if !self.installed {
            return Err(DriverError::InvalidState("not installed"));
        }
        self.started = true;
        Ok(())
    }

    fn receive(&mut self, timeout: Duration) -> Result<BusFrame, ReceiveError> {
        if !self.started {
            return Err(DriverError::InvalidState("not started").into());
        }
        match self.rx.recv_timeout(timeout) {
            Ok(frame) => Ok(frame),
            Err(RecvTimeoutError::Timeout) => Err(ReceiveError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(DriverError::Disconnected.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn started() -> (FrameInjector, ChannelBus) {
        let (injector, mut bus) = channel_bus();
        bus.install(&BusConfig::default()).unwrap();
        bus.start().unwrap();
        (injector, bus)
    }

    #[test]
    fn delivers_in_order() {
        let (injector, mut bus) = started();
        for id in 1..=3u16 {
            injector.send(BusFrame::standard(id, &[id as u8]).unwrap()).unwrap();
        }
        assert_eq!(bus.pending(), 3);
        for id in 1..=3u16 {
            let frame = bus.receive(Duration::from_millis(10)).unwrap();
            assert_eq!(frame.raw_id(), u32::from(id));
        }
    }

    #[test]
    fn times_out_when_idle() {
        let (_injector, mut bus) = started();
        let begin = Instant::now();
        let result = bus.receive(Duration::from_millis(20));
        assert!(matches!(result, Err(ReceiveError::Timeout)));
        assert!(begin.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn disconnected_injector_is_a_driver_error() {
        let (injector, mut bus) = started();
        drop(injector);
        let result = bus.receive(Duration::from_millis(10));
        assert!(matches!(
            result,
            Err(ReceiveError::Driver(DriverError::Disconnected))
        ));
    }

    #[test]
    fn receive_before_start_is_rejected() {
        let (_injector, mut bus) = channel_bus();
        bus.install(&BusConfig::default()).unwrap();
        assert!(matches!(
            bus.receive(Duration::from_millis(1)),
            Err(ReceiveError::Driver(DriverError::InvalidState(_)))
        ));
    }

    #[test]
    fn start_requires_install() {
        let (_injector, mut bus) = channel_bus();
        assert!(bus.start().is_err());
        bus.install(&BusConfig::default()).unwrap();
        assert!(bus.install(&BusConfig::default()).is_err());
    }
}
