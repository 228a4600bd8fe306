use serialport::{SerialPort, SerialPortInfo};
use std::io::Write;
use std::time::Duration;

use crate::error::TransportError;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Byte sink on the serial side of the bridge. Writes are fire-and-forget:
/// the bridge never retries.
///
/// A failed write may still have put part of the packet on the wire. The
/// link has no framing, so the reader then stays misaligned until it
/// resynchronises on its own.
pub trait SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
}

impl<T: SerialTransport + ?Sized> SerialTransport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).write(bytes)
    }
}

/// In-memory sink, everything written is appended.
impl SerialTransport for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PortInfo {
    pub port_name: String,
    pub port_type: String,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let (port_type, vid, pid, serial_number, manufacturer, product) = match &info.port_type {
            serialport::SerialPortType::UsbPort(usb) => (
                "USB".to_string(),
                Some(usb.vid),
                Some(usb.pid),
                usb.serial_number.clone(),
                usb.manufacturer.clone(),
                usb.product.clone(),
            ),
            serialport::SerialPortType::PciPort => ("PCI".to_string(), None, None, None, None, None),
            serialport::SerialPortType::BluetoothPort => ("Bluetooth".to_string(), None, None, None, None, None),
            serialport::SerialPortType::Unknown => ("Unknown".to_string(), None, None, None, None, None),
        };
        Self {
            port_name: info.port_name,
            port_type,
            vid,
            pid,
            serial_number,
            manufacturer,
            product,
        }
    }
}

impl std::fmt::Display for PortInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.vid, self.pid) {
            (Some(vid), Some(pid)) => write!(f, "{} ({:04X}:{:04X})", self.port_name, vid, pid)?,
            _ => write!(f, "{} [{}]", self.port_name, self.port_type)?,
        }
        let details: Vec<&str> = [&self.manufacturer, &self.product]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .collect();
        if !details.is_empty() {
            write!(f, " {}", details.join(" "))?;
        }
        if let Some(serial) = &self.serial_number {
            write!(f, " s/n {serial}")?;
        }
        Ok(())
    }
}

/// Serial link parameters. Defaults to 115200 8N1 without flow control.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: serialport::DataBits,
    pub parity: serialport::Parity,
    pub stop_bits: serialport::StopBits,
    pub flow_control: serialport::FlowControl,
    /// Upper bound on a single blocking read or write.
    pub timeout: Duration,
}

impl SerialConfig {
    /// Time one character occupies on the line: start bit, data, parity, stop.
    pub fn char_time(&self) -> Duration {
        let data = match self.data_bits {
            serialport::DataBits::Five => 5,
            serialport::DataBits::Six => 6,
            serialport::DataBits::Seven => 7,
            serialport::DataBits::Eight => 8,
        };
        let parity = match self.parity {
            serialport::Parity::None => 0,
            serialport::Parity::Odd | serialport::Parity::Even => 1,
        };
        let stop = match self.stop_bits {
            serialport::StopBits::One => 1,
            serialport::StopBits::Two => 2,
        };
        let bits: u64 = 1 + data + parity + stop;
        Duration::from_nanos(bits * 1_000_000_000 / u64::from(self.baud_rate.max(1)))
    }

    /// Whether a single write of `len` bytes fits inside the port timeout.
    pub fn fits_timeout(&self, len: usize) -> bool {
        self.char_time() * len as u32 <= self.timeout
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: serialport::DataBits::Eight,
            parity: serialport::Parity::None,
            stop_bits: serialport::StopBits::One,
            flow_control: serialport::FlowControl::None,
            timeout: Duration::from_millis(1000),
        }
    }
}

pub fn list_ports() -> Vec<PortInfo> {
    serialport::available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(PortInfo::from)
        .collect()
}

/// Opens the port described by `cfg`. Also used by readers on the host side.
pub fn open_port(cfg: &SerialConfig) -> Result<Box<dyn SerialPort>, TransportError> {
    let port = serialport::new(&cfg.port_name, cfg.baud_rate)
        .data_bits(cfg.data_bits)
        .parity(cfg.parity)
        .stop_bits(cfg.stop_bits)
        .flow_control(cfg.flow_control)
        .timeout(cfg.timeout)
        .open()?;
    Ok(port)
}

/// Serial transport backed by a real port.
pub struct SerialPortTransport {
    cfg: SerialConfig,
    port: Box<dyn SerialPort>,
}

impl SerialPortTransport {
    pub fn open(cfg: SerialConfig) -> Result<Self, TransportError> {
        if !cfg.fits_timeout(crate::packet::WIRE_PACKET_LEN) {
            log::warn!(
                "{}: timeout {:?} is shorter than one packet at {} baud, writes may be cut short",
                cfg.port_name,
                cfg.timeout,
                cfg.baud_rate
            );
        }
        let port = open_port(&cfg)?;
        log::info!("{}: opened at {} baud", cfg.port_name, cfg.baud_rate);
        Ok(Self { cfg, port })
    }

    pub fn config(&self) -> &SerialConfig {
        &self.cfg
    }
}

impl SerialTransport for SerialPortTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(bytes)?;
        Ok(())
    }
}
