//! Core of the CAN-to-serial bridge: frames, payload reduction, wire packets,
//! bus and serial seams, and the bridge loop.

pub mod bridge;
pub mod bus;
pub mod channel_bus;
pub mod config;
pub mod error;
pub mod frame;
pub mod packet;
pub mod reduce;
#[cfg(all(target_os = "linux", feature = "socketcan"))]
pub mod socketcan_bus;
pub mod transport;

pub use bridge::{Bridge, BridgeStats, Iteration};
pub use bus::{AcceptanceFilter, BusConfig, BusInterface, BusMode};
pub use channel_bus::{channel_bus, ChannelBus, FrameInjector};
pub use config::BridgeConfig;
pub use error::{BridgeError, DriverError, ReceiveError, TransportError};
pub use frame::BusFrame;
pub use packet::{WirePacket, WIRE_PACKET_LEN};
pub use reduce::reduce_payload;
#[cfg(all(target_os = "linux", feature = "socketcan"))]
pub use socketcan_bus::SocketCanBus;
pub use transport::{list_ports, open_port, PortInfo, SerialConfig, SerialPortTransport, SerialTransport};
