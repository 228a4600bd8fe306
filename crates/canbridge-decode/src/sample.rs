use canbridge_core::WirePacket;
use serde::{Deserialize, Serialize};

/// One decoded wire packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sample {
    pub can_id: u16,
    pub raw: u16,
}

impl Sample {
    /// The sensor upstream reports millivolts.
    pub fn voltage(&self) -> f64 {
        f64::from(self.raw) / 1000.0
    }

    pub fn to_packet(self) -> WirePacket {
        WirePacket::new(self.can_id, self.raw)
    }
}

impl From<WirePacket> for Sample {
    fn from(packet: WirePacket) -> Self {
        Self {
            can_id: packet.identifier(),
            raw: packet.value(),
        }
    }
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CAN ID = 0x{:04X} ({}), Raw Data = 0x{:04X} ({}), Voltage = {:.3} V",
            self.can_id,
            self.can_id,
            self.raw,
            self.raw,
            self.voltage()
        )
    }
}
