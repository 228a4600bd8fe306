use std::fmt;

use crate::frame::BusFrame;
use crate::reduce::reduce_payload;

pub const WIRE_PACKET_LEN: usize = 4;

/// The 4-byte packet written to the serial link:
/// `[id_high, id_low, value_high, value_low]`.
///
/// No delimiter, length prefix or checksum; the reader stays aligned by
/// counting bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WirePacket([u8; WIRE_PACKET_LEN]);

impl WirePacket {
    pub fn new(id: u16, value: u16) -> Self {
        let [id_hi, id_lo] = id.to_be_bytes();
        let [value_hi, value_lo] = value.to_be_bytes();
        Self([id_hi, id_lo, value_hi, value_lo])
    }

    pub fn from_frame(frame: &BusFrame) -> Self {
        Self::new(frame.wire_id(), reduce_payload(frame.payload()))
    }

    pub fn from_bytes(bytes: [u8; WIRE_PACKET_LEN]) -> Self {
        Self(bytes)
    }

    pub fn identifier(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    pub fn value(&self) -> u16 {
        u16::from_be_bytes([self.0[2], self.0[3]])
    }

    pub fn as_bytes(&self) -> &[u8; WIRE_PACKET_LEN] {
        &self.0
    }
}

impl AsRef<[u8]> for WirePacket {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<WirePacket> for [u8; WIRE_PACKET_LEN] {
    fn from(packet: WirePacket) -> Self {
        packet.0
    }
}

impl fmt::Display for WirePacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id=0x{:04X} value=0x{:04X}", self.identifier(), self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet_for(id: u16, payload: &[u8]) -> [u8; 4] {
        let frame = BusFrame::standard(id, payload).unwrap();
        WirePacket::from_frame(&frame).into()
    }

    #[test]
    fn two_byte_payload() {
        assert_eq!(packet_for(0x123, &[0x45, 0x67]), [0x01, 0x23, 0x45, 0x67]);
    }

    #[test]
    fn one_byte_payload() {
        assert_eq!(packet_for(0x7FF, &[0x09]), [0x07, 0xFF, 0x00, 0x09]);
    }

    #[test]
    fn empty_payload_still_four_bytes() {
        assert_eq!(packet_for(0x000, &[]), [0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn long_payload_is_truncated() {
        assert_eq!(
            packet_for(0x010, &[0xAB, 0xCD, 0xFF, 0xFF]),
            [0x00, 0x10, 0xAB, 0xCD]
        );
    }

    #[test]
    fn extended_identifier_drops_high_bits() {
        let frame = BusFrame::extended(0x1F12_3456, &[0x01, 0x02]).unwrap();
        let packet = WirePacket::from_frame(&frame);
        assert_eq!(packet.as_bytes(), &[0x34, 0x56, 0x01, 0x02]);
    }

    #[test]
    fn decodes_its_own_layout() {
        for &(id, value) in &[(0u16, 0u16), (0x7FF, 0x0009), (0xFFFF, 0x8001), (0x1234, 0xABCD)] {
            let packet = WirePacket::from_bytes(*WirePacket::new(id, value).as_bytes());
            assert_eq!((packet.identifier(), packet.value()), (id, value));
        }
    }

    #[test]
    fn every_identifier_and_value_round_trips() {
        for n in 0..=u16::MAX {
            for (id, value) in [(n, 0), (0, n), (n, !n), (n, n.rotate_left(5))] {
                let [b0, b1, b2, b3] = *WirePacket::new(id, value).as_bytes();
                assert_eq!(u16::from(b0) << 8 | u16::from(b1), id);
                assert_eq!(u16::from(b2) << 8 | u16::from(b3), value);
            }
        }
    }

    #[test]
    fn extended_identifiers_keep_low_16_bits() {
        for high in 0..=0x1FFFu32 {
            let raw = high << 16 | (high * 0x9E37 & 0xFFFF);
            let frame = BusFrame::extended(raw, &[0x12, 0x34]).unwrap();
            let packet = WirePacket::from_frame(&frame);
            assert_eq!(u32::from(packet.identifier()), raw & 0xFFFF);
            assert_eq!(packet.value(), 0x1234);
        }
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(WirePacket::new(0x123, 0x4567).to_string(), "id=0x0123 value=0x4567");
    }
}
