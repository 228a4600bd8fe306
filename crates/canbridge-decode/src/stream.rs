//! Byte-count framing for the serial link.
//!
//! Every 4 bytes form a packet. There is nothing to resynchronise on: once a
//! byte is lost, every following packet is shifted until [`PacketDecoder::reset`]
//! is called at a known packet boundary.

use canbridge_core::{WirePacket, WIRE_PACKET_LEN};

use crate::sample::Sample;

#[derive(Debug, Default, Clone)]
pub struct PacketDecoder {
    partial: [u8; WIRE_PACKET_LEN],
    filled: usize,
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds bytes as they come off the port and returns every completed sample.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Sample> {
        let mut samples = Vec::with_capacity((self.filled + bytes.len()) / WIRE_PACKET_LEN);
        for &byte in bytes {
            self.partial[self.filled] = byte;
            self.filled += 1;
            if self.filled == WIRE_PACKET_LEN {
                samples.push(Sample::from(WirePacket::from_bytes(self.partial)));
                self.filled = 0;
            }
        }
        samples
    }

    /// Bytes held back waiting for the rest of their packet.
    pub fn pending(&self) -> usize {
        self.filled
    }

    /// Drops any partial packet.
    pub fn reset(&mut self) {
        if self.filled > 0 {
            log::debug!("discarding {} partial packet bytes", self.filled);
        }
        self.filled = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_packets() {
        let mut decoder = PacketDecoder::new();
        let samples = decoder.push(&[0x01, 0x23, 0x45, 0x67, 0x07, 0xFF, 0x00, 0x09]);
        assert_eq!(
            samples,
            vec![
                Sample { can_id: 0x123, raw: 0x4567 },
                Sample { can_id: 0x7FF, raw: 0x0009 },
            ]
        );
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn split_across_reads() {
        let mut decoder = PacketDecoder::new();
        assert!(decoder.push(&[0x01]).is_empty());
        assert!(decoder.push(&[0x23, 0x45]).is_empty());
        assert_eq!(decoder.pending(), 3);
        assert_eq!(decoder.push(&[0x67, 0x00]), vec![Sample { can_id: 0x123, raw: 0x4567 }]);
        assert_eq!(decoder.pending(), 1);
    }

    #[test]
    fn reset_discards_partial() {
        let mut decoder = PacketDecoder::new();
        decoder.push(&[0xAA, 0xBB]);
        decoder.reset();
        assert_eq!(decoder.pending(), 0);
        assert_eq!(decoder.push(&[0, 1, 0, 2]), vec![Sample { can_id: 1, raw: 2 }]);
    }
}
