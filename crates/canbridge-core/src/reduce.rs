//! Payload reduction: a frame payload collapses into one 16-bit value.
//!
//! Only the first two bytes are ever read. Longer payloads are truncated and
//! the downstream consumer has no way to notice, because the wire format
//! carries no version.

/// Reduces a payload of 0 to 8 bytes.
///
/// - two or more bytes: `payload[0]` is the high byte, `payload[1]` the low byte
/// - one byte: that byte, high byte zero
/// - empty: zero
pub fn reduce_payload(payload: &[u8]) -> u16 {
    match payload {
        [hi, lo, ..] => u16::from_be_bytes([*hi, *lo]),
        [lo] => u16::from(*lo),
        [] => 0,
    }
}
