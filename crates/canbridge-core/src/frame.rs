use embedded_can::{ExtendedId, Id, StandardId};

/// Largest payload a classic CAN frame carries.
pub const MAX_PAYLOAD_LEN: usize = 8;

/// A classic CAN frame as handed over by the bus driver.
///
/// Remote frames keep their length code but carry no payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFrame {
    id: Id,
    data: [u8; MAX_PAYLOAD_LEN],
    len: u8,
    remote: bool,
}

impl BusFrame {
    /// Data frame with an 11-bit identifier.
    pub fn standard(id: u16, data: &[u8]) -> Option<Self> {
        <Self as embedded_can::Frame>::new(StandardId::new(id)?, data)
    }

    /// Data frame with a 29-bit identifier.
    pub fn extended(id: u32, data: &[u8]) -> Option<Self> {
        <Self as embedded_can::Frame>::new(ExtendedId::new(id)?, data)
    }

    /// Copies any `embedded-can` frame. Returns `None` for frames longer than
    /// a classic frame.
    pub fn from_embedded<F: embedded_can::Frame>(frame: &F) -> Option<Self> {
        if frame.is_remote_frame() {
            <Self as embedded_can::Frame>::new_remote(frame.id(), frame.dlc())
        } else {
            <Self as embedded_can::Frame>::new(frame.id(), frame.data())
        }
    }

    /// Raw identifier, 11 or 29 bits wide.
    pub fn raw_id(&self) -> u32 {
        match self.id {
            Id::Standard(id) => u32::from(id.as_raw()),
            Id::Extended(id) => id.as_raw(),
        }
    }

    /// The identifier as it travels downstream: the low 16 bits only.
    pub fn wire_id(&self) -> u16 {
        (self.raw_id() & 0xFFFF) as u16
    }

    pub fn payload(&self) -> &[u8] {
        if self.remote {
            &[]
        } else {
            &self.data[..usize::from(self.len)]
        }
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl embedded_can::Frame for BusFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > MAX_PAYLOAD_LEN {
            return None;
        }
        let mut buf = [0u8; MAX_PAYLOAD_LEN];
        buf[..data.len()].copy_from_slice(data);
        Some(Self {
            id: id.into(),
            data: buf,
            len: data.len() as u8,
            remote: false,
        })
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > MAX_PAYLOAD_LEN {
            return None;
        }
        Some(Self {
            id: id.into(),
            data: [0u8; MAX_PAYLOAD_LEN],
            len: dlc as u8,
            remote: true,
        })
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        self.remote
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        usize::from(self.len)
    }

    fn data(&self) -> &[u8] {
        self.payload()
    }
}
