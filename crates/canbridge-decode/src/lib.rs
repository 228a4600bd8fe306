//! Host side of the serial link: reassembles wire packets into samples.

pub mod history;
pub mod sample;
pub mod stream;

pub use history::{SampleHistory, SampleRecord, DEFAULT_HISTORY_LEN};
pub use sample::Sample;
pub use stream::PacketDecoder;
