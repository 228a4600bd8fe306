use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::sample::Sample;

/// Samples kept when no other limit is given, one minute at 1 Hz.
pub const DEFAULT_HISTORY_LEN: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleRecord {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub sample: Sample,
}

/// Rolling window of the most recent samples, oldest first.
pub struct SampleHistory {
    entries: VecDeque<SampleRecord>,
    max_entries: usize,
    id_filter: Option<u16>,
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

impl SampleHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
            id_filter: None,
        }
    }

    /// Only render samples with this CAN id. `None` shows everything.
    pub fn set_filter(&mut self, can_id: Option<u16>) {
        self.id_filter = can_id;
    }

    pub fn push(&mut self, sample: Sample) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        self.push_at(timestamp, sample);
    }

    pub fn push_at(&mut self, timestamp: u64, sample: Sample) {
        if self.max_entries == 0 {
            return;
        }
        if self.entries.len() == self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(SampleRecord { timestamp, sample });
    }

    pub fn entries(&self) -> impl Iterator<Item = &SampleRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&SampleRecord> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_text(&self, show_timestamp: bool, show_hex: bool) -> String {
        let mut result = String::new();
        for entry in &self.entries {
            if self.id_filter.is_some_and(|id| id != entry.sample.can_id) {
                continue;
            }

            if show_timestamp {
                let millis = entry.timestamp % 1000;
                let total_secs = entry.timestamp / 1000;
                let hours = (total_secs / 3600) % 24;
                let minutes = (total_secs / 60) % 60;
                let seconds = total_secs % 60;
                result.push_str(&format!("[{hours:02}:{minutes:02}:{seconds:02}.{millis:03}] "));
            }

            let Sample { can_id, raw } = entry.sample;
            if show_hex {
                result.push_str(&format!("0x{can_id:04X} 0x{raw:04X}"));
            } else {
                result.push_str(&format!("{can_id} {:.3} V", entry.sample.voltage()));
            }
            result.push('\n');
        }
        result
    }
}
