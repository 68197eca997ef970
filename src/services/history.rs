use crate::types::INSTRUMENTS;
use dashmap::DashMap;
use std::collections::VecDeque;

/// Default number of samples retained per instrument.
pub const DEFAULT_HISTORY_CAP: usize = 30;

/// Bounded per-instrument price window, oldest sample first.
pub struct PriceHistory {
    buffers: DashMap<String, VecDeque<f64>>,
    cap: usize,
}

impl PriceHistory {
    /// Create a history with an empty buffer for every registry instrument.
    pub fn new(cap: usize) -> Self {
        let buffers = DashMap::new();
        for instrument in INSTRUMENTS {
            buffers.insert(instrument.id.to_string(), VecDeque::with_capacity(cap));
        }
        Self { buffers, cap }
    }

    /// Push a sample, evicting the oldest ones past the cap.
    pub fn append(&self, instrument: &str, price: f64) {
        let mut buffer = self
            .buffers
            .entry(instrument.to_string())
            .or_insert_with(|| VecDeque::with_capacity(self.cap));

        buffer.push_back(price);
        while buffer.len() > self.cap {
            buffer.pop_front();
        }
    }

    /// Current samples for an instrument, oldest first.
    pub fn as_sequence(&self, instrument: &str) -> Vec<f64> {
        self.buffers
            .get(instrument)
            .map(|b| b.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, instrument: &str) -> usize {
        self.buffers.get(instrument).map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, instrument: &str) -> bool {
        self.len(instrument) == 0
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}
