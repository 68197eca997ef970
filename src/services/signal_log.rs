//! Logs signal transitions as snapshots are committed.

use crate::services::signals::classify;
use crate::services::SnapshotStore;
use crate::types::{Instrument, MarketSnapshot, SignalLabel};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Last label seen per instrument.
#[derive(Debug, Default)]
pub struct SignalTracker {
    last: HashMap<String, SignalLabel>,
}

impl SignalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the label for `snapshot`; returns `(previous, current)` when it
    /// changed. Unknown instruments are ignored.
    pub fn observe(
        &mut self,
        snapshot: &MarketSnapshot,
    ) -> Option<(Option<SignalLabel>, SignalLabel)> {
        let instrument = Instrument::lookup(&snapshot.instrument)?;
        let label = classify(snapshot, instrument.pip_multiplier()).label;

        let previous = self.last.insert(instrument.id.to_string(), label);
        if previous == Some(label) {
            None
        } else {
            Some((previous, label))
        }
    }

    pub fn current(&self, instrument: &str) -> Option<SignalLabel> {
        self.last.get(instrument).copied()
    }
}

/// Follow the store's commit channel and log every signal change.
pub fn spawn(store: &SnapshotStore) -> JoinHandle<()> {
    let mut rx = store.subscribe();

    tokio::spawn(async move {
        let mut tracker = SignalTracker::new();
        info!("Signal log listening for committed snapshots");

        loop {
            match rx.recv().await {
                Ok(snapshot) => match tracker.observe(&snapshot) {
                    Some((Some(from), to)) => {
                        info!("{} signal {} -> {}", snapshot.instrument, from, to)
                    }
                    Some((None, to)) => info!("{} signal {}", snapshot.instrument, to),
                    None => debug!("{} signal unchanged", snapshot.instrument),
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Signal log lagged by {} snapshots", n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Snapshot channel closed");
                    break;
                }
            }
        }
    })
}
