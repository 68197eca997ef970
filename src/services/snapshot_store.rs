use crate::services::signals::classify;
use crate::types::{Instrument, MarketSnapshot, TradingSignal, INSTRUMENTS};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Per-instrument market snapshots.
///
/// A commit replaces the whole record under the shard write lock and readers
/// clone under the read lock, so a reader never sees a half-applied update.
pub struct SnapshotStore {
    snapshots: DashMap<String, MarketSnapshot>,
    /// Broadcast channel of committed snapshots.
    tx: broadcast::Sender<MarketSnapshot>,
}

impl SnapshotStore {
    /// Create a store with an unset snapshot for every registry instrument.
    pub fn new() -> Arc<Self> {
        let (tx, _) = broadcast::channel(256);
        let snapshots = DashMap::new();
        for instrument in INSTRUMENTS {
            snapshots.insert(instrument.id.to_string(), MarketSnapshot::unset(instrument.id));
        }
        Arc::new(Self { snapshots, tx })
    }

    /// Subscribe to committed snapshots.
    pub fn subscribe(&self) -> broadcast::Receiver<MarketSnapshot> {
        self.tx.subscribe()
    }

    /// Replace the snapshot for `snapshot.instrument` in one write.
    pub fn commit(&self, snapshot: MarketSnapshot) {
        debug!(
            "Committing {} at {:?}",
            snapshot.instrument, snapshot.current_price
        );
        self.snapshots
            .insert(snapshot.instrument.clone(), snapshot.clone());

        // No receivers is fine
        let _ = self.tx.send(snapshot);
    }

    /// Read-only copy of an instrument's snapshot.
    pub fn get_snapshot(&self, instrument: &str) -> Option<MarketSnapshot> {
        self.snapshots.get(instrument).map(|s| s.clone())
    }

    /// Signal for an instrument, computed from its current snapshot.
    pub fn get_signal(&self, instrument: &Instrument) -> Option<TradingSignal> {
        let snapshot = self.get_snapshot(instrument.id)?;
        Some(classify(&snapshot, instrument.pip_multiplier()))
    }

    /// Most recent update across all instruments.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.snapshots.iter().filter_map(|s| s.last_update).max()
    }

    /// Number of instruments with levels available.
    pub fn ready_count(&self) -> usize {
        self.snapshots.iter().filter(|s| s.is_ready()).count()
    }
}
