//! Subscription Store
//!
//! Tracks which chat users follow which instruments and whether they want
//! alerts.
//!
//! Storage:
//! - DashMap: in-memory working set
//! - JSON file: `{ "<chat_id>": { "pairs": [...], "alerts": bool } }`,
//!   rewritten after every mutation via a temp file and rename

use crate::services::scheduler::ActiveInstruments;
use crate::types::{Instrument, Subscriber, INSTRUMENTS};
use anyhow::Context;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

/// Subscriber registry keyed by chat id.
pub struct SubscriptionStore {
    subscribers: DashMap<i64, Subscriber>,
    /// Persistence file, if any.
    path: Option<PathBuf>,
    /// Held across snapshot and write so saves land in order.
    save_lock: Mutex<()>,
}

impl SubscriptionStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self {
            subscribers: DashMap::new(),
            path: None,
            save_lock: Mutex::new(()),
        })
    }

    /// Load subscribers from `path`.
    ///
    /// A missing file starts an empty store; an unreadable one is logged and
    /// also starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Arc<Self> {
        let path = path.into();
        let subscribers = DashMap::new();

        match read_file(&path) {
            Ok(Some(loaded)) => {
                info!("Loaded {} subscribers from {}", loaded.len(), path.display());
                for (chat_id, subscriber) in loaded {
                    subscribers.insert(chat_id, subscriber);
                }
            }
            Ok(None) => info!("No subscriber file at {}, starting empty", path.display()),
            Err(e) => error!("Failed to load subscribers from {}: {:#}", path.display(), e),
        }

        Arc::new(Self {
            subscribers,
            path: Some(path),
            save_lock: Mutex::new(()),
        })
    }

    /// Write all subscribers to the persistence file.
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }

        let _guard = self.save_lock.lock().unwrap_or_else(|e| e.into_inner());

        let snapshot: BTreeMap<i64, Subscriber> = self
            .subscribers
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        let json = serde_json::to_string_pretty(&snapshot)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("replacing {}", path.display()))?;

        debug!("Saved {} subscribers", snapshot.len());
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            error!("Failed to save subscribers: {:#}", e);
        }
    }

    pub fn get(&self, chat_id: i64) -> Option<Subscriber> {
        self.subscribers.get(&chat_id).map(|s| s.clone())
    }

    /// Register a chat if it is new; returns its record.
    pub fn register(&self, chat_id: i64) -> Subscriber {
        if let Some(existing) = self.get(chat_id) {
            return existing;
        }

        let subscriber = self.subscribers.entry(chat_id).or_default().clone();
        self.persist();
        subscriber
    }

    /// Follow `instrument` if not followed yet, otherwise unfollow it.
    /// Returns whether the instrument is followed afterwards.
    pub fn toggle_pair(&self, chat_id: i64, instrument: &Instrument) -> bool {
        let followed = {
            let mut entry = self.subscribers.entry(chat_id).or_default();
            let pairs = &mut entry.pairs;
            if let Some(pos) = pairs.iter().position(|p| p == instrument.id) {
                pairs.remove(pos);
                false
            } else {
                pairs.push(instrument.id.to_string());
                true
            }
        };

        self.persist();
        followed
    }

    /// Enable or disable alerts for a chat.
    ///
    /// Enabling registers an unknown chat; disabling only touches existing
    /// ones and returns `None` for an unknown chat.
    pub fn set_alerts(&self, chat_id: i64, enabled: bool) -> Option<Subscriber> {
        let subscriber = if enabled {
            let mut entry = self.subscribers.entry(chat_id).or_default();
            entry.alerts = true;
            entry.clone()
        } else {
            let mut existing = self.subscribers.get_mut(&chat_id)?;
            existing.alerts = false;
            existing.clone()
        };

        self.persist();
        Some(subscriber)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Subscribers following at least one instrument.
    pub fn with_pairs_count(&self) -> usize {
        self.subscribers.iter().filter(|s| !s.pairs.is_empty()).count()
    }
}

impl ActiveInstruments for SubscriptionStore {
    /// Instruments followed by anyone, in registry order.
    fn active_instruments(&self) -> Vec<&'static Instrument> {
        INSTRUMENTS
            .iter()
            .filter(|i| self.subscribers.iter().any(|s| s.follows(i.id)))
            .collect()
    }
}

fn read_file(path: &Path) -> anyhow::Result<Option<BTreeMap<i64, Subscriber>>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}
