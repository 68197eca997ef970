//! Shared test doubles.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use pivotwatch::config::{IndicatorConfig, SchedulerConfig};
use pivotwatch::services::{ActiveInstruments, SnapshotStore, UpdatePipeline};
use pivotwatch::sources::{FetchError, PriceSource};
use pivotwatch::Instrument;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// How the stub answers for one pair.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Rate(f64),
    Fail,
    Hang,
    /// Panic on the first `n` calls, then answer with the rate.
    PanicThenRate(usize, f64),
}

/// Per-pair scripted source that records when each spot call happened.
pub struct StubSource {
    behaviors: HashMap<String, Behavior>,
    calls: Mutex<Vec<(String, Instant)>>,
    panics: AtomicUsize,
}

impl StubSource {
    pub fn new(behaviors: &[(&str, Behavior)]) -> Arc<Self> {
        Arc::new(Self {
            behaviors: behaviors
                .iter()
                .map(|(id, b)| (id.to_string(), *b))
                .collect(),
            calls: Mutex::new(Vec::new()),
            panics: AtomicUsize::new(0),
        })
    }

    /// Spot calls in order, as (pair, when).
    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch_rate(&self, base: &str, quote: &str) -> Result<f64, FetchError> {
        let id = format!("{}/{}", base, quote);
        self.calls.lock().unwrap().push((id.clone(), Instant::now()));

        match self.behaviors.get(&id).copied() {
            Some(Behavior::Rate(rate)) => Ok(rate),
            Some(Behavior::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(FetchError::Status(504))
            }
            Some(Behavior::PanicThenRate(n, rate)) => {
                if self.panics.fetch_add(1, Ordering::SeqCst) < n {
                    panic!("stub source exploded for {}", id);
                }
                Ok(rate)
            }
            Some(Behavior::Fail) | None => Err(FetchError::Status(503)),
        }
    }

    async fn fetch_prior_close(
        &self,
        base: &str,
        quote: &str,
        _date: NaiveDate,
    ) -> Result<f64, FetchError> {
        match self.behaviors.get(&format!("{}/{}", base, quote)) {
            Some(Behavior::Rate(rate)) | Some(Behavior::PanicThenRate(_, rate)) => Ok(*rate),
            _ => Err(FetchError::Status(404)),
        }
    }
}

/// A fixed list of active instruments.
pub struct Fixed(pub Vec<&'static Instrument>);

impl Fixed {
    pub fn of(ids: &[&str]) -> Arc<Self> {
        Arc::new(Self(ids.iter().map(|id| instrument(id)).collect()))
    }
}

impl ActiveInstruments for Fixed {
    fn active_instruments(&self) -> Vec<&'static Instrument> {
        self.0.clone()
    }
}

pub fn instrument(id: &str) -> &'static Instrument {
    Instrument::lookup(id).unwrap()
}

pub fn pipeline(source: Arc<dyn PriceSource>, fetch_timeout: Duration) -> Arc<UpdatePipeline> {
    Arc::new(UpdatePipeline::new(
        source,
        SnapshotStore::new(),
        &IndicatorConfig::default(),
        fetch_timeout,
    ))
}

/// Millisecond-scale timings for tests.
pub fn fast_scheduler() -> SchedulerConfig {
    SchedulerConfig {
        cycle_interval: Duration::from_millis(50),
        pacing_delay: Duration::ZERO,
        fetch_timeout: Duration::from_millis(100),
        recovery_backoff: Duration::from_millis(50),
    }
}

/// Poll `check` until it holds or `limit` elapses.
pub async fn eventually(limit: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
