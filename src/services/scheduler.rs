//! Monitoring scheduler.
//!
//! Drives the update pipeline over the active instruments on a fixed cycle.
//! Each pass runs as its own task so a panic inside one cycle is contained,
//! logged, and followed by the recovery backoff.

use crate::config::SchedulerConfig;
use crate::services::UpdatePipeline;
use crate::types::{Instrument, INSTRUMENTS};
use std::sync::Arc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};

/// Which instruments need refreshing each cycle.
pub trait ActiveInstruments: Send + Sync {
    fn active_instruments(&self) -> Vec<&'static Instrument>;
}

/// Every registry instrument is always active.
pub struct AllInstruments;

impl ActiveInstruments for AllInstruments {
    fn active_instruments(&self) -> Vec<&'static Instrument> {
        INSTRUMENTS.iter().collect()
    }
}

/// Outcome of one pass over the active instruments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub attempted: usize,
    pub updated: usize,
    pub failed: Vec<&'static str>,
}

/// Aborts the in-flight cycle when the loop is dropped.
struct CycleGuard(AbortHandle);

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Fixed-cadence driver for [`UpdatePipeline`].
pub struct MonitoringScheduler {
    pipeline: Arc<UpdatePipeline>,
    active: Arc<dyn ActiveInstruments>,
    config: SchedulerConfig,
}

impl MonitoringScheduler {
    pub fn new(
        pipeline: Arc<UpdatePipeline>,
        active: Arc<dyn ActiveInstruments>,
        config: SchedulerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            pipeline,
            active,
            config,
        })
    }

    /// One pass: update every active instrument, pacing successive calls.
    /// A failing instrument is logged and skipped.
    pub async fn run_cycle(&self) -> CycleReport {
        let instruments = self.active.active_instruments();
        let mut report = CycleReport {
            attempted: instruments.len(),
            ..CycleReport::default()
        };

        for (i, instrument) in instruments.iter().enumerate() {
            if i > 0 && !self.config.pacing_delay.is_zero() {
                tokio::time::sleep(self.config.pacing_delay).await;
            }

            match self.pipeline.update_one(instrument).await {
                Ok(snapshot) => {
                    debug!("Updated {} at {:?}", instrument, snapshot.current_price);
                    report.updated += 1;
                }
                Err(e) => {
                    warn!("Failed to update {}: {}", instrument, e);
                    report.failed.push(instrument.id);
                }
            }
        }

        report
    }

    /// Loop forever. Never returns under normal operation; aborting the task
    /// running this loop also aborts the cycle in flight.
    pub async fn run(self: Arc<Self>) {
        info!(
            "Starting monitoring: cycle {:?}, pacing {:?}",
            self.config.cycle_interval, self.config.pacing_delay
        );

        loop {
            let scheduler = self.clone();
            let cycle = tokio::spawn(async move { scheduler.run_cycle().await });
            let _guard = CycleGuard(cycle.abort_handle());

            match cycle.await {
                Ok(report) => {
                    info!(
                        "Cycle complete: {}/{} instruments updated",
                        report.updated, report.attempted
                    );
                    if !report.failed.is_empty() {
                        debug!("Failed this cycle: {:?}", report.failed);
                    }
                    tokio::time::sleep(self.config.cycle_interval).await;
                }
                Err(e) => {
                    error!(
                        "Monitoring cycle aborted: {}; retrying in {:?}",
                        e, self.config.recovery_backoff
                    );
                    tokio::time::sleep(self.config.recovery_backoff).await;
                }
            }
        }
    }

    /// Start [`run`](Self::run) as a background task.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(self.clone().run())
    }
}
