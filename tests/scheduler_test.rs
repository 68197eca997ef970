//! Monitoring scheduler tests: failure isolation, pacing, recovery and
//! snapshot atomicity under concurrent reads.

mod common;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{eventually, fast_scheduler, instrument, pipeline, Behavior, Fixed, StubSource};
use pivotwatch::config::SchedulerConfig;
use pivotwatch::services::signals::compute_bands;
use pivotwatch::services::MonitoringScheduler;
use pivotwatch::sources::{FetchError, PriceSource};
use pivotwatch::SessionQuote;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_failing_instrument_does_not_block_others() {
    let source = StubSource::new(&[
        ("EUR/USD", Behavior::Rate(1.1)),
        ("GBP/USD", Behavior::Fail),
        ("USD/JPY", Behavior::Rate(150.0)),
    ]);
    let pipeline = pipeline(source.clone(), Duration::from_millis(100));
    let store = pipeline.store().clone();
    let scheduler = MonitoringScheduler::new(
        pipeline,
        Fixed::of(&["EUR/USD", "GBP/USD", "USD/JPY"]),
        fast_scheduler(),
    );

    let report = scheduler.run_cycle().await;

    assert_eq!(report.attempted, 3);
    assert_eq!(report.updated, 2);
    assert_eq!(report.failed, vec!["GBP/USD"]);
    assert!(store.get_snapshot("EUR/USD").unwrap().is_ready());
    assert!(!store.get_snapshot("GBP/USD").unwrap().is_ready());
    assert_eq!(
        store.get_snapshot("USD/JPY").unwrap().current_price,
        Some(150.0)
    );
}

#[tokio::test]
async fn test_hung_instrument_times_out_and_cycle_continues() {
    let source = StubSource::new(&[
        ("EUR/USD", Behavior::Hang),
        ("AUD/USD", Behavior::Rate(0.66)),
    ]);
    let pipeline = pipeline(source, Duration::from_millis(50));
    let store = pipeline.store().clone();
    let scheduler =
        MonitoringScheduler::new(pipeline, Fixed::of(&["EUR/USD", "AUD/USD"]), fast_scheduler());

    let report = tokio::time::timeout(Duration::from_secs(5), scheduler.run_cycle())
        .await
        .expect("cycle should finish despite a hung source");

    assert_eq!(report.failed, vec!["EUR/USD"]);
    assert_eq!(
        store.get_snapshot("AUD/USD").unwrap().current_price,
        Some(0.66)
    );
}

#[tokio::test]
async fn test_pacing_between_calls() {
    let pacing = Duration::from_millis(60);
    let source = StubSource::new(&[
        ("EUR/USD", Behavior::Rate(1.1)),
        ("GBP/USD", Behavior::Rate(1.27)),
        ("USD/CHF", Behavior::Rate(0.88)),
    ]);
    let scheduler = MonitoringScheduler::new(
        pipeline(source.clone(), Duration::from_secs(1)),
        Fixed::of(&["EUR/USD", "GBP/USD", "USD/CHF"]),
        SchedulerConfig {
            pacing_delay: pacing,
            ..fast_scheduler()
        },
    );

    scheduler.run_cycle().await;

    let calls = source.calls();
    let order: Vec<&str> = calls.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(order, vec!["EUR/USD", "GBP/USD", "USD/CHF"]);
    for pair in calls.windows(2) {
        let gap = pair[1].1.duration_since(pair[0].1);
        assert!(gap >= pacing, "calls only {:?} apart", gap);
    }
}

#[tokio::test]
async fn test_empty_active_set() {
    let scheduler = MonitoringScheduler::new(
        pipeline(StubSource::new(&[]), Duration::from_secs(1)),
        Fixed::of(&[]),
        fast_scheduler(),
    );
    let report = scheduler.run_cycle().await;
    assert_eq!(report.attempted, 0);
    assert_eq!(report.updated, 0);
}

#[tokio::test]
async fn test_loop_updates_repeatedly() {
    let source = StubSource::new(&[("NZD/USD", Behavior::Rate(0.6))]);
    let pipeline = pipeline(source.clone(), Duration::from_millis(100));
    let history_handle = pipeline.clone();
    let handle =
        MonitoringScheduler::new(pipeline, Fixed::of(&["NZD/USD"]), fast_scheduler()).spawn();

    let repeated = eventually(Duration::from_secs(5), || {
        history_handle.history().len("NZD/USD") >= 3
    })
    .await;
    handle.abort();

    assert!(repeated, "loop should keep cycling");
    assert!(history_handle
        .store()
        .get_snapshot("NZD/USD")
        .unwrap()
        .is_ready());
}

#[tokio::test]
async fn test_loop_recovers_after_panicking_cycle() {
    let source = StubSource::new(&[("USD/CAD", Behavior::PanicThenRate(1, 1.36))]);
    let pipeline = pipeline(source.clone(), Duration::from_millis(100));
    let store = pipeline.store().clone();
    let handle =
        MonitoringScheduler::new(pipeline, Fixed::of(&["USD/CAD"]), fast_scheduler()).spawn();

    let recovered = eventually(Duration::from_secs(5), || {
        store
            .get_snapshot("USD/CAD")
            .is_some_and(|s| s.current_price == Some(1.36))
    })
    .await;

    assert!(recovered, "scheduler should resume after the backoff");
    assert!(!handle.is_finished());
    assert!(source.calls().len() >= 2);
    handle.abort();
}

/// Sets its flag when dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Never answers; records when a call starts and when it is dropped.
struct StuckSource {
    started: Arc<AtomicBool>,
    dropped: Arc<AtomicBool>,
}

#[async_trait]
impl PriceSource for StuckSource {
    fn name(&self) -> &str {
        "stuck"
    }

    async fn fetch_rate(&self, _base: &str, _quote: &str) -> Result<f64, FetchError> {
        let _flag = DropFlag(self.dropped.clone());
        self.started.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(FetchError::Status(504))
    }

    async fn fetch_prior_close(
        &self,
        _base: &str,
        _quote: &str,
        _date: NaiveDate,
    ) -> Result<f64, FetchError> {
        Err(FetchError::Status(404))
    }
}

#[tokio::test]
async fn test_abort_stops_cycle_in_flight() {
    let started = Arc::new(AtomicBool::new(false));
    let dropped = Arc::new(AtomicBool::new(false));
    let source = Arc::new(StuckSource {
        started: started.clone(),
        dropped: dropped.clone(),
    });
    let handle = MonitoringScheduler::new(
        pipeline(source, Duration::from_secs(3600)),
        Fixed::of(&["EUR/USD"]),
        fast_scheduler(),
    )
    .spawn();

    assert!(eventually(Duration::from_secs(5), || started.load(Ordering::SeqCst)).await);
    assert!(!dropped.load(Ordering::SeqCst));

    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());

    let stopped = eventually(Duration::from_secs(5), || dropped.load(Ordering::SeqCst)).await;
    assert!(stopped, "cycle task should be aborted with the loop");
}

/// Spot rates 1, 2, 3, ... with the prior close equal to the last spot.
struct CountingSource {
    next: AtomicU64,
    last_bits: AtomicU64,
}

#[async_trait]
impl PriceSource for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    async fn fetch_rate(&self, _base: &str, _quote: &str) -> Result<f64, FetchError> {
        let rate = (self.next.fetch_add(1, Ordering::SeqCst) + 1) as f64;
        self.last_bits.store(rate.to_bits(), Ordering::SeqCst);
        Ok(rate)
    }

    async fn fetch_prior_close(
        &self,
        _base: &str,
        _quote: &str,
        _date: NaiveDate,
    ) -> Result<f64, FetchError> {
        Ok(f64::from_bits(self.last_bits.load(Ordering::SeqCst)))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_readers_never_see_mixed_snapshot() {
    let source = Arc::new(CountingSource {
        next: AtomicU64::new(0),
        last_bits: AtomicU64::new(0),
    });
    let pipeline = pipeline(source, Duration::from_secs(1));
    let store = pipeline.store().clone();
    let eur = instrument("EUR/USD");

    let reader = tokio::spawn(async move {
        let mut checked = 0usize;
        loop {
            let snapshot = store.get_snapshot("EUR/USD").unwrap();
            match (snapshot.current_price, snapshot.bands) {
                (Some(price), Some(bands)) => {
                    let quote = SessionQuote::from_prior_close(price, price, eur.band_width());
                    let expected =
                        compute_bands(quote.prev_high, quote.prev_low, quote.prev_close);
                    assert_eq!(bands, expected, "bands do not match price {}", price);
                    assert_eq!(snapshot.prev_close, Some(price));
                    checked += 1;
                    if price >= 500.0 {
                        return checked;
                    }
                }
                (None, None) => {}
                other => panic!("partially set snapshot: {:?}", other),
            }
            tokio::task::yield_now().await;
        }
    });

    for _ in 0..500 {
        pipeline.update_one(eur).await.unwrap();
        tokio::task::yield_now().await;
    }

    let checked = reader.await.unwrap();
    assert!(checked > 0);
}
