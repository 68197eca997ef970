pub mod history;
pub mod pipeline;
pub mod report;
pub mod scheduler;
pub mod signal_log;
pub mod signals;
pub mod snapshot_store;
pub mod subscriptions;

pub use history::PriceHistory;
pub use pipeline::UpdatePipeline;
pub use report::{LevelDistance, LevelsReport};
pub use scheduler::{ActiveInstruments, AllInstruments, CycleReport, MonitoringScheduler};
pub use signal_log::SignalTracker;
pub use snapshot_store::SnapshotStore;
pub use subscriptions::SubscriptionStore;
