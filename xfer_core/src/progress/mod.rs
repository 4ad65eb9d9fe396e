pub mod aggregator;
pub mod notifier;
pub mod report;
pub mod sink;
pub mod state;

pub use aggregator::ProgressAggregator;
pub use notifier::ProgressNotifier;
pub use report::{format_bytes, Anomaly, AnomalyCategory, ProgressReport, Stage};
pub use sink::{LogSink, MemorySink, ProgressSink, WatchSink};
pub use state::{transition, Outcome, ProgressState, Transition};
