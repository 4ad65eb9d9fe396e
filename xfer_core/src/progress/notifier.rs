use tokio::sync::mpsc;

use super::aggregator::ProgressAggregator;
use super::sink::ProgressSink;
use super::state::ProgressState;
use crate::types::event::{Direction, TransferEvent};

/// Drains a transport's event channel into a `ProgressAggregator`.
///
/// # Lifecycle
///
/// | Channel message         | Effect                                   |
/// |-------------------------|------------------------------------------|
/// | `TransferEvent`         | `aggregator.handle(ev)` → sinks          |
/// | Channel closed          | `run` returns the final `ProgressState`  |
///
/// The notifier has no timeout of its own. If the transport drops its
/// sender without a `Completed`/`Failed` event the returned state is still
/// `InProgress`, and it is up to the caller to treat that as a stall.
pub struct ProgressNotifier {
    aggregator: ProgressAggregator,
}

impl ProgressNotifier {
    pub fn new(direction: Direction) -> Self {
        Self {
            aggregator: ProgressAggregator::new(direction),
        }
    }

    pub fn from_aggregator(aggregator: ProgressAggregator) -> Self {
        Self { aggregator }
    }

    /// Register a sink. Must be called before `run()`.
    pub fn add_sink(&mut self, sink: Box<dyn ProgressSink>) {
        self.aggregator.add_sink(sink);
    }

    /// Consume events until every sender is dropped.
    pub async fn run(mut self, mut events_rx: mpsc::Receiver<TransferEvent>) -> ProgressState {
        let mut handled: u64 = 0;
        while let Some(ev) = events_rx.recv().await {
            self.aggregator.handle(ev);
            handled += 1;
        }

        let state = self.aggregator.into_state();
        log::debug!(
            "[notifier] channel closed after {} events, outcome={}",
            handled,
            state.outcome
        );
        state
    }
}
