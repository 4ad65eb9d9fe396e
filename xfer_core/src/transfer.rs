use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::config::TransferConfig;
use crate::progress::notifier::ProgressNotifier;
use crate::progress::sink::ProgressSink;
use crate::progress::state::{Outcome, ProgressState};
use crate::transport::source::TransferSource;
use crate::types::error::TransferError;
use crate::types::event::Direction;

/// What a finished transfer looked like from the progress side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSummary {
    pub direction: Direction,
    pub state: ProgressState,
    /// Bytes the source says it moved.
    pub bytes_moved: u64,
    pub elapsed: Duration,
}

/// Runs a `TransferSource` with a `ProgressNotifier` attached.
pub struct Transfer {
    source: Arc<dyn TransferSource>,
    config: TransferConfig,
    notifier: ProgressNotifier,
}

impl Transfer {
    pub fn new(source: Arc<dyn TransferSource>, config: TransferConfig) -> Self {
        let notifier = ProgressNotifier::new(source.direction());
        Self {
            source,
            config,
            notifier,
        }
    }

    /// Register a progress sink. Must be called before `run()`.
    pub fn add_sink(&mut self, sink: Box<dyn ProgressSink>) {
        self.notifier.add_sink(sink);
    }

    /// Builder-style `add_sink`.
    pub fn with_sink(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.add_sink(Box::new(sink));
        self
    }

    /// Run the source to completion and reconcile its result with the
    /// outcome the event stream reported.
    ///
    /// The notifier runs as a background task fed by a fresh channel. The
    /// source owns the only sender, so the channel closes when the source
    /// returns or, under `config.timeout`, when its future is dropped.
    pub async fn run(self) -> Result<TransferSummary, TransferError> {
        let Transfer {
            source,
            config,
            notifier,
        } = self;
        let direction = source.direction();

        let (events_tx, events_rx) = mpsc::channel(config.channel_capacity.max(1));
        let notifier_handle = tokio::spawn(notifier.run(events_rx));

        let start = Instant::now();
        let result = match config.timeout {
            Some(limit) => match tokio::time::timeout(limit, source.run(events_tx)).await {
                Ok(r) => r,
                Err(_) => Err(TransferError::TimedOut(limit)),
            },
            None => source.run(events_tx).await,
        };
        let elapsed = start.elapsed();

        // Wait for the notifier to drain before looking at the outcome.
        let state = notifier_handle.await?;

        let bytes_moved = match result {
            Ok(n) => n,
            Err(e) => {
                log::error!(
                    "[transfer] {} failed after {} bytes: {}",
                    direction.verb(),
                    state.bytes_so_far,
                    e
                );
                return Err(e);
            }
        };

        match state.outcome {
            Outcome::Succeeded => {
                log::info!(
                    "[transfer] {} finished: {} bytes in {:.2}s",
                    direction.verb(),
                    state.bytes_so_far,
                    elapsed.as_secs_f64()
                );
                Ok(TransferSummary {
                    direction,
                    state,
                    bytes_moved,
                    elapsed,
                })
            }
            Outcome::Failed => Err(TransferError::Failed(state.bytes_so_far)),
            Outcome::InProgress => {
                log::warn!(
                    "[transfer] {} source returned without a terminal event ({} bytes seen)",
                    direction.verb(),
                    state.bytes_so_far
                );
                Err(TransferError::Incomplete)
            }
        }
    }
}
