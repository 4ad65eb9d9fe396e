use super::report::ProgressReport;
use super::sink::ProgressSink;
use super::state::{transition, Outcome, ProgressState};
use crate::types::event::{Direction, TransferEvent};

/// Folds a transfer's events into a `ProgressState` and emits one
/// `ProgressReport` per event to every attached sink.
///
/// One aggregator tracks exactly one transfer. It holds no locks, so drive
/// it from a single task; `handle` only does arithmetic and hands the
/// report to the sinks.
///
/// | Event              | State change                         | Report stage |
/// |--------------------|--------------------------------------|--------------|
/// | `Started`          | counters reset                       | `Started`    |
/// | `TotalSizeKnown`   | total set once                       | `TotalKnown` |
/// | `BytesTransferred` | `bytes_so_far += delta`              | `Progress`   |
/// | `Completed`        | outcome = `Succeeded`                | `Succeeded`  |
/// | `Failed`           | outcome = `Failed`                   | `Failed`     |
/// | anything after a terminal outcome, or a second total | none | `Anomaly` |
/// | unknown kind       | none                                 | `Ignored`    |
pub struct ProgressAggregator {
    direction: Direction,
    state: ProgressState,
    sinks: Vec<Box<dyn ProgressSink>>,
}

impl ProgressAggregator {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            state: ProgressState::new(),
            sinks: Vec::new(),
        }
    }

    /// Builder-style `add_sink`.
    pub fn with_sink(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.add_sink(Box::new(sink));
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn ProgressSink>) {
        self.sinks.push(sink);
    }

    /// Apply one event and emit the resulting report.
    ///
    /// Anomalies are carried on the report only; attach a `LogSink` to get
    /// them into the log.
    pub fn handle(&mut self, event: TransferEvent) -> ProgressReport {
        let t = transition(&self.state, &event);

        self.state = t.state;
        let report = ProgressReport::from_transition(&t, self.direction);
        for sink in self.sinks.iter_mut() {
            sink.on_report(&report);
        }
        report
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn outcome(&self) -> Outcome {
        self.state.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Consume the aggregator and keep only the final state.
    pub fn into_state(self) -> ProgressState {
        self.state
    }
}
