use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use super::report::{ProgressReport, Stage};

/// Anything that wants to see progress reports.
///
/// `on_report` is called once per handled event, in order, from inside
/// `ProgressAggregator::handle`. Implementations must not block: hand the
/// report off (print, log, push to a channel) and return.
pub trait ProgressSink: Send {
    fn on_report(&mut self, report: &ProgressReport);
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressReport) + Send,
{
    fn on_report(&mut self, report: &ProgressReport) {
        self(report)
    }
}

/// Forwards report lines to the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink {
    label: Option<String>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix every line with `[label]`, e.g. the object key.
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

impl ProgressSink for LogSink {
    fn on_report(&mut self, report: &ProgressReport) {
        let label = self.label.as_deref().unwrap_or("transfer");
        match (report.stage, &report.anomaly) {
            (Stage::Anomaly, _) | (_, Some(_)) => log::warn!("[{}] {}", label, report.message),
            (Stage::Progress, None) | (Stage::Ignored, None) => {
                log::debug!("[{}] {}", label, report.message)
            }
            _ => log::info!("[{}] {}", label, report.message),
        }
    }
}

/// Keeps every report in memory behind a shared handle.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    reports: Arc<Mutex<Vec<ProgressReport>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything received so far.
    pub fn reports(&self) -> Vec<ProgressReport> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// A panicking reader must not cost us reports, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Vec<ProgressReport>> {
        self.reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressSink for MemorySink {
    fn on_report(&mut self, report: &ProgressReport) {
        self.lock().push(report.clone());
    }
}

/// Publishes the latest report on a `watch` channel so that any number of
/// readers (a UI, an HTTP handler) can follow along.
pub struct WatchSink {
    tx: watch::Sender<Option<ProgressReport>>,
}

impl WatchSink {
    /// Creates the sink and returns a receiver that can be cloned freely.
    pub fn new() -> (Self, watch::Receiver<Option<ProgressReport>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }
}

impl ProgressSink for WatchSink {
    fn on_report(&mut self, report: &ProgressReport) {
        // send() only fails when every receiver is gone.
        let _ = self.tx.send(Some(report.clone()));
    }
}
