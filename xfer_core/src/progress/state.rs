use std::fmt;

use serde::Serialize;

use crate::progress::report::{Anomaly, Stage};
use crate::types::event::{EventKind, TransferEvent};

/// Where a transfer stands. `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    InProgress,
    Succeeded,
    Failed,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::InProgress => "in progress",
            Outcome::Succeeded => "succeeded",
            Outcome::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Running totals for one transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProgressState {
    pub bytes_so_far: u64,
    /// `None` until the transport reports the size; fixed afterwards.
    pub total_bytes: Option<u64>,
    pub outcome: Outcome,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `floor(bytes_so_far * 100 / total)` clamped to `[0, 100]`, or `None`
    /// while the total is unknown. A zero-byte object is complete by
    /// definition and reports 100.
    pub fn percent(&self) -> Option<u8> {
        let total = self.total_bytes?;
        if total == 0 {
            return Some(100);
        }
        let pct = (self.bytes_so_far as u128 * 100) / total as u128;
        Some(pct.min(100) as u8)
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }
}

/// Result of folding one event into a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: ProgressState,
    pub stage: Stage,
    /// Byte count carried by the event after clamping.
    pub delta: u64,
    pub anomaly: Option<Anomaly>,
}

/// Fold a single event into `state`.
///
/// Pure: the caller decides what to do with the new state and the
/// anomaly, if any. Protocol anomalies leave the state untouched;
/// negative byte counts are clamped and the event is applied anyway.
pub fn transition(state: &ProgressState, event: &TransferEvent) -> Transition {
    let delta = event.clamped_bytes();
    // byte_count is only meaningful for these two kinds
    let carries_bytes = matches!(
        event.kind,
        EventKind::TotalSizeKnown | EventKind::BytesTransferred
    );
    let invalid = (carries_bytes && event.byte_count < 0).then_some(Anomaly::NegativeByteCount {
        value: event.byte_count,
    });

    let unchanged = |stage, anomaly| Transition {
        state: *state,
        stage,
        delta,
        anomaly,
    };

    if event.kind == EventKind::Unknown {
        return unchanged(Stage::Ignored, None);
    }

    if state.is_terminal() {
        return unchanged(
            Stage::Anomaly,
            Some(Anomaly::AfterTerminal {
                kind: event.kind,
                outcome: state.outcome,
            }),
        );
    }

    let mut next = *state;
    let stage = match event.kind {
        EventKind::Started => {
            next = ProgressState::new();
            Stage::Started
        }
        EventKind::TotalSizeKnown => {
            if let Some(existing) = state.total_bytes {
                return unchanged(
                    Stage::Anomaly,
                    Some(Anomaly::DuplicateTotal {
                        existing,
                        reported: event.byte_count,
                    }),
                );
            }
            next.total_bytes = Some(delta);
            Stage::TotalKnown
        }
        EventKind::BytesTransferred => {
            next.bytes_so_far = state.bytes_so_far.saturating_add(delta);
            Stage::Progress
        }
        EventKind::Completed => {
            next.outcome = Outcome::Succeeded;
            Stage::Succeeded
        }
        EventKind::Failed => {
            next.outcome = Outcome::Failed;
            Stage::Failed
        }
        EventKind::Unknown => Stage::Ignored,
    };

    Transition {
        state: next,
        stage,
        delta,
        anomaly: invalid,
    }
}
