use serde::Serialize;
use thiserror::Error;

use crate::progress::state::{Outcome, Transition};
use crate::types::event::{Direction, EventKind};

/// What kind of report this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Started,
    TotalKnown,
    Progress,
    Succeeded,
    Failed,
    /// The event violated the transfer protocol and was not applied.
    Anomaly,
    /// The event kind is not understood and was skipped.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyCategory {
    /// The transport sent events in an order that makes no sense.
    ProtocolAnomaly,
    /// An event carried a value outside its domain.
    InvalidEventData,
}

/// Non-fatal irregularities observed in an event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Anomaly {
    #[error("total size reported twice (kept {existing}, ignored {reported})")]
    DuplicateTotal { existing: u64, reported: i64 },

    #[error("{kind:?} event received after the transfer {outcome}")]
    AfterTerminal { kind: EventKind, outcome: Outcome },

    #[error("negative byte count {value} clamped to zero")]
    NegativeByteCount { value: i64 },
}

impl Anomaly {
    pub fn category(&self) -> AnomalyCategory {
        match self {
            Anomaly::DuplicateTotal { .. } | Anomaly::AfterTerminal { .. } => {
                AnomalyCategory::ProtocolAnomaly
            }
            Anomaly::NegativeByteCount { .. } => AnomalyCategory::InvalidEventData,
        }
    }
}

/// One line of progress output plus the numbers behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub stage: Stage,
    pub direction: Direction,
    pub delta: u64,
    /// `None` means the total is unknown, not zero progress.
    pub percent: Option<u8>,
    pub bytes_so_far: u64,
    pub total_bytes: Option<u64>,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<Anomaly>,
    pub message: String,
}

impl ProgressReport {
    pub(crate) fn from_transition(t: &Transition, direction: Direction) -> Self {
        let state = &t.state;
        let percent = match t.stage {
            Stage::Started => None,
            _ => state.percent(),
        };

        let mut message = match t.stage {
            Stage::Started => format!("Start to {}......", direction.verb()),
            Stage::TotalKnown => format!(
                "{} bytes in total will be {}",
                t.delta,
                direction.past()
            ),
            Stage::Progress => match (percent, state.total_bytes) {
                (Some(pct), Some(total)) => format!(
                    "{} bytes have been {} at this time, {} progress: {}%({}/{})",
                    t.delta,
                    direction.participle(),
                    direction.verb(),
                    pct,
                    state.bytes_so_far,
                    total
                ),
                _ => format!(
                    "{} bytes have been {} at this time, {} ratio: unknown({}/...)",
                    t.delta,
                    direction.participle(),
                    direction.verb(),
                    state.bytes_so_far
                ),
            },
            Stage::Succeeded => format!(
                "Succeed to {}, {} bytes have been transferred in total",
                direction.verb(),
                state.bytes_so_far
            ),
            Stage::Failed => format!(
                "Failed to {}, {} bytes have been transferred",
                direction.verb(),
                state.bytes_so_far
            ),
            Stage::Anomaly => match &t.anomaly {
                Some(a) => format!("Ignoring {} event: {}", direction.verb(), a),
                None => format!("Ignoring {} event", direction.verb()),
            },
            Stage::Ignored => "Ignoring unrecognized event".to_string(),
        };

        if t.stage != Stage::Anomaly {
            if let Some(a) = &t.anomaly {
                message.push_str(&format!(" (warning: {})", a));
            }
        }

        Self {
            stage: t.stage,
            direction,
            delta: t.delta,
            percent,
            bytes_so_far: state.bytes_so_far,
            total_bytes: state.total_bytes,
            outcome: state.outcome,
            anomaly: t.anomaly,
            message,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self.stage, Stage::Succeeded | Stage::Failed)
    }
}

/// Binary-unit byte formatting: `512 B`, `1.5 KB`, `3.25 MB`, `1.00 GB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    // one decimal is enough below a megabyte
    if unit == 0 {
        format!("{:.1} {}", value, UNITS[unit])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}
