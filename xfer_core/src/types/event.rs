use serde::{Deserialize, Serialize};

/// What a transport is telling us about the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Started,
    TotalSizeKnown,
    BytesTransferred,
    Completed,
    Failed,
    /// Any kind this version does not understand. Aggregators ignore it.
    #[serde(other)]
    Unknown,
}

/// A single notification emitted by a transport.
///
/// `byte_count` is the total object size for `TotalSizeKnown`, the
/// incremental delta for `BytesTransferred`, and unused otherwise. It is
/// signed on purpose: a misbehaving transport may report negative values
/// and the aggregator needs to see them to clamp and flag them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub kind: EventKind,
    #[serde(default)]
    pub byte_count: i64,
}

impl TransferEvent {
    pub fn new(kind: EventKind, byte_count: i64) -> Self {
        Self { kind, byte_count }
    }

    pub fn started() -> Self {
        Self::new(EventKind::Started, 0)
    }

    pub fn total_size(total: i64) -> Self {
        Self::new(EventKind::TotalSizeKnown, total)
    }

    /// `TotalSizeKnown` for an on-disk length; saturates at `i64::MAX`.
    pub fn total_size_of_len(len: u64) -> Self {
        Self::total_size(i64::try_from(len).unwrap_or(i64::MAX))
    }

    pub fn bytes(delta: i64) -> Self {
        Self::new(EventKind::BytesTransferred, delta)
    }

    pub fn completed() -> Self {
        Self::new(EventKind::Completed, 0)
    }

    pub fn failed() -> Self {
        Self::new(EventKind::Failed, 0)
    }

    /// Byte count with negatives clamped to zero.
    pub fn clamped_bytes(&self) -> u64 {
        self.byte_count.max(0) as u64
    }
}

/// Which way the bytes are flowing. Only affects report wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Upload,
    Download,
}

impl Direction {
    /// Verb used in "start to ..." / "succeed to ..." lines.
    pub fn verb(&self) -> &'static str {
        match self {
            Direction::Upload => "upload",
            Direction::Download => "download",
        }
    }

    pub fn past(&self) -> &'static str {
        match self {
            Direction::Upload => "uploaded",
            Direction::Download => "downloaded",
        }
    }

    /// Past participle used for byte counts ("bytes have been ...").
    pub fn participle(&self) -> &'static str {
        match self {
            Direction::Upload => "written",
            Direction::Download => "read",
        }
    }
}

/// Parse a JSON-lines event log. Blank lines and `#` comments are skipped.
pub fn parse_event_lines(input: &str) -> Result<Vec<TransferEvent>, serde_json::Error> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str::<TransferEvent>)
        .collect()
}
