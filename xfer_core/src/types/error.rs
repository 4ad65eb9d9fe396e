use std::time::Duration;

use thiserror::Error;

/// Errors raised by transports and the transfer driver.
///
/// The aggregator itself never fails; these only cover moving bytes and
/// supervising the event stream.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid object key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("progress channel closed before the transfer finished")]
    ChannelClosed,

    #[error("transfer timed out after {0:?}")]
    TimedOut(Duration),

    #[error("transport stopped without reporting a terminal outcome")]
    Incomplete,

    #[error("transfer failed after {0} bytes")]
    Failed(u64),

    #[error("could not parse event log: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("progress task panicked: {0}")]
    Join(#[from] tokio::task::JoinError),
}
