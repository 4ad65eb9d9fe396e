use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::types::error::TransferError;
use crate::types::event::{Direction, TransferEvent};

/// Something that moves bytes and narrates it as `TransferEvent`s.
///
/// `Transfer` hands the sender in and drops its own copy, so the event
/// channel closes as soon as `run` returns (or its future is dropped on
/// timeout). A well-behaved source ends with `Completed` or `Failed`.
#[async_trait]
pub trait TransferSource: Send + Sync {
    fn direction(&self) -> Direction;

    /// Run the transfer, returning the number of bytes moved.
    async fn run(&self, events_tx: mpsc::Sender<TransferEvent>) -> Result<u64, TransferError>;
}

/// Send one event, mapping a closed channel to `TransferError::ChannelClosed`.
pub(crate) async fn emit(
    events_tx: &mpsc::Sender<TransferEvent>,
    event: TransferEvent,
) -> Result<(), TransferError> {
    events_tx
        .send(event)
        .await
        .map_err(|_| TransferError::ChannelClosed)
}
