pub mod error;
pub mod event;

pub use error::TransferError;
pub use event::{parse_event_lines, Direction, EventKind, TransferEvent};
