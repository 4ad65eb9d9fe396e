use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::source::{emit, TransferSource};
use crate::types::error::TransferError;
use crate::types::event::{parse_event_lines, Direction, EventKind, TransferEvent};

/// Plays back a recorded event stream, optionally paced by a fixed delay.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    events: Vec<TransferEvent>,
    direction: Direction,
    delay: Option<Duration>,
}

impl ReplaySource {
    pub fn new(events: Vec<TransferEvent>, direction: Direction) -> Self {
        Self {
            events,
            direction,
            delay: None,
        }
    }

    pub fn from_json_lines(input: &str, direction: Direction) -> Result<Self, TransferError> {
        Ok(Self::new(parse_event_lines(input)?, direction))
    }

    pub async fn from_file(path: impl AsRef<Path>, direction: Direction) -> Result<Self, TransferError> {
        let input = tokio::fs::read_to_string(path).await?;
        Self::from_json_lines(&input, direction)
    }

    /// Sleep this long between events.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn events(&self) -> &[TransferEvent] {
        &self.events
    }
}

#[async_trait]
impl TransferSource for ReplaySource {
    fn direction(&self) -> Direction {
        self.direction
    }

    async fn run(&self, events_tx: mpsc::Sender<TransferEvent>) -> Result<u64, TransferError> {
        let mut replayed: u64 = 0;
        for (i, ev) in self.events.iter().enumerate() {
            if i > 0 {
                if let Some(delay) = self.delay {
                    tokio::time::sleep(delay).await;
                }
            }
            if ev.kind == EventKind::BytesTransferred {
                replayed = replayed.saturating_add(ev.clamped_bytes());
            }
            emit(&events_tx, *ev).await?;
        }
        Ok(replayed)
    }
}
