use std::time::Duration;

/// Default read/write chunk size for local transports (8 KB).
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Default capacity of the transport → notifier event channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Knobs for a single transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferConfig {
    pub chunk_size: usize,
    pub channel_capacity: usize,
    /// Upper bound on the whole transfer. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            timeout: None,
        }
    }
}

impl TransferConfig {
    pub fn builder() -> TransferConfigBuilder {
        TransferConfigBuilder::new()
    }
}

pub struct TransferConfigBuilder {
    config: TransferConfig,
}

impl TransferConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: TransferConfig::default(),
        }
    }

    /// Zero is bumped to one byte so reads always make progress.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> TransferConfig {
        self.config
    }
}

impl Default for TransferConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
