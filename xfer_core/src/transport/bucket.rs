//! A directory that stands in for an object-storage bucket.
//!
//! Objects are plain files under the bucket root, addressed by
//! `/`-separated keys. `put` and `get` copy a file in fixed-size chunks and
//! narrate the copy as `TransferEvent`s, which is all the progress
//! machinery needs from a real storage client.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;

use super::source::{emit, TransferSource};
use crate::config::{TransferConfig, DEFAULT_CHUNK_SIZE};
use crate::types::error::TransferError;
use crate::types::event::{Direction, TransferEvent};

/// Env var that overrides the default bucket directory.
pub const BUCKET_DIR_ENV: &str = "XFER_BUCKET_DIR";

const DEFAULT_BUCKET_DIR: &str = "xfer-bucket";

#[derive(Debug, Clone)]
pub struct LocalBucket {
    root: PathBuf,
    chunk_size: usize,
}

impl LocalBucket {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Take the chunk size for every `put`/`get` from `config`.
    pub fn with_config(mut self, config: &TransferConfig) -> Self {
        self.chunk_size = config.chunk_size.max(1);
        self
    }

    /// Priority: `$XFER_BUCKET_DIR` → `./xfer-bucket`.
    pub fn from_env() -> Self {
        let root = std::env::var(BUCKET_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_BUCKET_DIR));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to its file path, rejecting keys that would escape the
    /// bucket root.
    pub fn object_path(&self, key: &str) -> Result<PathBuf, TransferError> {
        validate_key(key)?;
        Ok(key.split('/').fold(self.root.clone(), |p, seg| p.join(seg)))
    }

    pub async fn exists(&self, key: &str) -> bool {
        match self.object_path(key) {
            Ok(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Prepare an upload of the local file `src` to `key`.
    pub fn put(&self, key: &str, src: impl Into<PathBuf>) -> Result<BucketTransfer, TransferError> {
        let dst = self.object_path(key)?;
        Ok(BucketTransfer {
            direction: Direction::Upload,
            key: key.to_string(),
            src: src.into(),
            dst,
            chunk_size: self.chunk_size,
        })
    }

    /// Prepare a download of `key` into the local file `dst`.
    pub fn get(&self, key: &str, dst: impl Into<PathBuf>) -> Result<BucketTransfer, TransferError> {
        let src = self.object_path(key)?;
        Ok(BucketTransfer {
            direction: Direction::Download,
            key: key.to_string(),
            src,
            dst: dst.into(),
            chunk_size: self.chunk_size,
        })
    }
}

/// Keys are relative, `/`-separated, with no empty, `.` or `..` segments.
pub fn validate_key(key: &str) -> Result<(), TransferError> {
    let invalid = |reason| {
        Err(TransferError::InvalidKey {
            key: key.to_string(),
            reason,
        })
    };

    if key.is_empty() {
        return invalid("key is empty");
    }
    if key.starts_with('/') {
        return invalid("key must be relative");
    }
    if key.contains('\\') {
        return invalid("backslashes are not allowed");
    }
    for seg in key.split('/') {
        match seg {
            "" => return invalid("empty path segment"),
            "." | ".." => return invalid("dot segments are not allowed"),
            _ => {}
        }
    }
    Ok(())
}

/// One pending put or get.
#[derive(Debug, Clone)]
pub struct BucketTransfer {
    direction: Direction,
    key: String,
    src: PathBuf,
    dst: PathBuf,
    chunk_size: usize,
}

impl BucketTransfer {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn source_path(&self) -> &Path {
        &self.src
    }

    pub fn destination_path(&self) -> &Path {
        &self.dst
    }

    async fn copy(&self, events_tx: &mpsc::Sender<TransferEvent>) -> Result<u64, TransferError> {
        let mut src = match tokio::fs::File::open(&self.src).await {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound && self.direction == Direction::Download => {
                return Err(TransferError::ObjectNotFound(self.key.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let len = src.metadata().await?.len();
        emit(events_tx, TransferEvent::total_size_of_len(len)).await?;

        let parent = match self.dst.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        tokio::fs::create_dir_all(parent).await?;

        // Stage into a sibling temp file; it is removed on error or when this
        // future is dropped, so the destination only ever holds a whole copy.
        let staged = NamedTempFile::new_in(parent)?;
        let mut dst = BufWriter::new(tokio::fs::File::from_std(staged.reopen()?));

        let mut buf = vec![0u8; self.chunk_size];
        let mut copied: u64 = 0;
        loop {
            let n = src.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            dst.write_all(&buf[..n]).await?;
            copied += n as u64;
            emit(events_tx, TransferEvent::bytes(n as i64)).await?;
        }
        dst.flush().await?;
        drop(dst);

        staged.persist(&self.dst).map_err(|e| e.error)?;

        Ok(copied)
    }
}

#[async_trait]
impl TransferSource for BucketTransfer {
    fn direction(&self) -> Direction {
        self.direction
    }

    async fn run(&self, events_tx: mpsc::Sender<TransferEvent>) -> Result<u64, TransferError> {
        log::info!(
            "[bucket] {} key={} src={:?} dst={:?} chunk_size={}",
            self.direction.verb(),
            self.key,
            self.src,
            self.dst,
            self.chunk_size
        );
        emit(&events_tx, TransferEvent::started()).await?;

        match self.copy(&events_tx).await {
            Ok(copied) => {
                emit(&events_tx, TransferEvent::completed()).await?;
                Ok(copied)
            }
            Err(e) => {
                log::error!("[bucket] {} key={} failed: {}", self.direction.verb(), self.key, e);
                // The receiver may already be gone; the error below still reaches the caller.
                let _ = events_tx.send(TransferEvent::failed()).await;
                Err(e)
            }
        }
    }
}
