//! Filesystem callback surface
//!
//! The protocol front-end owns the connection and dispatches one call per
//! client command. `VirtualFs` is what it dispatches to.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::FsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// Protocol-neutral stat record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatRecord {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    pub mtime: Option<DateTime<Utc>>,
    pub ctime: Option<DateTime<Utc>>,
    /// Always equal to `mtime`
    pub atime: Option<DateTime<Utc>>,
}

impl StatRecord {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

pub type ReadStream = Box<dyn AsyncRead + Send + Unpin>;
pub type WriteStream = Box<dyn AsyncWrite + Send + Unpin>;

/// Filesystem operations a front-end can dispatch per session
#[async_trait]
pub trait VirtualFs: Send {
    /// Names of the entries directly below `path`
    async fn list(&mut self, path: &str) -> Result<Vec<String>, FsError>;

    async fn stat(&mut self, path: &str) -> Result<StatRecord, FsError>;

    /// Whole-file read
    async fn read(&mut self, path: &str) -> Result<Vec<u8>, FsError>;

    /// Whole-file write, creating or overwriting
    async fn write(&mut self, path: &str, data: &[u8]) -> Result<(), FsError>;

    async fn remove(&mut self, path: &str) -> Result<(), FsError>;

    async fn rename(&mut self, from: &str, to: &str) -> Result<(), FsError>;

    async fn mkdir(&mut self, path: &str, mode: u32) -> Result<(), FsError>;

    async fn rmdir(&mut self, path: &str) -> Result<(), FsError>;

    // Optional capabilities - implementations can override these

    /// Check if chunked streaming access is available
    fn supports_streaming(&self) -> bool {
        false
    }

    async fn create_read_stream(&mut self, path: &str) -> Result<ReadStream, FsError> {
        Err(FsError::NotSupported(format!("read stream for {}", path)))
    }

    async fn create_write_stream(&mut self, path: &str) -> Result<WriteStream, FsError> {
        Err(FsError::NotSupported(format!("write stream for {}", path)))
    }
}
