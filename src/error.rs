//! Error type shared by the gateway, resolver and filesystem adapter
//!
//! Every failure an adapter operation can report is one `FsError` variant.
//! The protocol front-end decides how to phrase the failure to its client;
//! `code()` and `reply_code()` give it the usual mappings.

use thiserror::Error;

/// Filesystem adapter error type
#[derive(Error, Debug)]
pub enum FsError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("Is a directory: {0}")]
    IsADirectory(String),

    #[error("HTTP Response Status: {status} ({resource})")]
    HttpStatus { status: u16, resource: String },

    #[error("Unexpected Content-Type: {0}")]
    UnexpectedContentType(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl FsError {
    /// errno-style code, as filesystem callbacks conventionally report it
    pub fn code(&self) -> &'static str {
        match self {
            FsError::NotFound(_) => "ENOENT",
            FsError::PermissionDenied(_) => "EACCES",
            FsError::NotSupported(_) => "ENOTSUP",
            FsError::IsADirectory(_) => "EISDIR",
            FsError::HttpStatus { .. }
            | FsError::UnexpectedContentType(_)
            | FsError::ParseError(_)
            | FsError::Transport(_) => "EIO",
        }
    }

    /// FTP reply code a front-end should answer with
    pub fn reply_code(&self) -> u16 {
        match self {
            FsError::NotFound(_) | FsError::PermissionDenied(_) | FsError::IsADirectory(_) => 550,
            FsError::NotSupported(_) => 502,
            FsError::HttpStatus { .. }
            | FsError::UnexpectedContentType(_)
            | FsError::ParseError(_)
            | FsError::Transport(_) => 451,
        }
    }

    /// Whether the failure came from the remote side rather than from the
    /// shape of the request itself
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            FsError::HttpStatus { .. }
                | FsError::UnexpectedContentType(_)
                | FsError::ParseError(_)
                | FsError::Transport(_)
        )
    }

    pub(crate) fn permission_denied() -> Self {
        FsError::PermissionDenied("EACCES, permission denied".to_string())
    }
}
