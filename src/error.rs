use std::io;

use thiserror::Error;

/// Errors raised by an `ObjectClient` backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Remote(String),
}

impl ClientError {
    pub fn remote(op: &str, key: &str, err: impl std::fmt::Display) -> Self {
        ClientError::Remote(format!("failed to {} at: {}, {}", op, key, err))
    }
}

#[derive(Error, Debug)]
pub enum IoCause {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Content(#[from] io::Error),
}

/// Errors surfaced by `CloudStorage` to the host application.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Requested object is absent (read path).
    #[error("file does not exist: {0}")]
    NotFound(String),

    /// Permission, timeout or any other remote fault.
    #[error("I/O failure: {0}")]
    Io(#[source] IoCause),

    #[error("{0} is not supported by remote object storage")]
    Unsupported(&'static str),

    /// OS-level error, raised as ENOENT by timestamp lookups.
    #[error(transparent)]
    Os(io::Error),

    #[error("invalid storage location: {0}")]
    InvalidLocation(String),
}

impl StorageError {
    pub fn os_not_found() -> Self {
        StorageError::Os(io::Error::from_raw_os_error(libc::ENOENT))
    }

    /// True for both the read-path and the OS-level not-found kinds.
    pub fn is_not_found(&self) -> bool {
        match self {
            StorageError::NotFound(_) => true,
            StorageError::Os(err) => err.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

impl From<ClientError> for StorageError {
    fn from(err: ClientError) -> Self {
        StorageError::Io(IoCause::Client(err))
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(IoCause::Content(err))
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
