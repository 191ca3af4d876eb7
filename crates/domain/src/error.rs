#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("no connection")]
    NoConnection,
    #[error("no session")]
    NoSession,
    #[error("{message} ({code})")]
    Server { code: String, message: String },
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

/// Failure of a catalog fetch as seen by the selection workflow.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("no connection")]
    Network,
    #[error("{message}")]
    Server { message: String },
}

impl From<ReadError> for FetchError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::Storage(StorageError::NoConnection) => FetchError::Network,
            ReadError::Storage(StorageError::Server { message, .. }) => {
                FetchError::Server { message }
            }
            ReadError::Storage(err) => FetchError::Server {
                message: err.to_string(),
            },
            ReadError::Other(err) => FetchError::Server {
                message: err.to_string(),
            },
        }
    }
}
