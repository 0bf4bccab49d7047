use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A document returned by the engine does not decode into a `Book`.
    #[error("Invalid document payload at hit {index}: {source}")]
    InvalidDocumentPayload {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Any failure talking to the engine (I/O, index corruption, writer state).
    #[error("Engine communication failure: {0}")]
    EngineCommunication(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn engine(err: impl std::fmt::Display) -> Self {
        Self::EngineCommunication(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
