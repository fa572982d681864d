// Error types for request/response handling

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),
}

pub type Result<T> = std::result::Result<T, Error>;
