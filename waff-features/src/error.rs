//! Error types for flag evaluation.

use thiserror::Error;
use waff_cache::CacheError;

/// Errors raised by a [`FlagStore`](crate::FlagStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid record {name}: {reason}")]
    InvalidRecord { name: String, reason: String },

    #[error("Store error: {0}")]
    Other(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the `try_*` evaluation methods.
#[derive(Debug, Error)]
pub enum WaffleError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Response error: {0}")]
    Response(#[from] waff_core::Error),
}

pub type WaffleResult<T> = std::result::Result<T, WaffleError>;
