use thiserror::Error;

use crate::sync::store::StoreError;

/// Errors that can stop the client from starting.
///
/// Everything else (sync failures, rejected moves, dropped input devices)
/// is handled in place and never reaches the embedding context.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to load asset {path}: {reason}")]
    AssetLoad { path: String, reason: String },

    #[error("map {path} has no usable spawn point")]
    MissingSpawn { path: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ClientError {
    pub fn asset(path: impl Into<String>, reason: impl ToString) -> Self {
        ClientError::AssetLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
