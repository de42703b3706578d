use thiserror::Error;

use crate::batch::CallbackError;

/// Errors surfaced by the library itself.
///
/// A transfer that fails on the wire is not in here: that outcome is data,
/// delivered to the registered failure callback as a
/// [`TransferCode`](crate::TransferCode).
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("invalid transfer URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to start the batch driver: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("callback failed: {0}")]
    Callback(#[source] CallbackError),
}
