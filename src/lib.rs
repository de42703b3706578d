use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::Client;

pub mod batch;
pub mod debug;
pub mod error;
pub mod transfer;
pub mod utils;

pub use batch::{classify, Callback, CallbackError, TransferBatch, TransferCode};
pub use debug::set_debug;
pub use error::BatchError;
pub use transfer::TransferHandle;

// Shared HTTP client for handles that do not bring their own.
static DEFAULT_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .user_agent(concat!("rusty-multi/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
});

pub(crate) fn default_client() -> &'static Client {
    &DEFAULT_CLIENT
}
