// batch/mod.rs

pub mod code;
pub mod executor;

// Re-export so callers reach everything from the crate root.
pub use code::{classify, TransferCode};
pub use executor::{Callback, CallbackError, TransferBatch};
