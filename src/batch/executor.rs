use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::runtime::Builder;

use crate::batch::TransferCode;
use crate::debug::debug_log;
use crate::error::BatchError;
use crate::transfer::TransferHandle;

/// Error a callback hands back when it cannot complete.
///
/// Callbacks are expected not to fail; one that does aborts the whole batch
/// (see [`TransferBatch::run`]).
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Completion callback: gets the finished handle and its terminal code.
pub type Callback = Box<dyn FnOnce(&mut TransferHandle, TransferCode) -> Result<(), CallbackError>>;

struct Registration {
    handle: Option<TransferHandle>,
    on_success: Option<Callback>,
    on_failure: Option<Callback>,
}

/// A set of registered transfers driven to completion by one [`run`] call.
///
/// Register preinitialized transfer handles with optional success and
/// failure callbacks, then call the blocking [`run`]. Every handle is driven
/// concurrently on a single thread; as each transfer concludes, the callback
/// matching its outcome fires exactly once, and the handle is released right
/// after. Callbacks across different handles fire in completion order, not
/// registration order.
///
/// [`run`]: TransferBatch::run
#[derive(Default)]
pub struct TransferBatch {
    registrations: Vec<Registration>,
}

impl TransferBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a not-yet-started handle to the batch. No I/O happens here.
    ///
    /// A `None` callback is valid and skips dispatch for that outcome.
    pub fn register(
        &mut self,
        handle: TransferHandle,
        on_success: Option<Callback>,
        on_failure: Option<Callback>,
    ) {
        self.registrations.push(Registration {
            handle: Some(handle),
            on_success,
            on_failure,
        });
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Drives every registered transfer to completion, blocking the calling
    /// thread until the last one has concluded and been released.
    ///
    /// Transfer failures are not errors: they are delivered to the matching
    /// `on_failure` callback as a [`TransferCode`] and the batch keeps
    /// going. The only error paths out of here are a driver runtime that
    /// will not start and a callback returning `Err` — the latter stops the
    /// batch, releases every remaining handle, and surfaces the callback's
    /// error unchanged.
    ///
    /// Must not be called from inside an async runtime; it owns its own.
    pub fn run(mut self) -> Result<(), BatchError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BatchError::Runtime)?;
        runtime.block_on(self.drive())
    }

    async fn drive(&mut self) -> Result<(), BatchError> {
        let mut in_flight: FuturesUnordered<BoxFuture<'static, (usize, TransferHandle, TransferCode)>> =
            FuturesUnordered::new();

        for (index, registration) in self.registrations.iter_mut().enumerate() {
            if let Some(mut handle) = registration.handle.take() {
                in_flight.push(Box::pin(async move {
                    let code = handle.perform().await;
                    (index, handle, code)
                }));
            }
        }

        while let Some((index, mut handle, code)) = in_flight.next().await {
            debug_log(&handle, code);

            // The completion carries the registration index, so the finished
            // handle maps straight back to its callbacks.
            let registration = &mut self.registrations[index];
            let callback = if code.is_success() {
                registration.on_success.take()
            } else {
                registration.on_failure.take()
            };

            let dispatched = match callback {
                Some(callback) => callback(&mut handle, code),
                None => Ok(()),
            };
            drop(handle);

            if let Err(err) = dispatched {
                // Dropping the driver cancels and releases everything still
                // in flight; the callback's own error is the one to surface.
                drop(in_flight);
                self.registrations.clear();
                return Err(BatchError::Callback(err));
            }
        }

        self.registrations.clear();
        Ok(())
    }
}
