//! Non-blocking store writes.

use std::future::Future;

use tokio::task::JoinHandle;
use tracing::{Instrument, debug, debug_span, warn};

use crate::{ErrorReporter, StoreError};

/// Handle to a write running in the background.
///
/// Dropping it leaves the write running. Awaiting it only waits for
/// completion; failures have already gone to the [`ErrorReporter`].
#[derive(Debug)]
pub struct PendingWrite {
    handle: JoinHandle<()>,
}

impl PendingWrite {
    /// Waits until the write has finished, successfully or not.
    pub async fn settled(self) {
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Background write task did not complete");
        }
    }
}

/// Spawns `write` on the runtime and returns immediately.
pub(crate) fn dispatch<F>(operation: &'static str, reporter: ErrorReporter, write: F) -> PendingWrite
where
    F: Future<Output = Result<(), StoreError>> + Send + 'static,
{
    let span = debug_span!("dispatch", operation);
    let handle = tokio::spawn(
        async move {
            match write.await {
                Ok(()) => debug!("Write settled"),
                Err(e) => reporter.report(operation, e),
            }
        }
        .instrument(span),
    );
    PendingWrite { handle }
}
