//! Store errors and the out-of-band reporting channel.
//!
//! Store failures never reach the caller that issued the write. They are
//! logged and forwarded to an [`ErrorReporter`], and whoever holds the
//! matching [`ErrorReports`] decides what to show.

use derive_more::{Display, Error};
use tokio::sync::mpsc;
use tracing::{instrument, warn};

/// Source location an error was raised at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("{}:{}", file, line)]
pub struct ErrorLocation {
    /// Source file where error occurred.
    pub file: &'static str,
    /// Line number where error occurred.
    pub line: u32,
}

impl ErrorLocation {
    /// Location of the caller, looking through `#[track_caller]` frames.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = std::panic::Location::caller();
        Self {
            file: loc.file(),
            line: loc.line(),
        }
    }
}

/// Document store error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error: {} at {}", message, location)]
pub struct StoreError {
    /// Error message.
    pub message: String,
    /// Where the error was raised.
    pub location: ErrorLocation,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }
}

/// A failed background write, tagged with what was being written.
#[derive(Debug, Clone, Display)]
#[display("{}: {}", operation, error)]
pub struct ErrorReport {
    /// Short name of the failed operation, e.g. `append_record`.
    pub operation: &'static str,
    /// The underlying failure.
    pub error: StoreError,
}

/// Sending half of the out-of-band error channel.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    tx: mpsc::UnboundedSender<ErrorReport>,
}

/// Receiving half of the out-of-band error channel.
pub type ErrorReports = mpsc::UnboundedReceiver<ErrorReport>;

impl ErrorReporter {
    /// Creates a reporter and the receiver its reports arrive on.
    pub fn channel() -> (Self, ErrorReports) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// A reporter whose reports are only logged.
    pub fn detached() -> Self {
        Self::channel().0
    }

    /// Logs the failure and forwards it to the receiver, if one is listening.
    #[instrument(skip(self, error), fields(error = %error))]
    pub fn report(&self, operation: &'static str, error: StoreError) {
        warn!(operation, error = %error, "Background store write failed");
        // A dropped receiver means nobody wants reports; the log line stands.
        let _ = self.tx.send(ErrorReport { operation, error });
    }
}
