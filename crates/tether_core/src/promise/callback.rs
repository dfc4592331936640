// callback.rs - Rejection callbacks
//
// Callbacks run synchronously on the thread that drains the runtime's job
// queue. They must not re-enter the runtime and must never unwind into it.

use crate::logger::{HostLogger, TracingLogger};
use crate::promise::{PromiseRejectEvent, RejectionEvent};
use crate::value::ScriptValue;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Receives promise rejection events from a script runtime.
pub trait PromiseRejectCallback: Send + Sync {
    fn on_rejection(&self, event: &RejectionEvent);
}

/// Default callback: one warning per event, through the host logger.
///
/// Logger failures (errors or panics) are swallowed here.
pub struct LoggingRejectCallback {
    logger: Arc<dyn HostLogger>,
}

impl LoggingRejectCallback {
    pub const MESSAGE: &'static str = "Received promise reject callback with event {0} {1}.";

    pub fn new(logger: Arc<dyn HostLogger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<dyn HostLogger> {
        &self.logger
    }
}

impl Default for LoggingRejectCallback {
    fn default() -> Self {
        Self::new(Arc::new(TracingLogger))
    }
}

impl PromiseRejectCallback for LoggingRejectCallback {
    fn on_rejection(&self, event: &RejectionEvent) {
        let kind = event.kind();
        let code = kind.code();
        let name = kind.name();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.logger.warn(Self::MESSAGE, &[&code, &name])
        }));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::debug!(error = %err, event = name, "rejection log entry dropped"),
            Err(_) => tracing::debug!(event = name, "host logger panicked; rejection log entry dropped"),
        }
    }
}

/// Aggregating callback: counts events per kind and keeps the latest reason.
#[derive(Default)]
pub struct RejectionStats {
    counts: [AtomicU64; 4],
    last_reason: Mutex<Option<ScriptValue>>,
    inner: Option<Arc<dyn PromiseRejectCallback>>,
}

impl RejectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward every event to `inner` after recording it.
    pub fn with_inner(inner: Arc<dyn PromiseRejectCallback>) -> Self {
        Self {
            inner: Some(inner),
            ..Self::default()
        }
    }

    pub fn count(&self, kind: PromiseRejectEvent) -> u64 {
        self.counts[kind.code() as usize].load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .map(|count| count.load(Ordering::Relaxed))
            .sum()
    }

    /// Rejections still lacking a handler, as far as the event stream shows.
    pub fn unhandled(&self) -> u64 {
        self.count(PromiseRejectEvent::PromiseRejectWithNoHandler)
            .saturating_sub(self.count(PromiseRejectEvent::PromiseHandlerAddedAfterReject))
    }

    /// Reason of the most recent rejection-without-handler.
    pub fn last_reason(&self) -> Option<ScriptValue> {
        self.last_reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PromiseRejectCallback for RejectionStats {
    fn on_rejection(&self, event: &RejectionEvent) {
        self.counts[event.kind().code() as usize].fetch_add(1, Ordering::Relaxed);
        if event.kind() == PromiseRejectEvent::PromiseRejectWithNoHandler {
            *self.last_reason.lock().unwrap_or_else(PoisonError::into_inner) =
                Some(event.reason().clone());
        }
        if let Some(inner) = &self.inner {
            inner.on_rejection(event);
        }
    }
}
