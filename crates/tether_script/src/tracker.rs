//! Host promise rejection tracker
//!
//! QuickJS reports two transitions: a promise rejected with no handler
//! attached, and a handler attached to an already rejected promise.

use crate::convert::from_js_shallow;
use rquickjs::runtime::RejectionTracker;
use rquickjs::{Ctx, Value};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tether_core::promise::{PromiseRejectCallback, PromiseRejectEvent, RejectionEvent};

/// Event kind for the engine's `is_handled` flag.
pub fn event_kind(is_handled: bool) -> PromiseRejectEvent {
    if is_handled {
        PromiseRejectEvent::PromiseHandlerAddedAfterReject
    } else {
        PromiseRejectEvent::PromiseRejectWithNoHandler
    }
}

/// Wrap `callback` as an engine rejection tracker.
///
/// The callback never sees engine handles, only shallow copies: containers
/// arrive opaque and no script code runs while building the event. A
/// panicking callback is contained here.
pub fn rejection_tracker(callback: Arc<dyn PromiseRejectCallback>) -> RejectionTracker {
    Box::new(
        move |_ctx: Ctx<'_>, promise: Value<'_>, reason: Value<'_>, is_handled: bool| {
            let event = RejectionEvent::new(
                event_kind(is_handled),
                from_js_shallow(&promise),
                from_js_shallow(&reason),
            );
            let delivered =
                panic::catch_unwind(AssertUnwindSafe(|| callback.on_rejection(&event)));
            if delivered.is_err() {
                tracing::debug!(event = event.kind().name(), "rejection callback panicked");
            }
        },
    )
}
