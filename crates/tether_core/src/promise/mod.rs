//! Promise rejection routing.
//!
//! A script runtime reports rejection-related promise transitions as
//! [`RejectionEvent`]s; a [`PromiseRejectCallback`] decides what the host
//! does with them.

mod callback;
mod event;

pub use callback::{LoggingRejectCallback, PromiseRejectCallback, RejectionStats};
pub use event::{PromiseRejectEvent, RejectionEvent};
