//! Tether Scripting
//!
//! QuickJS integration for the binding engine.
//!
//! ## Architecture
//!
//! - **Runtime:** `ScriptRuntime` owns a QuickJS runtime and one full context
//! - **Rejections:** the engine's host promise rejection tracker forwards to a
//!   `PromiseRejectCallback`
//! - **Values:** engine values are copied into `ScriptValue` under the bound
//!   class's conversion mode

pub mod bind;
pub mod convert;
pub mod error;
pub mod runtime;
pub mod tracker;

pub use error::ScriptError;
pub use runtime::ScriptRuntime;

pub use rquickjs;
