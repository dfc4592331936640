//! Tether Core
//!
//! Host binding engine shared by every script runtime integration:
//! - Member registry (per-class descriptor tables, two-phase build)
//! - Proxy policy (proxy mode, conversion mode, interception strategy)
//! - Member resolution and the per-class binding cache
//! - Promise rejection routing to the host logger

pub mod binding;
pub mod logger;
pub mod promise;
pub mod value;

pub use binding::{
    BindingCache, ClassBinding, ClassDescriptor, ClassDescriptorBuilder, ClassRef, ConversionMode,
    HostClass, ProxyMode, ProxyPolicy,
};
pub use logger::{HostLogger, LogLevel, LoggerError, TracingLogger};
pub use promise::{
    LoggingRejectCallback, PromiseRejectCallback, PromiseRejectEvent, RejectionEvent,
    RejectionStats,
};
pub use value::ScriptValue;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
