use crate::binding::Collision;
use thiserror::Error;

/// Errors raised while building or publishing a class descriptor.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("class '{class}' has {} conflicting member claim(s)", .collisions.len())]
    Collisions {
        class: &'static str,
        collisions: Vec<Collision>,
    },

    #[error("cannot redirect binding from '{from}' to incompatible class '{to}'")]
    IncompatibleRedirect { from: &'static str, to: &'static str },

    #[error("policy targets '{policy}' but descriptor targets '{descriptor}'")]
    ClassMismatch {
        policy: &'static str,
        descriptor: &'static str,
    },
}

/// Precondition violations when assembling a proxy policy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("proxy policy for class '{class}' requires an interception strategy")]
    MissingStrategy { class: &'static str },
}

/// Failures while invoking a host member on behalf of script code.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InvokeError {
    #[error("receiver is not an instance of {expected}")]
    ReceiverMismatch { expected: &'static str },

    #[error("'{member}' does not accept {count} argument(s)")]
    ArityMismatch { member: String, count: usize },

    #[error("argument {index} expected {expected}, found {found}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field '{name}' is read-only")]
    ReadOnly { name: String },

    #[error("{0}")]
    Host(String),
}
