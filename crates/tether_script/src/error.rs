use tether_core::binding::InvokeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script engine error: {0}")]
    Engine(#[from] rquickjs::Error),

    /// A script threw; carries the rendered exception.
    #[error("uncaught exception: {0}")]
    Exception(String),

    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),

    #[error("pending job failed: {0}")]
    Job(String),

    #[error(transparent)]
    Invoke(#[from] InvokeError),
}
