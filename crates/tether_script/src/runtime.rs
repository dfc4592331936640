//! Script runtime management
//!
//! Wraps a QuickJS runtime plus one full context. Rejections raised while
//! evaluating or while draining the job queue are delivered to the installed
//! `PromiseRejectCallback`.

use crate::bind::snapshot_object;
use crate::convert::{from_js, to_js};
use crate::error::ScriptError;
use crate::tracker::rejection_tracker;
use rquickjs::function::Rest;
use rquickjs::{CatchResultExt, CaughtError, Context, Function, Runtime, Value};
use std::any::Any;
use std::path::Path;
use std::sync::Arc;
use tether_core::binding::{ClassBinding, ConversionMode};
use tether_core::promise::PromiseRejectCallback;
use tether_core::ScriptValue;

/// Script execution context
pub struct ScriptRuntime {
    runtime: Runtime,
    pub context: Context,
    drain_jobs: bool,
}

impl ScriptRuntime {
    pub fn new() -> Result<Self, ScriptError> {
        let runtime = Runtime::new()?;
        let context = Context::full(&runtime)?;

        Ok(Self {
            runtime,
            context,
            drain_jobs: true,
        })
    }

    /// Create a runtime with `callback` installed as the rejection tracker.
    pub fn with_rejection_callback(
        callback: Arc<dyn PromiseRejectCallback>,
    ) -> Result<Self, ScriptError> {
        let runtime = Self::new()?;
        runtime.set_rejection_callback(Some(callback));
        Ok(runtime)
    }

    /// Install or remove the rejection callback.
    pub fn set_rejection_callback(&self, callback: Option<Arc<dyn PromiseRejectCallback>>) {
        tracing::debug!(installed = callback.is_some(), "promise rejection tracker updated");
        self.runtime
            .set_host_promise_rejection_tracker(callback.map(rejection_tracker));
    }

    /// Whether `execute` and friends drain the job queue afterwards.
    pub fn set_drain_jobs(&mut self, drain: bool) {
        self.drain_jobs = drain;
    }

    pub fn execute_file(&self, path: &Path) -> Result<(), ScriptError> {
        let source = std::fs::read_to_string(path)?;
        tracing::info!(path = %path.display(), "executing script file");
        self.execute(&source)
    }

    pub fn execute(&self, source: &str) -> Result<(), ScriptError> {
        self.context.with(|ctx| {
            ctx.eval::<(), _>(source)
                .catch(&ctx)
                .map_err(caught_error)
        })?;
        self.drain_if_enabled()
    }

    /// Evaluate `source` and copy the result out under `mode`.
    pub fn eval_value(&self, source: &str, mode: ConversionMode) -> Result<ScriptValue, ScriptError> {
        let value = self.context.with(|ctx| {
            let value = ctx
                .eval::<Value, _>(source)
                .catch(&ctx)
                .map_err(caught_error)?;
            Ok::<_, ScriptError>(from_js(&value, mode)?)
        })?;
        self.drain_if_enabled()?;
        Ok(value)
    }

    /// Call a global JavaScript function by name.
    pub fn call_function(&self, name: &str, args: &[ScriptValue]) -> Result<ScriptValue, ScriptError> {
        let result = self.context.with(|ctx| {
            let func: Function = ctx.globals().get(name)?;
            let args = args
                .iter()
                .map(|arg| to_js(&ctx, arg))
                .collect::<rquickjs::Result<Vec<_>>>()?;
            let value = func
                .call::<_, Value>((Rest(args),))
                .catch(&ctx)
                .map_err(caught_error)?;
            Ok::<_, ScriptError>(from_js(&value, ConversionMode::Transparent)?)
        })?;
        self.drain_if_enabled()?;
        Ok(result)
    }

    /// Publish a snapshot of a bound instance as global `name`.
    pub fn expose(
        &self,
        name: &str,
        binding: &ClassBinding,
        receiver: &mut dyn Any,
    ) -> Result<(), ScriptError> {
        self.context.with(|ctx| {
            let object = snapshot_object(&ctx, binding, receiver)?;
            ctx.globals().set(name, object)?;
            Ok(())
        })
    }

    /// Run queued promise jobs until the queue is empty. Returns the number
    /// of jobs executed.
    pub fn run_pending_jobs(&self) -> Result<usize, ScriptError> {
        let mut executed = 0;
        loop {
            match self.runtime.execute_pending_job() {
                Ok(true) => executed += 1,
                Ok(false) => break,
                Err(failure) => {
                    let message = failure.0.with(|ctx| describe(&ctx.catch()));
                    tracing::warn!(%message, "pending job raised an exception");
                    return Err(ScriptError::Job(message));
                }
            }
        }
        if executed > 0 {
            tracing::trace!(executed, "drained pending jobs");
        }
        Ok(executed)
    }

    fn drain_if_enabled(&self) -> Result<(), ScriptError> {
        if self.drain_jobs {
            self.run_pending_jobs()?;
        }
        Ok(())
    }
}

impl Default for ScriptRuntime {
    fn default() -> Self {
        Self::new().expect("Failed to create script runtime")
    }
}

fn caught_error(err: CaughtError<'_>) -> ScriptError {
    match err {
        CaughtError::Error(err) => ScriptError::Engine(err),
        CaughtError::Exception(exception) => {
            ScriptError::Exception(exception.message().unwrap_or_else(|| exception.to_string()))
        }
        CaughtError::Value(value) => ScriptError::Exception(describe(&value)),
    }
}

fn describe(value: &Value<'_>) -> String {
    from_js(value, ConversionMode::Transparent)
        .map(|converted| converted.to_string())
        .unwrap_or_else(|_| value.type_name().to_string())
}
