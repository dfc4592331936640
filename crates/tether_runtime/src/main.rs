//! Tether Runtime
//!
//! Minimal binary that boots a script runtime with host bindings.
//!
//! Usage: `tether [script.js] [--settings settings.json]`

mod demo;

use anyhow::{Context as _, Result};
use clap::Parser;
use demo::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use tether_core::binding::{BindingCache, ConversionMode, PassThrough};
use tether_core::promise::{LoggingRejectCallback, RejectionStats};
use tether_core::TracingLogger;
use tether_script::ScriptRuntime;
use tether_services::{init_logging, Settings};

/// Boots a QuickJS runtime with host class bindings.
#[derive(Parser, Debug)]
#[command(name = "tether", version, about = "Host class bindings for QuickJS scripts")]
struct Cli {
    /// Script to run. The built-in demo runs when omitted.
    script: Option<PathBuf>,

    /// Settings file (JSON).
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };

    init_logging(&settings.logging)?;
    tracing::info!("Tether v{}", tether_core::VERSION);

    let stats = Arc::new(if settings.logging.log_rejections {
        RejectionStats::with_inner(Arc::new(LoggingRejectCallback::new(Arc::new(TracingLogger))))
    } else {
        RejectionStats::new()
    });
    let mut runtime = ScriptRuntime::with_rejection_callback(stats.clone())?;
    runtime.set_drain_jobs(settings.script.drain_jobs_after_eval);

    let cache = BindingCache::new();
    let binding = cache.bind::<Vec2>(
        settings.binding.default_proxy_mode,
        Arc::new(PassThrough),
        settings.binding.collision_policy,
    )?;
    tracing::info!(
        class = binding.target_class().name(),
        proxy_mode = %binding.policy().proxy_mode(),
        "host class bound"
    );

    match &args.script {
        Some(path) => runtime.execute_file(path)?,
        None => {
            let mut origin = Vec2 { x: 3.0, y: 4.0 };
            runtime.expose("origin", &binding, &mut origin)?;
            runtime.execute(demo::SCRIPT)?;
            let summary = runtime.eval_value("summary", ConversionMode::Transparent)?;
            tracing::info!(%summary, "demo script finished");
        }
    }
    runtime.run_pending_jobs()?;

    tracing::info!(
        rejections = stats.total(),
        unhandled = stats.unhandled(),
        "runtime shut down"
    );
    Ok(())
}
