//! Host logger capability
//!
//! Binding components never write to a sink directly; they hand a positional
//! message template (`{0}`, `{1}`, ...) plus arguments to a [`HostLogger`].
//! [`TracingLogger`] is the default implementation and forwards to `tracing`.

use std::fmt::{self, Display, Write};
use thiserror::Error;

/// Severity accepted by [`HostLogger::log`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("placeholder {{{index}}} has no matching argument ({count} supplied)")]
    MissingArgument { index: usize, count: usize },

    #[error("malformed placeholder at byte {position}")]
    MalformedPlaceholder { position: usize },

    #[error("log sink failed: {0}")]
    Sink(String),
}

/// Logging capability consumed by the binding engine.
pub trait HostLogger: Send + Sync {
    /// Emit one entry. `template` uses positional `{N}` placeholders.
    fn log(&self, level: LogLevel, template: &str, args: &[&dyn Display])
        -> Result<(), LoggerError>;

    fn debug(&self, template: &str, args: &[&dyn Display]) -> Result<(), LoggerError> {
        self.log(LogLevel::Debug, template, args)
    }

    fn info(&self, template: &str, args: &[&dyn Display]) -> Result<(), LoggerError> {
        self.log(LogLevel::Info, template, args)
    }

    fn warn(&self, template: &str, args: &[&dyn Display]) -> Result<(), LoggerError> {
        self.log(LogLevel::Warn, template, args)
    }

    fn error(&self, template: &str, args: &[&dyn Display]) -> Result<(), LoggerError> {
        self.log(LogLevel::Error, template, args)
    }
}

/// Render a positional template. Placeholders may repeat or appear out of order.
pub fn format_template(template: &str, args: &[&dyn Display]) -> Result<String, LoggerError> {
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut rest = template;
    let mut offset = 0;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let position = offset + open;
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or(LoggerError::MalformedPlaceholder { position })?;
        let index: usize = after[..close]
            .parse()
            .map_err(|_| LoggerError::MalformedPlaceholder { position })?;
        let arg = args.get(index).ok_or(LoggerError::MissingArgument {
            index,
            count: args.len(),
        })?;
        write!(out, "{arg}").map_err(|err| LoggerError::Sink(err.to_string()))?;

        let consumed = open + 1 + close + 1;
        rest = &rest[consumed..];
        offset += consumed;
    }
    out.push_str(rest);
    Ok(out)
}

/// Default [`HostLogger`] backed by `tracing` under the `tether::host` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl HostLogger for TracingLogger {
    fn log(
        &self,
        level: LogLevel,
        template: &str,
        args: &[&dyn Display],
    ) -> Result<(), LoggerError> {
        let message = format_template(template, args)?;
        match level {
            LogLevel::Debug => tracing::debug!(target: "tether::host", "{}", message),
            LogLevel::Info => tracing::info!(target: "tether::host", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "tether::host", "{}", message),
            LogLevel::Error => tracing::error!(target: "tether::host", "{}", message),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_template() {
        let rendered = format_template("event {0} {1}.", &[&0, &"PromiseRejectWithNoHandler"]).unwrap();
        assert_eq!(rendered, "event 0 PromiseRejectWithNoHandler.");

        let reordered = format_template("{1}-{0}-{1}", &[&"a", &"b"]).unwrap();
        assert_eq!(reordered, "b-a-b");

        assert_eq!(format_template("no placeholders", &[]).unwrap(), "no placeholders");
    }

    #[test]
    fn test_format_template_errors() {
        assert!(matches!(
            format_template("{2}", &[&1]),
            Err(LoggerError::MissingArgument { index: 2, count: 1 })
        ));
        assert!(matches!(
            format_template("ab {x}", &[&1]),
            Err(LoggerError::MalformedPlaceholder { position: 3 })
        ));
        assert!(matches!(
            format_template("open {0", &[&1]),
            Err(LoggerError::MalformedPlaceholder { position: 5 })
        ));
    }

    #[test]
    fn tracing_logger_accepts_entries_without_subscriber() {
        let logger = TracingLogger;
        assert!(logger.warn("value {0}", &[&42]).is_ok());
        assert!(logger.info("missing {1}", &[&42]).is_err());
    }
}
