//! Error types for the APBR engine
//!
//! Compile and link failures are expected outcomes and are reported through
//! the diagnostic sink plus a `bool`. The errors below cover what a caller
//! cannot simply retry: unreadable files on the strict loading path, and
//! graphics context/loader setup failures.

use std::path::PathBuf;
use std::process::ExitCode;

use crate::log::DiagnosticSink;

/// Result type for APBR engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// APBR engine errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A shader source file could not be read
    #[error("Shader file target `{}` could not be read: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The GPU function loader could not resolve required entry points
    #[error("Graphics loader failed: {0}")]
    LoaderFailed(String),

    /// Window or graphics context creation failed
    #[error("Context creation failed: {0}")]
    ContextCreation(String),
}

impl Error {
    /// Whether the process has no meaningful way to continue
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::LoaderFailed(_) | Error::ContextCreation(_))
    }
}

/// Report an error at Fatal severity and produce the exit code `main` should return
///
/// The sink is flushed before returning so the line is not lost when the
/// process ends.
///
/// # Example
///
/// ```no_run
/// use apbr_engine::apbr::{report_fatal, Error};
/// use apbr_engine::apbr::log::DiagnosticSink;
///
/// fn main() -> std::process::ExitCode {
///     let sink = DiagnosticSink::stderr();
///     let error = Error::ContextCreation("no display".to_string());
///     report_fatal(&sink, &error)
/// }
/// ```
pub fn report_fatal(sink: &DiagnosticSink, error: &Error) -> ExitCode {
    crate::log_fatal!(sink, "{}", error);
    sink.flush();
    ExitCode::FAILURE
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
