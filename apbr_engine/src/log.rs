//! Diagnostic logging for the APBR engine
//!
//! This module provides the diagnostic sink every GPU object reports through:
//! - Customizable logger via Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error, Fatal)
//! - Colored line output by default
//! - Call-site tagging (file, line, column, enclosing function)
//! - Release builds drop everything below Warn
//!
//! A `DiagnosticSink` is meant to be used from the thread owning the graphics
//! context only. It is `!Sync`, so sharing one across threads does not compile.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use colored::Color;

/// Logger trait for custom logging implementations
///
/// Implement this trait to send diagnostic lines somewhere else than the
/// standard error stream (a file, an in-game console, a test buffer...).
///
/// # Example
///
/// ```no_run
/// use apbr_engine::apbr::log::{Logger, LogEntry};
///
/// struct FileLogger {
///     file: std::fs::File,
/// }
///
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Write to file...
///     }
/// }
/// ```
pub trait Logger {
    /// Log an entry
    ///
    /// # Arguments
    ///
    /// * `entry` - The log entry to process
    fn log(&self, entry: &LogEntry);

    /// Push any buffered output to the underlying stream
    fn flush(&self) {}
}

/// Where a log call was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Source file of the call
    pub file: &'static str,

    /// Line of the call
    pub line: u32,

    /// Column of the call
    pub column: u32,

    /// Fully qualified path of the enclosing function
    pub function: &'static str,
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ({}:{}) `{}`", self.file, self.line, self.column, self.function)
    }
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Log message
    pub message: String,

    /// Location of the logging call
    pub call_site: CallSite,
}

/// Log severity levels, ordered from least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogSeverity {
    /// Very verbose debug information
    Trace,

    /// Development/debugging information
    Debug,

    /// Important informational messages (default level)
    #[default]
    Info,

    /// Potential issues
    Warn,

    /// Failed operations (compile/link failures, unreadable files)
    Error,

    /// Unrecoverable setup failures
    Fatal,
}

impl LogSeverity {
    /// Every severity, lowest first
    pub const ALL: [LogSeverity; 6] = [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
        LogSeverity::Fatal,
    ];

    /// Label printed between brackets at the start of a line
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "Trace",
            LogSeverity::Debug => "Debug",
            LogSeverity::Info => "Info",
            LogSeverity::Warn => "Warn",
            LogSeverity::Error => "Error",
            LogSeverity::Fatal => "Fatal",
        }
    }

    /// Terminal color of a whole line at this severity
    pub fn color(self) -> Color {
        match self {
            LogSeverity::Trace => Color::White,
            LogSeverity::Debug => Color::Blue,
            LogSeverity::Info => Color::BrightGreen,
            LogSeverity::Warn => Color::Yellow,
            LogSeverity::Error => Color::Red,
            LogSeverity::Fatal => Color::Magenta,
        }
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Build flavour deciding which severities reach the logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildProfile {
    /// Unoptimized build, everything is logged
    Debug,
    /// Optimized build, only Warn and above are logged
    Release,
}

impl BuildProfile {
    /// Profile of the binary being compiled
    pub const fn current() -> Self {
        if cfg!(debug_assertions) {
            BuildProfile::Debug
        } else {
            BuildProfile::Release
        }
    }

    /// Lowest severity that gets through
    pub const fn min_severity(self) -> LogSeverity {
        match self {
            BuildProfile::Debug => LogSeverity::Trace,
            BuildProfile::Release => LogSeverity::Warn,
        }
    }
}

/// Render an entry as a single uncolored line (without trailing newline)
///
/// Format: `[LEVEL] timestamp | file: (line:col) `function` | message`
pub fn format_entry(entry: &LogEntry) -> String {
    let datetime: DateTime<Local> = entry.timestamp.into();
    format!(
        "[{}] {} | {} | {}",
        entry.severity,
        datetime.format("%Y-%m-%d %H:%M:%S%.3f %Z"),
        entry.call_site,
        entry.message
    )
}

/// Render an entry wrapped in the ANSI color of its severity, reset after
///
/// The escape codes are always emitted, whatever the terminal detection of
/// `colored` decides for stdout: the line may go to stderr or to any writer.
pub fn colorize_entry(entry: &LogEntry) -> String {
    format!(
        "\x1b[{}m{}\x1b[0m",
        entry.severity.color().to_fg_str(),
        format_entry(entry)
    )
}

/// Default logger implementation using colored standard error output
///
/// Colors:
/// - Trace: light gray
/// - Debug: blue
/// - Info: green
/// - Warn: yellow
/// - Error: red
/// - Fatal: magenta
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        eprintln!("{}", colorize_entry(entry));
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Logger writing one line per entry to any `Write` implementation
pub struct WriterLogger<W: Write> {
    writer: RefCell<W>,
    colorize: bool,
}

impl<W: Write> WriterLogger<W> {
    /// Colored output
    pub fn new(writer: W) -> Self {
        Self {
            writer: RefCell::new(writer),
            colorize: true,
        }
    }

    /// Plain output, for files and pipes
    pub fn plain(writer: W) -> Self {
        Self {
            writer: RefCell::new(writer),
            colorize: false,
        }
    }

    /// Give the writer back
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write> Logger for WriterLogger<W> {
    fn log(&self, entry: &LogEntry) {
        let mut writer = self.writer.borrow_mut();
        // A logger has nowhere to report its own write failures.
        let _ = if self.colorize {
            writeln!(writer, "{}", colorize_entry(entry))
        } else {
            writeln!(writer, "{}", format_entry(entry))
        };
    }

    fn flush(&self) {
        let _ = self.writer.borrow_mut().flush();
    }
}

/// Logger keeping every entry in memory
///
/// Clones share the same buffer: hand one clone to a `DiagnosticSink` and keep
/// another to inspect what was logged.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    entries: Rc<RefCell<Vec<LogEntry>>>,
    flushes: Rc<Cell<usize>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded entries
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Number of entries at exactly `severity`
    pub fn count(&self, severity: LogSeverity) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.severity == severity)
            .count()
    }

    /// Whether an entry at `severity` mentions `needle`
    pub fn contains(&self, severity: LogSeverity, needle: &str) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|entry| entry.severity == severity && entry.message.contains(needle))
    }

    /// How many times the logger was flushed
    pub fn flush_count(&self) -> usize {
        self.flushes.get()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl Logger for MemoryLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.borrow_mut().push(entry.clone());
    }

    fn flush(&self) {
        self.flushes.set(self.flushes.get() + 1);
    }
}

/// The diagnostic sink shader objects and programs report through
///
/// Owns its logger for its whole lifetime and flushes it when dropped. The
/// severity threshold comes from the build profile and never changes after
/// construction.
///
/// # Example
///
/// ```no_run
/// use apbr_engine::apbr::log::{DiagnosticSink, DefaultLogger};
/// use apbr_engine::log_info;
///
/// let sink = DiagnosticSink::new(DefaultLogger);
/// log_info!(sink, "Loaded {} shaders", 2);
/// ```
pub struct DiagnosticSink {
    logger: Box<dyn Logger>,
    min_severity: LogSeverity,
}

impl DiagnosticSink {
    /// Sink filtering according to the current build profile
    pub fn new<L: Logger + 'static>(logger: L) -> Self {
        Self::with_profile(logger, BuildProfile::current())
    }

    /// Sink filtering as if built with `profile`
    ///
    /// For tests only: it lets a debug test binary exercise the release
    /// policy. Applications use [`DiagnosticSink::new`], whose threshold is
    /// fixed by the build.
    #[doc(hidden)]
    pub fn with_profile<L: Logger + 'static>(logger: L, profile: BuildProfile) -> Self {
        Self {
            logger: Box::new(logger),
            min_severity: profile.min_severity(),
        }
    }

    /// Sink writing colored lines to standard error
    pub fn stderr() -> Self {
        Self::new(DefaultLogger)
    }

    /// Whether a record at `severity` would be written
    pub fn enabled(&self, severity: LogSeverity) -> bool {
        severity >= self.min_severity
    }

    /// Lowest severity that gets through
    pub fn min_severity(&self) -> LogSeverity {
        self.min_severity
    }

    /// Log a message
    ///
    /// Prefer the `log_*!` macros, which capture the call site and skip
    /// formatting when the severity is filtered out.
    pub fn log(&self, severity: LogSeverity, message: impl Into<String>, call_site: CallSite) {
        if !self.enabled(severity) {
            return;
        }

        self.logger.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            message: message.into(),
            call_site,
        });
    }

    /// Log a message at the default severity (Info)
    pub fn log_message(&self, message: impl Into<String>, call_site: CallSite) {
        self.log(LogSeverity::default(), message, call_site);
    }

    pub fn flush(&self) {
        self.logger.flush();
    }

    /// Flush and tear the sink down
    pub fn shutdown(self) {}
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::stderr()
    }
}

impl Drop for DiagnosticSink {
    fn drop(&mut self) {
        self.logger.flush();
    }
}

// ===== LOGGING MACROS =====

/// Fully qualified path of the enclosing function
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        match name.strip_suffix("::__here") {
            Some(function) => function,
            None => name,
        }
    }};
}

/// `CallSite` of the macro invocation
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::log::CallSite {
            file: file!(),
            line: line!(),
            column: column!(),
            function: $crate::function_name!(),
        }
    };
}

/// Log a message at an explicit severity
///
/// # Example
///
/// ```no_run
/// # use apbr_engine::apbr::log::{DiagnosticSink, LogSeverity};
/// # let sink = DiagnosticSink::stderr();
/// apbr_engine::log_at!(sink, LogSeverity::Warn, "{} fps", 12);
/// ```
#[macro_export]
macro_rules! log_at {
    ($sink:expr, $severity:expr, $($arg:tt)+) => {{
        let sink: &$crate::log::DiagnosticSink = &$sink;
        let severity: $crate::log::LogSeverity = $severity;
        if sink.enabled(severity) {
            sink.log(severity, format!($($arg)+), $crate::call_site!());
        }
    }};
}

/// Log a TRACE message
#[macro_export]
macro_rules! log_trace {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log_at!($sink, $crate::log::LogSeverity::Trace, $($arg)+)
    };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! log_debug {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log_at!($sink, $crate::log::LogSeverity::Debug, $($arg)+)
    };
}

/// Log an INFO message
#[macro_export]
macro_rules! log_info {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log_at!($sink, $crate::log::LogSeverity::Info, $($arg)+)
    };
}

/// Log a WARN message
#[macro_export]
macro_rules! log_warn {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log_at!($sink, $crate::log::LogSeverity::Warn, $($arg)+)
    };
}

/// Log an ERROR message
#[macro_export]
macro_rules! log_error {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log_at!($sink, $crate::log::LogSeverity::Error, $($arg)+)
    };
}

/// Log a FATAL message
#[macro_export]
macro_rules! log_fatal {
    ($sink:expr, $($arg:tt)+) => {
        $crate::log_at!($sink, $crate::log::LogSeverity::Fatal, $($arg)+)
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
