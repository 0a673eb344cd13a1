/// Render context: the graphics device, the diagnostic sink and the
/// application configuration, owned together.
///
/// Shaders and programs borrow the context, so the borrow checker guarantees
/// they are released before the device goes away and that nothing logs after
/// the sink has been flushed.

use std::fmt;

use crate::graphics_device::GraphicsDevice;
use crate::log::DiagnosticSink;

// ===== CONFIG =====

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Application name shown in the welcome line
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Size of the buffer compiler and linker logs are read into; longer
    /// logs are truncated
    pub info_log_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "APBR".to_string(),
            app_version: (0, 1, 0),
            info_log_capacity: 512,
        }
    }
}

impl Config {
    /// `major.minor.patch`
    pub fn version_string(&self) -> String {
        let (major, minor, patch) = self.app_version;
        format!("{}.{}.{}", major, minor, patch)
    }
}

// ===== RENDER CONTEXT =====

/// Owner of the device, sink and configuration
pub struct RenderContext {
    // Dropped in declaration order: the device goes first, then the sink
    // flushes.
    device: Box<dyn GraphicsDevice>,
    sink: DiagnosticSink,
    config: Config,
}

impl RenderContext {
    /// Wrap an initialized device and log the welcome line
    pub fn new<D: GraphicsDevice + 'static>(device: D, sink: DiagnosticSink, config: Config) -> Self {
        let ctx = Self {
            device: Box::new(device),
            sink,
            config,
        };
        ctx.display_info();
        ctx
    }

    /// Log `Welcome to <name> version <x.y.z>` at Info
    pub fn display_info(&self) {
        crate::log_info!(
            self.sink,
            "Welcome to {} version {}",
            self.config.app_name,
            self.config.version_string()
        );
    }

    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    pub fn sink(&self) -> &DiagnosticSink {
        &self.sink
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("config", &self.config)
            .field("min_severity", &self.sink.min_severity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
