/*!
# APBR Engine

Shader lifecycle and diagnostics core of the APBR renderer.

This crate turns shader source text into owned, leak-free GPU shader units and
linked programs, and reports every compile and link outcome through a leveled,
colorized, call-site-tagged diagnostic sink. It never talks to a GPU API
directly: all GPU work goes through the `GraphicsDevice` trait, implemented for
OpenGL by `apbr_engine_renderer_gl` and in memory by `MockGraphicsDevice`.

## Architecture

- **RenderContext**: Owns the graphics device, the diagnostic sink and the config
- **Shader**: One compiled shader unit (vertex or fragment)
- **ShaderProgram**: Linked program; uniforms and activation
- **DiagnosticSink**: Severity-filtered logging with `log_*!` macros
- **GraphicsDevice**: GPU context seam

Window and context creation, buffers, textures and the render loop belong to
the application.
*/

// Internal modules
mod error;
pub mod context;
pub mod graphics_device;
pub mod log;
pub mod program;
pub mod shader;

// Main apbr namespace module
pub mod apbr {
    // Error types
    pub use crate::error::{report_fatal, Error, Result};

    // Context
    pub use crate::context::{Config, RenderContext};

    // Shaders and programs
    pub use crate::program::ShaderProgram;
    pub use crate::shader::{Shader, ShaderStage};

    // Logging sub-module (types only; the log_*! macros live at the crate root)
    pub mod log {
        pub use crate::log::{
            BuildProfile, CallSite, DefaultLogger, DiagnosticSink, LogEntry, LogSeverity, Logger,
            MemoryLogger, WriterLogger,
        };
    }

    // GPU device seam
    pub mod device {
        pub use crate::graphics_device::mock_graphics_device::UniformUpload;
        pub use crate::graphics_device::{
            truncate_info_log, GraphicsDevice, Handle, MockGraphicsDevice, UniformValue,
            INVALID_UNIFORM_LOCATION, NULL_HANDLE,
        };
    }
}

// Re-export math library at crate root
pub use glam;
