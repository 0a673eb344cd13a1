/// Shader objects: one GPU compilation unit of a given stage.
///
/// A `Shader` owns its GPU handle and borrows the `RenderContext` that created
/// it, so it can never outlive the device or the diagnostic sink. Compilation
/// outcomes are reported through the sink and returned as `bool`: a failed
/// compile is an expected outcome, not an `Error`.
///
/// A unit that fails to compile is released immediately; the `Shader` value
/// stays usable as a "released" shader (handle 0) and its `Drop` does nothing.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::context::RenderContext;
use crate::error::{Error, Result};
use crate::graphics_device::{Handle, NULL_HANDLE};

// ===== SHADER STAGE =====

/// Pipeline stage a shader unit is compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// `GL_VERTEX_SHADER`
    pub const VERTEX_RAW: u32 = 0x8B31;
    /// `GL_FRAGMENT_SHADER`
    pub const FRAGMENT_RAW: u32 = 0x8B30;

    /// Stage for a raw GPU stage code, `None` if unrecognized
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            Self::VERTEX_RAW => Some(ShaderStage::Vertex),
            Self::FRAGMENT_RAW => Some(ShaderStage::Fragment),
            _ => None,
        }
    }

    pub fn to_raw(self) -> u32 {
        match self {
            ShaderStage::Vertex => Self::VERTEX_RAW,
            ShaderStage::Fragment => Self::FRAGMENT_RAW,
        }
    }

    /// Stage guessed from a file extension (`.vert`, `.vs`, `.frag`, `.fs`)
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "vert" | "vs" => Some(ShaderStage::Vertex),
            "frag" | "fs" => Some(ShaderStage::Fragment),
            _ => None,
        }
    }

    /// Name used in diagnostics
    pub fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "VERTEX",
            ShaderStage::Fragment => "FRAGMENT",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label of the sentinel "no compilation unit" state
pub const UNKNOWN_STAGE_LABEL: &str = "UNKNOWN";

// ===== SHADER =====

/// One GPU shader unit
pub struct Shader<'ctx> {
    ctx: &'ctx RenderContext,
    /// `None` only for the sentinel built from an unrecognized stage
    stage: Option<ShaderStage>,
    handle: Handle,
    compiled: bool,
}

impl<'ctx> Shader<'ctx> {
    /// Allocate an empty, uncompiled shader unit
    pub fn new(ctx: &'ctx RenderContext, stage: ShaderStage) -> Self {
        let handle = ctx.device().create_shader(stage);
        crate::log_trace!(ctx.sink(), "SHADER::{}::CREATED: id {}", stage, handle);

        Self {
            ctx,
            stage: Some(stage),
            handle,
            compiled: false,
        }
    }

    /// Allocate a shader unit from a raw GPU stage code
    ///
    /// An unrecognized code is logged at Warn and yields the sentinel state:
    /// no handle, stage label `UNKNOWN`, every compile attempt refused.
    pub fn from_raw_stage(ctx: &'ctx RenderContext, raw_stage: u32) -> Self {
        match ShaderStage::from_raw(raw_stage) {
            Some(stage) => Self::new(ctx, stage),
            None => {
                crate::log_warn!(
                    ctx.sink(),
                    "SHADER::{}::UNRECOGNIZED STAGE 0x{:04X}: no compilation unit created",
                    UNKNOWN_STAGE_LABEL,
                    raw_stage
                );
                Self::sentinel(ctx)
            }
        }
    }

    /// Allocate a shader unit and compile `source` into it
    pub fn with_source(ctx: &'ctx RenderContext, stage: ShaderStage, source: &str) -> Self {
        let mut shader = Self::new(ctx, stage);
        shader.compile(source);
        shader
    }

    /// Read `path` and compile its content
    ///
    /// An unreadable file is logged at Error and empty content is compiled
    /// instead, so the caller still gets a (failed) shader back. Use
    /// [`Shader::try_from_file`] to stop on read errors.
    pub fn from_file(ctx: &'ctx RenderContext, stage: ShaderStage, path: impl AsRef<Path>) -> Self {
        match read_source(path.as_ref()) {
            Ok(source) => Self::with_source(ctx, stage, &source),
            Err(err) => {
                crate::log_error!(ctx.sink(), "{}", err);
                Self::with_source(ctx, stage, "")
            }
        }
    }

    /// Read `path` and compile its content; read errors are returned
    ///
    /// No GPU handle is allocated when the file cannot be read.
    pub fn try_from_file(
        ctx: &'ctx RenderContext,
        stage: ShaderStage,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let source = read_source(path.as_ref())?;
        Ok(Self::with_source(ctx, stage, &source))
    }

    /// Like [`Shader::from_file`], with the stage taken from the file extension
    pub fn from_path(ctx: &'ctx RenderContext, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match ShaderStage::from_path(path) {
            Some(stage) => Self::from_file(ctx, stage, path),
            None => {
                crate::log_warn!(
                    ctx.sink(),
                    "SHADER::{}::UNRECOGNIZED EXTENSION: `{}`",
                    UNKNOWN_STAGE_LABEL,
                    path.display()
                );
                Self::sentinel(ctx)
            }
        }
    }

    pub fn vertex(ctx: &'ctx RenderContext, source: &str) -> Self {
        Self::with_source(ctx, ShaderStage::Vertex, source)
    }

    pub fn fragment(ctx: &'ctx RenderContext, source: &str) -> Self {
        Self::with_source(ctx, ShaderStage::Fragment, source)
    }

    pub fn vertex_from_file(ctx: &'ctx RenderContext, path: impl AsRef<Path>) -> Self {
        Self::from_file(ctx, ShaderStage::Vertex, path)
    }

    pub fn fragment_from_file(ctx: &'ctx RenderContext, path: impl AsRef<Path>) -> Self {
        Self::from_file(ctx, ShaderStage::Fragment, path)
    }

    fn sentinel(ctx: &'ctx RenderContext) -> Self {
        Self {
            ctx,
            stage: None,
            handle: NULL_HANDLE,
            compiled: false,
        }
    }

    // ===== COMPILATION =====

    /// Upload `source` and compile it
    ///
    /// Returns the compile status. On failure the compiler log is reported at
    /// Error and the unit is released.
    pub fn compile(&mut self, source: &str) -> bool {
        if !self.ensure_live("COMPILE") {
            return false;
        }
        self.ctx.device().shader_source(self.handle, source);
        self.compile_uploaded()
    }

    /// Recompile the source already uploaded to this unit
    pub fn compile_staged(&mut self) -> bool {
        if !self.ensure_live("COMPILE") {
            return false;
        }
        self.compile_uploaded()
    }

    fn ensure_live(&self, operation: &str) -> bool {
        if self.is_released() {
            crate::log_warn!(
                self.ctx.sink(),
                "SHADER::{}::{} SKIPPED: shader has no live handle",
                self.stage_label(),
                operation
            );
            return false;
        }
        true
    }

    fn compile_uploaded(&mut self) -> bool {
        let device = self.ctx.device();
        device.compile_shader(self.handle);
        self.compiled = device.shader_compile_status(self.handle);
        self.report_compile_status();
        self.compiled
    }

    fn report_compile_status(&mut self) {
        let ctx = self.ctx;
        let label = self.stage_label();

        if self.compiled {
            crate::log_info!(ctx.sink(), "SHADER::{}::COMPILATION SUCCESS: id {}", label, self.handle);
            return;
        }

        let info_log = ctx
            .device()
            .shader_info_log(self.handle, ctx.config().info_log_capacity);
        crate::log_error!(
            ctx.sink(),
            "SHADER::{}::COMPILATION FAILED: id {}\n{}",
            label,
            self.handle,
            diagnostic_body(&info_log, "(no compiler output)")
        );

        ctx.device().delete_shader(self.handle);
        self.handle = NULL_HANDLE;
    }

    // ===== ACCESSORS =====

    /// `None` for the sentinel built from an unrecognized stage
    pub fn stage(&self) -> Option<ShaderStage> {
        self.stage
    }

    /// `VERTEX`, `FRAGMENT` or `UNKNOWN`
    pub fn stage_label(&self) -> &'static str {
        self.stage.map_or(UNKNOWN_STAGE_LABEL, ShaderStage::label)
    }

    /// GPU handle, `NULL_HANDLE` once released
    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    pub fn is_released(&self) -> bool {
        self.handle == NULL_HANDLE
    }
}

impl Drop for Shader<'_> {
    fn drop(&mut self) {
        if self.is_released() {
            return;
        }
        self.ctx.device().delete_shader(self.handle);
        crate::log_trace!(self.ctx.sink(), "SHADER::{}::RELEASED: id {}", self.stage_label(), self.handle);
        self.handle = NULL_HANDLE;
    }
}

impl fmt::Debug for Shader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("stage", &self.stage)
            .field("handle", &self.handle)
            .field("compiled", &self.compiled)
            .finish()
    }
}

// ===== HELPERS =====

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Trimmed driver log, or `fallback` when the driver said nothing
pub(crate) fn diagnostic_body<'a>(info_log: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = info_log.trim_end();
    if trimmed.trim_start().is_empty() {
        fallback
    } else {
        trimmed
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
