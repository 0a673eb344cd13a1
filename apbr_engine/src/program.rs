/// Shader programs: linked sets of shader units.
///
/// A `ShaderProgram` owns its GPU program handle. Attaching a `Shader` only
/// records its handle as a link input; the shader keeps ownership and may be
/// dropped once the program is linked.

use std::fmt;

use crate::context::RenderContext;
use crate::graphics_device::{Handle, UniformValue, INVALID_UNIFORM_LOCATION, NULL_HANDLE};
use crate::shader::{diagnostic_body, Shader};

/// One GPU program object
pub struct ShaderProgram<'ctx> {
    ctx: &'ctx RenderContext,
    handle: Handle,
    attached: Vec<Handle>,
    linked: bool,
}

impl<'ctx> ShaderProgram<'ctx> {
    /// Allocate an empty program
    pub fn new(ctx: &'ctx RenderContext) -> Self {
        let handle = ctx.device().create_program();
        crate::log_trace!(ctx.sink(), "PROGRAM::CREATED: id {}", handle);

        Self {
            ctx,
            handle,
            attached: Vec::new(),
            linked: false,
        }
    }

    /// Compile a vertex and a fragment source, attach both and link
    ///
    /// The intermediate shader units are released when this returns; check
    /// [`ShaderProgram::is_linked`] for the outcome.
    pub fn from_sources(ctx: &'ctx RenderContext, vertex_source: &str, fragment_source: &str) -> Self {
        let vertex = Shader::vertex(ctx, vertex_source);
        let fragment = Shader::fragment(ctx, fragment_source);

        let mut program = Self::new(ctx);
        program.attach(&vertex);
        program.attach(&fragment);
        program.link();
        program
    }

    /// Record `shader` as an input of the next link
    ///
    /// Attaching the same shader twice is a no-op. A released shader (failed
    /// compile or unknown stage) is skipped with a warning; the next link then
    /// fails on the missing stage.
    pub fn attach(&mut self, shader: &Shader<'_>) {
        let sink = self.ctx.sink();

        if self.is_released() {
            crate::log_warn!(sink, "PROGRAM::ATTACH SKIPPED: program has no live handle");
            return;
        }

        if shader.is_released() {
            crate::log_warn!(
                sink,
                "PROGRAM::ATTACH SKIPPED: id {}, {} shader has no live handle",
                self.handle,
                shader.stage_label()
            );
            return;
        }

        if self.attached.contains(&shader.handle()) {
            crate::log_debug!(
                sink,
                "PROGRAM::ALREADY ATTACHED: id {}, shader {}",
                self.handle,
                shader.handle()
            );
            return;
        }

        self.ctx.device().attach_shader(self.handle, shader.handle());
        self.attached.push(shader.handle());
    }

    /// Link the attached units
    ///
    /// Returns the link status. On failure the linker log is reported at
    /// Error and the program is released.
    pub fn link(&mut self) -> bool {
        let ctx = self.ctx;
        let device = ctx.device();

        if self.is_released() {
            crate::log_warn!(ctx.sink(), "PROGRAM::LINK SKIPPED: program has no live handle");
            return false;
        }

        device.link_program(self.handle);
        self.linked = device.program_link_status(self.handle);

        if self.linked {
            crate::log_info!(ctx.sink(), "PROGRAM::LINK SUCCESS: id {}", self.handle);
            return true;
        }

        let info_log = device.program_info_log(self.handle, ctx.config().info_log_capacity);
        crate::log_error!(
            ctx.sink(),
            "PROGRAM::LINK FAILED: id {}\n{}",
            self.handle,
            diagnostic_body(&info_log, "(no linker output)")
        );

        device.delete_program(self.handle);
        self.handle = NULL_HANDLE;
        self.attached.clear();
        false
    }

    /// Location of the active uniform `name`, or `INVALID_UNIFORM_LOCATION`
    pub fn uniform_location(&self, name: &str) -> i32 {
        let sink = self.ctx.sink();

        if !self.linked || self.is_released() {
            crate::log_debug!(
                sink,
                "PROGRAM::UNIFORM `{}` NOT FOUND: id {} is not linked",
                name,
                self.handle
            );
            return INVALID_UNIFORM_LOCATION;
        }

        if name.contains('\0') {
            crate::log_debug!(sink, "PROGRAM::UNIFORM {:?} NOT FOUND: interior NUL", name);
            return INVALID_UNIFORM_LOCATION;
        }

        let location = self.ctx.device().uniform_location(self.handle, name);
        if location < 0 {
            crate::log_debug!(sink, "PROGRAM::UNIFORM `{}` NOT FOUND: id {}", name, self.handle);
        }
        location
    }

    /// Upload `value` to `location` of this program
    ///
    /// The program is made current first, so `location` always lands in the
    /// program it was looked up on. Negative locations are ignored; a
    /// released or unlinked program logs Warn and uploads nothing.
    pub fn set_uniform(&self, location: i32, value: impl Into<UniformValue>) {
        if self.is_released() || !self.linked {
            crate::log_warn!(
                self.ctx.sink(),
                "PROGRAM::SET UNIFORM SKIPPED: id {} is not a linked program",
                self.handle
            );
            return;
        }
        if location < 0 {
            return;
        }
        let device = self.ctx.device();
        device.use_program(self.handle);
        device.set_uniform(location, value.into());
    }

    /// Make this program current for subsequent draw calls
    pub fn use_program(&self) {
        if self.is_released() || !self.linked {
            crate::log_warn!(
                self.ctx.sink(),
                "PROGRAM::USE SKIPPED: id {} is not a linked program",
                self.handle
            );
            return;
        }
        self.ctx.device().use_program(self.handle);
    }

    // ===== ACCESSORS =====

    /// GPU handle, `NULL_HANDLE` once released
    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn is_linked(&self) -> bool {
        self.linked
    }

    pub fn is_released(&self) -> bool {
        self.handle == NULL_HANDLE
    }

    /// Shader handles attached so far, in attach order
    pub fn attached(&self) -> &[Handle] {
        &self.attached
    }
}

impl Drop for ShaderProgram<'_> {
    fn drop(&mut self) {
        if self.is_released() {
            return;
        }
        self.ctx.device().delete_program(self.handle);
        crate::log_trace!(self.ctx.sink(), "PROGRAM::RELEASED: id {}", self.handle);
        self.handle = NULL_HANDLE;
    }
}

impl fmt::Debug for ShaderProgram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("handle", &self.handle)
            .field("attached", &self.attached)
            .field("linked", &self.linked)
            .finish()
    }
}

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;
