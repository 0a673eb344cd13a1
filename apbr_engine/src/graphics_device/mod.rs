/// Graphics device module - the GPU context seam
///
/// `GraphicsDevice` stands for an externally initialized graphics context.
/// Shader objects and programs only talk to the GPU through it, so the whole
/// compile/link pipeline can run against `MockGraphicsDevice` in tests and
/// against a real OpenGL context (see `apbr_engine_renderer_gl`) in apps.

pub mod mock_graphics_device;

pub use mock_graphics_device::MockGraphicsDevice;

use crate::shader::ShaderStage;

/// Opaque GPU object name
pub type Handle = u32;

/// Handle value meaning "no object"
pub const NULL_HANDLE: Handle = 0;

/// Location returned for names that are not active uniforms
pub const INVALID_UNIFORM_LOCATION: i32 = -1;

/// Value uploaded to a uniform of the current program
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2(glam::Vec2),
    Vec3(glam::Vec3),
    Vec4(glam::Vec4),
    Mat4(glam::Mat4),
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<glam::Vec2> for UniformValue {
    fn from(value: glam::Vec2) -> Self {
        UniformValue::Vec2(value)
    }
}

impl From<glam::Vec3> for UniformValue {
    fn from(value: glam::Vec3) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<glam::Vec4> for UniformValue {
    fn from(value: glam::Vec4) -> Self {
        UniformValue::Vec4(value)
    }
}

impl From<glam::Mat4> for UniformValue {
    fn from(value: glam::Mat4) -> Self {
        UniformValue::Mat4(value)
    }
}

/// GPU context operations needed by shader objects and programs
///
/// Mirrors the OpenGL shader/program entry points one to one. All methods take
/// `&self`: the context is implicit global state owned by the calling thread.
/// Implementations are never shared between threads.
pub trait GraphicsDevice {
    /// Allocate a shader unit for `stage`
    fn create_shader(&self, stage: ShaderStage) -> Handle;

    /// Replace the source text of a shader unit
    fn shader_source(&self, shader: Handle, source: &str);

    /// Compile the uploaded source
    fn compile_shader(&self, shader: Handle);

    /// Whether the last compilation succeeded
    fn shader_compile_status(&self, shader: Handle) -> bool;

    /// Compiler output, at most `capacity - 1` bytes
    fn shader_info_log(&self, shader: Handle, capacity: usize) -> String;

    /// Release a shader unit
    fn delete_shader(&self, shader: Handle);

    /// Allocate a program object
    fn create_program(&self) -> Handle;

    /// Record `shader` as an input of the next link
    fn attach_shader(&self, program: Handle, shader: Handle);

    /// Link the attached units
    fn link_program(&self, program: Handle);

    /// Whether the last link succeeded
    fn program_link_status(&self, program: Handle) -> bool;

    /// Linker output, at most `capacity - 1` bytes
    fn program_info_log(&self, program: Handle, capacity: usize) -> String;

    /// Location of an active uniform, or `INVALID_UNIFORM_LOCATION`
    fn uniform_location(&self, program: Handle, name: &str) -> i32;

    /// Make `program` current for subsequent draw calls
    fn use_program(&self, program: Handle);

    /// Upload a value to a uniform of the current program
    fn set_uniform(&self, location: i32, value: UniformValue);

    /// Release a program object
    fn delete_program(&self, program: Handle);
}

/// Cut an info log the way a fixed-size, NUL-terminated driver buffer would
///
/// At most `capacity - 1` bytes are kept, never splitting a UTF-8 character.
pub fn truncate_info_log(log: &str, capacity: usize) -> String {
    let max_len = capacity.saturating_sub(1);
    if log.len() <= max_len {
        return log.to_string();
    }

    let mut end = max_len;
    while !log.is_char_boundary(end) {
        end -= 1;
    }
    log[..end].to_string()
}

#[cfg(test)]
#[path = "graphics_device_tests.rs"]
mod tests;
