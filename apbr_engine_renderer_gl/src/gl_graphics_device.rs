/// OpenGL implementation of `GraphicsDevice`
///
/// Every method forwards to the matching `gl*` entry point of the context
/// current on the calling thread. The device is `!Send` and `!Sync`, like the
/// context it wraps.

use std::ffi::{c_void, CString};
use std::marker::PhantomData;

use apbr_engine::apbr::device::{GraphicsDevice, Handle, UniformValue, INVALID_UNIFORM_LOCATION};
use apbr_engine::apbr::{Error, Result, ShaderStage};
use gl::types::{GLchar, GLenum, GLint, GLsizei};

/// Graphics device backed by the OpenGL context current on this thread
#[derive(Debug)]
pub struct GlGraphicsDevice {
    _not_send: PhantomData<*const ()>,
}

impl GlGraphicsDevice {
    /// Load GL entry points through `loader` and check the ones shaders need
    ///
    /// The caller must have made an OpenGL 3.3+ context current on this thread
    /// (with the window crate of its choice) before calling this, and must
    /// keep it current for as long as the device is used.
    ///
    /// # Errors
    ///
    /// `Error::LoaderFailed` naming the missing entry points.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use apbr_engine::apbr::{Config, RenderContext};
    /// use apbr_engine::apbr::log::DiagnosticSink;
    /// use apbr_engine_renderer_gl::GlGraphicsDevice;
    ///
    /// # fn get_proc_address(_: &str) -> *const std::ffi::c_void { std::ptr::null() }
    /// fn main() -> std::process::ExitCode {
    ///     let sink = DiagnosticSink::stderr();
    ///     let device = match GlGraphicsDevice::load_with(get_proc_address) {
    ///         Ok(device) => device,
    ///         Err(err) => return apbr_engine::apbr::report_fatal(&sink, &err),
    ///     };
    ///     let _ctx = RenderContext::new(device, sink, Config::default());
    ///     std::process::ExitCode::SUCCESS
    /// }
    /// ```
    pub fn load_with<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        let missing = missing_entry_points();
        if !missing.is_empty() {
            return Err(Error::LoaderFailed(format!(
                "missing entry points: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            _not_send: PhantomData,
        })
    }
}

impl GraphicsDevice for GlGraphicsDevice {
    fn create_shader(&self, stage: ShaderStage) -> Handle {
        unsafe { gl::CreateShader(gl_shader_type(stage)) }
    }

    fn shader_source(&self, shader: Handle, source: &str) {
        let string = source.as_ptr() as *const GLchar;
        let length = source_length(source);
        unsafe { gl::ShaderSource(shader, 1, &string, &length) };
    }

    fn compile_shader(&self, shader: Handle) {
        unsafe { gl::CompileShader(shader) };
    }

    fn shader_compile_status(&self, shader: Handle) -> bool {
        let mut status = GLint::from(gl::FALSE);
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
        status == GLint::from(gl::TRUE)
    }

    fn shader_info_log(&self, shader: Handle, capacity: usize) -> String {
        if capacity == 0 {
            return String::new();
        }
        let mut buffer = vec![0u8; capacity];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetShaderInfoLog(
                shader,
                buffer_size(capacity),
                &mut written,
                buffer.as_mut_ptr() as *mut GLchar,
            )
        };
        decode_info_log(&buffer, written)
    }

    fn delete_shader(&self, shader: Handle) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&self) -> Handle {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: Handle, shader: Handle) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn link_program(&self, program: Handle) {
        unsafe { gl::LinkProgram(program) };
    }

    fn program_link_status(&self, program: Handle) -> bool {
        let mut status = GLint::from(gl::FALSE);
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut status) };
        status == GLint::from(gl::TRUE)
    }

    fn program_info_log(&self, program: Handle, capacity: usize) -> String {
        if capacity == 0 {
            return String::new();
        }
        let mut buffer = vec![0u8; capacity];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetProgramInfoLog(
                program,
                buffer_size(capacity),
                &mut written,
                buffer.as_mut_ptr() as *mut GLchar,
            )
        };
        decode_info_log(&buffer, written)
    }

    fn uniform_location(&self, program: Handle, name: &str) -> i32 {
        let Ok(name) = CString::new(name) else {
            return INVALID_UNIFORM_LOCATION;
        };
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn use_program(&self, program: Handle) {
        unsafe { gl::UseProgram(program) };
    }

    fn set_uniform(&self, location: i32, value: UniformValue) {
        unsafe {
            match value {
                UniformValue::Int(v) => gl::Uniform1i(location, v),
                UniformValue::Float(v) => gl::Uniform1f(location, v),
                UniformValue::Vec2(v) => gl::Uniform2f(location, v.x, v.y),
                UniformValue::Vec3(v) => gl::Uniform3f(location, v.x, v.y, v.z),
                UniformValue::Vec4(v) => gl::Uniform4f(location, v.x, v.y, v.z, v.w),
                UniformValue::Mat4(m) => {
                    let columns = m.to_cols_array();
                    gl::UniformMatrix4fv(location, 1, gl::FALSE, columns.as_ptr());
                }
            }
        }
    }

    fn delete_program(&self, program: Handle) {
        unsafe { gl::DeleteProgram(program) };
    }
}

// ===== HELPERS =====

/// GL shader type for a stage
pub fn gl_shader_type(stage: ShaderStage) -> GLenum {
    match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
    }
}

/// Length passed to `glShaderSource`; sources are not NUL-terminated
pub(crate) fn source_length(source: &str) -> GLint {
    GLint::try_from(source.len()).unwrap_or(GLint::MAX)
}

pub(crate) fn buffer_size(capacity: usize) -> GLsizei {
    GLsizei::try_from(capacity).unwrap_or(GLsizei::MAX)
}

/// Text the driver wrote into an info-log buffer
pub(crate) fn decode_info_log(buffer: &[u8], written: GLsizei) -> String {
    let written = usize::try_from(written).unwrap_or(0).min(buffer.len());
    String::from_utf8_lossy(&buffer[..written]).into_owned()
}

fn missing_entry_points() -> Vec<&'static str> {
    let entry_points = [
        ("glCreateShader", gl::CreateShader::is_loaded()),
        ("glShaderSource", gl::ShaderSource::is_loaded()),
        ("glCompileShader", gl::CompileShader::is_loaded()),
        ("glGetShaderiv", gl::GetShaderiv::is_loaded()),
        ("glGetShaderInfoLog", gl::GetShaderInfoLog::is_loaded()),
        ("glDeleteShader", gl::DeleteShader::is_loaded()),
        ("glCreateProgram", gl::CreateProgram::is_loaded()),
        ("glAttachShader", gl::AttachShader::is_loaded()),
        ("glLinkProgram", gl::LinkProgram::is_loaded()),
        ("glGetProgramiv", gl::GetProgramiv::is_loaded()),
        ("glGetProgramInfoLog", gl::GetProgramInfoLog::is_loaded()),
        ("glGetUniformLocation", gl::GetUniformLocation::is_loaded()),
        ("glUseProgram", gl::UseProgram::is_loaded()),
        ("glUniform1i", gl::Uniform1i::is_loaded()),
        ("glUniform1f", gl::Uniform1f::is_loaded()),
        ("glUniform2f", gl::Uniform2f::is_loaded()),
        ("glUniform3f", gl::Uniform3f::is_loaded()),
        ("glUniform4f", gl::Uniform4f::is_loaded()),
        ("glUniformMatrix4fv", gl::UniformMatrix4fv::is_loaded()),
        ("glDeleteProgram", gl::DeleteProgram::is_loaded()),
    ];

    entry_points
        .iter()
        .filter(|(_, loaded)| !loaded)
        .map(|(name, _)| *name)
        .collect()
}

#[cfg(test)]
#[path = "gl_graphics_device_tests.rs"]
mod tests;
