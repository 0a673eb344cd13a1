/// Mock graphics device for tests (no GPU required)
///
/// Behaves like a tiny OpenGL driver: it hands out object names, runs a
/// miniature GLSL checker on compile, links vertex + fragment units, assigns
/// uniform locations and records every operation the real API would reject
/// (double deletes, attaching unknown names...) so tests can assert none
/// happened.
///
/// Clones share the same state: give one to a `RenderContext` and keep one to
/// inspect it.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::graphics_device::{
    truncate_info_log, GraphicsDevice, Handle, UniformValue, INVALID_UNIFORM_LOCATION, NULL_HANDLE,
};
use crate::shader::ShaderStage;

// ============================================================================
// Mock objects
// ============================================================================

#[derive(Debug)]
struct MockShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    info_log: String,
    deleted: bool,
}

#[derive(Debug, Default)]
struct MockProgram {
    attached: Vec<Handle>,
    linked: bool,
    info_log: String,
    uniforms: Vec<String>,
    deleted: bool,
}

/// A uniform upload seen by the mock device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformUpload {
    /// Program current at upload time
    pub program: Handle,
    pub location: i32,
    pub value: UniformValue,
}

#[derive(Debug, Default)]
struct MockState {
    last_handle: Handle,
    shaders: FxHashMap<Handle, MockShader>,
    programs: FxHashMap<Handle, MockProgram>,
    current_program: Handle,
    uploads: Vec<UniformUpload>,
    invalid_operations: Vec<String>,
}

impl MockState {
    fn allocate(&mut self) -> Handle {
        self.last_handle += 1;
        self.last_handle
    }

    fn reject(&mut self, operation: String) {
        self.invalid_operations.push(operation);
    }

    fn live_shader(&mut self, shader: Handle) -> Option<&mut MockShader> {
        self.shaders.get_mut(&shader).filter(|s| !s.deleted)
    }

    fn live_program(&mut self, program: Handle) -> Option<&mut MockProgram> {
        self.programs.get_mut(&program).filter(|p| !p.deleted)
    }
}

// ============================================================================
// Mock device
// ============================================================================

/// In-memory `GraphicsDevice`
#[derive(Debug, Clone, Default)]
pub struct MockGraphicsDevice {
    state: Rc<RefCell<MockState>>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations a real driver would have flagged as errors
    pub fn invalid_operations(&self) -> Vec<String> {
        self.state.borrow().invalid_operations.clone()
    }

    /// Shaders allocated and not yet deleted
    pub fn live_shader_count(&self) -> usize {
        self.state.borrow().shaders.values().filter(|s| !s.deleted).count()
    }

    /// Programs allocated and not yet deleted
    pub fn live_program_count(&self) -> usize {
        self.state.borrow().programs.values().filter(|p| !p.deleted).count()
    }

    pub fn is_shader_live(&self, shader: Handle) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| !s.deleted)
    }

    pub fn is_program_live(&self, program: Handle) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| !p.deleted)
    }

    /// Source last uploaded to `shader`
    pub fn shader_source_of(&self, shader: Handle) -> Option<String> {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.source.clone())
    }

    /// Shaders attached to `program`, in attach order
    pub fn attached_shaders(&self, program: Handle) -> Vec<Handle> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    pub fn current_program(&self) -> Handle {
        self.state.borrow().current_program
    }

    pub fn uniform_uploads(&self) -> Vec<UniformUpload> {
        self.state.borrow().uploads.clone()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_shader(&self, stage: ShaderStage) -> Handle {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate();
        state.shaders.insert(
            handle,
            MockShader {
                stage,
                source: String::new(),
                compiled: false,
                info_log: String::new(),
                deleted: false,
            },
        );
        handle
    }

    fn shader_source(&self, shader: Handle, source: &str) {
        let mut state = self.state.borrow_mut();
        match state.live_shader(shader) {
            Some(entry) => entry.source = source.to_string(),
            None => state.reject(format!("shader_source on unknown shader {}", shader)),
        }
    }

    fn compile_shader(&self, shader: Handle) {
        let mut state = self.state.borrow_mut();
        match state.live_shader(shader) {
            Some(entry) => match check_source(entry.stage, &entry.source) {
                Ok(()) => {
                    entry.compiled = true;
                    entry.info_log.clear();
                }
                Err(log) => {
                    entry.compiled = false;
                    entry.info_log = log;
                }
            },
            None => state.reject(format!("compile_shader on unknown shader {}", shader)),
        }
    }

    fn shader_compile_status(&self, shader: Handle) -> bool {
        let mut state = self.state.borrow_mut();
        match state.live_shader(shader) {
            Some(entry) => entry.compiled,
            None => {
                state.reject(format!("shader_compile_status on unknown shader {}", shader));
                false
            }
        }
    }

    fn shader_info_log(&self, shader: Handle, capacity: usize) -> String {
        let mut state = self.state.borrow_mut();
        match state.live_shader(shader) {
            Some(entry) => truncate_info_log(&entry.info_log, capacity),
            None => {
                state.reject(format!("shader_info_log on unknown shader {}", shader));
                String::new()
            }
        }
    }

    fn delete_shader(&self, shader: Handle) {
        if shader == NULL_HANDLE {
            return;
        }
        let mut state = self.state.borrow_mut();
        match state.live_shader(shader) {
            Some(entry) => entry.deleted = true,
            None => state.reject(format!("delete_shader on unknown shader {}", shader)),
        }
    }

    fn create_program(&self) -> Handle {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate();
        state.programs.insert(handle, MockProgram::default());
        handle
    }

    fn attach_shader(&self, program: Handle, shader: Handle) {
        let mut state = self.state.borrow_mut();
        if state.live_shader(shader).is_none() {
            state.reject(format!("attach_shader of unknown shader {}", shader));
            return;
        }
        match state.live_program(program) {
            Some(entry) if entry.attached.contains(&shader) => {
                state.reject(format!("shader {} attached twice to program {}", shader, program));
            }
            Some(entry) => entry.attached.push(shader),
            None => state.reject(format!("attach_shader to unknown program {}", program)),
        }
    }

    fn link_program(&self, program: Handle) {
        let mut state = self.state.borrow_mut();
        let attached = match state.live_program(program) {
            Some(entry) => entry.attached.clone(),
            None => {
                state.reject(format!("link_program on unknown program {}", program));
                return;
            }
        };

        let result = link_units(&state.shaders, &attached);
        if let Some(entry) = state.live_program(program) {
            match result {
                Ok(uniforms) => {
                    entry.linked = true;
                    entry.info_log.clear();
                    entry.uniforms = uniforms;
                }
                Err(log) => {
                    entry.linked = false;
                    entry.info_log = log;
                    entry.uniforms.clear();
                }
            }
        }
    }

    fn program_link_status(&self, program: Handle) -> bool {
        let mut state = self.state.borrow_mut();
        match state.live_program(program) {
            Some(entry) => entry.linked,
            None => {
                state.reject(format!("program_link_status on unknown program {}", program));
                false
            }
        }
    }

    fn program_info_log(&self, program: Handle, capacity: usize) -> String {
        let mut state = self.state.borrow_mut();
        match state.live_program(program) {
            Some(entry) => truncate_info_log(&entry.info_log, capacity),
            None => {
                state.reject(format!("program_info_log on unknown program {}", program));
                String::new()
            }
        }
    }

    fn uniform_location(&self, program: Handle, name: &str) -> i32 {
        let mut state = self.state.borrow_mut();
        match state.live_program(program) {
            Some(entry) if entry.linked => entry
                .uniforms
                .iter()
                .position(|uniform| uniform == name)
                .map_or(INVALID_UNIFORM_LOCATION, |index| index as i32),
            Some(_) => {
                state.reject(format!("uniform_location on unlinked program {}", program));
                INVALID_UNIFORM_LOCATION
            }
            None => {
                state.reject(format!("uniform_location on unknown program {}", program));
                INVALID_UNIFORM_LOCATION
            }
        }
    }

    fn use_program(&self, program: Handle) {
        let mut state = self.state.borrow_mut();
        if program == NULL_HANDLE {
            state.current_program = NULL_HANDLE;
            return;
        }
        match state.live_program(program) {
            Some(entry) if entry.linked => state.current_program = program,
            Some(_) => state.reject(format!("use_program on unlinked program {}", program)),
            None => state.reject(format!("use_program on unknown program {}", program)),
        }
    }

    fn set_uniform(&self, location: i32, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        if state.current_program == NULL_HANDLE {
            state.reject(format!("set_uniform({}) without a current program", location));
            return;
        }
        if location < 0 {
            return;
        }
        let program = state.current_program;
        state.uploads.push(UniformUpload {
            program,
            location,
            value,
        });
    }

    fn delete_program(&self, program: Handle) {
        if program == NULL_HANDLE {
            return;
        }
        let mut state = self.state.borrow_mut();
        match state.live_program(program) {
            Some(entry) => entry.deleted = true,
            None => state.reject(format!("delete_program on unknown program {}", program)),
        }
    }
}

// ============================================================================
// Miniature GLSL checks
// ============================================================================

/// Accept sources with balanced delimiters, a `main` function and, for the
/// vertex stage, a `gl_Position` write. Errors use the `0:line(col)` prefix
/// common to GLSL compilers.
fn check_source(stage: ShaderStage, source: &str) -> Result<(), String> {
    if source.trim().is_empty() {
        return Err("0:1(1): error: syntax error, unexpected end of file".to_string());
    }

    let mut open: Vec<(char, usize, usize)> = Vec::new();
    for (line_index, line) in source.lines().enumerate() {
        let code = line.split("//").next().unwrap_or_default();
        for (column_index, c) in code.chars().enumerate() {
            let expected = match c {
                '{' | '(' => {
                    open.push((c, line_index + 1, column_index + 1));
                    continue;
                }
                '}' => '{',
                ')' => '(',
                _ => continue,
            };
            match open.pop() {
                Some((opened, _, _)) if opened == expected => {}
                _ => {
                    return Err(format!(
                        "0:{}({}): error: syntax error, unexpected '{}'",
                        line_index + 1,
                        column_index + 1,
                        c
                    ));
                }
            }
        }
    }

    if let Some((c, line, column)) = open.pop() {
        return Err(format!(
            "0:{}({}): error: syntax error, '{}' is never closed",
            line, column, c
        ));
    }

    if !source.contains("void main") {
        return Err("0:1(1): error: function `main' is not defined".to_string());
    }

    if stage == ShaderStage::Vertex && !source.contains("gl_Position") {
        return Err("0:1(1): error: vertex shader does not write `gl_Position'".to_string());
    }

    Ok(())
}

/// Link attached units; on success returns active uniforms in location order
fn link_units(shaders: &FxHashMap<Handle, MockShader>, attached: &[Handle]) -> Result<Vec<String>, String> {
    let mut errors = Vec::new();
    let mut has_vertex = false;
    let mut has_fragment = false;
    let mut sources = Vec::new();

    for handle in attached {
        match shaders.get(handle) {
            Some(shader) if shader.compiled => {
                match shader.stage {
                    ShaderStage::Vertex => has_vertex = true,
                    ShaderStage::Fragment => has_fragment = true,
                }
                sources.push(shader.source.as_str());
            }
            Some(shader) => errors.push(format!(
                "error: {} shader {} has not been successfully compiled",
                shader.stage.label().to_lowercase(),
                handle
            )),
            None => errors.push(format!("error: unknown shader {}", handle)),
        }
    }

    if !has_vertex {
        errors.push("error: no vertex shader attached".to_string());
    }
    if !has_fragment {
        errors.push("error: no fragment shader attached".to_string());
    }

    if errors.is_empty() {
        Ok(active_uniforms(&sources))
    } else {
        Err(errors.join("\n"))
    }
}

/// Uniforms declared as `uniform <type> <name>` and referenced at least once
fn active_uniforms(sources: &[&str]) -> Vec<String> {
    let mut declared: Vec<String> = Vec::new();

    for source in sources {
        for statement in source.split(';') {
            let mut tokens = statement
                .split_whitespace()
                .skip_while(|token| *token != "uniform")
                .skip(1)
                .filter(|token| !matches!(*token, "lowp" | "mediump" | "highp"));

            let (Some(_ty), Some(name)) = (tokens.next(), tokens.next()) else {
                continue;
            };
            let name = name.split('[').next().unwrap_or(name);
            if is_identifier(name) && !declared.iter().any(|d| d == name) {
                declared.push(name.to_string());
            }
        }
    }

    declared.retain(|name| {
        sources
            .iter()
            .any(|source| identifier_occurrences(source, name) >= 2)
    });
    declared
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn identifier_occurrences(source: &str, name: &str) -> usize {
    source
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| *token == name)
        .count()
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
