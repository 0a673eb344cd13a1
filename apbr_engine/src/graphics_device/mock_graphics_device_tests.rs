//! Unit tests for mock_graphics_device.rs
//!
//! Exercises the mock driver on its own: name allocation, the miniature GLSL
//! checker, linking, uniform locations and invalid-operation tracking.

use crate::graphics_device::mock_graphics_device::UniformUpload;
use crate::graphics_device::{GraphicsDevice, MockGraphicsDevice, UniformValue, NULL_HANDLE};
use crate::shader::ShaderStage;

const VERTEX_SRC: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
uniform mat4 transform;
void main() {
    gl_Position = transform * vec4(aPos, 1.0);
}
";

const FRAGMENT_SRC: &str = "#version 330 core
out vec4 FragColor;
uniform vec4 color;
uniform float unused;
void main() {
    FragColor = color;
}
";

fn compiled(device: &MockGraphicsDevice, stage: ShaderStage, source: &str) -> u32 {
    let shader = device.create_shader(stage);
    device.shader_source(shader, source);
    device.compile_shader(shader);
    shader
}

fn linked_program(device: &MockGraphicsDevice) -> u32 {
    let vs = compiled(device, ShaderStage::Vertex, VERTEX_SRC);
    let fs = compiled(device, ShaderStage::Fragment, FRAGMENT_SRC);
    let program = device.create_program();
    device.attach_shader(program, vs);
    device.attach_shader(program, fs);
    device.link_program(program);
    program
}

// ============================================================================
// HANDLE ALLOCATION
// ============================================================================

#[test]
fn test_handles_are_nonzero_and_unique() {
    let device = MockGraphicsDevice::new();
    let a = device.create_shader(ShaderStage::Vertex);
    let b = device.create_shader(ShaderStage::Fragment);
    let c = device.create_program();

    assert_ne!(a, NULL_HANDLE);
    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_eq!(device.live_shader_count(), 2);
    assert_eq!(device.live_program_count(), 1);
}

#[test]
fn test_clones_share_state() {
    let device = MockGraphicsDevice::new();
    let observer = device.clone();
    let shader = device.create_shader(ShaderStage::Vertex);

    assert!(observer.is_shader_live(shader));
}

#[test]
fn test_shader_source_is_stored() {
    let device = MockGraphicsDevice::new();
    let shader = device.create_shader(ShaderStage::Vertex);
    device.shader_source(shader, VERTEX_SRC);

    assert_eq!(device.shader_source_of(shader).as_deref(), Some(VERTEX_SRC));
}

// ============================================================================
// COMPILATION
// ============================================================================

#[test]
fn test_valid_sources_compile() {
    let device = MockGraphicsDevice::new();
    let vs = compiled(&device, ShaderStage::Vertex, VERTEX_SRC);
    let fs = compiled(&device, ShaderStage::Fragment, FRAGMENT_SRC);

    assert!(device.shader_compile_status(vs));
    assert!(device.shader_compile_status(fs));
    assert_eq!(device.shader_info_log(vs, 512), "");
    assert!(device.invalid_operations().is_empty());
}

#[test]
fn test_empty_source_fails() {
    let device = MockGraphicsDevice::new();
    let shader = compiled(&device, ShaderStage::Fragment, "   \n");

    assert!(!device.shader_compile_status(shader));
    assert!(device.shader_info_log(shader, 512).contains("unexpected end of file"));
}

#[test]
fn test_unbalanced_brace_reports_position() {
    let device = MockGraphicsDevice::new();
    let shader = compiled(
        &device,
        ShaderStage::Fragment,
        "void main() {\n    gl_FragColor = vec4(1.0);\n}}\n",
    );

    assert!(!device.shader_compile_status(shader));
    assert_eq!(
        device.shader_info_log(shader, 512),
        "0:3(2): error: syntax error, unexpected '}'"
    );
}

#[test]
fn test_unclosed_paren_reports_opening_position() {
    let device = MockGraphicsDevice::new();
    let shader = compiled(&device, ShaderStage::Fragment, "void main() {\n  foo(\n}\n");

    assert!(!device.shader_compile_status(shader));
    assert!(device.shader_info_log(shader, 512).starts_with("0:3(1):"));
}

#[test]
fn test_braces_in_line_comments_are_ignored() {
    let device = MockGraphicsDevice::new();
    let shader = compiled(
        &device,
        ShaderStage::Fragment,
        "// {{ not code\nvoid main() {\n}\n",
    );

    assert!(device.shader_compile_status(shader));
}

#[test]
fn test_missing_main_fails() {
    let device = MockGraphicsDevice::new();
    let shader = compiled(&device, ShaderStage::Fragment, "vec4 color() { return vec4(1.0); }");

    assert!(!device.shader_compile_status(shader));
    assert!(device.shader_info_log(shader, 512).contains("`main'"));
}

#[test]
fn test_vertex_stage_requires_gl_position() {
    let device = MockGraphicsDevice::new();
    let source = "void main() {\n}\n";
    let vs = compiled(&device, ShaderStage::Vertex, source);
    let fs = compiled(&device, ShaderStage::Fragment, source);

    assert!(!device.shader_compile_status(vs));
    assert!(device.shader_info_log(vs, 512).contains("gl_Position"));
    assert!(device.shader_compile_status(fs));
}

#[test]
fn test_info_log_respects_capacity() {
    let device = MockGraphicsDevice::new();
    let shader = compiled(&device, ShaderStage::Fragment, "");

    assert_eq!(device.shader_info_log(shader, 8).len(), 7);
}

#[test]
fn test_recompile_after_fix_succeeds() {
    let device = MockGraphicsDevice::new();
    let shader = compiled(&device, ShaderStage::Fragment, "void main() {");
    assert!(!device.shader_compile_status(shader));

    device.shader_source(shader, FRAGMENT_SRC);
    device.compile_shader(shader);
    assert!(device.shader_compile_status(shader));
    assert_eq!(device.shader_info_log(shader, 512), "");
}

// ============================================================================
// LINKING
// ============================================================================

#[test]
fn test_link_vertex_and_fragment() {
    let device = MockGraphicsDevice::new();
    let program = linked_program(&device);

    assert!(device.program_link_status(program));
    assert_eq!(device.program_info_log(program, 512), "");
    assert_eq!(device.attached_shaders(program).len(), 2);
}

#[test]
fn test_link_without_fragment_fails() {
    let device = MockGraphicsDevice::new();
    let vs = compiled(&device, ShaderStage::Vertex, VERTEX_SRC);
    let program = device.create_program();
    device.attach_shader(program, vs);
    device.link_program(program);

    assert!(!device.program_link_status(program));
    assert_eq!(
        device.program_info_log(program, 512),
        "error: no fragment shader attached"
    );
}

#[test]
fn test_link_with_nothing_attached_lists_both_stages() {
    let device = MockGraphicsDevice::new();
    let program = device.create_program();
    device.link_program(program);

    let log = device.program_info_log(program, 512);
    assert!(log.contains("no vertex shader attached"));
    assert!(log.contains("no fragment shader attached"));
}

#[test]
fn test_link_with_uncompiled_unit_fails() {
    let device = MockGraphicsDevice::new();
    let vs = compiled(&device, ShaderStage::Vertex, VERTEX_SRC);
    let fs = compiled(&device, ShaderStage::Fragment, "void main() {");
    let program = device.create_program();
    device.attach_shader(program, vs);
    device.attach_shader(program, fs);
    device.link_program(program);

    assert!(!device.program_link_status(program));
    assert!(device
        .program_info_log(program, 512)
        .contains("fragment shader"));
}

#[test]
fn test_shader_deleted_after_attach_still_links() {
    let device = MockGraphicsDevice::new();
    let vs = compiled(&device, ShaderStage::Vertex, VERTEX_SRC);
    let fs = compiled(&device, ShaderStage::Fragment, FRAGMENT_SRC);
    let program = device.create_program();
    device.attach_shader(program, vs);
    device.attach_shader(program, fs);
    device.delete_shader(vs);
    device.delete_shader(fs);
    device.link_program(program);

    assert!(device.program_link_status(program));
}

#[test]
fn test_attach_twice_is_invalid() {
    let device = MockGraphicsDevice::new();
    let vs = compiled(&device, ShaderStage::Vertex, VERTEX_SRC);
    let program = device.create_program();
    device.attach_shader(program, vs);
    device.attach_shader(program, vs);

    assert_eq!(device.attached_shaders(program), vec![vs]);
    assert_eq!(device.invalid_operations().len(), 1);
}

// ============================================================================
// UNIFORMS
// ============================================================================

#[test]
fn test_active_uniform_locations_follow_declaration_order() {
    let device = MockGraphicsDevice::new();
    let program = linked_program(&device);

    assert_eq!(device.uniform_location(program, "transform"), 0);
    assert_eq!(device.uniform_location(program, "color"), 1);
}

#[test]
fn test_unreferenced_uniform_is_inactive() {
    let device = MockGraphicsDevice::new();
    let program = linked_program(&device);

    assert_eq!(device.uniform_location(program, "unused"), -1);
    assert_eq!(device.uniform_location(program, "missing"), -1);
}

#[test]
fn test_precision_qualifier_and_array_uniforms() {
    let device = MockGraphicsDevice::new();
    let vs = compiled(&device, ShaderStage::Vertex, VERTEX_SRC);
    let fs = compiled(
        &device,
        ShaderStage::Fragment,
        "uniform highp vec4 tint;\nuniform float weights[4];\nout vec4 c;\nvoid main() {\n    c = tint * weights[0];\n}\n",
    );
    let program = device.create_program();
    device.attach_shader(program, vs);
    device.attach_shader(program, fs);
    device.link_program(program);

    assert!(device.uniform_location(program, "tint") >= 0);
    assert!(device.uniform_location(program, "weights") >= 0);
}

#[test]
fn test_uniform_location_on_unlinked_program_is_invalid() {
    let device = MockGraphicsDevice::new();
    let program = device.create_program();

    assert_eq!(device.uniform_location(program, "color"), -1);
    assert_eq!(device.invalid_operations().len(), 1);
}

#[test]
fn test_set_uniform_records_upload_for_current_program() {
    let device = MockGraphicsDevice::new();
    let program = linked_program(&device);
    device.use_program(program);
    device.set_uniform(1, UniformValue::Float(0.5));

    assert_eq!(device.current_program(), program);
    assert_eq!(
        device.uniform_uploads(),
        vec![UniformUpload {
            program,
            location: 1,
            value: UniformValue::Float(0.5),
        }]
    );
}

#[test]
fn test_set_uniform_at_invalid_location_is_ignored() {
    let device = MockGraphicsDevice::new();
    let program = linked_program(&device);
    device.use_program(program);
    device.set_uniform(-1, UniformValue::Int(3));

    assert!(device.uniform_uploads().is_empty());
    assert!(device.invalid_operations().is_empty());
}

#[test]
fn test_set_uniform_without_program_is_invalid() {
    let device = MockGraphicsDevice::new();
    device.set_uniform(0, UniformValue::Int(1));

    assert!(device.uniform_uploads().is_empty());
    assert_eq!(device.invalid_operations().len(), 1);
}

#[test]
fn test_use_unlinked_program_is_invalid() {
    let device = MockGraphicsDevice::new();
    let program = device.create_program();
    device.use_program(program);

    assert_eq!(device.current_program(), NULL_HANDLE);
    assert_eq!(device.invalid_operations().len(), 1);
}

#[test]
fn test_use_null_program_unbinds() {
    let device = MockGraphicsDevice::new();
    let program = linked_program(&device);
    device.use_program(program);
    device.use_program(NULL_HANDLE);

    assert_eq!(device.current_program(), NULL_HANDLE);
}

// ============================================================================
// DELETION
// ============================================================================

#[test]
fn test_delete_releases_objects() {
    let device = MockGraphicsDevice::new();
    let shader = device.create_shader(ShaderStage::Vertex);
    let program = device.create_program();
    device.delete_shader(shader);
    device.delete_program(program);

    assert_eq!(device.live_shader_count(), 0);
    assert_eq!(device.live_program_count(), 0);
    assert!(!device.is_shader_live(shader));
    assert!(!device.is_program_live(program));
    assert!(device.invalid_operations().is_empty());
}

#[test]
fn test_double_delete_is_recorded() {
    let device = MockGraphicsDevice::new();
    let shader = device.create_shader(ShaderStage::Fragment);
    let program = device.create_program();
    device.delete_shader(shader);
    device.delete_shader(shader);
    device.delete_program(program);
    device.delete_program(program);

    assert_eq!(device.invalid_operations().len(), 2);
}

#[test]
fn test_delete_null_handle_is_silent() {
    let device = MockGraphicsDevice::new();
    device.delete_shader(NULL_HANDLE);
    device.delete_program(NULL_HANDLE);

    assert!(device.invalid_operations().is_empty());
}

#[test]
fn test_operations_on_unknown_handles_are_recorded() {
    let device = MockGraphicsDevice::new();
    device.shader_source(42, "void main() {}");
    device.compile_shader(42);
    assert!(!device.shader_compile_status(42));
    device.link_program(43);

    assert_eq!(device.invalid_operations().len(), 4);
}
