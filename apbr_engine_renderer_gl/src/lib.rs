/*!
# APBR Engine - OpenGL Device

OpenGL 3.3 implementation of the APBR engine's `GraphicsDevice`, built on the
`gl` crate.

Window and context creation stay with the application: create a context with
the window crate of your choice, make it current, then hand its
`get_proc_address` to [`GlGraphicsDevice::load_with`].
*/

mod gl_graphics_device;

pub use gl_graphics_device::{gl_shader_type, GlGraphicsDevice};
