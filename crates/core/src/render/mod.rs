//! glow backend for the render pipeline.
//!
//! Only available with the `render` feature. [`GlowApi`] implements
//! [`GraphicsApi`](crate::pipeline::GraphicsApi) on top of a live WebGL2 /
//! OpenGL ES 3 context.

pub mod backend;
pub mod context;
pub mod shader;
pub mod target;
pub mod texture;

pub use backend::GlowApi;
pub use context::GpuContext;
pub use shader::{compile_program, compile_shader, format_shader_error, link_program, ShaderError, Stage, POSITION_ATTRIBUTE};
pub use target::RenderTarget;
pub use texture::{create_texture, pixel_type_for_format, TextureConfig};
