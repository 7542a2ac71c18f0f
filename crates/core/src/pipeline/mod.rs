//! Render pipeline: outputs with ping-ponged buffers, pass scheduling,
//! vertex topologies, blending and cameras, driven through [`GraphicsApi`].
//!
//! Nothing in this module touches a GPU directly. [`HeadlessApi`] records
//! the calls; the `render` feature provides a glow-backed implementation.

pub mod api;
pub mod blend;
pub mod camera;
pub mod headless;
pub mod output;
pub mod pass;
pub mod ping_pong;
pub mod renderer;
pub mod shaders;
pub mod topology;

pub use api::{DrawCall, GraphicsApi, Viewport};
pub use blend::{BlendFactor, BlendMode, BlendState};
pub use camera::{Camera, CameraMatrices, CameraOptions, Projection};
pub use headless::{Command, HeadlessApi, RecordedDraw};
pub use output::{Output, OutputState};
pub use pass::{DrawPass, Pass, ViewportSpec};
pub use ping_pong::PingPong;
pub use renderer::{Renderer, RendererConfig};
pub use topology::{attributes, Attributes, ItemCount, Topology};
