//! The graphics-API surface the pipeline drives.
//!
//! Outputs only ever allocate targets, build programs, draw and clear.
//! [`HeadlessApi`](super::headless::HeadlessApi) records those calls; the
//! `render` feature adds a glow-backed implementation.

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::value::{ProgramId, TargetId, UniformValue};

use super::blend::BlendState;
use super::topology::Topology;

/// A viewport rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Everything the backend needs to issue one draw.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub program: ProgramId,
    pub target: TargetId,
    pub topology: Topology,
    /// Two floats per vertex.
    pub positions: &'a [f32],
    pub count: usize,
    pub uniforms: &'a [(String, UniformValue)],
    pub blend: Option<BlendState>,
    /// `None` covers the whole target.
    pub viewport: Option<Viewport>,
    pub line_width: Option<f32>,
}

/// GPU operations required by the render pipeline.
pub trait GraphicsApi {
    /// Allocates a texture-backed render target.
    fn create_target(&mut self, width: u32, height: u32) -> Result<TargetId, GraphError>;

    /// Reallocates a target's storage; its handle stays valid.
    fn resize_target(&mut self, target: TargetId, width: u32, height: u32) -> Result<(), GraphError>;

    fn destroy_target(&mut self, target: TargetId);

    /// Compiles and links a program.
    fn create_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, GraphError>;

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), GraphError>;

    fn clear(&mut self, target: TargetId, color: [f32; 4]) -> Result<(), GraphError>;
}
