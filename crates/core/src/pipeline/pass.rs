//! Pass descriptors handed to [`Output::render`](super::output::Output::render).

use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::value::TargetId;

use super::api::Viewport;
use super::blend::BlendMode;
use super::topology::{ItemCount, Topology};

/// A viewport in units of the target size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSpec {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl ViewportSpec {
    pub fn to_pixels(&self, width: u32, height: u32) -> Viewport {
        let (w, h) = (f64::from(width), f64::from(height));
        Viewport {
            x: (self.x * w).round() as i32,
            y: (self.y * h).round() as i32,
            width: (self.w * w).round().max(0.0) as u32,
            height: (self.h * h).round().max(0.0) as u32,
        }
    }
}

/// A pass that runs a compiled chain.
#[derive(Debug, Clone)]
pub struct DrawPass {
    pub chain: Chain,
    pub topology: Topology,
    pub count: ItemCount,
    pub blend: BlendMode,
    pub viewport: Option<ViewportSpec>,
    pub line_width: Option<f32>,
    /// Draw into this target instead of the output's next buffer.
    pub framebuffer: Option<TargetId>,
}

impl DrawPass {
    pub fn new(chain: Chain) -> Self {
        Self {
            chain,
            topology: Topology::Triangles,
            count: ItemCount::default(),
            blend: BlendMode::Disabled,
            viewport: None,
            line_width: None,
            framebuffer: None,
        }
    }

    pub fn primitive(mut self, topology: Topology, count: ItemCount) -> Self {
        self.topology = topology;
        self.count = count;
        self
    }

    pub fn blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn viewport(mut self, viewport: ViewportSpec) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn line_width(mut self, width: f32) -> Self {
        self.line_width = Some(width);
        self
    }

    pub fn framebuffer(mut self, target: TargetId) -> Self {
        self.framebuffer = Some(target);
        self
    }
}

#[derive(Debug, Clone)]
pub enum Pass {
    /// Clears the feedback buffer and both scratch buffers to transparent.
    Clear,
    /// Writes the current buffer, faded toward transparent by `amount`,
    /// into the feedback buffer.
    Fade { amount: f64, camera: bool },
    Draw(DrawPass),
}

impl Pass {
    pub fn fade(amount: f64) -> Self {
        Pass::Fade {
            amount,
            camera: false,
        }
    }

    pub fn draw(chain: Chain) -> Self {
        Pass::Draw(DrawPass::new(chain))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Pass::Clear => "clear",
            Pass::Fade { .. } => "fade",
            Pass::Draw(_) => "draw",
        }
    }
}

impl From<DrawPass> for Pass {
    fn from(pass: DrawPass) -> Self {
        Pass::Draw(pass)
    }
}
