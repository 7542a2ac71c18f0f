//! GL context wrapper that picks the output buffer format.

use super::texture::TextureConfig;

/// Wraps a `glow::Context` and records which optional capabilities it has.
pub struct GpuContext {
    gl: glow::Context,
    supports_color_buffer_float: bool,
    float_targets: bool,
}

impl GpuContext {
    /// Wraps `gl`. Output buffers are 8-bit RGBA.
    pub fn new(gl: glow::Context) -> Self {
        use glow::HasContext;

        let supports_color_buffer_float = gl.supported_extensions().contains("EXT_color_buffer_float");
        tracing::debug!(supports_color_buffer_float, "wrapped GL context");
        Self {
            gl,
            supports_color_buffer_float,
            float_targets: false,
        }
    }

    /// Requests half-float output buffers. Ignored with a warning when the
    /// context cannot render to float attachments.
    pub fn with_float_targets(mut self, enabled: bool) -> Self {
        if enabled && !self.supports_color_buffer_float {
            tracing::warn!("EXT_color_buffer_float unavailable, keeping 8-bit targets");
            return self;
        }
        self.float_targets = enabled;
        self
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    pub fn into_gl(self) -> glow::Context {
        self.gl
    }

    pub fn supports_color_buffer_float(&self) -> bool {
        self.supports_color_buffer_float
    }

    /// Texture parameters for a new output buffer.
    pub fn target_config(&self, width: u32, height: u32) -> TextureConfig {
        if self.float_targets {
            TextureConfig::rgba16f(width, height)
        } else {
            TextureConfig::rgba8(width, height)
        }
    }
}
