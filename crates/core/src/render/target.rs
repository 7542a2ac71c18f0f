//! Framebuffer plus color texture backing one output buffer.

use crate::error::GraphError;
use crate::pipeline::Viewport;

use super::texture::{create_texture, TextureConfig};

pub struct RenderTarget {
    fbo: glow::Framebuffer,
    texture: glow::Texture,
    config: TextureConfig,
}

#[allow(unsafe_code)]
fn attach(gl: &glow::Context, fbo: glow::Framebuffer, texture: glow::Texture) -> u32 {
    use glow::HasContext;

    // SAFETY: both handles were created on this context and are live.
    unsafe {
        gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
        gl.framebuffer_texture_2d(
            glow::FRAMEBUFFER,
            glow::COLOR_ATTACHMENT0,
            glow::TEXTURE_2D,
            Some(texture),
            0,
        );
        let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
        gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        status
    }
}

impl RenderTarget {
    /// Creates a framebuffer with a fresh color attachment.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Backend`] if an object cannot be created or the
    /// framebuffer is incomplete.
    #[allow(unsafe_code)]
    pub fn new(gl: &glow::Context, config: TextureConfig) -> Result<Self, GraphError> {
        use glow::HasContext;

        let texture = create_texture(gl, &config, None)?;

        // SAFETY: glow wraps raw GL calls as unsafe. The texture was just
        // created and is deleted again on every error path.
        let fbo = match unsafe { gl.create_framebuffer() } {
            Ok(fbo) => fbo,
            Err(e) => {
                unsafe { gl.delete_texture(texture) };
                return Err(GraphError::Backend(e));
            }
        };

        let status = attach(gl, fbo, texture);
        if status != glow::FRAMEBUFFER_COMPLETE {
            unsafe {
                gl.delete_framebuffer(fbo);
                gl.delete_texture(texture);
            }
            return Err(GraphError::Backend(format!(
                "framebuffer incomplete: status 0x{status:04X}"
            )));
        }

        Ok(Self {
            fbo,
            texture,
            config,
        })
    }

    /// Makes this the draw target, restricted to `viewport` when given.
    #[allow(unsafe_code)]
    pub fn bind(&self, gl: &glow::Context, viewport: Option<Viewport>) {
        use glow::HasContext;

        let v = viewport.unwrap_or(Viewport {
            x: 0,
            y: 0,
            width: self.config.width,
            height: self.config.height,
        });
        // SAFETY: self.fbo is a live framebuffer created in new().
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.fbo));
            gl.viewport(v.x, v.y, v.width as i32, v.height as i32);
        }
    }

    pub fn texture(&self) -> glow::Texture {
        self.texture
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Swaps in a texture of the new size, keeping the framebuffer. On
    /// failure the previous attachment is restored.
    #[allow(unsafe_code)]
    pub fn resize(&mut self, gl: &glow::Context, width: u32, height: u32) -> Result<(), GraphError> {
        use glow::HasContext;

        let config = self.config.with_size(width, height);
        let texture = create_texture(gl, &config, None)?;

        let status = attach(gl, self.fbo, texture);
        if status != glow::FRAMEBUFFER_COMPLETE {
            attach(gl, self.fbo, self.texture);
            // SAFETY: the new texture is detached and owned only here.
            unsafe { gl.delete_texture(texture) };
            return Err(GraphError::Backend(format!(
                "framebuffer incomplete after resize: status 0x{status:04X}"
            )));
        }

        // SAFETY: the old texture is no longer attached.
        unsafe { gl.delete_texture(self.texture) };
        self.texture = texture;
        self.config = config;
        Ok(())
    }

    #[allow(unsafe_code)]
    pub fn destroy(&self, gl: &glow::Context) {
        use glow::HasContext;

        // SAFETY: both handles come from new() or resize().
        unsafe {
            gl.delete_framebuffer(self.fbo);
            gl.delete_texture(self.texture);
        }
    }
}

#[cfg(test)]
mod tests {
    // Run with `cargo test --features render -- --ignored` when a GL
    // context is available.

    #[test]
    #[ignore = "requires GL context"]
    fn resize_keeps_framebuffer_handle() {
        // Would test: fbo is unchanged after resize(64, 32) and size() is (64, 32).
    }

    #[test]
    #[ignore = "requires GL context"]
    fn bind_without_viewport_covers_target() {
        // Would test: GL_VIEWPORT equals (0, 0, width, height) after bind(gl, None).
    }
}
