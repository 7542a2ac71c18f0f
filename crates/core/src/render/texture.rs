//! Texture allocation for output buffers and externally supplied images.

use crate::error::GraphError;

/// Storage and sampling parameters of a GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureConfig {
    pub width: u32,
    pub height: u32,
    /// GL internal format (e.g. `glow::RGBA8`).
    pub internal_format: u32,
    /// Min and mag filter (e.g. `glow::NEAREST`).
    pub filter: u32,
}

impl TextureConfig {
    /// 8-bit RGBA with nearest sampling. The format of every output buffer
    /// unless float targets are requested.
    pub fn rgba8(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            internal_format: glow::RGBA8,
            filter: glow::NEAREST,
        }
    }

    /// Half-float RGBA with nearest sampling.
    pub fn rgba16f(width: u32, height: u32) -> Self {
        Self {
            internal_format: glow::RGBA16F,
            ..Self::rgba8(width, height)
        }
    }

    pub fn with_size(self, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..self
        }
    }
}

/// The upload type matching an internal format.
pub fn pixel_type_for_format(internal_format: u32) -> u32 {
    match internal_format {
        glow::RGBA16F | glow::RGB16F => glow::HALF_FLOAT,
        glow::RGBA32F | glow::RGB32F => glow::FLOAT,
        _ => glow::UNSIGNED_BYTE,
    }
}

/// Allocates a texture with `CLAMP_TO_EDGE` wrapping and, when `pixels` is
/// given, uploads them as tightly packed RGBA.
///
/// # Errors
///
/// Returns [`GraphError::Backend`] if the context cannot create the texture,
/// or [`GraphError::InvalidDimensions`] if `pixels` has the wrong length.
#[allow(unsafe_code)]
pub fn create_texture(
    gl: &glow::Context,
    config: &TextureConfig,
    pixels: Option<&[u8]>,
) -> Result<glow::Texture, GraphError> {
    use glow::HasContext;

    if config.width == 0 || config.height == 0 {
        return Err(GraphError::InvalidDimensions);
    }
    if let Some(data) = pixels {
        if data.len() != config.width as usize * config.height as usize * 4 {
            return Err(GraphError::InvalidDimensions);
        }
    }

    // SAFETY: glow wraps raw GL calls as unsafe. Parameters come from a
    // validated TextureConfig and the upload length was checked above.
    let texture = unsafe { gl.create_texture().map_err(GraphError::Backend)? };

    unsafe {
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, config.filter as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, config.filter as i32);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            config.internal_format as i32,
            config.width as i32,
            config.height as i32,
            0,
            glow::RGBA,
            pixel_type_for_format(config.internal_format),
            glow::PixelUnpackData::Slice(pixels),
        );
        gl.bind_texture(glow::TEXTURE_2D, None);
    }

    Ok(texture)
}
