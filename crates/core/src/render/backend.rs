//! [`GraphicsApi`] implemented on a live glow context.

use std::collections::HashMap;

use crate::error::GraphError;
use crate::pipeline::{BlendFactor, BlendState, DrawCall, GraphicsApi, Topology};
use crate::value::{ProgramId, TargetId, TextureId, UniformValue};

use super::context::GpuContext;
use super::shader::{compile_program, POSITION_ATTRIBUTE};
use super::target::RenderTarget;
use super::texture::{create_texture, TextureConfig};

struct LinkedProgram {
    program: glow::Program,
    position: Option<u32>,
    locations: HashMap<String, Option<glow::UniformLocation>>,
}

pub struct GlowApi {
    ctx: GpuContext,
    targets: HashMap<TargetId, RenderTarget>,
    programs: Vec<LinkedProgram>,
    external: HashMap<u32, glow::Texture>,
    vertex_array: glow::VertexArray,
    vertex_buffer: glow::Buffer,
    next_target: u32,
    next_external: u32,
}

pub fn gl_mode(topology: Topology) -> u32 {
    match topology {
        Topology::Triangles => glow::TRIANGLES,
        Topology::Points => glow::POINTS,
        Topology::LineStrip => glow::LINE_STRIP,
        Topology::LineLoop => glow::LINE_LOOP,
        Topology::Lines => glow::LINES,
    }
}

pub fn gl_factor(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcColor => glow::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => glow::DST_COLOR,
        BlendFactor::OneMinusDstColor => glow::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => glow::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
    }
}

impl GlowApi {
    #[allow(unsafe_code)]
    pub fn new(ctx: GpuContext) -> Result<Self, GraphError> {
        use glow::HasContext;

        let gl = ctx.gl();
        // SAFETY: plain object creation on a live context.
        let (vertex_array, vertex_buffer) = unsafe {
            let vao = gl.create_vertex_array().map_err(GraphError::Backend)?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(e) => {
                    gl.delete_vertex_array(vao);
                    return Err(GraphError::Backend(e));
                }
            };
            (vao, vbo)
        };

        Ok(Self {
            ctx,
            targets: HashMap::new(),
            programs: Vec::new(),
            external: HashMap::new(),
            vertex_array,
            vertex_buffer,
            next_target: 0,
            next_external: 0,
        })
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    /// Uploads tightly packed RGBA8 pixels as a texture that chains can
    /// sample through an external [`TextureId`].
    pub fn upload_texture(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<TextureId, GraphError> {
        let texture = create_texture(self.ctx.gl(), &TextureConfig::rgba8(width, height), Some(pixels))?;
        Ok(self.register_texture(texture))
    }

    /// Registers a texture owned by the caller.
    pub fn register_texture(&mut self, texture: glow::Texture) -> TextureId {
        let id = self.next_external;
        self.next_external += 1;
        self.external.insert(id, texture);
        TextureId::External(id)
    }

    /// The GL texture behind a target, e.g. to present it on screen.
    pub fn target_texture(&self, target: TargetId) -> Option<glow::Texture> {
        self.targets.get(&target).map(RenderTarget::texture)
    }

    fn resolve(&self, texture: TextureId) -> Option<glow::Texture> {
        match texture {
            TextureId::Target(target) => self.target_texture(target),
            TextureId::External(id) => self.external.get(&id).copied(),
        }
    }

    fn target(&self, target: TargetId) -> Result<&RenderTarget, GraphError> {
        self.targets.get(&target).ok_or(GraphError::UnknownTarget(target.0))
    }

    #[allow(unsafe_code)]
    fn upload_uniforms(&mut self, program: ProgramId, uniforms: &[(String, UniformValue)]) -> Result<(), GraphError> {
        use glow::HasContext;

        let mut textures = Vec::new();
        let linked = self
            .programs
            .get_mut(program.0 as usize)
            .ok_or(GraphError::UnknownProgram(program.0))?;
        let gl = self.ctx.gl();
        let handle = linked.program;

        for (name, value) in uniforms {
            let location = linked
                .locations
                .entry(name.clone())
                // SAFETY: the program is linked and live.
                .or_insert_with(|| unsafe { gl.get_uniform_location(handle, name) })
                .clone();
            let Some(location) = location else {
                continue;
            };
            // SAFETY: the program is bound by the caller and the location
            // belongs to it.
            unsafe {
                match value {
                    UniformValue::Float(v) => gl.uniform_1_f32(Some(&location), *v as f32),
                    UniformValue::Int(v) => gl.uniform_1_i32(Some(&location), *v as i32),
                    UniformValue::Vec(v) => match v.as_slice() {
                        [x] => gl.uniform_1_f32(Some(&location), *x as f32),
                        [x, y] => gl.uniform_2_f32(Some(&location), *x as f32, *y as f32),
                        [x, y, z] => gl.uniform_3_f32(Some(&location), *x as f32, *y as f32, *z as f32),
                        [x, y, z, w, ..] => {
                            gl.uniform_4_f32(Some(&location), *x as f32, *y as f32, *z as f32, *w as f32)
                        }
                        [] => {}
                    },
                    UniformValue::Mat4(m) => gl.uniform_matrix_4_f32_slice(Some(&location), false, m),
                    UniformValue::Texture(texture) => textures.push((location, *texture)),
                }
            }
        }

        for (unit, (location, texture)) in textures.into_iter().enumerate() {
            let bound = texture.and_then(|t| self.resolve(t));
            if texture.is_some() && bound.is_none() {
                tracing::warn!(?texture, "texture is not known to the backend, sampling nothing");
            }
            // SAFETY: unit indices stay within the handful of samplers a
            // chain declares.
            unsafe {
                gl.active_texture(glow::TEXTURE0 + unit as u32);
                gl.bind_texture(glow::TEXTURE_2D, bound);
                gl.uniform_1_i32(Some(&location), unit as i32);
            }
        }
        Ok(())
    }

    #[allow(unsafe_code)]
    fn apply_blend(&self, blend: Option<BlendState>) {
        use glow::HasContext;

        let gl = self.ctx.gl();
        // SAFETY: fixed-function state changes only.
        unsafe {
            match blend {
                Some(state) => {
                    gl.enable(glow::BLEND);
                    gl.blend_equation(glow::FUNC_ADD);
                    gl.blend_func_separate(
                        gl_factor(state.src_rgb),
                        gl_factor(state.dst_rgb),
                        gl_factor(state.src_alpha),
                        gl_factor(state.dst_alpha),
                    );
                }
                None => gl.disable(glow::BLEND),
            }
        }
    }

    /// Deletes every GL object this backend created.
    #[allow(unsafe_code)]
    pub fn destroy(self) -> GpuContext {
        use glow::HasContext;

        let gl = self.ctx.gl();
        for target in self.targets.values() {
            target.destroy(gl);
        }
        // SAFETY: every handle below was created by this backend.
        unsafe {
            for linked in &self.programs {
                gl.delete_program(linked.program);
            }
            gl.delete_buffer(self.vertex_buffer);
            gl.delete_vertex_array(self.vertex_array);
        }
        self.ctx
    }
}

impl GraphicsApi for GlowApi {
    fn create_target(&mut self, width: u32, height: u32) -> Result<TargetId, GraphError> {
        let config = self.ctx.target_config(width, height);
        let target = RenderTarget::new(self.ctx.gl(), config)?;
        let id = TargetId(self.next_target);
        self.next_target += 1;
        self.targets.insert(id, target);
        Ok(id)
    }

    fn resize_target(&mut self, target: TargetId, width: u32, height: u32) -> Result<(), GraphError> {
        let gl = self.ctx.gl();
        self.targets
            .get_mut(&target)
            .ok_or(GraphError::UnknownTarget(target.0))?
            .resize(gl, width, height)
    }

    fn destroy_target(&mut self, target: TargetId) {
        if let Some(t) = self.targets.remove(&target) {
            t.destroy(self.ctx.gl());
        }
    }

    #[allow(unsafe_code)]
    fn create_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, GraphError> {
        use glow::HasContext;

        let gl = self.ctx.gl();
        let program = compile_program(gl, vertex, fragment)?;
        // SAFETY: the program was just linked.
        let position = unsafe { gl.get_attrib_location(program, POSITION_ATTRIBUTE) };
        let id = ProgramId(self.programs.len() as u32);
        self.programs.push(LinkedProgram {
            program,
            position,
            locations: HashMap::new(),
        });
        Ok(id)
    }

    #[allow(unsafe_code)]
    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), GraphError> {
        use glow::HasContext;

        let (program, position) = match self.programs.get(call.program.0 as usize) {
            Some(linked) => (linked.program, linked.position),
            None => return Err(GraphError::UnknownProgram(call.program.0)),
        };
        self.target(call.target)?.bind(self.ctx.gl(), call.viewport);

        // SAFETY: every handle is live and the buffer upload is sized from
        // the slice itself.
        unsafe {
            let gl = self.ctx.gl();
            gl.use_program(Some(program));
            gl.bind_vertex_array(Some(self.vertex_array));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vertex_buffer));
            let bytes: Vec<u8> = call.positions.iter().flat_map(|f| f.to_ne_bytes()).collect();
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, &bytes, glow::DYNAMIC_DRAW);
            if let Some(location) = position {
                gl.enable_vertex_attrib_array(location);
                gl.vertex_attrib_pointer_f32(location, 2, glow::FLOAT, false, 0, 0);
            }
        }

        self.upload_uniforms(call.program, call.uniforms)?;
        self.apply_blend(call.blend);

        // SAFETY: state was fully set up above.
        unsafe {
            let gl = self.ctx.gl();
            if let Some(width) = call.line_width {
                gl.line_width(width);
            }
            gl.draw_arrays(gl_mode(call.topology), 0, call.count as i32);
            gl.bind_vertex_array(None);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
        Ok(())
    }

    #[allow(unsafe_code)]
    fn clear(&mut self, target: TargetId, color: [f32; 4]) -> Result<(), GraphError> {
        use glow::HasContext;

        let gl = self.ctx.gl();
        self.target(target)?.bind(gl, None);
        // SAFETY: the target's framebuffer is bound.
        unsafe {
            gl.clear_color(color[0], color[1], color[2], color[3]);
            gl.clear(glow::COLOR_BUFFER_BIT);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
        Ok(())
    }
}
