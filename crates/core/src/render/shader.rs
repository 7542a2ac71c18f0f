//! Shader compilation and linking.
//!
//! Driver logs are returned with the offending source numbered line by
//! line, so a rejected chain can be read next to its error.

use std::fmt;

use thiserror::Error;

use crate::error::GraphError;

/// Attribute every generated vertex shader reads its position from. It is
/// pinned to location 0 before linking.
pub const POSITION_ATTRIBUTE: &str = "position";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    fn gl_enum(self) -> u32 {
        match self {
            Stage::Vertex => glow::VERTEX_SHADER,
            Stage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        })
    }
}

#[derive(Debug, Clone, Error)]
pub enum ShaderError {
    #[error("{stage} shader rejected:\n{log}")]
    Compile { stage: Stage, log: String },
    #[error("program link failed:\n{0}")]
    Link(String),
}

impl From<ShaderError> for GraphError {
    fn from(err: ShaderError) -> Self {
        GraphError::Backend(err.to_string())
    }
}

/// Numbers every line of `source`, right-aligned, and appends `log`.
pub fn format_shader_error(source: &str, log: &str) -> String {
    let width = source.lines().count().max(1).to_string().len();
    let mut out: Vec<String> = source
        .lines()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {line}", i + 1))
        .collect();
    if !log.is_empty() {
        if !out.is_empty() {
            out.push(String::new());
        }
        out.push(log.to_string());
    }
    out.join("\n")
}

#[allow(unsafe_code)]
pub fn compile_shader(gl: &glow::Context, stage: Stage, source: &str) -> Result<glow::Shader, ShaderError> {
    use glow::HasContext;

    // SAFETY: the stage constant is valid and a rejected shader is deleted
    // before returning.
    unsafe {
        let shader = gl
            .create_shader(stage.gl_enum())
            .map_err(|log| ShaderError::Compile { stage, log })?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if gl.get_shader_compile_status(shader) {
            return Ok(shader);
        }
        let log = format_shader_error(source, &gl.get_shader_info_log(shader));
        gl.delete_shader(shader);
        Err(ShaderError::Compile { stage, log })
    }
}

/// Links compiled stages, binding [`POSITION_ATTRIBUTE`] to location 0.
/// The stages are detached again whatever the outcome.
#[allow(unsafe_code)]
pub fn link_program(gl: &glow::Context, stages: &[glow::Shader]) -> Result<glow::Program, ShaderError> {
    use glow::HasContext;

    // SAFETY: every stage is a live handle from compile_shader.
    unsafe {
        let program = gl.create_program().map_err(ShaderError::Link)?;
        for &stage in stages {
            gl.attach_shader(program, stage);
        }
        gl.bind_attrib_location(program, 0, POSITION_ATTRIBUTE);
        gl.link_program(program);
        for &stage in stages {
            gl.detach_shader(program, stage);
        }
        if gl.get_program_link_status(program) {
            return Ok(program);
        }
        let log = gl.get_program_info_log(program);
        gl.delete_program(program);
        Err(ShaderError::Link(log))
    }
}

/// Builds a program from vertex and fragment source. Stage objects never
/// outlive the call.
#[allow(unsafe_code)]
pub fn compile_program(gl: &glow::Context, vertex: &str, fragment: &str) -> Result<glow::Program, ShaderError> {
    use glow::HasContext;

    let mut stages = Vec::with_capacity(2);
    let mut result = Ok(());
    for (stage, source) in [(Stage::Vertex, vertex), (Stage::Fragment, fragment)] {
        match compile_shader(gl, stage, source) {
            Ok(shader) => stages.push(shader),
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }
    let program = result.and_then(|()| link_program(gl, &stages));

    // SAFETY: a linked program keeps its own copy of the stages.
    for shader in stages {
        unsafe { gl.delete_shader(shader) };
    }
    if let Err(e) = &program {
        tracing::debug!(error = %e, "shader program rejected");
    }
    program
}
