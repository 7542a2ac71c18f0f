//! Vertex shader and fade shader sources shared by every output.
//!
//! Positions arrive in normalised `[0, 1]` space and are mapped to clip
//! space through the camera. `uv` carries the normalised position to the
//! fragment stage.

use crate::compiler::Precision;
use crate::types::float_literal;

use super::topology::Topology;

/// Vertex shader for draws of the given topology.
pub fn vertex_shader(precision: Precision, topology: Topology) -> String {
    let point_size = if topology == Topology::Points {
        "  gl_PointSize = 1.0;\n"
    } else {
        ""
    };
    format!(
        "#version 300 es\n\
         precision {precision} float;\n\
         in vec2 position;\n\
         out vec2 uv;\n\
         uniform mat4 projection;\n\
         uniform mat4 view;\n\
         void main() {{\n\
         \x20 uv = position;\n\
         {point_size}\
         \x20 gl_Position = projection * view * vec4(2.0 * position - 1.0, 0.0, 1.0);\n\
         }}\n",
        precision = precision.qualifier(),
    )
}

/// Fragment shader that blends the feedback buffer toward transparent.
/// `amount` is clamped to `[0, 1]`.
pub fn fade_shader(precision: Precision, amount: f64) -> String {
    format!(
        "#version 300 es\n\
         precision {precision} float;\n\
         in vec2 uv;\n\
         uniform sampler2D prevBuffer;\n\
         out vec4 fragColor;\n\
         void main() {{\n\
         \x20 fragColor = mix(texture(prevBuffer, uv), vec4(0.0), {amount});\n\
         }}\n",
        precision = precision.qualifier(),
        amount = float_literal(amount.clamp(0.0, 1.0)),
    )
}
