//! Generators: primitives that produce an image from a coordinate.

use shadegraph_core::{DefaultValue, GlslType, InputDecl, PrimitiveDef, PrimitiveKind};

fn source(name: &str, body: &str) -> PrimitiveDef {
    PrimitiveDef::new(name, PrimitiveKind::Source, body)
}

const VORONOI: &str = r#"   vec3 color = vec3(.0);
   _st *= scale;
   vec2 i_st = floor(_st);
   vec2 f_st = fract(_st);
   float m_dist = 10.;
   vec2 m_point;
   for (int j=-1; j<=1; j++ ) {
   for (int i=-1; i<=1; i++ ) {
   vec2 neighbor = vec2(float(i),float(j));
   vec2 p = i_st + neighbor;
   vec2 point = fract(sin(vec2(dot(p,vec2(127.1,311.7)),dot(p,vec2(269.5,183.3))))*43758.5453);
   point = 0.5 + 0.5*sin(time*speed + 6.2831*point);
   vec2 diff = neighbor + point - f_st;
   float dist = length(diff);
   if( dist < m_dist ) {
   m_dist = dist;
   m_point = point;
   }
   }
   }
   color += dot(m_point,vec2(.3,.6));
   color *= 1.0 - blending*m_dist;
   return vec4(color, 1.0);"#;

const OSC: &str = r#"   vec2 st = _st;
   float r = sin((st.x-offset/frequency+time*sync)*frequency)*0.5  + 0.5;
   float g = sin((st.x+time*sync)*frequency)*0.5 + 0.5;
   float b = sin((st.x+offset/frequency+time*sync)*frequency)*0.5  + 0.5;
   return vec4(r, g, b, 1.0);"#;

const SHAPE: &str = r#"   vec2 st = _st * 2. - 1.;
   float a = atan(st.x,st.y)+3.1416;
   float r = (2.*3.1416)/sides;
   float d = cos(floor(.5+a/r)*r-a)*length(st);
   float v = 1.0-smoothstep(radius, radius + smoothing + 0.0000001, d);
   return vec4(v);"#;

const HEX: &str = r#"   int r = (rgb / 256 / 256) % 256;
   int g = (rgb / 256) % 256;
   int b = rgb % 256;
   return vec4(float(r) / 255.0, float(g) / 255.0, float(b) / 255.0, a);"#;

// Hash noise on a pixel grid of `size` pixels per cell.
const WNOISE: &str = r#"   const highp float a = 12.9898;
   const highp float b = 78.233;
   const highp float c = 43758.5453;
   highp float dt = dot(floor((_st * resolution) / size), offset + vec2(a, b));
   highp float sn = mod(dt, 3.141592653589793);
   highp float d = fract(sin(sn) * c);
   return vec4(d, d, d, 1.0);"#;

const CNOISE: &str = r#"   const highp float a = 12.9898;
   const highp float b = 78.233;
   const highp float c = 43758.5453;
   highp vec2 cell = floor((_st * resolution) / size);
   highp vec2 k = offset + vec2(a, b);
   highp float rr = fract(sin(mod(dot(cell, k), 3.141592653589793)) * c);
   highp float gg = fract(sin(mod(dot(cell + vec2(0.123, 0.567), k), 3.141592653589793)) * c);
   highp float bb = fract(sin(mod(dot(cell + vec2(0.543, 0.905), k), 3.141592653589793)) * c);
   return vec4(rr, gg, bb, 1.0);"#;

pub fn primitives() -> Vec<PrimitiveDef> {
    vec![
        source(
            "noise",
            "   return vec4(vec3(_noise(vec3(_st*scale, offset*time))), 1.0);",
        )
        .input(InputDecl::float("scale", 10.0))
        .input(InputDecl::float("offset", 0.1)),
        source("voronoi", VORONOI)
            .input(InputDecl::float("scale", 5.0))
            .input(InputDecl::float("speed", 0.3))
            .input(InputDecl::float("blending", 0.3)),
        source("osc", OSC)
            .input(InputDecl::float("frequency", 60.0))
            .input(InputDecl::float("sync", 0.1))
            .input(InputDecl::float("offset", 0.0)),
        source("shape", SHAPE)
            .input(InputDecl::float("sides", 3.0))
            .input(InputDecl::float("radius", 0.3))
            .input(InputDecl::float("smoothing", 0.01)),
        source("gradient", "   return vec4(_st, sin(time*speed), 1.0);")
            .input(InputDecl::float("speed", 0.0)),
        source("src", "   return texture(tex, fract(_st));")
            .input(InputDecl::required("tex", GlslType::Sampler2D)),
        source("solid", "   return vec4(r, g, b, a);")
            .input(InputDecl::float("r", 0.0))
            .input(InputDecl::float("g", 0.0))
            .input(InputDecl::float("b", 0.0))
            .input(InputDecl::float("a", 1.0)),
        source("solid2", "   return vec4(rg, b, a);")
            .input(InputDecl::vector("rg", GlslType::Vec2, 0.0))
            .input(InputDecl::float("b", 0.0))
            .input(InputDecl::float("a", 1.0)),
        source("solid3", "   return vec4(rgb, a);")
            .input(InputDecl::vector("rgb", GlslType::Vec3, 0.0))
            .input(InputDecl::float("a", 1.0)),
        source("hex", HEX)
            .input(InputDecl::new("rgb", GlslType::Int, DefaultValue::Scalar(0.0)))
            .input(InputDecl::float("a", 1.0)),
        source("wnoise", WNOISE)
            .input(InputDecl::float("size", 10.0))
            .input(InputDecl::vector("offset", GlslType::Vec2, 0.0)),
        source("cnoise", CNOISE)
            .input(InputDecl::float("size", 10.0))
            .input(InputDecl::vector("offset", GlslType::Vec2, 0.0)),
        source("prev", "   return texture(prevBuffer, fract(_st));"),
    ]
}
