//! Color operators. Several carry a coordinate overload and also work
//! directly on the coordinate when applied before any generator.

use shadegraph_core::{CoordOverload, GlslType, InputDecl, PrimitiveDef, PrimitiveKind};

fn color(name: &str, body: &str) -> PrimitiveDef {
    PrimitiveDef::new(name, PrimitiveKind::Color, body)
}

/// Overload reusing the primitive's own inputs.
fn on_coord(body: &str) -> CoordOverload {
    CoordOverload {
        inputs: None,
        body: body.to_string(),
        return_type: None,
    }
}

fn on_coord_with(inputs: Vec<InputDecl>, body: &str) -> CoordOverload {
    CoordOverload {
        inputs: Some(inputs),
        body: body.to_string(),
        return_type: None,
    }
}

const POSTERIZE: &str = r#"   vec4 c2 = pow(_c0, vec4(gamma));
   c2 *= vec4(bins);
   c2 = floor(c2);
   c2/= vec4(bins);
   c2 = pow(c2, vec4(1.0/gamma));
   return vec4(c2.xyz, _c0.a);"#;

// Negative channels select the inverted input.
const COLOR: &str = r#"   vec4 c = vec4(r, g, b, a);
   vec4 pos = step(0.0, c);
   return vec4(mix((1.0-_c0)*abs(c), c*_c0, pos));"#;

const LUMA: &str = r#"   float a = smoothstep(threshold-(tolerance+0.0000001), threshold+(tolerance+0.0000001), _luminance(_c0.rgb));
   return vec4(_c0.rgb*a, a);"#;

const THRESH: &str = r#"   return vec4(vec3(smoothstep(threshold-(tolerance+0.0000001), threshold+(tolerance+0.0000001), _luminance(_c0.rgb))), _c0.a);"#;

const COLORAMA: &str = r#"   vec3 c = _rgbToHsv(_c0.rgb);
   c += vec3(amount);
   c = _hsvToRgb(c);
   c = fract(c);
   return vec4(c, _c0.a);"#;

/// Channel extractors `r`, `g`, `b`, `a`.
fn channel(name: &'static str) -> PrimitiveDef {
    color(name, &format!("   return vec4(_c0.{name} * scale + offset);"))
        .input(InputDecl::float("scale", 1.0))
        .input(InputDecl::float("offset", 0.0))
}

/// Periodic shaping functions, renamed to stay clear of the GLSL built-ins.
fn periodic(name: &'static str, period: &str) -> PrimitiveDef {
    color(
        name,
        &format!("   return vec4({name}(_c0.rgb * {period} * freq) * amp, _c0.a);"),
    )
    .glsl_name(format!("_{name}"))
    .input(InputDecl::vector("freq", GlslType::Vec3, 1.0))
    .input(InputDecl::vector("amp", GlslType::Vec3, 1.0))
    .coord_overload(on_coord_with(
        vec![
            InputDecl::vector("freq", GlslType::Vec2, 1.0),
            InputDecl::vector("amp", GlslType::Vec2, 0.5),
        ],
        &format!("   return {name}(_st * {period} * freq) * amp;"),
    ))
}

pub fn primitives() -> Vec<PrimitiveDef> {
    vec![
        color("posterize", POSTERIZE)
            .input(InputDecl::float("bins", 3.0))
            .input(InputDecl::float("gamma", 0.6)),
        color("shift", "   vec4 c2 = vec4(_c0);\n   c2 = fract(c2 + val);\n   return c2;")
            .input(InputDecl::vector("val", GlslType::Vec4, 0.5)),
        color(
            "repeat",
            "   vec3 c2 = _c0.rgb * repeat;\n   c2 += step(1., mod(c2,2.0)) * offset;\n   return vec4(fract(c2), _c0.a);",
        )
        .input(InputDecl::vector("repeat", GlslType::Vec3, 3.0))
        .input(InputDecl::vector("offset", GlslType::Vec3, 0.0))
        .coord_overload(on_coord_with(
            vec![
                InputDecl::vector("repeat", GlslType::Vec2, 3.0),
                InputDecl::vector("offset", GlslType::Vec2, 0.0),
            ],
            "   vec2 st = _st * repeat;\n   st += step(1., mod(st,2.0)) * offset;\n   return fract(st);",
        )),
        color(
            "scroll",
            "   _c0.rgb += scroll + time*speed;\n   return vec4(fract(_c0.rgb), _c0.a);",
        )
        .input(InputDecl::vector("scroll", GlslType::Vec3, 0.5))
        .input(InputDecl::vector("speed", GlslType::Vec3, 0.0))
        .coord_overload(on_coord_with(
            vec![
                InputDecl::vector("scroll", GlslType::Vec2, 0.5),
                InputDecl::vector("speed", GlslType::Vec2, 0.0),
            ],
            "   _st.xy += scroll + time*speed;\n   return fract(_st);",
        )),
        color(
            "scrollX",
            "   _c0.x += scrollX + time*speed;\n   return vec4(fract(_c0.x), _c0.y, _c0.z, _c0.a);",
        )
        .input(InputDecl::float("scrollX", 0.5))
        .input(InputDecl::float("speed", 0.0))
        .coord_overload(on_coord("   _st.x += scrollX + time*speed;\n   return fract(_st);")),
        color(
            "scrollY",
            "   _c0.y += scrollY + time*speed;\n   return vec4(_c0.x, fract(_c0.y), _c0.z, _c0.a);",
        )
        .input(InputDecl::float("scrollY", 0.5))
        .input(InputDecl::float("speed", 0.0))
        .coord_overload(on_coord("   _st.y += scrollY + time*speed;\n   return fract(_st);")),
        color(
            "scrollZ",
            "   _c0.z += scrollZ + time*speed;\n   return vec4(_c0.x, _c0.y, fract(_c0.z), _c0.a);",
        )
        .input(InputDecl::float("scrollZ", 0.5))
        .input(InputDecl::float("speed", 0.0)),
        color(
            "invert",
            "   return vec4((1.0-_c0.rgb)*amount + _c0.rgb*(1.0-amount), _c0.a);",
        )
        .input(InputDecl::float("amount", 1.0))
        .coord_overload(on_coord("   return (1.0-_st)*amount + _st*(1.0-amount);")),
        color(
            "contrast",
            "   vec4 c = (_c0-vec4(0.5))*vec4(amount) + vec4(0.5);\n   return vec4(c.rgb, _c0.a);",
        )
        .input(InputDecl::float("amount", 1.6)),
        color("brightness", "   return vec4(_c0.rgb + vec3(amount), _c0.a);")
            .input(InputDecl::float("amount", 0.4)),
        color("luma", LUMA)
            .input(InputDecl::float("threshold", 0.5))
            .input(InputDecl::float("tolerance", 0.1)),
        color("thresh", THRESH)
            .input(InputDecl::float("threshold", 0.5))
            .input(InputDecl::float("tolerance", 0.04)),
        color("color", COLOR)
            .input(InputDecl::float("r", 1.0))
            .input(InputDecl::float("g", 1.0))
            .input(InputDecl::float("b", 1.0))
            .input(InputDecl::float("a", 1.0)),
        color(
            "saturate",
            "   const vec3 W = vec3(0.2125, 0.7154, 0.0721);\n   vec3 intensity = vec3(dot(_c0.rgb, W));\n   return vec4(mix(intensity, _c0.rgb, amount), _c0.a);",
        )
        .glsl_name("_saturate")
        .input(InputDecl::float("amount", 2.0)),
        color(
            "hue",
            "   vec3 c = _rgbToHsv(_c0.rgb);\n   c.r += hue;\n   return vec4(_hsvToRgb(c), _c0.a);",
        )
        .input(InputDecl::float("hue", 0.4)),
        color("colorama", COLORAMA).input(InputDecl::float("amount", 0.005)),
        color("sum", "   vec4 v = _c0 * scale;\n   return v.r + v.g + v.b + v.a;")
            .input(InputDecl::vector("scale", GlslType::Vec4, 1.0))
            .returns(GlslType::Float)
            .coord_overload(CoordOverload {
                inputs: Some(vec![InputDecl::vector("scale", GlslType::Vec2, 1.0)]),
                body: "   vec2 v = _st * scale;\n   return v.x + v.y;".to_string(),
                return_type: Some(GlslType::Float),
            }),
        channel("r"),
        channel("g"),
        channel("b"),
        channel("a"),
        color(
            "map",
            "   return (_c0 - start1) / (stop1 - start1) * (stop2 - start2) + start2;",
        )
        .input(InputDecl::required("start1", GlslType::Vec4))
        .input(InputDecl::required("stop1", GlslType::Vec4))
        .input(InputDecl::vector("start2", GlslType::Vec4, 0.0))
        .input(InputDecl::vector("stop2", GlslType::Vec4, 1.0))
        .coord_overload(on_coord_with(
            vec![
                InputDecl::required("start1", GlslType::Vec2),
                InputDecl::required("stop1", GlslType::Vec2),
                InputDecl::vector("start2", GlslType::Vec2, 0.0),
                InputDecl::vector("stop2", GlslType::Vec2, 1.0),
            ],
            "   return (_st - start1) / (stop1 - start1) * (stop2 - start2) + start2;",
        )),
        periodic("sin", "TWO_PI"),
        periodic("cos", "TWO_PI"),
        periodic("tan", "PI"),
        periodic("atan", "PI"),
        color("pow", "   return vec4(pow(_c0.rgb, power), _c0.a);")
            .glsl_name("_pow")
            .input(InputDecl::vector("power", GlslType::Vec3, 2.0))
            .coord_overload(on_coord_with(
                vec![InputDecl::vector("power", GlslType::Vec2, 2.0)],
                "   return pow(_st, power);",
            )),
    ]
}
