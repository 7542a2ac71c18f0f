//! Small primitive table shared by the unit tests of this crate.

use crate::primitive::{CoordOverload, InputDecl, PrimitiveDef, PrimitiveRegistry};
use crate::signature::PrimitiveKind;
use crate::types::{DefaultValue, GlslType};
use crate::value::{FrameContext, FrameProps, TextureTable};

pub(crate) const OSC_BODY: &str = "   vec2 st = _st;\n   float r = sin((st.x-offset/frequency+time*sync)*frequency)*0.5  + 0.5;\n   return vec4(r, r, r, 1.0);";

pub(crate) fn registry() -> PrimitiveRegistry {
    PrimitiveRegistry::new()
        .with(
            PrimitiveDef::new("osc", PrimitiveKind::Source, OSC_BODY)
                .input(InputDecl::float("frequency", 60.0))
                .input(InputDecl::float("sync", 0.1))
                .input(InputDecl::float("offset", 0.0)),
        )
        .with(
            PrimitiveDef::new("solid", PrimitiveKind::Source, "   return vec4(r, g, b, a);")
                .input(InputDecl::float("r", 0.0))
                .input(InputDecl::float("g", 0.0))
                .input(InputDecl::float("b", 0.0))
                .input(InputDecl::float("a", 1.0)),
        )
        .with(
            PrimitiveDef::new("src", PrimitiveKind::Source, "   return texture(tex, fract(_st));")
                .input(InputDecl::required("tex", GlslType::Sampler2D)),
        )
        .with(
            PrimitiveDef::new(
                "rotate",
                PrimitiveKind::Coord,
                "   vec2 xy = _st - vec2(0.5);\n   float ang = angle + speed * time;\n   xy = mat2(cos(ang),-sin(ang), sin(ang),cos(ang))*xy;\n   xy += 0.5;\n   return xy;",
            )
            .input(InputDecl::float("angle", 10.0))
            .input(InputDecl::float("speed", 0.0)),
        )
        .with(
            PrimitiveDef::new(
                "invert",
                PrimitiveKind::Color,
                "   return vec4((1.0-_c0.rgb)*amount + _c0.rgb*(1.0-amount), _c0.a);",
            )
            .input(InputDecl::float("amount", 1.0)),
        )
        .with(
            PrimitiveDef::new("tint", PrimitiveKind::Color, "   return vec4(_c0.rgb * rgb, _c0.a);")
                .input(InputDecl::new(
                    "rgb",
                    GlslType::Vec3,
                    DefaultValue::Vector(vec![1.0, 1.0, 1.0]),
                )),
        )
        .with(
            PrimitiveDef::new("shift", PrimitiveKind::Color, "   return fract(_c0 + amount);")
                .input(InputDecl::vector("amount", GlslType::Vec4, 0.0)),
        )
        .with(
            PrimitiveDef::new(
                "add",
                PrimitiveKind::Combine,
                "   return (_c0+_c1)*amount + _c0*(1.0-amount);",
            )
            .input(InputDecl::float("amount", 1.0)),
        )
        .with(
            PrimitiveDef::new(
                "modulate",
                PrimitiveKind::CombineCoord,
                "   return _st + _c0.xy*amount;",
            )
            .input(InputDecl::float("amount", 0.1)),
        )
        .with(
            PrimitiveDef::new(
                "sum",
                PrimitiveKind::Color,
                "   vec4 v = _c0 * s;\n   return v.r + v.g + v.b + v.a;",
            )
            .input(InputDecl::vector("s", GlslType::Vec4, 1.0))
            .returns(GlslType::Float)
            .coord_overload(CoordOverload {
                inputs: Some(vec![InputDecl::vector("s", GlslType::Vec2, 1.0)]),
                body: "   vec2 v = _st * s;\n   return v.x + v.y;".into(),
                return_type: Some(GlslType::Float),
            }),
        )
        .with(
            PrimitiveDef::new("gain", PrimitiveKind::Raw, "   return _in * level;")
                .input(InputDecl::float("level", 1.0)),
        )
        .with(
            PrimitiveDef::new("pulse", PrimitiveKind::Source, "   return vec4(vec3(level), 1.0);")
                .input(InputDecl::float("level", 1.0).uniform()),
        )
}

pub(crate) fn with_frame<R>(props: &FrameProps, f: impl FnOnce(&FrameContext<'_>) -> R) -> R {
    let textures = TextureTable::default();
    let ctx = FrameContext {
        props,
        draw_index: 0,
        textures: &textures,
    };
    f(&ctx)
}
