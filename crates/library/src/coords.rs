//! Coordinate transforms, plain and side-chain driven.

use shadegraph_core::{GlslType, InputDecl, PrimitiveDef, PrimitiveKind};

fn coord(name: &str, body: &str) -> PrimitiveDef {
    PrimitiveDef::new(name, PrimitiveKind::Coord, body)
}

fn modulator(name: &str, body: &str) -> PrimitiveDef {
    PrimitiveDef::new(name, PrimitiveKind::CombineCoord, body)
}

const ROTATE: &str = r#"   vec2 xy = _st - vec2(0.5);
   float ang = angle * (3.141592653589793 / 180.0);
   ang = ang + speed *time;
   xy = mat2(cos(ang),-sin(ang), sin(ang),cos(ang))*xy;
   xy += 0.5;
   return xy;"#;

const KALEID: &str = r#"   vec2 st = _st;
   st -= 0.5;
   float r = length(st);
   float a = atan(st.y, st.x);
   float pi = 2.*3.1416;
   a = mod(a,pi/nSides);
   a = abs(a-pi/nSides/2.);
   return r*vec2(cos(a), sin(a));"#;

const MODULATE_KALEID: &str = r#"   vec2 st = _st - 0.5;
   float r = length(st);
   float a = atan(st.y, st.x);
   float pi = 2.*3.1416;
   a = mod(a,pi/nSides);
   a = abs(a-pi/nSides/2.);
   return (_c0.r+r)*vec2(cos(a), sin(a));"#;

const MODULATE_REPEAT: &str = r#"   vec2 st = _st * vec2(repeatX, repeatY);
   st.x += step(1., mod(st.y,2.0)) + _c0.r * offsetX;
   st.y += step(1., mod(st.x,2.0)) + _c0.g * offsetY;
   return fract(st);"#;

const MODULATE_ROTATE: &str = r#"   vec2 xy = _st - vec2(0.5);
   float angle = offset + _c0.x * multiple;
   xy = mat2(cos(angle),-sin(angle), sin(angle),cos(angle))*xy;
   xy += 0.5;
   return xy;"#;

pub fn primitives() -> Vec<PrimitiveDef> {
    vec![
        coord("rotate", ROTATE)
            .input(InputDecl::float("angle", 10.0))
            .input(InputDecl::float("speed", 0.0)),
        coord(
            "scale",
            "   vec2 xy = _st - offset;\n   xy*=(1.0/amount);\n   xy+=offset;\n   return xy;",
        )
        .input(InputDecl::vector("amount", GlslType::Vec2, 1.5))
        .input(InputDecl::vector("offset", GlslType::Vec2, 0.5)),
        coord(
            "pixelate",
            "   vec2 xy = vec2(pixelX, pixelY);\n   return (floor(_st * xy) + 0.5)/xy;",
        )
        .input(InputDecl::float("pixelX", 20.0))
        .input(InputDecl::float("pixelY", 20.0)),
        coord(
            "repeatX",
            "   vec2 st = _st * vec2(reps, 1.0);\n   st.y += step(1., mod(st.x,2.0))* offset;\n   return fract(st);",
        )
        .input(InputDecl::float("reps", 3.0))
        .input(InputDecl::float("offset", 0.0)),
        coord(
            "repeatY",
            "   vec2 st = _st * vec2(1.0, reps);\n   st.x += step(1., mod(st.y,2.0))* offset;\n   return fract(st);",
        )
        .input(InputDecl::float("reps", 3.0))
        .input(InputDecl::float("offset", 0.0)),
        coord("kaleid", KALEID).input(InputDecl::float("nSides", 4.0)),
        modulator("modulate", "   return _st + _c0.xy*amount;").input(InputDecl::float("amount", 0.1)),
        modulator(
            "modulateScale",
            "   vec2 xy = _st - vec2(0.5);\n   xy*=(1.0/vec2(offset + multiple*_c0.r, offset + multiple*_c0.g));\n   xy+=vec2(0.5);\n   return xy;",
        )
        .input(InputDecl::float("multiple", 1.0))
        .input(InputDecl::float("offset", 1.0)),
        modulator(
            "modulatePixelate",
            "   vec2 xy = vec2(offset + _c0.x*multiple, offset + _c0.y*multiple);\n   return (floor(_st * xy) + 0.5)/xy;",
        )
        .input(InputDecl::float("multiple", 10.0))
        .input(InputDecl::float("offset", 3.0)),
        modulator("modulateRotate", MODULATE_ROTATE)
            .input(InputDecl::float("multiple", 1.0))
            .input(InputDecl::float("offset", 0.0)),
        modulator(
            "modulateHue",
            "   return _st + (vec2(_c0.g - _c0.r, _c0.b - _c0.g) * amount * 1.0/resolution);",
        )
        .input(InputDecl::float("amount", 1.0)),
        modulator("modulateRepeat", MODULATE_REPEAT)
            .input(InputDecl::float("repeatX", 3.0))
            .input(InputDecl::float("repeatY", 3.0))
            .input(InputDecl::float("offsetX", 0.5))
            .input(InputDecl::float("offsetY", 0.5)),
        modulator(
            "modulateRepeatX",
            "   vec2 st = _st * vec2(reps, 1.0);\n   st.y += step(1., mod(st.x,2.0)) + _c0.r * offset;\n   return fract(st);",
        )
        .input(InputDecl::float("reps", 3.0))
        .input(InputDecl::float("offset", 0.5)),
        modulator(
            "modulateRepeatY",
            "   vec2 st = _st * vec2(1.0, reps);\n   st.x += step(1., mod(st.y,2.0)) + _c0.r * offset;\n   return fract(st);",
        )
        .input(InputDecl::float("reps", 3.0))
        .input(InputDecl::float("offset", 0.5)),
        modulator("modulateKaleid", MODULATE_KALEID).input(InputDecl::float("nSides", 4.0)),
        modulator(
            "modulateScrollX",
            "   _st.x += _c0.r*scrollX + time*speed;\n   return fract(_st);",
        )
        .input(InputDecl::float("scrollX", 0.5))
        .input(InputDecl::float("speed", 0.0)),
        modulator(
            "modulateScrollY",
            "   _st.y += _c0.r*scrollY + time*speed;\n   return fract(_st);",
        )
        .input(InputDecl::float("scrollY", 0.5))
        .input(InputDecl::float("speed", 0.0)),
    ]
}
