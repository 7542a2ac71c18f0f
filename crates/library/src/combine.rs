//! Two-image combinators. `_c0` is the chain so far, `_c1` the side-chain.

use shadegraph_core::{InputDecl, PrimitiveDef, PrimitiveKind};

fn combine(name: &str, body: &str) -> PrimitiveDef {
    PrimitiveDef::new(name, PrimitiveKind::Combine, body)
}

pub fn primitives() -> Vec<PrimitiveDef> {
    vec![
        combine("add", "   return (_c0+_c1)*amount + _c0*(1.0-amount);")
            .input(InputDecl::float("amount", 1.0)),
        combine("sub", "   return (_c0-_c1)*amount + _c0*(1.0-amount);")
            .input(InputDecl::float("amount", 1.0)),
        combine(
            "layer",
            "   return vec4(mix(_c0.rgb, _c1.rgb, _c1.a), clamp(_c0.a + _c1.a, 0.0, 1.0));",
        ),
        combine("blend", "   return _c0*(1.0-amount)+_c1*amount;")
            .input(InputDecl::float("amount", 0.5)),
        combine("mult", "   return _c0*(1.0-amount)+(_c0*_c1)*amount;")
            .input(InputDecl::float("amount", 1.0)),
        combine(
            "diff",
            "   return vec4(abs(_c0.rgb-_c1.rgb), max(_c0.a, _c1.a));",
        ),
        combine(
            "mask",
            "   float a = _luminance(_c1.rgb);\n   return vec4(_c0.rgb*a, a*_c0.a);",
        ),
    ]
}
