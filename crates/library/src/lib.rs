#![deny(unsafe_code)]
//! The standard primitive table for shadegraph.
//!
//! Generators, coordinate transforms, color operators and combinators as
//! [`PrimitiveDef`]s, plus the GLSL [`PRELUDE`] they share. Both the CLI and
//! embedding applications start from [`standard_registry`] and may register
//! their own primitives on top.

mod colors;
mod combine;
mod coords;
mod prelude;
mod sources;

pub use prelude::PRELUDE;

use shadegraph_core::{Compiler, PrimitiveDef, PrimitiveRegistry};

/// Every standard primitive, grouped by kind: generators, coordinate
/// transforms, color operators, combinators.
pub fn primitives() -> Vec<PrimitiveDef> {
    let mut defs = sources::primitives();
    defs.extend(coords::primitives());
    defs.extend(colors::primitives());
    defs.extend(combine::primitives());
    defs
}

/// A registry holding [`primitives`] with [`PRELUDE`] installed.
pub fn standard_registry() -> PrimitiveRegistry {
    let mut registry = PrimitiveRegistry::new();
    for def in primitives() {
        registry.register(def);
    }
    registry.set_prelude(PRELUDE);
    registry
}

/// A compiler over [`standard_registry`] with default conversions.
pub fn standard_compiler() -> Compiler {
    Compiler::new(standard_registry())
}
