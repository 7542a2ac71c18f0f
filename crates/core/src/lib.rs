#![deny(unsafe_code)]
//! Core of shadegraph: a compiler from chains of typed shading primitives to
//! GLSL ES 3.00 fragment shaders, and a feedback-capable ping-pong render
//! pipeline that runs them.
//!
//! Provides the primitive model ([`PrimitiveDef`], [`PrimitiveRegistry`]),
//! argument binding ([`Binder`]), the [`Compiler`], chains and argument
//! values, and the [`pipeline`] of outputs and passes driven through the
//! [`GraphicsApi`](pipeline::GraphicsApi) trait. Scenes can be described in
//! JSON ([`scene`]).

pub mod binder;
pub mod chain;
pub mod compiler;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod primitive;
pub mod scene;
pub mod signature;
pub mod types;
pub mod value;

#[cfg(feature = "render")]
pub mod render;

#[cfg(test)]
mod test_support;

pub use binder::{Binder, BoundArgument, BoundValue, Component, LiveValue};
pub use chain::{Chain, Node};
pub use compiler::{CompiledProgram, Compiler, Precision, UniformEntry, MAX_DEPTH};
pub use error::GraphError;
pub use primitive::{CoordOverload, InputDecl, PrimitiveDef, PrimitiveRegistry};
pub use scene::Scene;
pub use signature::{PrimitiveKind, Signature};
pub use types::{Conversion, DefaultValue, GlslType, TypeConversions};
pub use value::{
    ArgValue, Ease, FrameContext, FrameProps, PropProvider, Provider, ProviderError, Sequence, TextureId,
    TextureRef, TextureSource, TextureTable, UniformValue,
};
