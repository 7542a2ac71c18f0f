//! Chains of primitive calls.
//!
//! A [`Chain`] is an ordered list of calls. Chains are plain values: a
//! side-chain argument holds its own copy, so the graph built from nested
//! chains is always a tree.

use crate::error::GraphError;
use crate::primitive::{PrimitiveDef, PrimitiveRegistry};
use crate::signature::PrimitiveKind;
use crate::types::GlslType;
use crate::value::ArgValue;

/// One primitive invocation with the caller's arguments.
#[derive(Debug, Clone)]
pub struct Node {
    pub primitive: String,
    pub args: Vec<ArgValue>,
}

impl Node {
    pub fn new(primitive: impl Into<String>, args: Vec<ArgValue>) -> Self {
        Self {
            primitive: primitive.into(),
            args,
        }
    }
}

/// An ordered sequence of primitive calls compiled into one expression.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    nodes: Vec<Node>,
    /// Channel swizzle applied to the chain's final value (e.g. `rgb`).
    projection: Option<String>,
}

impl Chain {
    /// An empty chain; its value is the incoming coordinate.
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain starting with a single call.
    pub fn start(primitive: impl Into<String>, args: Vec<ArgValue>) -> Self {
        Self::new().then(primitive, args)
    }

    /// Appends a call.
    pub fn then(mut self, primitive: impl Into<String>, args: Vec<ArgValue>) -> Self {
        self.push(Node::new(primitive, args));
        self
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Projects the final value onto a channel subset.
    pub fn project(mut self, swizzle: impl Into<String>) -> Self {
        self.projection = Some(swizzle.into());
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn projection(&self) -> Option<&str> {
        self.projection.as_deref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Type of the value this chain produces.
    ///
    /// Walks the chain the same way the compiler does: an empty chain yields
    /// the `vec2` coordinate, sources yield images, coordinate transforms
    /// leave the upstream type untouched, and a projection narrows the
    /// result to its channel count.
    pub fn return_type(&self, registry: &PrimitiveRegistry) -> Result<GlslType, GraphError> {
        let mut ty = GlslType::Vec2;
        for node in &self.nodes {
            ty = output_type(registry.lookup(&node.primitive)?, &ty);
        }
        Ok(match &self.projection {
            Some(swizzle) => projected_type(swizzle),
            None => ty,
        })
    }
}

/// Type of the value leaving `def` when `incoming` arrives from upstream.
pub(crate) fn output_type(def: &PrimitiveDef, incoming: &GlslType) -> GlslType {
    match def.kind {
        PrimitiveKind::Coord | PrimitiveKind::CombineCoord => incoming.clone(),
        PrimitiveKind::Raw => def.return_type.clone().unwrap_or_else(|| incoming.clone()),
        _ => {
            let coord = def.uses_coord_overload(incoming);
            def.signature_for(coord)
                .return_type
                .unwrap_or_else(|| incoming.clone())
        }
    }
}

/// Type selected by a channel swizzle.
pub(crate) fn projected_type(swizzle: &str) -> GlslType {
    match swizzle.len() {
        1 => GlslType::Float,
        2 => GlslType::Vec2,
        3 => GlslType::Vec3,
        _ => GlslType::Vec4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{CoordOverload, InputDecl};

    fn registry() -> PrimitiveRegistry {
        PrimitiveRegistry::new()
            .with(PrimitiveDef::new("osc", PrimitiveKind::Source, "return vec4(_st, 0.0, 1.0);"))
            .with(PrimitiveDef::new("rotate", PrimitiveKind::Coord, "return _st;"))
            .with(PrimitiveDef::new("invert", PrimitiveKind::Color, "return 1.0 - _c0;"))
            .with(
                PrimitiveDef::new("sum", PrimitiveKind::Color, "return _c0.r;")
                    .input(InputDecl::vector("scale", GlslType::Vec4, 1.0))
                    .returns(GlslType::Float)
                    .coord_overload(CoordOverload {
                        inputs: None,
                        body: "return _st.x;".into(),
                        return_type: Some(GlslType::Float),
                    }),
            )
            .with(PrimitiveDef::new("sin", PrimitiveKind::Color, "return sin(_c0);").coord_overload(
                CoordOverload {
                    inputs: None,
                    body: "return sin(_st);".into(),
                    return_type: None,
                },
            ))
    }

    #[test]
    fn empty_chain_is_a_coordinate() {
        assert_eq!(Chain::new().return_type(&registry()).unwrap(), GlslType::Vec2);
    }

    #[test]
    fn source_then_coord_is_still_an_image() {
        let chain = Chain::start("osc", vec![]).then("rotate", vec![]);
        assert_eq!(chain.return_type(&registry()).unwrap(), GlslType::Vec4);
    }

    #[test]
    fn reducer_returns_float() {
        let chain = Chain::start("osc", vec![]).then("sum", vec![]);
        assert_eq!(chain.return_type(&registry()).unwrap(), GlslType::Float);
    }

    #[test]
    fn coord_overload_keeps_coordinate_type() {
        let chain = Chain::start("sin", vec![]);
        assert_eq!(chain.return_type(&registry()).unwrap(), GlslType::Vec2);
    }

    #[test]
    fn projection_narrows_type() {
        let chain = Chain::start("osc", vec![]).project("rgb");
        assert_eq!(chain.return_type(&registry()).unwrap(), GlslType::Vec3);
        let chain = Chain::start("osc", vec![]).project("r");
        assert_eq!(chain.return_type(&registry()).unwrap(), GlslType::Float);
    }

    #[test]
    fn unknown_primitive_is_reported() {
        let chain = Chain::start("nope", vec![]);
        assert!(matches!(
            chain.return_type(&registry()),
            Err(GraphError::UnknownPrimitive(_))
        ));
    }

    #[test]
    fn builder_preserves_order_and_args() {
        let chain = Chain::start("osc", vec![ArgValue::Number(10.0)])
            .then("invert", vec![])
            .then("rotate", vec![ArgValue::Number(0.5), ArgValue::Number(0.1)]);
        let names: Vec<_> = chain.nodes().iter().map(|n| n.primitive.as_str()).collect();
        assert_eq!(names, vec!["osc", "invert", "rotate"]);
        assert_eq!(chain.nodes()[2].args.len(), 2);
        assert_eq!(chain.len(), 3);
    }
}
