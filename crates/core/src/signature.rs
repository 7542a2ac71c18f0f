//! Primitive kinds and their fixed signatures.
//!
//! A kind decides what a primitive receives before its own declared inputs
//! and what it returns:
//!
//! | kind | implicit parameters | returns |
//! |---|---|---|
//! | `Source` | `vec2 _st` | `vec4` |
//! | `Coord` | `vec2 _st` | `vec2` |
//! | `Color` | `vec4 _c0` | `vec4` |
//! | `Combine` | `vec4 _c0, vec4 _c1` | `vec4` |
//! | `CombineCoord` | `vec2 _st, vec4 _c0` | `vec2` |
//! | `Raw` | incoming value as `_in` | incoming type |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::types::GlslType;

/// Structural category of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    /// Generator: starts a new image at the current coordinate.
    #[serde(alias = "src")]
    Source,
    /// Coordinate transform applied to everything upstream.
    Coord,
    /// Color operator on the upstream image.
    Color,
    /// Two-image combinator; the second image is a side-chain.
    Combine,
    /// Coordinate transform driven by a side-chain image.
    CombineCoord,
    /// Verbatim code with no fixed signature.
    #[serde(alias = "glsl")]
    Raw,
}

/// All kinds, in declaration order.
pub const ALL_KINDS: [PrimitiveKind; 6] = [
    PrimitiveKind::Source,
    PrimitiveKind::Coord,
    PrimitiveKind::Color,
    PrimitiveKind::Combine,
    PrimitiveKind::CombineCoord,
    PrimitiveKind::Raw,
];

/// One implicit leading parameter of a primitive function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitParam {
    pub ty: GlslType,
    pub name: &'static str,
}

/// Return type and implicit parameters fixed by a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Return type, or `None` when the primitive returns whatever it received.
    pub return_type: Option<GlslType>,
    /// Implicit parameters preceding the declared inputs.
    pub params: Vec<ImplicitParam>,
    /// Whether the upstream value is forwarded as an extra `_in` parameter.
    pub passthrough: bool,
}

impl Signature {
    /// Number of implicit parameters the emitted function consumes.
    pub fn arity(&self) -> usize {
        self.params.len() + usize::from(self.passthrough)
    }
}

fn param(ty: GlslType, name: &'static str) -> ImplicitParam {
    ImplicitParam { ty, name }
}

impl PrimitiveKind {
    /// Looks up the signature for this kind.
    pub fn signature(self) -> Signature {
        match self {
            PrimitiveKind::Source => Signature {
                return_type: Some(GlslType::Vec4),
                params: vec![param(GlslType::Vec2, "_st")],
                passthrough: false,
            },
            PrimitiveKind::Coord => Signature {
                return_type: Some(GlslType::Vec2),
                params: vec![param(GlslType::Vec2, "_st")],
                passthrough: false,
            },
            PrimitiveKind::Color => Signature {
                return_type: Some(GlslType::Vec4),
                params: vec![param(GlslType::Vec4, "_c0")],
                passthrough: false,
            },
            PrimitiveKind::Combine => Signature {
                return_type: Some(GlslType::Vec4),
                params: vec![param(GlslType::Vec4, "_c0"), param(GlslType::Vec4, "_c1")],
                passthrough: false,
            },
            PrimitiveKind::CombineCoord => Signature {
                return_type: Some(GlslType::Vec2),
                params: vec![param(GlslType::Vec2, "_st"), param(GlslType::Vec4, "_c0")],
                passthrough: false,
            },
            PrimitiveKind::Raw => Signature {
                return_type: None,
                params: Vec::new(),
                passthrough: true,
            },
        }
    }

    /// Signature of the coordinate overload of a `Color` primitive, used when
    /// the upstream value is a coordinate rather than an image.
    pub fn coord_overload_signature() -> Signature {
        Signature {
            return_type: Some(GlslType::Vec2),
            params: vec![param(GlslType::Vec2, "_st")],
            passthrough: false,
        }
    }

    /// Whether the kind consumes a side-chain image as its first declared input.
    pub fn takes_side_chain(self) -> bool {
        matches!(self, PrimitiveKind::Combine | PrimitiveKind::CombineCoord)
    }

    /// Canonical lower-camel name.
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Source => "source",
            PrimitiveKind::Coord => "coord",
            PrimitiveKind::Color => "color",
            PrimitiveKind::Combine => "combine",
            PrimitiveKind::CombineCoord => "combineCoord",
            PrimitiveKind::Raw => "raw",
        }
    }

    /// Parses a kind name, accepting the short aliases `src` and `glsl`.
    pub fn parse(primitive: &str, kind: &str) -> Result<Self, GraphError> {
        match kind {
            "source" | "src" => Ok(PrimitiveKind::Source),
            "coord" => Ok(PrimitiveKind::Coord),
            "color" => Ok(PrimitiveKind::Color),
            "combine" => Ok(PrimitiveKind::Combine),
            "combineCoord" => Ok(PrimitiveKind::CombineCoord),
            "raw" | "glsl" => Ok(PrimitiveKind::Raw),
            other => Err(GraphError::UnknownKind {
                primitive: primitive.to_string(),
                kind: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrimitiveKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveKind::parse("<anonymous>", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_takes_coordinate_and_returns_image() {
        let sig = PrimitiveKind::Source.signature();
        assert_eq!(sig.return_type, Some(GlslType::Vec4));
        assert_eq!(sig.params, vec![param(GlslType::Vec2, "_st")]);
        assert_eq!(sig.arity(), 1);
    }

    #[test]
    fn combine_takes_two_images() {
        let sig = PrimitiveKind::Combine.signature();
        assert_eq!(sig.arity(), 2);
        assert!(sig.params.iter().all(|p| p.ty == GlslType::Vec4));
    }

    #[test]
    fn combine_coord_returns_coordinate() {
        let sig = PrimitiveKind::CombineCoord.signature();
        assert_eq!(sig.return_type, Some(GlslType::Vec2));
        assert_eq!(sig.params[0].name, "_st");
        assert_eq!(sig.params[1].name, "_c0");
    }

    #[test]
    fn raw_passes_value_through() {
        let sig = PrimitiveKind::Raw.signature();
        assert!(sig.passthrough);
        assert_eq!(sig.return_type, None);
        assert_eq!(sig.arity(), 1);
    }

    #[test]
    fn only_combinators_take_side_chains() {
        let with: Vec<_> = ALL_KINDS
            .iter()
            .filter(|k| k.takes_side_chain())
            .collect();
        assert_eq!(with, vec![&PrimitiveKind::Combine, &PrimitiveKind::CombineCoord]);
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(PrimitiveKind::parse("osc", "src").unwrap(), PrimitiveKind::Source);
        assert_eq!(PrimitiveKind::parse("x", "glsl").unwrap(), PrimitiveKind::Raw);
        assert_eq!(
            "combineCoord".parse::<PrimitiveKind>().unwrap(),
            PrimitiveKind::CombineCoord
        );
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        let err = PrimitiveKind::parse("warp", "genTypo").unwrap_err();
        assert!(matches!(err, GraphError::UnknownKind { .. }));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for kind in ALL_KINDS {
            let name = kind.to_string();
            assert_eq!(name.parse::<PrimitiveKind>().unwrap(), kind);
        }
    }
}
