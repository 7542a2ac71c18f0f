//! Shading-language value types, input defaults and literal rendering.
//!
//! The compiler only needs to know a handful of things about a GLSL type:
//! its name, whether it is a vector (and of what arity), and whether it is a
//! texture handle. Everything else is passed through verbatim for the
//! external shader compiler to judge.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::ArgValue;

/// A GLSL type as declared by a primitive input or returned by a primitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GlslType {
    Float,
    Int,
    Vec2,
    Vec3,
    Vec4,
    Sampler2D,
    /// Any other declared type name, kept verbatim.
    Named(String),
}

impl GlslType {
    /// Parses a declared type name. Never fails: unknown names are kept as
    /// [`GlslType::Named`].
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "float" => GlslType::Float,
            "int" => GlslType::Int,
            "vec2" => GlslType::Vec2,
            "vec3" => GlslType::Vec3,
            "vec4" => GlslType::Vec4,
            "sampler2D" => GlslType::Sampler2D,
            other => GlslType::Named(other.to_string()),
        }
    }

    /// The type name as it appears in shader source.
    pub fn name(&self) -> &str {
        match self {
            GlslType::Float => "float",
            GlslType::Int => "int",
            GlslType::Vec2 => "vec2",
            GlslType::Vec3 => "vec3",
            GlslType::Vec4 => "vec4",
            GlslType::Sampler2D => "sampler2D",
            GlslType::Named(name) => name,
        }
    }

    /// Whether the type name carries the `vec` tag.
    pub fn is_vector(&self) -> bool {
        self.name().starts_with("vec")
    }

    /// Whether this is a texture handle.
    pub fn is_texture(&self) -> bool {
        matches!(self, GlslType::Sampler2D)
    }

    /// Number of components of a vector type, `0` for scalars.
    ///
    /// A `vec` type whose arity suffix does not parse is logged and treated
    /// as a scalar.
    pub fn vector_len(&self) -> usize {
        match self {
            GlslType::Vec2 => 2,
            GlslType::Vec3 => 3,
            GlslType::Vec4 => 4,
            GlslType::Named(name) if name.starts_with("vec") => {
                match name["vec".len()..].parse::<usize>() {
                    Ok(len) => len,
                    Err(e) => {
                        tracing::warn!(
                            ty = %name,
                            error = %e,
                            "cannot determine length of vector input type, treating as scalar"
                        );
                        0
                    }
                }
            }
            _ => 0,
        }
    }

    /// Swizzle that projects a `vec4` image value down to this type.
    ///
    /// Returns `None` for `vec4` (no projection needed) and for types that
    /// have no channel subset.
    pub fn channel_selector(&self) -> Option<&'static str> {
        match self {
            GlslType::Float => Some("r"),
            GlslType::Vec2 => Some("rg"),
            GlslType::Vec3 => Some("rgb"),
            _ => None,
        }
    }
}

impl fmt::Display for GlslType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for GlslType {
    fn from(name: String) -> Self {
        GlslType::parse(&name)
    }
}

impl From<&str> for GlslType {
    fn from(name: &str) -> Self {
        GlslType::parse(name)
    }
}

impl From<GlslType> for String {
    fn from(ty: GlslType) -> Self {
        ty.name().to_string()
    }
}

/// Default value of a primitive input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Scalar(f64),
    Vector(Vec<f64>),
    /// No default: the caller is expected to supply a value.
    #[default]
    Unspecified,
}

impl DefaultValue {
    /// The scalar form of this default. Vectors yield their first component.
    pub fn scalar(&self) -> Option<f64> {
        match self {
            DefaultValue::Scalar(v) => Some(*v),
            DefaultValue::Vector(v) => v.first().copied(),
            DefaultValue::Unspecified => None,
        }
    }

    /// The default for component `index` of a vector of `len` components.
    ///
    /// Vector defaults provide their own components, scalar defaults are
    /// broadcast. A missing 4th (alpha) component of a 4-vector is `1.0`.
    pub fn component(&self, index: usize, len: usize) -> f64 {
        match self {
            DefaultValue::Vector(v) if index < v.len() => v[index],
            _ if len == 4 && index == 3 => 1.0,
            DefaultValue::Scalar(v) => *v,
            _ => 0.0,
        }
    }

    /// All `len` components of this default.
    pub fn components(&self, len: usize) -> Vec<f64> {
        (0..len).map(|i| self.component(i, len)).collect()
    }
}

/// Renders a number as a shading-language float literal.
///
/// The result always contains a decimal point, so `3` becomes `3.0`.
/// Non-finite values cannot be expressed in GLSL and render as `0.0`.
pub fn float_literal(value: f64) -> String {
    if !value.is_finite() {
        tracing::warn!(value, "non-finite value cannot be a float literal, using 0.0");
        return "0.0".to_string();
    }
    let mut text = format!("{value}");
    if !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Renders a vector constructor call such as `vec3(1.0, 0.5, 0.0)`.
pub fn vector_literal(ty: &GlslType, components: &[f64]) -> String {
    let parts: Vec<String> = components.iter().copied().map(float_literal).collect();
    format!("{}({})", ty.name(), parts.join(", "))
}

/// A named operation appended to a side-chain to coerce its return type.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Primitive name to append.
    pub op: String,
    /// Fixed arguments for that primitive.
    pub args: Vec<ArgValue>,
}

/// Table of default conversions keyed by (expected type, actual type).
///
/// A miss is not an error: the mismatch is left for the shader compiler.
#[derive(Debug, Clone)]
pub struct TypeConversions {
    table: BTreeMap<(GlslType, GlslType), Conversion>,
}

impl TypeConversions {
    /// An empty table: no coercion is ever applied.
    pub fn empty() -> Self {
        Self {
            table: BTreeMap::new(),
        }
    }

    /// Registers (or replaces) the conversion used when a side-chain returning
    /// `actual` feeds an input of type `expected`.
    pub fn register(&mut self, expected: GlslType, actual: GlslType, conversion: Conversion) {
        self.table.insert((expected, actual), conversion);
    }

    /// Looks up the conversion for an (expected, actual) pair.
    pub fn lookup(&self, expected: &GlslType, actual: &GlslType) -> Option<&Conversion> {
        self.table.get(&(expected.clone(), actual.clone()))
    }

    /// Number of registered conversions.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no conversions are registered.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for TypeConversions {
    /// Channel summation for `float` inputs fed by image or coordinate chains.
    fn default() -> Self {
        let mut conversions = Self::empty();
        conversions.register(
            GlslType::Float,
            GlslType::Vec4,
            Conversion {
                op: "sum".into(),
                args: vec![ArgValue::Vector(vec![1.0, 1.0, 1.0, 1.0])],
            },
        );
        conversions.register(
            GlslType::Float,
            GlslType::Vec2,
            Conversion {
                op: "sum".into(),
                args: vec![ArgValue::Vector(vec![1.0, 1.0])],
            },
        );
        conversions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_types() {
        assert_eq!(GlslType::parse("float"), GlslType::Float);
        assert_eq!(GlslType::parse("vec3"), GlslType::Vec3);
        assert_eq!(GlslType::parse("sampler2D"), GlslType::Sampler2D);
        assert_eq!(GlslType::parse("mat3"), GlslType::Named("mat3".into()));
    }

    #[test]
    fn vector_len_of_builtin_vectors() {
        assert_eq!(GlslType::Vec2.vector_len(), 2);
        assert_eq!(GlslType::Vec4.vector_len(), 4);
        assert_eq!(GlslType::Float.vector_len(), 0);
    }

    #[test]
    fn malformed_vector_suffix_degrades_to_scalar() {
        let ty = GlslType::parse("vecX");
        assert!(ty.is_vector());
        assert_eq!(ty.vector_len(), 0);
    }

    #[test]
    fn unusual_vector_arity_is_parsed() {
        assert_eq!(GlslType::parse("vec8").vector_len(), 8);
    }

    #[test]
    fn serde_uses_type_names() {
        let json = serde_json::to_string(&GlslType::Vec3).unwrap();
        assert_eq!(json, "\"vec3\"");
        let back: GlslType = serde_json::from_str("\"sampler2D\"").unwrap();
        assert_eq!(back, GlslType::Sampler2D);
    }

    #[test]
    fn float_literal_adds_fractional_component() {
        assert_eq!(float_literal(3.0), "3.0");
        assert_eq!(float_literal(0.25), "0.25");
        assert_eq!(float_literal(-2.0), "-2.0");
    }

    #[test]
    fn float_literal_replaces_non_finite() {
        assert_eq!(float_literal(f64::NAN), "0.0");
        assert_eq!(float_literal(f64::INFINITY), "0.0");
    }

    #[test]
    fn vector_literal_lists_components() {
        assert_eq!(
            vector_literal(&GlslType::Vec3, &[1.0, 0.5, 0.0]),
            "vec3(1.0, 0.5, 0.0)"
        );
    }

    #[test]
    fn scalar_default_broadcasts_except_alpha() {
        let d = DefaultValue::Scalar(0.0);
        assert_eq!(d.components(4), vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(d.components(3), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn vector_default_supplies_its_own_components() {
        let d = DefaultValue::Vector(vec![0.2, 0.3]);
        assert_eq!(d.components(3), vec![0.2, 0.3, 0.0]);
    }

    #[test]
    fn unspecified_default_has_no_scalar() {
        assert_eq!(DefaultValue::Unspecified.scalar(), None);
        assert_eq!(DefaultValue::Unspecified.components(2), vec![0.0, 0.0]);
    }

    #[test]
    fn default_value_deserializes_untagged() {
        let s: DefaultValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(s, DefaultValue::Scalar(1.5));
        let v: DefaultValue = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(v, DefaultValue::Vector(vec![1.0, 2.0]));
        let u: DefaultValue = serde_json::from_str("null").unwrap();
        assert_eq!(u, DefaultValue::Unspecified);
    }

    #[test]
    fn default_conversions_cover_float_from_vec4_and_vec2() {
        let table = TypeConversions::default();
        assert_eq!(table.len(), 2);
        let c = table.lookup(&GlslType::Float, &GlslType::Vec4).unwrap();
        assert_eq!(c.op, "sum");
        assert!(table.lookup(&GlslType::Float, &GlslType::Vec2).is_some());
        assert!(table.lookup(&GlslType::Vec3, &GlslType::Vec4).is_none());
    }

    #[test]
    fn empty_conversions_never_match() {
        let table = TypeConversions::empty();
        assert!(table.is_empty());
        assert!(table.lookup(&GlslType::Float, &GlslType::Vec4).is_none());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn integer_literal_round_trips(n in -1_000_000i64..1_000_000) {
                let text = float_literal(n as f64);
                prop_assert!(text.contains('.'), "no decimal point in {}", text);
                let back: f64 = text.parse().unwrap();
                prop_assert_eq!(back, n as f64);
            }

            #[test]
            fn finite_literal_round_trips(v in -1.0e6f64..1.0e6) {
                let back: f64 = float_literal(v).parse().unwrap();
                prop_assert_eq!(back, v);
            }
        }
    }
}
