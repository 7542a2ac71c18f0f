//! Primitive definitions and the registry that holds them.
//!
//! A primitive is a named GLSL function body plus the contract needed to
//! call it: its [`PrimitiveKind`] and its declared inputs. The registry is
//! static configuration; the standard table lives in `shadegraph-library`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GraphError;
use crate::signature::{PrimitiveKind, Signature};
use crate::types::{DefaultValue, GlslType};

/// One declared input of a primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: GlslType,
    #[serde(default)]
    pub default: DefaultValue,
    /// Always bind this input as a uniform, whatever value it receives.
    #[serde(default, rename = "isUniform")]
    pub force_uniform: bool,
}

impl InputDecl {
    pub fn new(name: impl Into<String>, ty: GlslType, default: DefaultValue) -> Self {
        Self {
            name: name.into(),
            ty,
            default,
            force_uniform: false,
        }
    }

    /// A `float` input with a scalar default.
    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Self::new(name, GlslType::Float, DefaultValue::Scalar(default))
    }

    /// A vector input whose default is broadcast to every component.
    pub fn vector(name: impl Into<String>, ty: GlslType, default: f64) -> Self {
        Self::new(name, ty, DefaultValue::Scalar(default))
    }

    /// An input with no default.
    pub fn required(name: impl Into<String>, ty: GlslType) -> Self {
        Self::new(name, ty, DefaultValue::Unspecified)
    }

    /// Marks the input as always bound to a uniform.
    pub fn uniform(mut self) -> Self {
        self.force_uniform = true;
        self
    }
}

/// The coordinate overload of a `Color` primitive.
///
/// When the chain value reaching the primitive is a `vec2` coordinate rather
/// than an image, this body is emitted instead, taking `vec2 _st`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordOverload {
    /// Inputs of the overload; `None` reuses the primitive's inputs.
    #[serde(default)]
    pub inputs: Option<Vec<InputDecl>>,
    #[serde(rename = "glsl")]
    pub body: String,
    #[serde(default, rename = "returnType")]
    pub return_type: Option<GlslType>,
}

/// A named shading operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveDef {
    pub name: String,
    /// Function name in shader source when it differs from `name` (e.g. to
    /// avoid shadowing GLSL built-ins such as `sin`).
    #[serde(default, rename = "glslName")]
    pub glsl_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: PrimitiveKind,
    #[serde(default)]
    pub inputs: Vec<InputDecl>,
    #[serde(rename = "glsl")]
    pub body: String,
    /// Overrides the kind's return type (reducers such as `sum`).
    #[serde(default, rename = "returnType")]
    pub return_type: Option<GlslType>,
    #[serde(default)]
    pub coord: Option<CoordOverload>,
}

impl PrimitiveDef {
    pub fn new(name: impl Into<String>, kind: PrimitiveKind, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            glsl_name: None,
            kind,
            inputs: Vec::new(),
            body: body.into(),
            return_type: None,
            coord: None,
        }
    }

    pub fn input(mut self, input: InputDecl) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn glsl_name(mut self, name: impl Into<String>) -> Self {
        self.glsl_name = Some(name.into());
        self
    }

    pub fn returns(mut self, ty: GlslType) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn coord_overload(mut self, overload: CoordOverload) -> Self {
        self.coord = Some(overload);
        self
    }

    /// Name of the emitted GLSL function.
    pub fn function_name(&self) -> &str {
        self.glsl_name.as_deref().unwrap_or(&self.name)
    }

    /// The kind's signature with this primitive's return-type override.
    pub fn signature(&self) -> Signature {
        let mut sig = self.kind.signature();
        if let Some(ty) = &self.return_type {
            sig.return_type = Some(ty.clone());
        }
        sig
    }

    /// Whether this call should use the coordinate overload, given the type
    /// of the value arriving from upstream.
    pub fn uses_coord_overload(&self, incoming: &GlslType) -> bool {
        self.kind == PrimitiveKind::Color && self.coord.is_some() && *incoming == GlslType::Vec2
    }

    /// Declared inputs for the chosen overload.
    pub fn inputs_for(&self, coord: bool) -> &[InputDecl] {
        match (&self.coord, coord) {
            (Some(CoordOverload { inputs: Some(inputs), .. }), true) => inputs,
            _ => &self.inputs,
        }
    }

    /// Body for the chosen overload.
    pub fn body_for(&self, coord: bool) -> &str {
        match (&self.coord, coord) {
            (Some(overload), true) => &overload.body,
            _ => &self.body,
        }
    }

    /// Signature for the chosen overload.
    pub fn signature_for(&self, coord: bool) -> Signature {
        match (&self.coord, coord) {
            (Some(overload), true) => {
                let mut sig = PrimitiveKind::coord_overload_signature();
                if let Some(ty) = &overload.return_type {
                    sig.return_type = Some(ty.clone());
                }
                sig
            }
            _ => self.signature(),
        }
    }
}

/// Name-indexed table of primitives plus the shared GLSL prelude.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveRegistry {
    defs: Vec<PrimitiveDef>,
    index: HashMap<String, usize>,
    prelude: String,
}

impl PrimitiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a primitive, replacing any previous definition with that name.
    pub fn register(&mut self, def: PrimitiveDef) {
        match self.index.get(&def.name) {
            Some(&slot) => {
                tracing::debug!(primitive = %def.name, "replacing primitive definition");
                self.defs[slot] = def;
            }
            None => {
                self.index.insert(def.name.clone(), self.defs.len());
                self.defs.push(def);
            }
        }
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, def: PrimitiveDef) -> Self {
        self.register(def);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PrimitiveDef> {
        self.index.get(name).map(|&i| &self.defs[i])
    }

    /// Like [`get`](Self::get) but reports an unknown name as an error.
    pub fn lookup(&self, name: &str) -> Result<&PrimitiveDef, GraphError> {
        self.get(name)
            .ok_or_else(|| GraphError::UnknownPrimitive(name.to_string()))
    }

    /// Primitives in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PrimitiveDef> {
        self.defs.iter()
    }

    /// Names of all primitives of one kind, in registration order.
    pub fn names_of_kind(&self, kind: PrimitiveKind) -> Vec<&str> {
        self.defs
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Helper code emitted ahead of every primitive function.
    pub fn prelude(&self) -> &str {
        &self.prelude
    }

    pub fn set_prelude(&mut self, prelude: impl Into<String>) {
        self.prelude = prelude.into();
    }

    /// Extends the registry from a JSON array of primitive definitions.
    ///
    /// The format mirrors [`PrimitiveDef`]'s serde form: `name`, `type`,
    /// `inputs`, `glsl`, and the optional `glslName`, `returnType`, `coord`.
    pub fn extend_from_json(&mut self, defs: &Value) -> Result<usize, GraphError> {
        let list = defs
            .as_array()
            .ok_or_else(|| GraphError::Scene("primitive table must be a JSON array".into()))?;
        for entry in list {
            let name = entry.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
            if let Some(kind) = entry.get("type").and_then(Value::as_str) {
                // Surface a bad kind as UnknownKind rather than a generic serde error.
                PrimitiveKind::parse(name, kind)?;
            }
            let def: PrimitiveDef = serde_json::from_value(entry.clone())
                .map_err(|e| GraphError::Scene(format!("primitive '{name}': {e}")))?;
            self.register(def);
        }
        Ok(list.len())
    }
}
