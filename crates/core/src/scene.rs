//! JSON scene descriptions: renderer config, per-output camera and passes.
//!
//! ```json
//! {
//!   "config": { "width": 640, "height": 360 },
//!   "outputs": [
//!     { "passes": [
//!         { "clear": "fade", "amount": 0.05 },
//!         { "chain": [ { "op": "osc", "args": [20, 0.1, [0, 1.5]] },
//!                      { "op": "rotate", "args": [{ "prop": "angle" }] } ],
//!           "blend": "add" }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Structural problems are errors. Unknown pass directives, blend modes
//! and topologies only warn.

use std::path::Path;
use std::rc::Rc;

use serde_json::Value;

use crate::chain::{Chain, Node};
use crate::error::GraphError;
use crate::params::{param_bool, param_f64, param_str, param_vec3};
use crate::pipeline::{
    BlendMode, Camera, CameraOptions, DrawPass, GraphicsApi, ItemCount, Pass, Projection, Renderer,
    RendererConfig, Topology, ViewportSpec,
};
use crate::value::{ArgValue, Ease, PropProvider, Sequence, TextureRef};

const DEFAULT_FADE: f64 = 0.1;

#[derive(Debug, Clone, Default)]
pub struct OutputScene {
    pub camera: Camera,
    pub passes: Vec<Pass>,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub config: RendererConfig,
    pub outputs: Vec<OutputScene>,
}

impl Scene {
    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        let value: Value = serde_json::from_str(text).map_err(|e| GraphError::Scene(e.to_string()))?;
        parse_scene(&value)
    }

    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| GraphError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Compiles every output's passes into `renderer` and sets its cameras.
    pub fn apply<A: GraphicsApi>(&self, renderer: &mut Renderer<A>) -> Result<(), GraphError> {
        for (index, output) in self.outputs.iter().enumerate() {
            renderer.set_camera(index, output.camera)?;
            renderer.render(index, &output.passes)?;
        }
        Ok(())
    }
}

pub fn parse_scene(value: &Value) -> Result<Scene, GraphError> {
    let config = match value.get("config") {
        Some(config) => serde_json::from_value(config.clone())
            .map_err(|e| GraphError::Scene(format!("config: {e}")))?,
        None => RendererConfig::default(),
    };
    let outputs = match value.get("outputs") {
        None => Vec::new(),
        Some(Value::Array(outputs)) => outputs.iter().map(parse_output).collect::<Result<_, _>>()?,
        Some(_) => return Err(GraphError::Scene("'outputs' must be an array".into())),
    };
    if outputs.len() > config.outputs {
        return Err(GraphError::Scene(format!(
            "{} outputs described but the renderer has {}",
            outputs.len(),
            config.outputs
        )));
    }
    Ok(Scene { config, outputs })
}

fn parse_output(value: &Value) -> Result<OutputScene, GraphError> {
    let camera = value.get("camera").map(parse_camera).unwrap_or_default();
    let passes = match value.get("passes") {
        None => Vec::new(),
        Some(Value::Array(passes)) => {
            let mut parsed = Vec::with_capacity(passes.len());
            for pass in passes {
                if let Some(pass) = parse_pass(pass)? {
                    parsed.push(pass);
                }
            }
            parsed
        }
        Some(_) => return Err(GraphError::Scene("'passes' must be an array".into())),
    };
    Ok(OutputScene { camera, passes })
}

/// A look-at camera from `{eye, target, projection, near, far}`. Without
/// both points the camera stays identity.
pub fn parse_camera(value: &Value) -> Camera {
    let (Some(eye), Some(target)) = (param_vec3(value, "eye"), param_vec3(value, "target")) else {
        tracing::warn!("camera needs 'eye' and 'target', using identity");
        return Camera::Identity;
    };
    let defaults = CameraOptions::default();
    let projection = match param_str(value, "projection") {
        Some("perspective") => Projection::Perspective,
        Some("ortho") | None => Projection::Ortho,
        Some(other) => {
            tracing::warn!(projection = other, "unknown projection, using ortho");
            Projection::Ortho
        }
    };
    let camera = match projection {
        Projection::Perspective => Camera::perspective(eye, target),
        Projection::Ortho => Camera::ortho(eye, target),
    };
    camera.with_range(
        param_f64(value, "near", f64::from(defaults.near)) as f32,
        param_f64(value, "far", f64::from(defaults.far)) as f32,
    )
}

/// Parses one pass. `Ok(None)` means the directive was not recognised and
/// is skipped.
pub fn parse_pass(value: &Value) -> Result<Option<Pass>, GraphError> {
    if let Some(directive) = value.get("clear") {
        return Ok(match directive.as_str() {
            Some("clear") => Some(Pass::Clear),
            Some("fade") => Some(Pass::Fade {
                amount: param_f64(value, "amount", DEFAULT_FADE),
                camera: param_bool(value, "camera", false),
            }),
            _ => {
                tracing::warn!(directive = %directive, "unrecognised clear directive, skipping pass");
                None
            }
        });
    }
    let Some(chain) = value.get("chain") else {
        tracing::warn!(pass = %value, "pass has neither 'clear' nor 'chain', skipping");
        return Ok(None);
    };

    let mut pass = DrawPass::new(parse_chain(chain)?);
    let topology = param_str(value, "primitive").map(Topology::parse).unwrap_or_default();
    let count = match value.get("count") {
        None => ItemCount::default(),
        Some(count) => serde_json::from_value(count.clone()).unwrap_or_else(|_| {
            tracing::warn!(count = %count, "unreadable item count, using 1");
            ItemCount::default()
        }),
    };
    pass = pass.primitive(topology, count);
    pass = pass.blend(match value.get("blend") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => BlendMode::Disabled,
        Some(Value::String(name)) => BlendMode::from_name(Some(name.as_str())),
        Some(custom) => match serde_json::from_value(custom.clone()) {
            Ok(state) => BlendMode::Custom(state),
            Err(e) => {
                tracing::warn!(error = %e, "unreadable custom blend, using alpha");
                BlendMode::Alpha
            }
        },
    });
    if let Some(viewport) = value.get("viewport") {
        match serde_json::from_value::<ViewportSpec>(viewport.clone()) {
            Ok(spec) => pass = pass.viewport(spec),
            Err(e) => tracing::warn!(error = %e, "unreadable viewport, drawing full target"),
        }
    }
    if let Some(width) = value.get("line_width").and_then(Value::as_f64) {
        pass = pass.line_width(width as f32);
    }
    Ok(Some(pass.into()))
}

/// A chain is a list of `{op, args}` nodes, or `{chain, swizzle}`.
pub fn parse_chain(value: &Value) -> Result<Chain, GraphError> {
    let (nodes, swizzle) = match value {
        Value::Array(nodes) => (nodes, None),
        Value::Object(_) => match value.get("chain") {
            Some(Value::Array(nodes)) => (nodes, param_str(value, "swizzle")),
            _ => return Err(GraphError::Scene("chain object needs a 'chain' array".into())),
        },
        other => return Err(GraphError::Scene(format!("expected a chain, got {other}"))),
    };

    let mut chain = Chain::new();
    for node in nodes {
        let op = param_str(node, "op")
            .ok_or_else(|| GraphError::Scene(format!("chain node without 'op': {node}")))?;
        let args = match node.get("args") {
            None => Vec::new(),
            Some(Value::Array(args)) => args.iter().map(parse_arg).collect::<Result<_, _>>()?,
            Some(other) => return Err(GraphError::Scene(format!("'args' of '{op}' must be an array, got {other}"))),
        };
        chain.push(Node::new(op, args));
    }
    Ok(match swizzle {
        Some(s) => chain.project(s),
        None => chain,
    })
}

pub fn parse_arg(value: &Value) -> Result<ArgValue, GraphError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(ArgValue::Number)
            .ok_or_else(|| GraphError::Scene(format!("number out of range: {n}"))),
        Value::Array(items) => Ok(ArgValue::Sequence(Sequence::new(
            items.iter().map(parse_arg).collect::<Result<_, _>>()?,
        ))),
        Value::Object(map) => {
            if let Some(vec) = map.get("vec") {
                parse_vector(vec)
            } else if let Some(Value::Array(items)) = map.get("seq") {
                let values = items.iter().map(parse_arg).collect::<Result<_, _>>()?;
                Ok(ArgValue::Sequence(
                    Sequence::new(values)
                        .fast(param_f64(value, "speed", 1.0))
                        .smooth(param_f64(value, "smooth", 0.0))
                        .offset(param_f64(value, "offset", 0.0))
                        .ease(parse_ease(value)),
                ))
            } else if map.contains_key("chain") {
                parse_chain(value).map(ArgValue::Chain)
            } else if let Some(index) = map.get("output") {
                index
                    .as_u64()
                    .map(|i| ArgValue::Texture(TextureRef::Output(i as usize)))
                    .ok_or_else(|| GraphError::Scene(format!("output index must be a non-negative integer, got {index}")))
            } else if let Some(name) = param_str(value, "prop") {
                Ok(ArgValue::Provider(Rc::new(PropProvider {
                    name: name.to_string(),
                    scale: param_f64(value, "scale", 1.0),
                    offset: param_f64(value, "offset", 0.0),
                })))
            } else {
                Err(GraphError::Scene(format!("unrecognised argument: {value}")))
            }
        }
        other => Err(GraphError::Scene(format!("unsupported argument: {other}"))),
    }
}

fn parse_vector(value: &Value) -> Result<ArgValue, GraphError> {
    let Value::Array(items) = value else {
        return Err(GraphError::Scene(format!("'vec' must be an array, got {value}")));
    };
    items
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| GraphError::Scene(format!("vector component must be a number, got {v}")))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ArgValue::Vector)
}

fn parse_ease(value: &Value) -> Ease {
    match value.get("ease") {
        None => Ease::default(),
        Some(ease) => serde_json::from_value(ease.clone()).unwrap_or_else(|_| {
            tracing::warn!(ease = %ease, "unknown easing, using linear");
            Ease::default()
        }),
    }
}
