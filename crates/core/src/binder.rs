//! Argument binding.
//!
//! The binder resolves every declared input of one primitive call against the
//! value the caller supplied for it. Each input ends up as one of:
//!
//! - literal source text spliced straight into the call,
//! - a side-chain compiled recursively and spliced as a nested call,
//! - a live value re-evaluated every frame and fed through a uniform.
//!
//! Binding never fails on a bad value. Anything the binder cannot make sense
//! of degrades to the input's default and is logged. The only error is an
//! unknown primitive inside a side-chain, found while typing it.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::chain::Chain;
use crate::error::GraphError;
use crate::primitive::{InputDecl, PrimitiveDef, PrimitiveRegistry};
use crate::types::{float_literal, vector_literal, DefaultValue, GlslType, TypeConversions};
use crate::value::{ArgValue, FrameContext, Provider, Sequence, TextureRef, UniformValue};

/// Primitive used to sample a texture supplied to a non-sampler input.
pub const SAMPLER_PRIMITIVE: &str = "src";

/// One scalar slot of a live value.
#[derive(Clone)]
pub enum Component {
    Fixed(f64),
    /// Validated provider output, or `default` when the provider misbehaves.
    Provider { provider: Rc<dyn Provider>, default: f64 },
    /// Per-frame selection over a sequence.
    Sequence { sequence: Sequence, default: f64 },
}

impl Component {
    pub fn evaluate(&self, ctx: &FrameContext<'_>) -> f64 {
        match self {
            Component::Fixed(v) => *v,
            Component::Provider { provider, default } => checked(provider.as_ref(), ctx, *default),
            Component::Sequence { sequence, default } => sequence.select(ctx, *default),
        }
    }

    fn from_element(element: Option<&ArgValue>, default: f64, input: &str) -> Self {
        match element {
            None => Component::Fixed(default),
            Some(ArgValue::Number(n)) => Component::Fixed(*n),
            Some(ArgValue::Provider(p)) => Component::Provider {
                provider: Rc::clone(p),
                default,
            },
            Some(ArgValue::Sequence(s)) => Component::Sequence {
                sequence: s.clone(),
                default,
            },
            Some(ArgValue::Vector(v)) => Component::Sequence {
                sequence: Sequence::of(v),
                default,
            },
            Some(other) => {
                tracing::warn!(
                    input,
                    shape = other.shape(),
                    "unsupported vector component, using default"
                );
                Component::Fixed(default)
            }
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Fixed(v) => write!(f, "Fixed({v})"),
            Component::Provider { default, .. } => write!(f, "Provider(default = {default})"),
            Component::Sequence { sequence, default } => {
                write!(f, "Sequence({:?}, default = {default})", sequence.values)
            }
        }
    }
}

/// Runs a provider and insists on a finite number.
fn checked(provider: &dyn Provider, ctx: &FrameContext<'_>, default: f64) -> f64 {
    match provider.evaluate(ctx) {
        Ok(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => v,
            _ => {
                tracing::warn!(value = %n, "provider returned a non-finite number, using default");
                default
            }
        },
        Ok(other) => {
            tracing::warn!(value = %other, "provider did not return a number, using default");
            default
        }
        Err(e) => {
            tracing::warn!(error = %e, "provider failed, using default");
            default
        }
    }
}

/// A value refreshed every frame and uploaded as a uniform.
#[derive(Debug, Clone)]
pub enum LiveValue {
    Scalar(Component),
    /// A scalar feeding an `int` uniform, rounded on upload.
    Integer(Component),
    /// A vector assembled component by component.
    Components(Vec<Component>),
    /// A texture re-resolved every frame; `None` stays unbound.
    Texture(Option<TextureRef>),
    /// A static value bound as a uniform on request.
    Constant(UniformValue),
}

impl LiveValue {
    pub fn evaluate(&self, ctx: &FrameContext<'_>) -> UniformValue {
        match self {
            LiveValue::Scalar(c) => UniformValue::Float(c.evaluate(ctx)),
            LiveValue::Integer(c) => UniformValue::Int(c.evaluate(ctx).round() as i64),
            LiveValue::Components(parts) => {
                UniformValue::Vec(parts.iter().map(|c| c.evaluate(ctx)).collect())
            }
            LiveValue::Texture(texture) => {
                UniformValue::Texture(texture.as_ref().and_then(|t| ctx.textures.resolve(t)))
            }
            LiveValue::Constant(v) => v.clone(),
        }
    }

    /// The texture reference behind a texture uniform.
    pub fn texture(&self) -> Option<&TextureRef> {
        match self {
            LiveValue::Texture(t) => t.as_ref(),
            _ => None,
        }
    }
}

/// How a bound input reaches the emitted call.
#[derive(Debug, Clone)]
pub enum BoundValue {
    /// Source text spliced into the call.
    Literal(String),
    /// A side-chain, already coerced to the input type where possible.
    Chain(Chain),
    /// A uniform refreshed every frame.
    Live(LiveValue),
}

/// One declared input after binding.
#[derive(Debug, Clone)]
pub struct BoundArgument {
    /// Declared name, suffixed with the call's start index when uniform.
    pub name: String,
    pub ty: GlslType,
    pub value: BoundValue,
    pub is_uniform: bool,
}

/// Resolves supplied arguments against declared inputs.
#[derive(Debug, Clone, Copy)]
pub struct Binder<'a> {
    registry: &'a PrimitiveRegistry,
    conversions: &'a TypeConversions,
}

impl<'a> Binder<'a> {
    pub fn new(registry: &'a PrimitiveRegistry, conversions: &'a TypeConversions) -> Self {
        Self {
            registry,
            conversions,
        }
    }

    /// Binds the declared inputs of `def` to `args`, positionally.
    ///
    /// `start_index` is the number of uniforms the enclosing program has
    /// collected before this call; it suffixes the names of this call's
    /// uniforms so they cannot collide with any other call's.
    pub fn bind(
        &self,
        def: &PrimitiveDef,
        args: &[ArgValue],
        start_index: usize,
    ) -> Result<Vec<BoundArgument>, GraphError> {
        self.bind_inputs(&def.inputs, args, start_index)
    }

    /// Like [`bind`](Self::bind), against an explicit input list (used for
    /// coordinate overloads and the implicit side-chain input).
    pub fn bind_inputs(
        &self,
        inputs: &[InputDecl],
        args: &[ArgValue],
        start_index: usize,
    ) -> Result<Vec<BoundArgument>, GraphError> {
        if args.len() > inputs.len() {
            tracing::debug!(
                supplied = args.len(),
                declared = inputs.len(),
                "ignoring surplus arguments"
            );
        }
        inputs
            .iter()
            .enumerate()
            .map(|(i, input)| self.bind_input(input, args.get(i), start_index))
            .collect()
    }

    fn bind_input(
        &self,
        input: &InputDecl,
        supplied: Option<&ArgValue>,
        start_index: usize,
    ) -> Result<BoundArgument, GraphError> {
        let len = input.ty.vector_len();
        let mut value = match supplied {
            None => default_value(input, len),
            Some(arg) => self.supplied_value(input, len, arg)?,
        };

        if input.force_uniform {
            value = match value {
                BoundValue::Literal(_) => {
                    BoundValue::Live(LiveValue::Constant(static_uniform(input, len, supplied)))
                }
                BoundValue::Chain(chain) => {
                    tracing::warn!(
                        input = %input.name,
                        "side-chain cannot be bound as a uniform, keeping it inline"
                    );
                    BoundValue::Chain(chain)
                }
                live => live,
            };
        }

        let is_uniform = matches!(value, BoundValue::Live(_));
        let name = if is_uniform {
            format!("{}{}", input.name, start_index)
        } else {
            input.name.clone()
        };
        Ok(BoundArgument {
            name,
            ty: input.ty.clone(),
            value,
            is_uniform,
        })
    }

    fn supplied_value(
        &self,
        input: &InputDecl,
        len: usize,
        arg: &ArgValue,
    ) -> Result<BoundValue, GraphError> {
        if input.ty.is_texture() {
            return Ok(BoundValue::Live(LiveValue::Texture(match arg {
                ArgValue::Texture(t) => Some(t.clone()),
                other => {
                    tracing::warn!(
                        input = %input.name,
                        shape = other.shape(),
                        "sampler input needs a texture, leaving it unbound"
                    );
                    None
                }
            })));
        }

        Ok(match arg {
            ArgValue::Provider(p) => BoundValue::Live(if len > 0 {
                LiveValue::Components(
                    (0..len)
                        .map(|i| Component::Provider {
                            provider: Rc::clone(p),
                            default: input.default.component(i, len),
                        })
                        .collect(),
                )
            } else {
                scalar(input, Component::Provider {
                    provider: Rc::clone(p),
                    default: scalar_default(input),
                })
            }),
            ArgValue::Sequence(seq) if len > 0 => BoundValue::Live(LiveValue::Components(
                (0..len)
                    .map(|i| {
                        Component::from_element(
                            seq.values.get(i),
                            input.default.component(i, len),
                            &input.name,
                        )
                    })
                    .collect(),
            )),
            ArgValue::Sequence(seq) => BoundValue::Live(scalar(
                input,
                Component::Sequence {
                    sequence: seq.clone(),
                    default: scalar_default(input),
                },
            )),
            ArgValue::Chain(chain) => self.coerce(input, chain)?,
            ArgValue::Number(n) if len > 0 => {
                BoundValue::Literal(vector_literal(&input.ty, &vec![*n; len]))
            }
            ArgValue::Number(n) => BoundValue::Literal(scalar_literal(&input.ty, *n)),
            ArgValue::Vector(v) if len > 0 => {
                BoundValue::Literal(vector_literal(&input.ty, &padded(v, &input.default, len)))
            }
            ArgValue::Vector(v) => {
                tracing::warn!(
                    input = %input.name,
                    "vector supplied for scalar input, using its first component"
                );
                let first = v.first().copied().unwrap_or_else(|| scalar_default(input));
                BoundValue::Literal(scalar_literal(&input.ty, first))
            }
            ArgValue::Texture(texture) => {
                let chain = Chain::start(SAMPLER_PRIMITIVE, vec![ArgValue::Texture(texture.clone())]);
                BoundValue::Chain(match input.ty.channel_selector() {
                    Some(swizzle) => chain.project(swizzle),
                    None => chain,
                })
            }
        })
    }

    /// Appends the registered conversion when the side-chain's type differs
    /// from the input's. A miss leaves the chain as is.
    fn coerce(&self, input: &InputDecl, chain: &Chain) -> Result<BoundValue, GraphError> {
        let actual = chain.return_type(self.registry)?;
        if actual == input.ty {
            return Ok(BoundValue::Chain(chain.clone()));
        }
        match self.conversions.lookup(&input.ty, &actual) {
            Some(conversion) => {
                tracing::debug!(
                    input = %input.name,
                    expected = %input.ty,
                    actual = %actual,
                    op = %conversion.op,
                    "coercing side-chain"
                );
                Ok(BoundValue::Chain(
                    chain
                        .clone()
                        .then(conversion.op.clone(), conversion.args.clone()),
                ))
            }
            None => {
                tracing::debug!(
                    input = %input.name,
                    expected = %input.ty,
                    actual = %actual,
                    "no conversion registered, passing side-chain through"
                );
                Ok(BoundValue::Chain(chain.clone()))
            }
        }
    }
}

/// A live scalar whose uniform matches the input's declared type.
fn scalar(input: &InputDecl, component: Component) -> LiveValue {
    match input.ty {
        GlslType::Int => LiveValue::Integer(component),
        _ => LiveValue::Scalar(component),
    }
}

fn scalar_default(input: &InputDecl) -> f64 {
    input.default.scalar().unwrap_or(0.0)
}

fn default_value(input: &InputDecl, len: usize) -> BoundValue {
    if input.ty.is_texture() {
        tracing::warn!(input = %input.name, "no texture supplied, leaving sampler unbound");
        return BoundValue::Live(LiveValue::Texture(None));
    }
    if input.default == DefaultValue::Unspecified {
        tracing::warn!(input = %input.name, "input has no default and no value, using 0");
    }
    if len > 0 {
        BoundValue::Literal(vector_literal(&input.ty, &input.default.components(len)))
    } else {
        BoundValue::Literal(scalar_literal(&input.ty, scalar_default(input)))
    }
}

/// Static value of a literal input that must be bound as a uniform anyway.
fn static_uniform(input: &InputDecl, len: usize, supplied: Option<&ArgValue>) -> UniformValue {
    let components = match supplied {
        Some(ArgValue::Number(n)) => vec![*n; len.max(1)],
        Some(ArgValue::Vector(v)) if len > 0 => padded(v, &input.default, len),
        Some(ArgValue::Vector(v)) => vec![v.first().copied().unwrap_or_else(|| scalar_default(input))],
        _ if len > 0 => input.default.components(len),
        _ => vec![scalar_default(input)],
    };
    match (len, &input.ty) {
        (0, GlslType::Int) => UniformValue::Int(components[0].round() as i64),
        (0, _) => UniformValue::Float(components[0]),
        _ => UniformValue::Vec(components),
    }
}

/// Truncates or extends `values` to `len`, filling from the default.
fn padded(values: &[f64], default: &DefaultValue, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| values.get(i).copied().unwrap_or_else(|| default.component(i, len)))
        .collect()
}

fn scalar_literal(ty: &GlslType, value: f64) -> String {
    match ty {
        GlslType::Int => format!("{}", value.round() as i64),
        _ => float_literal(value),
    }
}
