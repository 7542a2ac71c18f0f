//! Argument values, live providers and per-frame context.
//!
//! An [`ArgValue`] is what a caller hands to a primitive call. The binder
//! resolves it once, at compile time, into either literal source text, a
//! nested chain, or a live value that is re-evaluated every frame against a
//! [`FrameContext`].

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::chain::Chain;

/// Backend handle of a texture-backed render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// Backend handle of a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramId(pub u32);

/// A texture the backend can bind for sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureId {
    /// The color attachment of a render target.
    Target(TargetId),
    /// A texture registered with the backend by an external collaborator.
    External(u32),
}

/// Accessor for textures whose backing changes over time (video, camera,
/// asynchronously loaded images). Queried fresh on every frame.
pub trait TextureSource {
    fn current_texture(&self) -> Option<TextureId>;
}

/// A reference to an image that can be sampled by a compiled program.
#[derive(Clone)]
pub enum TextureRef {
    /// The feedback buffer of the output with this index.
    Output(usize),
    /// A collaborator-owned texture.
    External(Rc<dyn TextureSource>),
}

impl fmt::Debug for TextureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureRef::Output(i) => write!(f, "Output({i})"),
            TextureRef::External(_) => f.write_str("External(..)"),
        }
    }
}

/// Feedback texture of every output, snapshotted before an output ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureTable {
    outputs: Vec<Option<TextureId>>,
}

impl TextureTable {
    pub fn new(outputs: Vec<Option<TextureId>>) -> Self {
        Self { outputs }
    }

    /// Resolves a reference to whatever texture currently backs it.
    pub fn resolve(&self, texture: &TextureRef) -> Option<TextureId> {
        match texture {
            TextureRef::Output(index) => self.outputs.get(*index).copied().flatten(),
            TextureRef::External(source) => source.current_texture(),
        }
    }

    pub fn set(&mut self, index: usize, texture: Option<TextureId>) {
        if index >= self.outputs.len() {
            self.outputs.resize(index + 1, None);
        }
        self.outputs[index] = texture;
    }
}

/// Properties of one animation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameProps {
    /// Seconds since the clock started.
    pub time: f64,
    /// Tempo used by sequence selection.
    pub bpm: f64,
    /// Output resolution in pixels.
    pub resolution: [f64; 2],
    /// Arbitrary external properties (a JSON object).
    pub properties: Value,
    /// Camera position, when a camera is active.
    pub eye: Option<[f32; 3]>,
    /// Camera look-at point, when a camera is active.
    pub target: Option<[f32; 3]>,
}

impl Default for FrameProps {
    fn default() -> Self {
        Self {
            time: 0.0,
            bpm: 30.0,
            resolution: [1.0, 1.0],
            properties: Value::Object(Default::default()),
            eye: None,
            target: None,
        }
    }
}

/// Everything a live value may depend on.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub props: &'a FrameProps,
    /// Index of the draw within the current tick.
    pub draw_index: usize,
    pub textures: &'a TextureTable,
}

/// A provider failed to produce a value.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// A per-frame value source.
///
/// Providers are evaluated once per frame for every uniform they feed. A
/// provider that errors or yields something other than a number is replaced
/// by the input's default for that frame.
pub trait Provider {
    fn evaluate(&self, ctx: &FrameContext<'_>) -> Result<Value, ProviderError>;
}

/// Adapts a plain function of the frame into a [`Provider`].
pub struct FnProvider<F>(pub F);

impl<F> Provider for FnProvider<F>
where
    F: Fn(&FrameContext<'_>) -> f64,
{
    fn evaluate(&self, ctx: &FrameContext<'_>) -> Result<Value, ProviderError> {
        // Non-finite results become `null`, which the binder rejects.
        Ok(Value::from((self.0)(ctx)))
    }
}

/// Reads a named frame property: `time`, `bpm`, or a key of the external
/// properties object, then applies `value * scale + offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropProvider {
    pub name: String,
    #[serde(default = "one")]
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
}

fn one() -> f64 {
    1.0
}

impl PropProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale: 1.0,
            offset: 0.0,
        }
    }
}

impl Provider for PropProvider {
    fn evaluate(&self, ctx: &FrameContext<'_>) -> Result<Value, ProviderError> {
        let raw = match self.name.as_str() {
            "time" => ctx.props.time,
            "bpm" => ctx.props.bpm,
            name => ctx
                .props
                .properties
                .get(name)
                .and_then(Value::as_f64)
                .ok_or_else(|| ProviderError(format!("frame property '{name}' is not a number")))?,
        };
        Ok(Value::from(raw * self.scale + self.offset))
    }
}

/// Easing applied between consecutive sequence elements when smoothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutCubic,
    Sin,
}

impl Ease {
    /// Maps `t` in `[0, 1]` to eased progress in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Ease::Linear => t,
            Ease::EaseInQuad => t * t,
            Ease::EaseOutQuad => t * (2.0 - t),
            Ease::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
                }
            }
            Ease::Sin => (1.0 + (std::f64::consts::PI * t - std::f64::consts::FRAC_PI_2).sin()) / 2.0,
        }
    }
}

/// A time-varying selection over a list of values.
///
/// The playhead is `time * speed * bpm / 60 + offset`; it steps through the
/// list one element per beat, wrapping at the end.
#[derive(Debug, Clone)]
pub struct Sequence {
    pub values: Vec<ArgValue>,
    pub speed: f64,
    pub smooth: f64,
    pub offset: f64,
    pub ease: Ease,
}

impl Sequence {
    pub fn new(values: Vec<ArgValue>) -> Self {
        Self {
            values,
            speed: 1.0,
            smooth: 0.0,
            offset: 0.0,
            ease: Ease::Linear,
        }
    }

    pub fn of(values: &[f64]) -> Self {
        Self::new(values.iter().copied().map(ArgValue::Number).collect())
    }

    pub fn fast(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn smooth(mut self, smooth: f64) -> Self {
        self.smooth = smooth;
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// The value selected for this frame, or `fallback` for an empty list.
    pub fn select(&self, ctx: &FrameContext<'_>, fallback: f64) -> f64 {
        let len = self.values.len();
        if len == 0 {
            return fallback;
        }
        let index = ctx.props.time * self.speed * (ctx.props.bpm / 60.0) + self.offset;
        let slot = |i: f64| (i.rem_euclid(len as f64).floor() as usize).min(len - 1);

        if self.smooth != 0.0 {
            let shifted = index - self.smooth / 2.0;
            let current = self.element(slot(shifted), ctx, fallback);
            let next = self.element(slot(shifted + 1.0), ctx, fallback);
            let t = (shifted.rem_euclid(1.0) / self.smooth).min(1.0);
            self.ease.apply(t) * (next - current) + current
        } else {
            self.element(slot(index), ctx, fallback)
        }
    }

    fn element(&self, i: usize, ctx: &FrameContext<'_>, fallback: f64) -> f64 {
        match &self.values[i] {
            ArgValue::Number(n) => *n,
            ArgValue::Vector(v) => v.first().copied().unwrap_or(fallback),
            ArgValue::Sequence(nested) => nested.select(ctx, fallback),
            ArgValue::Provider(p) => match p.evaluate(ctx) {
                Ok(v) => v.as_f64().unwrap_or(fallback),
                Err(_) => fallback,
            },
            ArgValue::Chain(_) | ArgValue::Texture(_) => fallback,
        }
    }
}

/// A value supplied for one primitive input.
#[derive(Clone)]
pub enum ArgValue {
    /// A plain number, rendered as a literal.
    Number(f64),
    /// A static numeric vector, rendered as a constructor.
    Vector(Vec<f64>),
    /// A list of values: a per-frame selector for scalar inputs, or a
    /// component list for vector inputs.
    Sequence(Sequence),
    /// A per-frame provider.
    Provider(Rc<dyn Provider>),
    /// A side-chain.
    Chain(Chain),
    /// A texture reference.
    Texture(TextureRef),
}

impl ArgValue {
    /// Wraps a function of the frame as a live provider.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&FrameContext<'_>) -> f64 + 'static,
    {
        ArgValue::Provider(Rc::new(FnProvider(f)))
    }

    /// A live provider reading a frame property.
    pub fn prop(name: impl Into<String>) -> Self {
        ArgValue::Provider(Rc::new(PropProvider::new(name)))
    }

    /// A sequence of plain numbers.
    pub fn seq(values: &[f64]) -> Self {
        ArgValue::Sequence(Sequence::of(values))
    }

    /// The feedback buffer of output `index`.
    pub fn output(index: usize) -> Self {
        ArgValue::Texture(TextureRef::Output(index))
    }

    /// Short tag used in log lines.
    pub fn shape(&self) -> &'static str {
        match self {
            ArgValue::Number(_) => "number",
            ArgValue::Vector(_) => "vector",
            ArgValue::Sequence(_) => "sequence",
            ArgValue::Provider(_) => "provider",
            ArgValue::Chain(_) => "chain",
            ArgValue::Texture(_) => "texture",
        }
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Number(n) => write!(f, "Number({n})"),
            ArgValue::Vector(v) => write!(f, "Vector({v:?})"),
            ArgValue::Sequence(s) => write!(f, "Sequence({:?})", s.values),
            ArgValue::Provider(_) => f.write_str("Provider(..)"),
            ArgValue::Chain(c) => write!(f, "Chain({c:?})"),
            ArgValue::Texture(t) => write!(f, "Texture({t:?})"),
        }
    }
}

impl From<f64> for ArgValue {
    fn from(n: f64) -> Self {
        ArgValue::Number(n)
    }
}

impl From<i32> for ArgValue {
    fn from(n: i32) -> Self {
        ArgValue::Number(f64::from(n))
    }
}

impl From<Chain> for ArgValue {
    fn from(chain: Chain) -> Self {
        ArgValue::Chain(chain)
    }
}

impl From<Sequence> for ArgValue {
    fn from(seq: Sequence) -> Self {
        ArgValue::Sequence(seq)
    }
}

impl From<TextureRef> for ArgValue {
    fn from(texture: TextureRef) -> Self {
        ArgValue::Texture(texture)
    }
}

/// The value a uniform takes for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformValue {
    Float(f64),
    Int(i64),
    Vec(Vec<f64>),
    Mat4([f32; 16]),
    Texture(Option<TextureId>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(time: f64) -> FrameProps {
        FrameProps {
            time,
            bpm: 60.0,
            ..FrameProps::default()
        }
    }

    fn ctx<'a>(props: &'a FrameProps, textures: &'a TextureTable) -> FrameContext<'a> {
        FrameContext {
            props,
            draw_index: 0,
            textures,
        }
    }

    #[test]
    fn frame_props_default_bpm_is_30() {
        assert!((FrameProps::default().bpm - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sequence_steps_one_element_per_beat() {
        let seq = Sequence::of(&[1.0, 2.0, 3.0]);
        let textures = TextureTable::default();
        for (time, expected) in [(0.0, 1.0), (1.0, 2.0), (2.5, 3.0), (3.0, 1.0)] {
            let props = frame(time);
            assert_eq!(seq.select(&ctx(&props, &textures), 0.0), expected, "time {time}");
        }
    }

    #[test]
    fn sequence_speed_and_offset_shift_the_playhead() {
        let seq = Sequence::of(&[1.0, 2.0, 3.0, 4.0]).fast(2.0).offset(1.0);
        let textures = TextureTable::default();
        let props = frame(1.0);
        // 1.0 * 2.0 * 1.0 + 1.0 = 3
        assert_eq!(seq.select(&ctx(&props, &textures), 0.0), 4.0);
    }

    #[test]
    fn smoothed_sequence_interpolates() {
        let seq = Sequence::of(&[0.0, 10.0]).smooth(1.0);
        let textures = TextureTable::default();
        let props = frame(0.75);
        // shifted playhead 0.25 lies a quarter of the way from 0 to 10
        let v = seq.select(&ctx(&props, &textures), 0.0);
        assert!((v - 2.5).abs() < 1e-9, "got {v}");
    }

    #[test]
    fn empty_sequence_uses_fallback() {
        let seq = Sequence::new(Vec::new());
        let textures = TextureTable::default();
        let props = frame(3.0);
        assert_eq!(seq.select(&ctx(&props, &textures), 0.7), 0.7);
    }

    #[test]
    fn nested_sequence_elements_are_selected_recursively() {
        let seq = Sequence::new(vec![ArgValue::seq(&[5.0, 6.0]), ArgValue::Number(9.0)]);
        let textures = TextureTable::default();
        let props = frame(0.0);
        assert_eq!(seq.select(&ctx(&props, &textures), 0.0), 5.0);
    }

    #[test]
    fn negative_time_wraps_into_range() {
        let seq = Sequence::of(&[1.0, 2.0, 3.0]);
        let textures = TextureTable::default();
        let props = frame(-1.0);
        assert_eq!(seq.select(&ctx(&props, &textures), 0.0), 3.0);
    }

    #[test]
    fn ease_endpoints_are_fixed() {
        for ease in [
            Ease::Linear,
            Ease::EaseInQuad,
            Ease::EaseOutQuad,
            Ease::EaseInOutCubic,
            Ease::Sin,
        ] {
            assert!(ease.apply(0.0).abs() < 1e-9, "{ease:?} at 0");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-9, "{ease:?} at 1");
        }
    }

    #[test]
    fn fn_provider_turns_nan_into_null() {
        fn nan(_: &FrameContext<'_>) -> f64 {
            f64::NAN
        }
        let p = FnProvider(nan);
        let textures = TextureTable::default();
        let props = frame(0.0);
        assert_eq!(p.evaluate(&ctx(&props, &textures)).unwrap(), Value::Null);
    }

    #[test]
    fn prop_provider_reads_time_and_properties() {
        let textures = TextureTable::default();
        let mut props = frame(2.0);
        props.properties = json!({"level": 0.5});

        let time = PropProvider {
            name: "time".into(),
            scale: 0.5,
            offset: 1.0,
        };
        assert_eq!(time.evaluate(&ctx(&props, &textures)).unwrap(), json!(2.0));

        let level = PropProvider::new("level");
        assert_eq!(level.evaluate(&ctx(&props, &textures)).unwrap(), json!(0.5));

        let missing = PropProvider::new("absent");
        assert!(missing.evaluate(&ctx(&props, &textures)).is_err());
    }

    #[test]
    fn texture_table_resolves_outputs_and_external_sources() {
        struct Fixed;
        impl TextureSource for Fixed {
            fn current_texture(&self) -> Option<TextureId> {
                Some(TextureId::External(7))
            }
        }

        let mut table = TextureTable::default();
        table.set(2, Some(TextureId::Target(TargetId(4))));
        assert_eq!(
            table.resolve(&TextureRef::Output(2)),
            Some(TextureId::Target(TargetId(4)))
        );
        assert_eq!(table.resolve(&TextureRef::Output(0)), None);
        assert_eq!(table.resolve(&TextureRef::Output(9)), None);
        assert_eq!(
            table.resolve(&TextureRef::External(Rc::new(Fixed))),
            Some(TextureId::External(7))
        );
    }
}
