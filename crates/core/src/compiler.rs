//! Graph compiler: turns a [`Chain`] into one fragment shader plus the
//! ordered table of uniforms it reads.
//!
//! Every node becomes a call to its primitive's function. The previous
//! node's value is the call's implicit leading argument, except that
//! coordinate transforms act on the coordinate handed to everything
//! upstream of them:
//!
//! ```text
//! osc(60).rotate(0.5).invert()
//!   => invert(osc(rotate(st, 0.5, 0.0), 60.0, 0.1, 0.0), 1.0)
//! ```
//!
//! Side-chains are compiled recursively at the coordinate of the node that
//! consumes them. Uniforms are collected depth-first: a node's own uniforms,
//! then those of its side-chains, then the next node's.

use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::binder::{Binder, BoundValue, LiveValue};
use crate::chain::{output_type, projected_type, Chain};
use crate::error::GraphError;
use crate::primitive::{InputDecl, PrimitiveDef, PrimitiveRegistry};
use crate::signature::PrimitiveKind;
use crate::types::{GlslType, TypeConversions};
use crate::value::{FrameContext, UniformValue};

/// Maximum side-chain nesting depth.
pub const MAX_DEPTH: usize = 64;

/// Name of the implicit input carrying a combinator's side-chain.
pub const SIDE_CHAIN_INPUT: &str = "color";

/// Float precision qualifier of generated fragment shaders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    #[serde(rename = "lowp")]
    Low,
    #[default]
    #[serde(rename = "mediump")]
    Medium,
    #[serde(rename = "highp")]
    High,
}

impl Precision {
    pub fn qualifier(self) -> &'static str {
        match self {
            Precision::Low => "lowp",
            Precision::Medium => "mediump",
            Precision::High => "highp",
        }
    }
}

/// One entry of a program's uniform table.
#[derive(Debug, Clone)]
pub struct UniformEntry {
    pub name: String,
    pub ty: GlslType,
    pub value: LiveValue,
}

/// The result of compiling a chain.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    /// Complete GLSL ES 3.00 fragment shader.
    pub source: String,
    /// Uniforms in collection order.
    pub uniforms: Vec<UniformEntry>,
    /// Type of the chain's value before it is widened to `fragColor`.
    pub return_type: GlslType,
}

impl CompiledProgram {
    pub fn uniform_names(&self) -> impl Iterator<Item = &str> {
        self.uniforms.iter().map(|u| u.name.as_str())
    }

    /// Evaluates every uniform for one frame, in table order.
    pub fn uniform_values(&self, ctx: &FrameContext<'_>) -> Vec<(String, UniformValue)> {
        self.uniforms
            .iter()
            .map(|u| (u.name.clone(), u.value.evaluate(ctx)))
            .collect()
    }
}

/// Compiles chains against a primitive registry.
#[derive(Debug, Clone)]
pub struct Compiler {
    registry: PrimitiveRegistry,
    conversions: TypeConversions,
    precision: Precision,
}

impl Compiler {
    pub fn new(registry: PrimitiveRegistry) -> Self {
        Self {
            registry,
            conversions: TypeConversions::default(),
            precision: Precision::default(),
        }
    }

    pub fn with_conversions(mut self, conversions: TypeConversions) -> Self {
        self.conversions = conversions;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn registry(&self) -> &PrimitiveRegistry {
        &self.registry
    }

    pub fn conversions(&self) -> &TypeConversions {
        &self.conversions
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Compiles `chain` into a fragment shader.
    ///
    /// Fails only on an unknown primitive or on nesting deeper than
    /// [`MAX_DEPTH`]; everything else degrades with a warning.
    pub fn compile(&self, chain: &Chain) -> Result<CompiledProgram, GraphError> {
        let mut emitter = Emitter {
            registry: &self.registry,
            binder: Binder::new(&self.registry, &self.conversions),
            uniforms: Vec::new(),
            functions: Vec::new(),
            seen: HashSet::new(),
            uniform_names: HashSet::new(),
        };
        let (expr, return_type) = emitter.chain(chain, 0)?;
        let color = widen_to_color(&expr.render("st"), &return_type);

        let mut source = String::new();
        source.push_str("#version 300 es\n");
        source.push_str(&format!("precision {} float;\n", self.precision.qualifier()));
        source.push_str("uniform float time;\nuniform vec2 resolution;\nuniform sampler2D prevBuffer;\n");
        for uniform in &emitter.uniforms {
            source.push_str(&format!("uniform {} {};\n", uniform.ty, uniform.name));
        }
        source.push_str("out vec4 fragColor;\n\n");
        if !self.registry.prelude().is_empty() {
            source.push_str(self.registry.prelude());
            source.push_str("\n\n");
        }
        for function in &emitter.functions {
            source.push_str(function);
            source.push_str("\n\n");
        }
        source.push_str("void main() {\n");
        source.push_str("  vec2 st = gl_FragCoord.xy / resolution.xy;\n");
        source.push_str(&format!("  fragColor = {color};\n}}\n"));

        tracing::debug!(
            nodes = chain.len(),
            functions = emitter.functions.len(),
            uniforms = emitter.uniforms.len(),
            return_type = %return_type,
            "compiled chain"
        );
        Ok(CompiledProgram {
            source,
            uniforms: emitter.uniforms,
            return_type,
        })
    }
}

fn widen_to_color(expr: &str, ty: &GlslType) -> String {
    match ty {
        GlslType::Vec4 => expr.to_string(),
        GlslType::Vec3 => format!("vec4({expr}, 1.0)"),
        GlslType::Vec2 => format!("vec4({expr}, 0.0, 1.0)"),
        GlslType::Float => format!("vec4(vec3({expr}), 1.0)"),
        other => {
            tracing::warn!(ty = %other, "chain value is not a color, writing it unchanged");
            expr.to_string()
        }
    }
}

enum ArgExpr {
    Text(String),
    Chain(Expr),
}

struct Call {
    kind: PrimitiveKind,
    function: String,
    args: Vec<ArgExpr>,
}

impl Call {
    fn invoke(&self, leading: String, uv: &str) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(leading);
        for arg in &self.args {
            parts.push(match arg {
                ArgExpr::Text(text) => text.clone(),
                ArgExpr::Chain(expr) => expr.render(uv),
            });
        }
        format!("{}({})", self.function, parts.join(", "))
    }
}

/// A compiled chain as a function of the coordinate it is sampled at.
struct Expr {
    calls: Vec<Call>,
    projection: Option<String>,
}

impl Expr {
    fn render(&self, uv: &str) -> String {
        let text = render_calls(&self.calls, uv);
        match &self.projection {
            Some(swizzle) => format!("{text}.{swizzle}"),
            None => text,
        }
    }
}

fn render_calls(calls: &[Call], uv: &str) -> String {
    let Some((last, upstream)) = calls.split_last() else {
        return uv.to_string();
    };
    match last.kind {
        PrimitiveKind::Source => last.invoke(uv.to_string(), uv),
        PrimitiveKind::Coord | PrimitiveKind::CombineCoord => {
            render_calls(upstream, &last.invoke(uv.to_string(), uv))
        }
        PrimitiveKind::Color | PrimitiveKind::Combine | PrimitiveKind::Raw => {
            last.invoke(render_calls(upstream, uv), uv)
        }
    }
}

struct Emitter<'a> {
    registry: &'a PrimitiveRegistry,
    binder: Binder<'a>,
    uniforms: Vec<UniformEntry>,
    functions: Vec<String>,
    seen: HashSet<String>,
    uniform_names: HashSet<String>,
}

impl Emitter<'_> {
    fn chain(&mut self, chain: &Chain, depth: usize) -> Result<(Expr, GlslType), GraphError> {
        if depth > MAX_DEPTH {
            return Err(GraphError::CycleDetected(depth));
        }
        let mut ty = GlslType::Vec2;
        let mut calls = Vec::with_capacity(chain.len());

        for node in chain.nodes() {
            let def = self.registry.lookup(&node.primitive)?;
            let coord = def.uses_coord_overload(&ty);
            let function = self.function(def, coord, &ty);

            let inputs: Cow<'_, [InputDecl]> = if def.kind.takes_side_chain() {
                let mut all = Vec::with_capacity(def.inputs.len() + 1);
                all.push(InputDecl::required(SIDE_CHAIN_INPUT, GlslType::Vec4));
                all.extend_from_slice(&def.inputs);
                Cow::Owned(all)
            } else {
                Cow::Borrowed(def.inputs_for(coord))
            };
            let bound = self
                .binder
                .bind_inputs(&inputs, &node.args, self.uniforms.len())?;

            let mut names = Vec::with_capacity(bound.len());
            for arg in &bound {
                names.push(match &arg.value {
                    BoundValue::Live(value) => {
                        let name = self.claim(&arg.name);
                        self.uniforms.push(UniformEntry {
                            name: name.clone(),
                            ty: arg.ty.clone(),
                            value: value.clone(),
                        });
                        Some(name)
                    }
                    _ => None,
                });
            }

            let mut args = Vec::with_capacity(bound.len());
            for (arg, name) in bound.into_iter().zip(names) {
                args.push(match arg.value {
                    BoundValue::Literal(text) => ArgExpr::Text(text),
                    BoundValue::Live(_) => ArgExpr::Text(name.unwrap_or(arg.name)),
                    BoundValue::Chain(side) => ArgExpr::Chain(self.chain(&side, depth + 1)?.0),
                });
            }

            ty = output_type(def, &ty);
            calls.push(Call {
                kind: def.kind,
                function,
                args,
            });
        }

        if let Some(swizzle) = chain.projection() {
            ty = projected_type(swizzle);
        }
        Ok((
            Expr {
                calls,
                projection: chain.projection().map(str::to_string),
            },
            ty,
        ))
    }

    /// Reserves a uniform name. `x1` at index 0 and `x` at index 10 both
    /// come out as `x10`; the later one gets a `_n` suffix.
    fn claim(&mut self, name: &str) -> String {
        let mut unique = name.to_string();
        let mut suffix = 1;
        while !self.uniform_names.insert(unique.clone()) {
            unique = format!("{name}_{suffix}");
            suffix += 1;
        }
        if unique != name {
            tracing::debug!(uniform = name, renamed = %unique, "uniform name taken, renaming");
        }
        unique
    }

    /// Emits the function for `def` unless an identical one already exists,
    /// and returns its name.
    fn function(&mut self, def: &PrimitiveDef, coord: bool, incoming: &GlslType) -> String {
        let sig = def.signature_for(coord);
        let mut params: Vec<String> = sig
            .params
            .iter()
            .map(|p| format!("{} {}", p.ty, p.name))
            .collect();
        if sig.passthrough {
            params.push(format!("{incoming} _in"));
        }
        params.extend(
            def.inputs_for(coord)
                .iter()
                .map(|input| format!("{} {}", input.ty, input.name)),
        );
        let ret = sig.return_type.unwrap_or_else(|| incoming.clone());
        let header = format!("{ret} {}({})", def.function_name(), params.join(", "));
        if self.seen.insert(header.clone()) {
            self.functions
                .push(format!("{header} {{\n{}\n}}", def.body_for(coord)));
        }
        def.function_name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{registry, with_frame, OSC_BODY};
    use crate::value::{ArgValue, FrameProps};

    fn compile(chain: &Chain) -> CompiledProgram {
        Compiler::new(registry()).compile(chain).unwrap()
    }

    fn main_line(program: &CompiledProgram) -> &str {
        program
            .source
            .lines()
            .find(|l| l.trim_start().starts_with("fragColor ="))
            .unwrap()
            .trim()
    }

    #[test]
    fn single_source_emits_body_verbatim() {
        let program = compile(&Chain::start("osc", vec![]));
        assert!(program.source.contains(OSC_BODY));
        assert!(program
            .source
            .contains("vec4 osc(vec2 _st, float frequency, float sync, float offset) {"));
        assert_eq!(main_line(&program), "fragColor = osc(st, 60.0, 0.1, 0.0);");
        assert!(program.uniforms.is_empty());
        assert_eq!(program.return_type, GlslType::Vec4);
    }

    #[test]
    fn source_is_glsl_es_300() {
        let program = compile(&Chain::start("osc", vec![]));
        assert!(program.source.starts_with("#version 300 es\nprecision mediump float;\n"));
        assert!(program.source.contains("uniform sampler2D prevBuffer;"));
        assert!(program.source.contains("out vec4 fragColor;"));
        assert!(program.source.contains("vec2 st = gl_FragCoord.xy / resolution.xy;"));
    }

    #[test]
    fn precision_is_configurable() {
        let program = Compiler::new(registry())
            .with_precision(Precision::High)
            .compile(&Chain::start("osc", vec![]))
            .unwrap();
        assert!(program.source.contains("precision highp float;"));
    }

    #[test]
    fn combine_splices_side_chain_without_uniforms() {
        let side = Chain::start("solid", vec![1.0.into()]);
        let chain = Chain::start("osc", vec![]).then("add", vec![side.into(), 1.0.into()]);
        let program = compile(&chain);
        assert!(program.uniforms.is_empty());
        assert!(program.source.contains(OSC_BODY));
        assert!(program.source.contains("return vec4(r, g, b, a);"));
        assert!(program
            .source
            .contains("vec4 add(vec4 _c0, vec4 _c1, float amount) {"));
        assert_eq!(
            main_line(&program),
            "fragColor = add(osc(st, 60.0, 0.1, 0.0), solid(st, 1.0, 0.0, 0.0, 1.0), 1.0);"
        );
    }

    #[test]
    fn callback_argument_becomes_single_uniform() {
        let chain = Chain::start(
            "osc",
            vec![60.0.into(), 0.1.into(), ArgValue::func(|ctx| ctx.props.time)],
        );
        let program = compile(&chain);
        assert_eq!(program.uniform_names().collect::<Vec<_>>(), vec!["offset0"]);
        assert!(program.source.contains("uniform float offset0;"));
        assert_eq!(main_line(&program), "fragColor = osc(st, 60.0, 0.1, offset0);");

        let props = FrameProps {
            time: 4.0,
            ..FrameProps::default()
        };
        let values = with_frame(&props, |ctx| program.uniform_values(ctx));
        assert_eq!(values, vec![("offset0".to_string(), UniformValue::Float(4.0))]);
    }

    #[test]
    fn coord_transforms_wrap_the_coordinate() {
        let chain = Chain::start("osc", vec![])
            .then("rotate", vec![0.5.into()])
            .then("invert", vec![]);
        assert_eq!(
            main_line(&compile(&chain)),
            "fragColor = invert(osc(rotate(st, 0.5, 0.0), 60.0, 0.1, 0.0), 1.0);"
        );
    }

    #[test]
    fn combine_coord_evaluates_side_chain_at_incoming_coordinate() {
        let side = Chain::start("solid", vec![]);
        let chain = Chain::start("osc", vec![]).then("modulate", vec![side.into()]);
        let program = compile(&chain);
        assert_eq!(
            main_line(&program),
            "fragColor = osc(modulate(st, solid(st, 0.0, 0.0, 0.0, 1.0), 0.1), 60.0, 0.1, 0.0);"
        );
        assert!(program
            .source
            .contains("vec2 modulate(vec2 _st, vec4 _c0, float amount) {"));
    }

    #[test]
    fn side_chain_under_coord_transform_sees_transformed_coordinate() {
        let side = Chain::start("solid", vec![]);
        let chain = Chain::start("osc", vec![])
            .then("add", vec![side.into()])
            .then("rotate", vec![]);
        assert_eq!(
            main_line(&compile(&chain)),
            "fragColor = add(osc(rotate(st, 10.0, 0.0), 60.0, 0.1, 0.0), \
             solid(rotate(st, 10.0, 0.0), 0.0, 0.0, 0.0, 1.0), 1.0);"
        );
    }

    #[test]
    fn functions_are_emitted_once() {
        let side = Chain::start("osc", vec![10.0.into()]);
        let chain = Chain::start("osc", vec![]).then("add", vec![side.into()]);
        let program = compile(&chain);
        assert_eq!(program.source.matches("vec4 osc(").count(), 1);
    }

    #[test]
    fn coord_overload_is_emitted_alongside_image_version() {
        let side = Chain::start("osc", vec![]);
        let chain = Chain::start("osc", vec![side.into()]).then("sum", vec![]);
        let program = compile(&chain);
        assert!(program.source.contains("float sum(vec4 _c0, vec4 s) {"));
        assert_eq!(program.return_type, GlslType::Float);
        assert!(main_line(&program).starts_with("fragColor = vec4(vec3(sum("));

        let coord = compile(&Chain::start("sum", vec![]));
        assert!(coord.source.contains("float sum(vec2 _st, vec2 s) {"));
        assert_eq!(main_line(&coord), "fragColor = vec4(vec3(sum(st, vec2(1.0, 1.0))), 1.0);");
    }

    #[test]
    fn image_side_chain_on_float_input_is_converted() {
        let side = Chain::start("solid", vec![]);
        let chain = Chain::start("osc", vec![side.into()]);
        assert_eq!(
            main_line(&compile(&chain)),
            "fragColor = osc(st, sum(solid(st, 0.0, 0.0, 0.0, 1.0), vec4(1.0, 1.0, 1.0, 1.0)), 0.1, 0.0);"
        );
    }

    #[test]
    fn texture_on_vector_input_samples_and_projects() {
        let chain = Chain::start("osc", vec![]).then("tint", vec![ArgValue::output(1)]);
        let program = compile(&chain);
        assert_eq!(
            main_line(&program),
            "fragColor = tint(osc(st, 60.0, 0.1, 0.0), src(st, tex0).rgb);"
        );
        assert_eq!(program.uniform_names().collect::<Vec<_>>(), vec!["tex0"]);
        assert!(program.source.contains("uniform sampler2D tex0;"));
    }

    #[test]
    fn raw_primitive_passes_incoming_type_through() {
        let chain = Chain::start("osc", vec![]).then("gain", vec![2.0.into()]);
        let program = compile(&chain);
        assert!(program.source.contains("vec4 gain(vec4 _in, float level) {"));
        assert_eq!(main_line(&program), "fragColor = gain(osc(st, 60.0, 0.1, 0.0), 2.0);");

        let coord = compile(&Chain::start("gain", vec![]));
        assert!(coord.source.contains("vec2 gain(vec2 _in, float level) {"));
        assert_eq!(coord.return_type, GlslType::Vec2);
    }

    #[test]
    fn uniforms_are_collected_depth_first() {
        let side = Chain::start("osc", vec![ArgValue::prop("time")]);
        let chain = Chain::start("osc", vec![ArgValue::prop("time")])
            .then("add", vec![side.into(), ArgValue::prop("time")])
            .then("rotate", vec![ArgValue::prop("time")]);
        let program = compile(&chain);
        assert_eq!(
            program.uniform_names().collect::<Vec<_>>(),
            vec!["frequency0", "amount1", "frequency2", "angle3"]
        );
    }

    #[test]
    fn unknown_primitive_fails() {
        let result = Compiler::new(registry()).compile(&Chain::start("nope", vec![]));
        assert!(matches!(result, Err(GraphError::UnknownPrimitive(_))));
    }

    #[test]
    fn excessive_nesting_is_rejected() {
        let mut chain = Chain::start("solid", vec![]);
        for _ in 0..=MAX_DEPTH {
            chain = Chain::start("osc", vec![]).then("add", vec![chain.into()]);
        }
        let result = Compiler::new(registry()).compile(&chain);
        assert!(matches!(result, Err(GraphError::CycleDetected(_))));
    }

    #[test]
    fn nesting_within_limit_compiles() {
        let mut chain = Chain::start("solid", vec![]);
        for _ in 0..MAX_DEPTH {
            chain = Chain::start("osc", vec![]).then("add", vec![chain.into()]);
        }
        assert!(Compiler::new(registry()).compile(&chain).is_ok());
    }

    #[test]
    fn empty_chain_renders_coordinate() {
        let program = compile(&Chain::new());
        assert_eq!(main_line(&program), "fragColor = vec4(st, 0.0, 1.0);");
    }

    #[test]
    fn compiling_twice_is_byte_identical() {
        let side = Chain::start("osc", vec![ArgValue::seq(&[1.0, 2.0])]);
        let chain = Chain::start("osc", vec![])
            .then("modulate", vec![side.into(), 0.3.into()])
            .then("tint", vec![ArgValue::output(0)]);
        let compiler = Compiler::new(registry());
        let a = compiler.compile(&chain).unwrap();
        let b = compiler.compile(&chain).unwrap();
        assert_eq!(a.source, b.source);
        assert_eq!(
            a.uniform_names().collect::<Vec<_>>(),
            b.uniform_names().collect::<Vec<_>>()
        );
    }

    #[test]
    fn digit_suffixed_inputs_get_unique_uniforms() {
        let registry = registry()
            .with(PrimitiveDef::new("gain", PrimitiveKind::Color, "   return _c0 * x1;").input(InputDecl::float("x1", 1.0)))
            .with(PrimitiveDef::new("bias", PrimitiveKind::Color, "   return _c0 + x;").input(InputDecl::float("x", 0.0)));
        let mut chain = Chain::start("osc", vec![]).then("gain", vec![ArgValue::seq(&[1.0, 2.0])]);
        for _ in 0..10 {
            chain = chain.then("bias", vec![ArgValue::seq(&[0.1, 0.2])]);
        }
        let program = Compiler::new(registry).compile(&chain).unwrap();

        let names: Vec<&str> = program.uniform_names().collect();
        assert_eq!(names.len(), 11);
        assert_eq!(names[0], "x10");
        assert_eq!(names[10], "x10_1");
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), names.len());
        assert_eq!(program.source.matches("uniform float x10;").count(), 1);
        assert!(program.source.contains("uniform float x10_1;"));
        assert!(main_line(&program).ends_with(", x10_1);"));
    }

    #[test]
    fn int_inputs_upload_int_values() {
        let registry = registry().with(
            PrimitiveDef::new("bits", PrimitiveKind::Source, "   return vec4(float(rgb) / 255.0);")
                .input(InputDecl::new("rgb", GlslType::Int, crate::types::DefaultValue::Scalar(0.0)))
                .input(InputDecl::new("mask", GlslType::Int, crate::types::DefaultValue::Scalar(7.0)).uniform())
                .input(InputDecl::float("gain", 1.0)),
        );
        let chain = Chain::start("bits", vec![ArgValue::seq(&[254.6]), ArgValue::Number(3.0), ArgValue::seq(&[0.5])]);
        let program = Compiler::new(registry).compile(&chain).unwrap();
        assert!(program.source.contains("uniform int rgb0;"));
        assert!(program.source.contains("uniform int mask0;"));

        let values = with_frame(&FrameProps::default(), |ctx| program.uniform_values(ctx));
        assert_eq!(values[0], ("rgb0".to_string(), UniformValue::Int(255)));
        assert_eq!(values[1], ("mask0".to_string(), UniformValue::Int(3)));
        for (entry, (_, value)) in program.uniforms.iter().zip(&values) {
            match entry.ty {
                GlslType::Int => assert!(matches!(value, UniformValue::Int(_)), "{}", entry.name),
                GlslType::Float => assert!(matches!(value, UniformValue::Float(_)), "{}", entry.name),
                _ => {}
            }
        }
    }

    #[test]
    fn every_kind_matches_its_signature() {
        let registry = registry();
        for def in registry.iter() {
            let program = compile(&Chain::start(def.name.clone(), vec![]));
            let sig = def.signature_for(def.uses_coord_overload(&GlslType::Vec2));
            let header = program
                .source
                .lines()
                .find(|l| l.contains(&format!(" {}(", def.function_name())) && l.ends_with('{'))
                .unwrap();
            let params = header
                .split_once('(')
                .and_then(|(_, rest)| rest.rsplit_once(')'))
                .map(|(p, _)| p)
                .unwrap();
            let count = if params.is_empty() { 0 } else { params.split(", ").count() };
            assert_eq!(
                count,
                sig.arity() + def.inputs_for(def.uses_coord_overload(&GlslType::Vec2)).len(),
                "{}",
                def.name
            );
            if let Some(ret) = sig.return_type {
                assert!(header.starts_with(&format!("{ret} ")), "{}", def.name);
            }
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// Replaces every run of digits with `#`.
        fn without_numbers(text: &str) -> String {
            let mut out = String::with_capacity(text.len());
            let mut in_number = false;
            for c in text.chars() {
                if c.is_ascii_digit() {
                    if !in_number {
                        out.push('#');
                    }
                    in_number = true;
                } else {
                    out.push(c);
                    in_number = false;
                }
            }
            out
        }

        fn shaped(a: f64, b: f64, c: f64) -> Chain {
            let side = Chain::start("solid", vec![a.into(), b.into()]);
            Chain::start("osc", vec![a.into(), ArgValue::prop("time")])
                .then("rotate", vec![b.into()])
                .then("add", vec![side.into(), c.into()])
                .then("tint", vec![ArgValue::seq(&[a, b, c])])
        }

        proptest! {
            #[test]
            fn same_shape_differs_only_in_literals(
                a in 0.0f64..100.0, b in 0.0f64..100.0, c in 0.0f64..100.0,
                x in 0.0f64..100.0, y in 0.0f64..100.0, z in 0.0f64..100.0,
            ) {
                let compiler = Compiler::new(registry());
                let first = compiler.compile(&shaped(a, b, c)).unwrap();
                let second = compiler.compile(&shaped(x, y, z)).unwrap();
                prop_assert_eq!(without_numbers(&first.source), without_numbers(&second.source));
                prop_assert_eq!(
                    first.uniform_names().collect::<Vec<_>>(),
                    second.uniform_names().collect::<Vec<_>>()
                );
            }
        }
    }
}
