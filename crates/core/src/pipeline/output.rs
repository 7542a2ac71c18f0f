//! A render output: two ping-ponged buffers, two scratch buffers and the
//! compiled passes that draw into them every tick.

use std::collections::HashMap;

use serde::Serialize;

use crate::compiler::{CompiledProgram, Compiler};
use crate::error::GraphError;
use crate::value::{FrameContext, FrameProps, ProgramId, TargetId, TextureId, TextureTable, UniformValue};

use super::api::{DrawCall, GraphicsApi};
use super::blend::BlendState;
use super::camera::{Camera, CameraMatrices};
use super::pass::{Pass, ViewportSpec};
use super::ping_pong::PingPong;
use super::shaders::{fade_shader, vertex_shader};
use super::topology::{attributes, Attributes, Topology, TRIANGLE_POSITIONS};

const TRANSPARENT: [f32; 4] = [0.0; 4];

/// Lifecycle of an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputState {
    /// Buffers allocated, nothing compiled.
    Idle,
    /// Passes compiled, not yet drawn since the last compile or resize.
    Compiled,
    /// Drawing every tick.
    Running,
}

#[derive(Debug)]
struct DrawStep {
    program: ProgramId,
    compiled: CompiledProgram,
    topology: Topology,
    attributes: Attributes,
    blend: Option<BlendState>,
    viewport: Option<ViewportSpec>,
    line_width: Option<f32>,
    framebuffer: Option<TargetId>,
}

#[derive(Debug)]
enum Step {
    Clear,
    Fade { program: ProgramId, camera: bool },
    Draw(Box<DrawStep>),
}

#[derive(Debug)]
pub struct Output {
    index: usize,
    fbos: [TargetId; 2],
    temp: [TargetId; 2],
    ping_pong: PingPong,
    width: u32,
    height: u32,
    camera: Camera,
    steps: Vec<Step>,
    programs: HashMap<(String, String), ProgramId>,
    state: OutputState,
}

impl Output {
    /// Allocates the output's four render targets.
    pub fn new(api: &mut dyn GraphicsApi, index: usize, width: u32, height: u32) -> Result<Self, GraphError> {
        let mut created = Vec::with_capacity(4);
        for _ in 0..4 {
            match api.create_target(width, height) {
                Ok(target) => created.push(target),
                Err(e) => {
                    for target in created {
                        api.destroy_target(target);
                    }
                    return Err(e);
                }
            }
        }
        tracing::debug!(output = index, width, height, "allocated output buffers");
        Ok(Self {
            index,
            fbos: [created[0], created[1]],
            temp: [created[2], created[3]],
            ping_pong: PingPong::new(),
            width,
            height,
            camera: Camera::default(),
            steps: Vec::new(),
            programs: HashMap::new(),
            state: OutputState::Idle,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> OutputState {
        self.state
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The ping-ponged pair, indexed like [`PingPong`].
    pub fn buffers(&self) -> [TargetId; 2] {
        self.fbos
    }

    pub fn scratch(&self) -> [TargetId; 2] {
        self.temp
    }

    pub fn ping_pong(&self) -> PingPong {
        self.ping_pong
    }

    /// Buffer written by the most recent draw.
    pub fn current(&self) -> TargetId {
        self.fbos[self.ping_pong.current()]
    }

    /// The texture other outputs sample when they reference this one.
    pub fn texture(&self) -> TextureId {
        TextureId::Target(self.fbos[self.ping_pong.feedback()])
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn pass_count(&self) -> usize {
        self.steps.len()
    }

    /// Compiles `passes` and makes them this output's draw list.
    ///
    /// On error the previous passes stay in place.
    pub fn render(&mut self, api: &mut dyn GraphicsApi, compiler: &Compiler, passes: &[Pass]) -> Result<(), GraphError> {
        let precision = compiler.precision();
        let mut steps = Vec::with_capacity(passes.len());
        for pass in passes {
            let step = match pass {
                Pass::Clear => Step::Clear,
                Pass::Fade { amount, camera } => {
                    let vertex = vertex_shader(precision, Topology::Triangles);
                    let program = self.program(api, vertex, fade_shader(precision, *amount))?;
                    Step::Fade {
                        program,
                        camera: *camera,
                    }
                }
                Pass::Draw(draw) => {
                    let compiled = compiler.compile(&draw.chain)?;
                    let vertex = vertex_shader(precision, draw.topology);
                    let program = self.program(api, vertex, compiled.source.clone())?;
                    Step::Draw(Box::new(DrawStep {
                        program,
                        compiled,
                        topology: draw.topology,
                        attributes: attributes(draw.topology, draw.count),
                        blend: draw.blend.state(),
                        viewport: draw.viewport,
                        line_width: draw.line_width,
                        framebuffer: draw.framebuffer,
                    }))
                }
            };
            steps.push(step);
        }
        tracing::debug!(output = self.index, passes = steps.len(), "compiled passes");
        self.steps = steps;
        self.state = OutputState::Compiled;
        Ok(())
    }

    fn program(&mut self, api: &mut dyn GraphicsApi, vertex: String, fragment: String) -> Result<ProgramId, GraphError> {
        let key = (vertex, fragment);
        if let Some(program) = self.programs.get(&key) {
            return Ok(*program);
        }
        let program = api.create_program(&key.0, &key.1)?;
        self.programs.insert(key, program);
        Ok(program)
    }

    /// Runs every pass once.
    ///
    /// `textures` holds the feedback texture of every output as it was
    /// before this output started drawing.
    pub fn tick(&mut self, api: &mut dyn GraphicsApi, props: &FrameProps, textures: &TextureTable) -> Result<(), GraphError> {
        if self.state == OutputState::Idle {
            return Ok(());
        }
        self.state = OutputState::Running;

        let aspect = self.width as f32 / self.height as f32;
        let matrices = self.camera.matrices(props, aspect);
        let mut draw_index = 0;

        for step in &self.steps {
            match step {
                Step::Clear => {
                    api.clear(self.fbos[self.ping_pong.feedback()], TRANSPARENT)?;
                    for target in self.temp {
                        api.clear(target, TRANSPARENT)?;
                    }
                }
                Step::Fade { program, camera } => {
                    let source = self.fbos[self.ping_pong.current()];
                    let target = self.fbos[self.ping_pong.feedback()];
                    let matrices = if *camera { matrices } else { CameraMatrices::IDENTITY };
                    let uniforms = frame_uniforms(props, source, &matrices);
                    api.draw(&DrawCall {
                        program: *program,
                        target,
                        topology: Topology::Triangles,
                        positions: &TRIANGLE_POSITIONS,
                        count: 3,
                        uniforms: &uniforms,
                        blend: None,
                        viewport: None,
                        line_width: None,
                    })?;
                }
                Step::Draw(draw) => {
                    let (target, feedback) = match draw.framebuffer {
                        Some(target) => {
                            let feedback = self.fbos[self.ping_pong.feedback()];
                            if feedback == target {
                                (target, self.fbos[self.ping_pong.current()])
                            } else {
                                (target, feedback)
                            }
                        }
                        None => {
                            let written = self.ping_pong.flip();
                            (self.fbos[written], self.fbos[self.ping_pong.feedback()])
                        }
                    };

                    let mut table = textures.clone();
                    table.set(self.index, Some(TextureId::Target(feedback)));
                    let ctx = FrameContext {
                        props,
                        draw_index,
                        textures: &table,
                    };

                    let mut uniforms = frame_uniforms(props, feedback, &matrices);
                    for (name, value) in draw.compiled.uniform_values(&ctx) {
                        let value = match value {
                            UniformValue::Texture(Some(TextureId::Target(t))) if t == target => {
                                tracing::warn!(
                                    output = self.index,
                                    uniform = %name,
                                    "texture is the draw target, sampling the feedback buffer instead"
                                );
                                UniformValue::Texture(Some(TextureId::Target(feedback)))
                            }
                            other => other,
                        };
                        uniforms.push((name, value));
                    }

                    api.draw(&DrawCall {
                        program: draw.program,
                        target,
                        topology: draw.topology,
                        positions: &draw.attributes.positions,
                        count: draw.attributes.count,
                        uniforms: &uniforms,
                        blend: draw.blend,
                        viewport: draw.viewport.map(|v| v.to_pixels(self.width, self.height)),
                        line_width: draw.line_width,
                    })?;
                    draw_index += 1;
                }
            }
        }
        Ok(())
    }

    /// Reallocates all four buffers. Compiled passes are kept.
    pub fn resize(&mut self, api: &mut dyn GraphicsApi, width: u32, height: u32) -> Result<(), GraphError> {
        if width == 0 || height == 0 {
            return Err(GraphError::InvalidDimensions);
        }
        for target in self.fbos.into_iter().chain(self.temp) {
            api.resize_target(target, width, height)?;
        }
        self.width = width;
        self.height = height;
        if self.state == OutputState::Running {
            self.state = OutputState::Compiled;
        }
        Ok(())
    }

    /// Releases the output's buffers.
    pub fn destroy(self, api: &mut dyn GraphicsApi) {
        for target in self.fbos.into_iter().chain(self.temp) {
            api.destroy_target(target);
        }
    }
}

/// Uniforms every program receives, ahead of its own.
fn frame_uniforms(props: &FrameProps, feedback: TargetId, matrices: &CameraMatrices) -> Vec<(String, UniformValue)> {
    let mut uniforms = vec![
        ("time".to_string(), UniformValue::Float(props.time)),
        ("resolution".to_string(), UniformValue::Vec(props.resolution.to_vec())),
        (
            "prevBuffer".to_string(),
            UniformValue::Texture(Some(TextureId::Target(feedback))),
        ),
    ];
    uniforms.extend(matrices.uniforms());
    uniforms
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::chain::Chain;
    use crate::pipeline::blend::BlendMode;
    use crate::pipeline::headless::{Command, HeadlessApi, RecordedDraw};
    use crate::pipeline::pass::DrawPass;
    use crate::pipeline::topology::ItemCount;
    use crate::test_support::registry;
    use crate::value::{ArgValue, Sequence, TextureRef, TextureSource};

    fn setup() -> (HeadlessApi, Compiler, Output) {
        let mut api = HeadlessApi::new();
        let output = Output::new(&mut api, 0, 8, 4).unwrap();
        api.take_commands();
        (api, Compiler::new(registry()), output)
    }

    fn tick(api: &mut HeadlessApi, output: &mut Output) -> Vec<RecordedDraw> {
        let table = TextureTable::new(vec![Some(output.texture())]);
        output.tick(api, &FrameProps::default(), &table).unwrap();
        api.take_commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::Draw(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    fn osc() -> Pass {
        Pass::draw(Chain::start("osc", vec![]))
    }

    #[test]
    fn new_output_allocates_four_targets_and_is_idle() {
        let mut api = HeadlessApi::new();
        let output = Output::new(&mut api, 2, 16, 16).unwrap();
        assert_eq!(api.live_targets(), 4);
        assert_eq!(output.state(), OutputState::Idle);
        assert_eq!(output.index(), 2);
        assert_eq!(output.texture(), TextureId::Target(output.buffers()[1]));
    }

    #[test]
    fn zero_sized_output_fails_without_leaking_targets() {
        let mut api = HeadlessApi::new();
        assert!(matches!(Output::new(&mut api, 0, 0, 4), Err(GraphError::InvalidDimensions)));
        assert_eq!(api.live_targets(), 0);
    }

    #[test]
    fn idle_output_does_not_draw() {
        let (mut api, _, mut output) = setup();
        assert!(tick(&mut api, &mut output).is_empty());
        assert_eq!(output.state(), OutputState::Idle);
    }

    #[test]
    fn render_then_tick_moves_through_states() {
        let (mut api, compiler, mut output) = setup();
        output.render(&mut api, &compiler, &[osc()]).unwrap();
        assert_eq!(output.state(), OutputState::Compiled);
        tick(&mut api, &mut output);
        assert_eq!(output.state(), OutputState::Running);
    }

    #[test]
    fn fade_writes_feedback_buffer_without_flipping() {
        let (mut api, compiler, mut output) = setup();
        let [a, b] = output.buffers();
        output
            .render(&mut api, &compiler, &[Pass::fade(0.1), osc()])
            .unwrap();

        let draws = tick(&mut api, &mut output);
        assert_eq!(draws.len(), 2);
        // Fade reads the current buffer and writes the other one.
        assert_eq!(draws[0].target, b);
        assert_eq!(draws[0].uniform("prevBuffer"), Some(&UniformValue::Texture(Some(TextureId::Target(a)))));
        // The draw then flips onto the faded buffer.
        assert_eq!(draws[1].target, b);
        assert_eq!(draws[1].uniform("prevBuffer"), Some(&UniformValue::Texture(Some(TextureId::Target(a)))));
        assert_eq!(output.ping_pong().current(), 1);

        let draws = tick(&mut api, &mut output);
        assert_eq!(draws[0].target, a);
        assert_eq!(draws[1].target, a);
        assert_eq!(output.ping_pong().current(), 0);
    }

    #[test]
    fn fade_alone_never_flips() {
        let (mut api, compiler, mut output) = setup();
        output.render(&mut api, &compiler, &[Pass::fade(0.5)]).unwrap();
        for _ in 0..3 {
            let draws = tick(&mut api, &mut output);
            assert_eq!(draws[0].target, output.buffers()[1]);
            assert_eq!(output.ping_pong().current(), 0);
        }
    }

    #[test]
    fn each_draw_flips_once() {
        let (mut api, compiler, mut output) = setup();
        output.render(&mut api, &compiler, &[osc(), osc(), osc()]).unwrap();
        let draws = tick(&mut api, &mut output);
        let [a, b] = output.buffers();
        let targets: Vec<_> = draws.iter().map(|d| d.target).collect();
        assert_eq!(targets, vec![b, a, b]);
        for draw in &draws {
            assert_ne!(
                draw.uniform("prevBuffer"),
                Some(&UniformValue::Texture(Some(TextureId::Target(draw.target))))
            );
        }
    }

    #[test]
    fn clear_targets_feedback_and_scratch_buffers() {
        let (mut api, compiler, mut output) = setup();
        output.render(&mut api, &compiler, &[Pass::Clear]).unwrap();
        output
            .tick(&mut api, &FrameProps::default(), &TextureTable::default())
            .unwrap();
        let cleared: Vec<_> = api
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::Clear { target, color } => Some((*target, *color)),
                _ => None,
            })
            .collect();
        let [t0, t1] = output.scratch();
        assert_eq!(
            cleared,
            vec![(output.buffers()[1], [0.0; 4]), (t0, [0.0; 4]), (t1, [0.0; 4])]
        );
    }

    #[test]
    fn frame_uniforms_precede_program_uniforms() {
        let (mut api, compiler, mut output) = setup();
        let chain = Chain::start("osc", vec![ArgValue::Sequence(Sequence::of(&[1.0, 2.0]))]);
        output.render(&mut api, &compiler, &[Pass::draw(chain)]).unwrap();
        let draws = tick(&mut api, &mut output);
        let names: Vec<_> = draws[0].uniforms.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["time", "resolution", "prevBuffer", "projection", "view", "frequency0"]
        );
        assert_eq!(draws[0].uniform("frequency0"), Some(&UniformValue::Float(1.0)));
    }

    #[test]
    fn self_reference_samples_previous_frame() {
        let (mut api, compiler, mut output) = setup();
        let chain = Chain::start("src", vec![ArgValue::output(0)]);
        output.render(&mut api, &compiler, &[Pass::draw(chain)]).unwrap();
        let draws = tick(&mut api, &mut output);
        let [a, b] = output.buffers();
        assert_eq!(draws[0].target, b);
        assert_eq!(draws[0].uniform("tex0"), Some(&UniformValue::Texture(Some(TextureId::Target(a)))));
    }

    struct Fixed(TextureId);

    impl TextureSource for Fixed {
        fn current_texture(&self) -> Option<TextureId> {
            Some(self.0)
        }
    }

    #[test]
    fn texture_aliasing_the_target_is_redirected() {
        let (mut api, compiler, mut output) = setup();
        let [a, b] = output.buffers();
        let aliased = TextureRef::External(Rc::new(Fixed(TextureId::Target(b))));
        let chain = Chain::start("src", vec![aliased.into()]);
        output.render(&mut api, &compiler, &[Pass::draw(chain)]).unwrap();
        let draws = tick(&mut api, &mut output);
        assert_eq!(draws[0].target, b);
        assert_eq!(draws[0].uniform("tex0"), Some(&UniformValue::Texture(Some(TextureId::Target(a)))));
    }

    #[test]
    fn explicit_framebuffer_does_not_flip() {
        let (mut api, compiler, mut output) = setup();
        let [t0, _] = output.scratch();
        let pass = DrawPass::new(Chain::start("osc", vec![])).framebuffer(t0);
        output.render(&mut api, &compiler, &[pass.into()]).unwrap();
        let draws = tick(&mut api, &mut output);
        assert_eq!(draws[0].target, t0);
        assert_eq!(output.ping_pong().current(), 0);
    }

    #[test]
    fn draw_state_reaches_the_backend() {
        let (mut api, compiler, mut output) = setup();
        let pass = DrawPass::new(Chain::start("osc", vec![]))
            .primitive(Topology::Points, ItemCount::Pair([3, 2]))
            .blend(BlendMode::Add)
            .viewport(ViewportSpec {
                x: 0.0,
                y: 0.0,
                w: 0.5,
                h: 1.0,
            });
        output.render(&mut api, &compiler, &[pass.into()]).unwrap();
        let draws = tick(&mut api, &mut output);
        assert_eq!(draws[0].topology, Topology::Points);
        assert_eq!(draws[0].count, 6);
        assert_eq!(draws[0].positions, 12);
        assert_eq!(draws[0].blend, BlendMode::Add.state());
        assert_eq!(draws[0].viewport.map(|v| (v.width, v.height)), Some((4, 4)));
    }

    #[test]
    fn identical_passes_share_a_program() {
        let (mut api, compiler, mut output) = setup();
        output.render(&mut api, &compiler, &[osc(), osc()]).unwrap();
        output.render(&mut api, &compiler, &[osc()]).unwrap();
        let created = api
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::CreateProgram { .. }))
            .count();
        assert_eq!(created, 1);
    }

    #[test]
    fn failed_render_keeps_previous_passes() {
        let (mut api, compiler, mut output) = setup();
        output.render(&mut api, &compiler, &[osc()]).unwrap();
        let err = output
            .render(&mut api, &compiler, &[Pass::draw(Chain::start("nope", vec![]))])
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownPrimitive(name) if name == "nope"));
        assert_eq!(output.pass_count(), 1);
    }

    #[test]
    fn resize_keeps_programs_and_returns_to_compiled() {
        let (mut api, compiler, mut output) = setup();
        output.render(&mut api, &compiler, &[osc()]).unwrap();
        tick(&mut api, &mut output);
        output.resize(&mut api, 32, 16).unwrap();
        assert_eq!(output.state(), OutputState::Compiled);
        assert_eq!(output.size(), (32, 16));
        assert_eq!(api.target_size(output.buffers()[0]), Some((32, 16)));
        assert_eq!(output.pass_count(), 1);
        assert!(!api.commands().iter().any(|c| matches!(c, Command::CreateProgram { .. })));
        assert_eq!(tick(&mut api, &mut output).len(), 1);
    }

    #[test]
    fn destroy_releases_targets() {
        let (mut api, _, output) = setup();
        output.destroy(&mut api);
        assert_eq!(api.live_targets(), 0);
    }
}
