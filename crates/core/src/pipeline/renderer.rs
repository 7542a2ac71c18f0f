//! The renderer owns the clock, the frame properties and every output,
//! and ticks the outputs in index order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compiler::{Compiler, Precision};
use crate::error::GraphError;
use crate::value::{FrameProps, TextureTable};

use super::api::GraphicsApi;
use super::camera::Camera;
use super::output::Output;
use super::pass::Pass;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub width: u32,
    pub height: u32,
    pub outputs: usize,
    pub bpm: f64,
    pub precision: Precision,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            outputs: 4,
            bpm: 30.0,
            precision: Precision::default(),
        }
    }
}

pub struct Renderer<A: GraphicsApi> {
    api: A,
    compiler: Compiler,
    outputs: Vec<Output>,
    props: FrameProps,
    width: u32,
    height: u32,
}

impl<A: GraphicsApi> Renderer<A> {
    /// Allocates `config.outputs` outputs on `api`.
    pub fn new(mut api: A, compiler: Compiler, config: &RendererConfig) -> Result<Self, GraphError> {
        if config.width == 0 || config.height == 0 {
            return Err(GraphError::InvalidDimensions);
        }
        let mut outputs = Vec::with_capacity(config.outputs);
        for index in 0..config.outputs {
            outputs.push(Output::new(&mut api, index, config.width, config.height)?);
        }
        let props = FrameProps {
            bpm: config.bpm,
            resolution: [f64::from(config.width), f64::from(config.height)],
            ..FrameProps::default()
        };
        tracing::info!(
            outputs = config.outputs,
            width = config.width,
            height = config.height,
            "renderer ready"
        );
        Ok(Self {
            api,
            compiler: compiler.with_precision(config.precision),
            outputs,
            props,
            width: config.width,
            height: config.height,
        })
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn output(&self, index: usize) -> Result<&Output, GraphError> {
        self.outputs.get(index).ok_or(GraphError::UnknownOutput {
            index,
            count: self.outputs.len(),
        })
    }

    fn output_mut(&mut self, index: usize) -> Result<&mut Output, GraphError> {
        let count = self.outputs.len();
        self.outputs
            .get_mut(index)
            .ok_or(GraphError::UnknownOutput { index, count })
    }

    pub fn props(&self) -> &FrameProps {
        &self.props
    }

    pub fn time(&self) -> f64 {
        self.props.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.props.time = time;
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.props.bpm = bpm;
    }

    /// Sets an external property visible to property providers.
    pub fn set_property(&mut self, name: &str, value: Value) {
        if !self.props.properties.is_object() {
            self.props.properties = Value::Object(Default::default());
        }
        if let Value::Object(map) = &mut self.props.properties {
            map.insert(name.to_string(), value);
        }
    }

    pub fn set_eye(&mut self, eye: Option<[f32; 3]>, target: Option<[f32; 3]>) {
        self.props.eye = eye;
        self.props.target = target;
    }

    /// Compiles `passes` into output `index`.
    pub fn render(&mut self, index: usize, passes: &[Pass]) -> Result<(), GraphError> {
        let count = self.outputs.len();
        let output = self
            .outputs
            .get_mut(index)
            .ok_or(GraphError::UnknownOutput { index, count })?;
        output.render(&mut self.api, &self.compiler, passes)
    }

    pub fn set_camera(&mut self, index: usize, camera: Camera) -> Result<(), GraphError> {
        self.output_mut(index)?.set_camera(camera);
        Ok(())
    }

    /// Feedback texture of every output, as other outputs would sample it now.
    pub fn texture_table(&self) -> TextureTable {
        TextureTable::new(self.outputs.iter().map(|o| Some(o.texture())).collect())
    }

    /// Advances the clock by `dt` seconds and ticks every output.
    pub fn tick(&mut self, dt: f64) -> Result<(), GraphError> {
        self.props.time += dt;
        self.props.resolution = [f64::from(self.width), f64::from(self.height)];
        for i in 0..self.outputs.len() {
            let textures = self.texture_table();
            self.outputs[i].tick(&mut self.api, &self.props, &textures)?;
        }
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), GraphError> {
        if width == 0 || height == 0 {
            return Err(GraphError::InvalidDimensions);
        }
        for output in &mut self.outputs {
            output.resize(&mut self.api, width, height)?;
        }
        self.width = width;
        self.height = height;
        self.props.resolution = [f64::from(width), f64::from(height)];
        tracing::debug!(width, height, "resized outputs");
        Ok(())
    }

    /// Releases every output and hands the backend back.
    pub fn into_api(mut self) -> A {
        for output in self.outputs.drain(..) {
            output.destroy(&mut self.api);
        }
        self.api
    }
}
