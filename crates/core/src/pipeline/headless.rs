//! A graphics backend that records calls instead of issuing them.
//!
//! Used by tests and by the CLI `plan` command to show what a scene would
//! draw, frame by frame.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::GraphError;
use crate::value::{ProgramId, TargetId, UniformValue};

use super::api::{DrawCall, GraphicsApi, Viewport};
use super::blend::BlendState;
use super::topology::Topology;

/// A draw as seen by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedDraw {
    pub program: ProgramId,
    pub target: TargetId,
    pub topology: Topology,
    pub count: usize,
    pub positions: usize,
    pub uniforms: Vec<(String, UniformValue)>,
    pub blend: Option<BlendState>,
    pub viewport: Option<Viewport>,
    pub line_width: Option<f32>,
}

impl RecordedDraw {
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    CreateTarget { target: TargetId, width: u32, height: u32 },
    ResizeTarget { target: TargetId, width: u32, height: u32 },
    DestroyTarget { target: TargetId },
    CreateProgram { program: ProgramId },
    Draw(RecordedDraw),
    Clear { target: TargetId, color: [f32; 4] },
}

#[derive(Debug, Default)]
pub struct HeadlessApi {
    commands: Vec<Command>,
    targets: BTreeMap<TargetId, (u32, u32)>,
    programs: Vec<(String, String)>,
    next_target: u32,
}

impl HeadlessApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns and forgets the calls recorded so far.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn draws(&self) -> impl Iterator<Item = &RecordedDraw> {
        self.commands.iter().filter_map(|c| match c {
            Command::Draw(d) => Some(d),
            _ => None,
        })
    }

    /// Size of a live target.
    pub fn target_size(&self, target: TargetId) -> Option<(u32, u32)> {
        self.targets.get(&target).copied()
    }

    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    /// Vertex and fragment source of a program.
    pub fn program_source(&self, program: ProgramId) -> Option<(&str, &str)> {
        self.programs
            .get(program.0 as usize)
            .map(|(v, f)| (v.as_str(), f.as_str()))
    }

    fn check_target(&self, target: TargetId) -> Result<(), GraphError> {
        if self.targets.contains_key(&target) {
            Ok(())
        } else {
            Err(GraphError::UnknownTarget(target.0))
        }
    }
}

impl GraphicsApi for HeadlessApi {
    fn create_target(&mut self, width: u32, height: u32) -> Result<TargetId, GraphError> {
        if width == 0 || height == 0 {
            return Err(GraphError::InvalidDimensions);
        }
        let target = TargetId(self.next_target);
        self.next_target += 1;
        self.targets.insert(target, (width, height));
        self.commands.push(Command::CreateTarget {
            target,
            width,
            height,
        });
        Ok(target)
    }

    fn resize_target(&mut self, target: TargetId, width: u32, height: u32) -> Result<(), GraphError> {
        if width == 0 || height == 0 {
            return Err(GraphError::InvalidDimensions);
        }
        match self.targets.get_mut(&target) {
            Some(size) => *size = (width, height),
            None => return Err(GraphError::UnknownTarget(target.0)),
        }
        self.commands.push(Command::ResizeTarget {
            target,
            width,
            height,
        });
        Ok(())
    }

    fn destroy_target(&mut self, target: TargetId) {
        if self.targets.remove(&target).is_some() {
            self.commands.push(Command::DestroyTarget { target });
        }
    }

    fn create_program(&mut self, vertex: &str, fragment: &str) -> Result<ProgramId, GraphError> {
        let program = ProgramId(self.programs.len() as u32);
        self.programs.push((vertex.to_string(), fragment.to_string()));
        self.commands.push(Command::CreateProgram { program });
        Ok(program)
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), GraphError> {
        self.check_target(call.target)?;
        if call.program.0 as usize >= self.programs.len() {
            return Err(GraphError::UnknownProgram(call.program.0));
        }
        self.commands.push(Command::Draw(RecordedDraw {
            program: call.program,
            target: call.target,
            topology: call.topology,
            count: call.count,
            positions: call.positions.len(),
            uniforms: call.uniforms.to_vec(),
            blend: call.blend,
            viewport: call.viewport,
            line_width: call.line_width,
        }));
        Ok(())
    }

    fn clear(&mut self, target: TargetId, color: [f32; 4]) -> Result<(), GraphError> {
        self.check_target(target)?;
        self.commands.push(Command::Clear { target, color });
        Ok(())
    }
}
