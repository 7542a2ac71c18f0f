//! Per-output camera producing the `projection` and `view` uniforms.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::value::{FrameProps, UniformValue};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    #[default]
    Ortho,
    Perspective,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOptions {
    pub projection: Projection,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            projection: Projection::Ortho,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Identity by default, or a look-at camera with an orthographic or
/// perspective lens.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Camera {
    #[default]
    Identity,
    LookAt {
        eye: Vec3,
        target: Vec3,
        options: CameraOptions,
    },
}

/// Matrices uploaded with every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    pub projection: Mat4,
    pub view: Mat4,
}

impl CameraMatrices {
    pub const IDENTITY: Self = Self {
        projection: Mat4::IDENTITY,
        view: Mat4::IDENTITY,
    };

    pub fn uniforms(&self) -> [(String, UniformValue); 2] {
        [
            ("projection".to_string(), UniformValue::Mat4(self.projection.to_cols_array())),
            ("view".to_string(), UniformValue::Mat4(self.view.to_cols_array())),
        ]
    }
}

impl Camera {
    pub fn perspective(eye: [f32; 3], target: [f32; 3]) -> Self {
        Self::look_at(eye, target, Projection::Perspective)
    }

    pub fn ortho(eye: [f32; 3], target: [f32; 3]) -> Self {
        Self::look_at(eye, target, Projection::Ortho)
    }

    fn look_at(eye: [f32; 3], target: [f32; 3], projection: Projection) -> Self {
        Camera::LookAt {
            eye: Vec3::from(eye),
            target: Vec3::from(target),
            options: CameraOptions {
                projection,
                ..CameraOptions::default()
            },
        }
    }

    /// Overrides the clip range of a look-at camera.
    pub fn with_range(self, near: f32, far: f32) -> Self {
        match self {
            Camera::LookAt {
                eye,
                target,
                options,
            } => Camera::LookAt {
                eye,
                target,
                options: CameraOptions {
                    near,
                    far,
                    ..options
                },
            },
            Camera::Identity => Camera::Identity,
        }
    }

    /// Builds this frame's matrices. A frame's `eye`/`target` override the
    /// configured ones.
    pub fn matrices(&self, props: &FrameProps, aspect: f32) -> CameraMatrices {
        match self {
            Camera::Identity => CameraMatrices::IDENTITY,
            Camera::LookAt {
                eye,
                target,
                options,
            } => {
                let eye = props.eye.map(Vec3::from).unwrap_or(*eye);
                let target = props.target.map(Vec3::from).unwrap_or(*target);
                let projection = match options.projection {
                    Projection::Perspective => Mat4::perspective_rh_gl(
                        std::f32::consts::FRAC_PI_4,
                        aspect,
                        options.near,
                        options.far,
                    ),
                    Projection::Ortho => {
                        Mat4::orthographic_rh_gl(-1.0, 1.0, -1.0, 1.0, options.near, options.far)
                    }
                };
                CameraMatrices {
                    projection,
                    view: Mat4::look_at_rh(eye, target, Vec3::Y),
                }
            }
        }
    }
}
