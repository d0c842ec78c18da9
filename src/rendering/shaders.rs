//! # Fog Shader
//!
//! Optional distance-fog material for the 3D scene. When it cannot be
//! compiled the scene is drawn with flat colors instead.

use crate::{UndercroftError, UndercroftResult};
use log::warn;
use macroquad::material::{load_material, Material, MaterialParams};
use macroquad::miniquad::{Comparison, PipelineParams, ShaderSource, UniformDesc, UniformType};
use macroquad::prelude::*;

const FOG_VERTEX: &str = r#"#version 100
attribute vec3 position;
attribute vec2 texcoord;
attribute vec4 color0;

varying lowp vec4 color;
varying highp float depth;

uniform mat4 Model;
uniform mat4 Projection;

void main() {
    vec4 clip = Projection * Model * vec4(position, 1.0);
    gl_Position = clip;
    depth = clip.w;
    color = color0 / 255.0;
}
"#;

const FOG_FRAGMENT: &str = r#"#version 100
precision mediump float;

varying lowp vec4 color;
varying highp float depth;

uniform vec4 fog_color;
uniform float fog_start;
uniform float fog_end;

void main() {
    float fog = clamp((depth - fog_start) / (fog_end - fog_start), 0.0, 1.0);
    gl_FragColor = vec4(mix(color.rgb, fog_color.rgb, fog), color.a);
}
"#;

/// Fog falloff, in world units from the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogParams {
    pub color: Color,
    pub start: f32,
    pub end: f32,
}

impl Default for FogParams {
    fn default() -> Self {
        Self {
            color: Color::new(0.02, 0.02, 0.04, 1.0),
            start: 4.0,
            end: 20.0,
        }
    }
}

/// Compiled fog material.
pub struct FogMaterial {
    material: Material,
    pub params: FogParams,
}

impl FogMaterial {
    /// Compiles the fog shader.
    pub fn load(params: FogParams) -> UndercroftResult<Self> {
        let material = load_material(
            ShaderSource::Glsl {
                vertex: FOG_VERTEX,
                fragment: FOG_FRAGMENT,
            },
            MaterialParams {
                pipeline_params: PipelineParams {
                    depth_test: Comparison::LessOrEqual,
                    depth_write: true,
                    ..Default::default()
                },
                uniforms: vec![
                    UniformDesc::new("fog_color", UniformType::Float4),
                    UniformDesc::new("fog_start", UniformType::Float1),
                    UniformDesc::new("fog_end", UniformType::Float1),
                ],
                ..Default::default()
            },
        )
        .map_err(|e| UndercroftError::EntityCreation(format!("fog shader: {:?}", e)))?;

        Ok(Self { material, params })
    }

    /// Compiles the fog shader, or logs why not and returns `None`.
    pub fn load_or_fallback(params: FogParams) -> Option<Self> {
        match Self::load(params) {
            Ok(material) => Some(material),
            Err(e) => {
                warn!("Falling back to flat shading: {}", e);
                None
            }
        }
    }

    /// Makes the material current for subsequent draw calls.
    pub fn apply(&self) {
        let c = self.params.color;
        self.material.set_uniform("fog_color", vec4(c.r, c.g, c.b, c.a));
        self.material.set_uniform("fog_start", self.params.start);
        self.material.set_uniform("fog_end", self.params.end);
        gl_use_material(&self.material);
    }

    /// Restores the default material.
    pub fn reset(&self) {
        gl_use_default_material();
    }
}
