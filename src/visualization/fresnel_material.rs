use bevy::mesh::MeshVertexBufferLayoutRef;
use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::prelude::*;
use bevy::render::render_resource::{
    AsBindGroup, RenderPipelineDescriptor, ShaderType, SpecializedMeshPipelineError,
};
use bevy::shader::ShaderRef;

/// Rim-light parameters: `bias + scale * (1 + dot(I, N))^power` blends facing into rim color.
#[derive(ShaderType, Clone, Copy, Debug)]
#[repr(C)]
pub struct FresnelParams {
    pub rim_color: Vec4,
    pub facing_color: Vec4,
    pub bias: f32,
    pub scale: f32,
    pub power: f32,
    pub _padding: f32,
}

impl Default for FresnelParams {
    fn default() -> Self {
        Self {
            rim_color: Vec4::new(0.0, 0.53, 1.0, 1.0),
            facing_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            bias: 0.1,
            scale: 1.0,
            power: 4.0,
            _padding: 0.0,
        }
    }
}

/// Additive atmospheric glow drawn on a slightly enlarged shell.
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone, Default)]
pub struct FresnelMaterial {
    #[uniform(0)]
    pub params: FresnelParams,
}

impl Material for FresnelMaterial {
    fn fragment_shader() -> ShaderRef {
        "shaders/fresnel.wgsl".into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }

    fn specialize(
        _pipeline: &MaterialPipeline,
        descriptor: &mut RenderPipelineDescriptor,
        _layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        if let Some(depth_stencil) = descriptor.depth_stencil.as_mut() {
            depth_stencil.depth_write_enabled = false;
        }
        Ok(())
    }
}

pub struct FresnelMaterialPlugin;

impl Plugin for FresnelMaterialPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<FresnelMaterial>::default());
    }
}
