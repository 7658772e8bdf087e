//! Visualization module
//!
//! This module turns the body registry into meshes, materials and pivots,
//! drives their per-frame spin, and adds the lighting and decorations.

use bevy::prelude::*;

pub mod animation;
pub mod composer;
pub mod decorations;
pub mod fresnel_material;
pub mod lighting;
pub mod materials;
pub mod shapes;

pub use animation::{AnimationConfig, Spin, advance_spins};
pub use composer::{SceneGraph, compose_scene};
pub use fresnel_material::FresnelMaterialPlugin;
pub use lighting::spawn_sun_light;
pub use materials::degrade_missing_textures;

use crate::core::config::SceneConfig;

/// Plugin for scene composition and animation
pub struct VisualizationPlugin;

impl Plugin for VisualizationPlugin {
    fn build(&self, app: &mut App) {
        let timing = app
            .world()
            .get_resource::<SceneConfig>()
            .map(|config| config.animation)
            .unwrap_or_default();

        app.add_plugins(FresnelMaterialPlugin)
            .insert_resource(AnimationConfig { timing })
            .add_systems(Startup, (spawn_sun_light, compose_scene))
            .add_systems(Update, (advance_spins, degrade_missing_textures));
    }
}
