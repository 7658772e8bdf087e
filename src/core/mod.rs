//! Core scene plumbing: configuration, the orbit camera and viewport sizing.

use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCameraSystemSet;

pub mod config;
pub mod orbit_camera;
pub mod viewport;

pub use config::{CameraBounds, SceneConfig};
pub use orbit_camera::MainCamera;
pub use viewport::{OverlayRoot, Viewport, handle_viewport_resize};

/// Camera, bounds and viewport management.
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        let bounds = app
            .world()
            .get_resource::<SceneConfig>()
            .map(|config| config.camera)
            .unwrap_or_default();

        app.insert_resource(bounds)
            .init_resource::<Viewport>()
            .add_systems(
                Startup,
                (orbit_camera::spawn_main_camera, viewport::init_viewport),
            )
            .add_systems(Update, handle_viewport_resize)
            .add_systems(
                PostUpdate,
                orbit_camera::clamp_camera_distance
                    .after(PanOrbitCameraSystemSet)
                    .before(bevy::transform::TransformSystems::Propagate),
            );
    }
}
