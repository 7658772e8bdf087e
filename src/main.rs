// Earth, the Moon and a handful of near-Earth objects, with labels and click-to-inspect popups.

use anyhow::Context;
use bevy::ecs::error::warn;
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use bevy_panorbit_camera::PanOrbitCameraPlugin;

#[cfg(feature = "dev")]
use bevy::dev_tools::fps_overlay::FpsOverlayPlugin;

mod bodies;
mod core;
mod ui;
mod visualization;

use crate::core::{CorePlugin, SceneConfig};
use ui::UiPlugin;
use visualization::VisualizationPlugin;

/// Everything the viewer adds on top of Bevy's default plugins.
pub struct NeoViewerPlugin;

impl Plugin for NeoViewerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PanOrbitCameraPlugin)
            .add_plugins(CorePlugin)
            .add_plugins(VisualizationPlugin)
            .add_plugins(UiPlugin);
    }
}

fn main() -> anyhow::Result<()> {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Near-Earth Objects".to_string(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }));

    #[cfg(feature = "dev")]
    app.add_plugins(FpsOverlayPlugin::default());

    // A failing frame is logged and the next one runs as usual.
    app.set_error_handler(warn);

    // Loaded after the log plugin so config warnings are visible.
    let config = SceneConfig::load();
    let registry = bodies::build_registry(&config).context("invalid body catalog")?;
    info!(
        "Registered {} bodies for the {:?} profile",
        registry.len(),
        config.profile
    );

    app.insert_resource(config)
        .insert_resource(registry)
        .add_plugins(NeoViewerPlugin);

    app.run();
    Ok(())
}
