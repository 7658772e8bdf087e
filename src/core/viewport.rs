//! Keeps the 3D render surface and the 2D label overlay sized to the window.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::core::orbit_camera::MainCamera;

/// Full-window UI node that hosts overlay labels and popups.
#[derive(Component)]
pub struct OverlayRoot;

/// Current size of the primary viewport in logical pixels.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub aspect: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            aspect: 1280.0 / 720.0,
        }
    }
}

impl Viewport {
    /// New size; a degenerate height keeps the previous aspect ratio.
    pub fn resized(self, width: f32, height: f32) -> Self {
        let aspect = if height > 0.0 && width > 0.0 {
            width / height
        } else {
            self.aspect
        };
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            aspect,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Seed the viewport from the primary window before the first resize arrives.
pub fn init_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<Viewport>,
) {
    if let Ok(window) = windows.single() {
        *viewport = viewport.resized(window.width(), window.height());
        debug!("Viewport initialised at {}x{}", viewport.width, viewport.height);
    }
}

/// Apply the latest window size to the viewport, camera aspect and overlay root.
pub fn handle_viewport_resize(
    mut resized: MessageReader<WindowResized>,
    mut viewport: ResMut<Viewport>,
    mut projections: Query<&mut Projection, With<MainCamera>>,
    mut overlays: Query<&mut Node, With<OverlayRoot>>,
) {
    let Some(latest) = resized.read().last() else {
        return;
    };

    *viewport = viewport.resized(latest.width, latest.height);

    for mut projection in projections.iter_mut() {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = viewport.aspect;
        }
    }

    for mut node in overlays.iter_mut() {
        node.width = Val::Px(viewport.width);
        node.height = Val::Px(viewport.height);
    }

    debug!(
        "Viewport resized to {}x{} (aspect {:.3})",
        viewport.width, viewport.height, viewport.aspect
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resize_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_message::<WindowResized>()
            .init_resource::<Viewport>()
            .add_systems(Update, handle_viewport_resize);
        app
    }

    fn resize(app: &mut App, width: f32, height: f32) {
        app.world_mut().write_message(WindowResized {
            window: Entity::PLACEHOLDER,
            width,
            height,
        });
        app.update();
    }

    #[test]
    fn zero_height_keeps_previous_aspect() {
        let viewport = Viewport::default().resized(800.0, 400.0);
        assert_eq!(viewport.aspect, 2.0);

        let minimised = viewport.resized(800.0, 0.0);
        assert_eq!(minimised.aspect, 2.0);
        assert!(minimised.is_empty());
    }

    #[test]
    fn resize_updates_camera_and_overlay() {
        let mut app = resize_app();
        let camera = app
            .world_mut()
            .spawn((Projection::Perspective(PerspectiveProjection::default()), MainCamera))
            .id();
        let overlay = app.world_mut().spawn((Node::default(), OverlayRoot)).id();

        resize(&mut app, 1000.0, 500.0);

        let viewport = *app.world().resource::<Viewport>();
        assert_eq!(viewport.size(), Vec2::new(1000.0, 500.0));

        let Projection::Perspective(perspective) = app.world().get::<Projection>(camera).unwrap()
        else {
            panic!("expected a perspective projection");
        };
        assert_eq!(perspective.aspect_ratio, 2.0);

        let node = app.world().get::<Node>(overlay).unwrap();
        assert_eq!(node.width, Val::Px(1000.0));
        assert_eq!(node.height, Val::Px(500.0));
    }

    #[test]
    fn latest_resize_wins() {
        let mut app = resize_app();
        app.world_mut().write_message(WindowResized {
            window: Entity::PLACEHOLDER,
            width: 300.0,
            height: 300.0,
        });
        resize(&mut app, 640.0, 480.0);

        let viewport = *app.world().resource::<Viewport>();
        assert_eq!(viewport.size(), Vec2::new(640.0, 480.0));
        assert!((viewport.aspect - 640.0 / 480.0).abs() < 1e-6);
    }
}
