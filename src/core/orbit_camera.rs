//! Orbit camera setup and distance bounds on top of `bevy_panorbit_camera`.
//!
//! PanOrbit already honours its zoom limits for user input. The clamp system below runs right
//! after the PanOrbit update so that radius values written by anything else (config reloads,
//! forced updates) are also kept inside `CameraBounds`.

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;

use crate::core::config::CameraBounds;

/// Marker for the camera that renders the scene and drives picking and labels.
#[derive(Component)]
pub struct MainCamera;

const INITIAL_DISTANCE: f32 = 3.0;
const FOV_DEG: f32 = 75.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

pub fn spawn_main_camera(mut commands: Commands, bounds: Res<CameraBounds>) {
    let mut pan_orbit = PanOrbitCamera {
        focus: Vec3::ZERO,
        radius: Some(INITIAL_DISTANCE),
        yaw: Some(0.0),
        pitch: Some(0.0),
        force_update: true,
        ..default()
    };
    apply_bounds(&bounds, &mut pan_orbit);

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: FOV_DEG.to_radians(),
            near: NEAR,
            far: FAR,
            ..default()
        }),
        Camera {
            order: 0,
            clear_color: ClearColorConfig::Custom(Color::BLACK),
            ..default()
        },
        pan_orbit,
        MainCamera,
        Tonemapping::AcesFitted,
        Transform::from_xyz(0.0, 0.0, INITIAL_DISTANCE).looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("Main Camera"),
    ));
}

/// Main camera with its projection and target size filled in the way `camera_system` leaves
/// them, for tests that run without a window or renderer.
#[cfg(test)]
pub fn headless_camera(size: UVec2) -> Camera {
    let mut camera = Camera::default();
    camera.computed.clip_from_view = Mat4::perspective_infinite_reverse_rh(
        FOV_DEG.to_radians(),
        size.x as f32 / size.y as f32,
        NEAR,
    );
    camera.computed.target_info = Some(bevy::camera::RenderTargetInfo {
        physical_size: size,
        scale_factor: 1.0,
    });
    camera
}

/// Copy the bounds into PanOrbit's limits and pull both radii inside them.
/// Returns true when anything changed.
pub fn apply_bounds(bounds: &CameraBounds, pan_orbit: &mut PanOrbitCamera) -> bool {
    let mut changed = false;

    if pan_orbit.zoom_lower_limit != bounds.min_distance {
        pan_orbit.zoom_lower_limit = bounds.min_distance;
        changed = true;
    }
    if pan_orbit.zoom_upper_limit != Some(bounds.max_distance) {
        pan_orbit.zoom_upper_limit = Some(bounds.max_distance);
        changed = true;
    }

    let target = bounds.clamp(pan_orbit.target_radius);
    if target != pan_orbit.target_radius {
        pan_orbit.target_radius = target;
        changed = true;
    }
    if let Some(radius) = pan_orbit.radius {
        let clamped = bounds.clamp(radius);
        if clamped != radius {
            pan_orbit.radius = Some(clamped);
            changed = true;
        }
    }

    changed
}

/// Eye position moved along its focus ray so its distance lies within the bounds.
pub fn clamp_eye(bounds: &CameraBounds, focus: Vec3, eye: Vec3) -> Vec3 {
    let offset = eye - focus;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return focus + Vec3::Z * bounds.min_distance;
    }
    let clamped = bounds.clamp(distance);
    if clamped == distance {
        eye
    } else {
        focus + offset * (clamped / distance)
    }
}

pub fn clamp_camera_distance(
    bounds: Res<CameraBounds>,
    mut cameras: Query<(&mut PanOrbitCamera, &mut Transform), With<MainCamera>>,
) {
    for (mut pan_orbit, mut transform) in cameras.iter_mut() {
        // Only touch the component when needed so change detection stays quiet.
        if apply_bounds(&bounds, pan_orbit.bypass_change_detection()) {
            pan_orbit.set_changed();
            debug!("Camera radius clamped to {:?}", pan_orbit.radius);
        }

        let eye = clamp_eye(&bounds, pan_orbit.focus, transform.translation);
        if eye != transform.translation {
            transform.translation = eye;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radii_are_pulled_into_bounds() {
        let bounds = CameraBounds::default();
        let mut pan_orbit = PanOrbitCamera {
            radius: Some(500.0),
            target_radius: 0.5,
            ..default()
        };

        assert!(apply_bounds(&bounds, &mut pan_orbit));
        assert_eq!(pan_orbit.radius, Some(100.0));
        assert_eq!(pan_orbit.target_radius, 1.2);
        assert_eq!(pan_orbit.zoom_lower_limit, 1.2);
        assert_eq!(pan_orbit.zoom_upper_limit, Some(100.0));

        // Second pass is a no-op.
        assert!(!apply_bounds(&bounds, &mut pan_orbit));
    }

    #[test]
    fn eye_distance_is_clamped_along_its_ray() {
        let bounds = CameraBounds::default();
        let focus = Vec3::new(1.0, 0.0, 0.0);

        let far = clamp_eye(&bounds, focus, Vec3::new(1.0, 0.0, 250.0));
        assert!((far - Vec3::new(1.0, 0.0, 100.0)).length() < 1e-4);

        let near = clamp_eye(&bounds, focus, Vec3::new(1.5, 0.0, 0.0));
        assert!(((near - focus).length() - 1.2).abs() < 1e-5);
        assert!(near.x > focus.x);

        let inside = Vec3::new(1.0, 3.0, 0.0);
        assert_eq!(clamp_eye(&bounds, focus, inside), inside);
    }

    #[test]
    fn clamp_system_respects_custom_bounds() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(CameraBounds {
                min_distance: 2.0,
                max_distance: 10.0,
            })
            .add_systems(Update, clamp_camera_distance);

        let camera = app
            .world_mut()
            .spawn((
                PanOrbitCamera {
                    radius: Some(40.0),
                    target_radius: 40.0,
                    ..default()
                },
                Transform::from_xyz(0.0, 0.0, 40.0),
                MainCamera,
            ))
            .id();

        app.update();

        let pan_orbit = app.world().get::<PanOrbitCamera>(camera).unwrap();
        assert_eq!(pan_orbit.radius, Some(10.0));
        assert_eq!(pan_orbit.target_radius, 10.0);
        let transform = app.world().get::<Transform>(camera).unwrap();
        assert!((transform.translation.length() - 10.0).abs() < 1e-4);
    }
}
