//! Screen-space picking of bodies.
//!
//! A left click is turned into a camera ray through the pointer and tested against the bounding
//! sphere of every `PickTarget` mesh. The nearest hit is published as a `BodyPicked` message.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::bodies::{BodyId, BodyMesh, PickTarget};
use crate::core::orbit_camera::MainCamera;
use crate::ui::popup::{PopupCloseButton, PopupPanel};

/// A body was clicked.
#[derive(Message, Clone, Debug, PartialEq)]
pub struct BodyPicked(pub Hit);

#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    pub body: BodyId,
    pub entity: Entity,
    /// Ray parameter of the first intersection, in world units from the ray origin.
    pub distance: f32,
}

/// A pickable body as seen by the resolver.
#[derive(Clone, Debug)]
pub struct PickCandidate {
    pub body: BodyId,
    pub entity: Entity,
    pub center: Vec3,
    pub radius: f32,
}

/// Smallest non-negative ray parameter at which the ray meets the sphere.
pub fn intersect_sphere(ray: Ray3d, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(*ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let near = -b - root;
    let far = -b + root;
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        // Ray starts inside the sphere.
        Some(far)
    } else {
        None
    }
}

/// Nearest candidate hit by the ray, if any.
pub fn resolve(ray: Ray3d, candidates: &[PickCandidate]) -> Option<Hit> {
    candidates
        .iter()
        .filter_map(|candidate| {
            intersect_sphere(ray, candidate.center, candidate.radius).map(|distance| Hit {
                body: candidate.body.clone(),
                entity: candidate.entity,
                distance,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

pub fn resolve_click_picks(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    targets: Query<(Entity, &BodyMesh, &GlobalTransform), With<PickTarget>>,
    popup_ui: Query<&Interaction, Or<(With<PopupPanel>, With<PopupCloseButton>)>>,
    mut picked: MessageWriter<BodyPicked>,
) -> Result {
    if !buttons.just_pressed(MouseButton::Left) {
        return Ok(());
    }
    // Clicks on the popup belong to the popup.
    if popup_ui.iter().any(|interaction| *interaction != Interaction::None) {
        return Ok(());
    }

    let window = windows.single()?;
    let Some(cursor) = window.cursor_position() else {
        return Ok(());
    };
    let (camera, camera_transform) = cameras.single()?;
    let ray = camera.viewport_to_world(camera_transform, cursor)?;

    let candidates: Vec<PickCandidate> = targets
        .iter()
        .map(|(entity, mesh, transform)| PickCandidate {
            body: mesh.body.clone(),
            entity,
            center: transform.translation(),
            radius: mesh.radius * transform.scale().max_element(),
        })
        .collect();

    match resolve(ray, &candidates) {
        Some(hit) => {
            debug!(
                "Picked {} ({}) at distance {:.3}",
                hit.body, hit.entity, hit.distance
            );
            picked.write(BodyPicked(hit));
        }
        None => debug!("Click at {cursor} hit nothing"),
    }

    Ok(())
}
