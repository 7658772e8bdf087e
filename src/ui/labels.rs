//! Screen-space labels that follow their 3D anchors.

use bevy::prelude::*;

use crate::bodies::LabelAnchor;
use crate::core::config::SceneConfig;
use crate::core::orbit_camera::MainCamera;
use crate::core::viewport::{OverlayRoot, Viewport};
use crate::visualization::composer::SceneGraph;

const LABEL_FONT_SIZE: f32 = 10.0;

/// UI text bound to a [`LabelAnchor`] entity.
#[derive(Component)]
pub struct OverlayLabel {
    pub anchor: Entity,
}

pub fn spawn_overlay_root(mut commands: Commands) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        OverlayRoot,
        Name::new("Overlay Root"),
    ));
}

/// One label per anchor, in registry order, when the profile shows labels.
pub fn spawn_overlay_labels(
    mut commands: Commands,
    config: Res<SceneConfig>,
    graph: Res<SceneGraph>,
    roots: Query<Entity, With<OverlayRoot>>,
    anchors: Query<&LabelAnchor>,
) -> Result {
    if !config.features().labels {
        debug!("Labels disabled for the {:?} profile", config.profile);
        return Ok(());
    }
    let root = roots.single()?;

    let mut count = 0;
    for entity in graph.label_anchors() {
        let anchor = anchors.get(entity)?;
        commands.spawn((
            Node {
                position_type: PositionType::Absolute,
                ..default()
            },
            Text::new(anchor.text.clone()),
            TextFont::from_font_size(LABEL_FONT_SIZE),
            TextColor(Color::WHITE),
            Visibility::Hidden,
            OverlayLabel { anchor: entity },
            Name::new(format!("{} overlay label", anchor.body)),
            ChildOf(root),
        ));
        count += 1;
    }
    info!("Spawned {} overlay labels", count);
    Ok(())
}

/// Overlay position (logical px, origin top-left) of a world point, or `None` when the point is
/// behind the camera or outside the overlay.
pub fn project_to_overlay(
    camera: &Camera,
    camera_transform: &GlobalTransform,
    world: Vec3,
    overlay: Vec2,
) -> Option<Vec2> {
    let point = camera.world_to_viewport(camera_transform, world).ok()?;
    Rect::from_corners(Vec2::ZERO, overlay)
        .contains(point)
        .then_some(point)
}

/// Top-left corner that centers a label of `size` on `point`.
pub fn centered_origin(point: Vec2, size: Vec2) -> Vec2 {
    point - size / 2.0
}

pub fn sync_overlay_labels(
    viewport: Res<Viewport>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    anchors: Query<&GlobalTransform, With<LabelAnchor>>,
    mut labels: Query<(&OverlayLabel, &mut Node, &mut Visibility, &ComputedNode)>,
) -> Result {
    if labels.is_empty() || viewport.is_empty() {
        return Ok(());
    }
    let (camera, camera_transform) = cameras.single()?;

    for (label, mut node, mut visibility, computed) in labels.iter_mut() {
        let projected = anchors
            .get(label.anchor)
            .ok()
            .and_then(|anchor| {
                project_to_overlay(
                    camera,
                    camera_transform,
                    anchor.translation(),
                    viewport.size(),
                )
            });

        let Some(point) = projected else {
            visibility.set_if_neq(Visibility::Hidden);
            continue;
        };

        let size = computed.size() * computed.inverse_scale_factor();
        let origin = centered_origin(point, size);
        if node.left != Val::Px(origin.x) || node.top != Val::Px(origin.y) {
            node.left = Val::Px(origin.x);
            node.top = Val::Px(origin.y);
        }
        visibility.set_if_neq(Visibility::Inherited);
    }

    Ok(())
}
