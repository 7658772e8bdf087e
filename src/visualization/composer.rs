//! Builds the entity hierarchy for every registered body.
//!
//! ```text
//! SpaceRoot
//! └── OrbitPivot          at the parent's placement, revolves (orbit_rate)
//!     ├── BodyPivot       at the body's placement, tilted, spins (rotation_rate)
//!     │   ├── BodyMesh
//!     │   └── layers      lights / clouds / glow shells
//!     ├── LabelAnchor     follows the orbit but not the self-spin
//!     └── child OrbitPivots of satellites
//! ```

use bevy::prelude::*;

use crate::bodies::{
    BodyHandle, BodyMesh, BodyPivot, BodyRegistry, CelestialBody, LabelAnchor, LayerKind,
    OrbitPivot, PickTarget,
};
use crate::core::config::SceneConfig;
use crate::visualization::animation::Spin;
use crate::visualization::decorations::spawn_decorations;
use crate::visualization::fresnel_material::FresnelMaterial;
use crate::visualization::materials::{PendingSurface, body_material, layer_material};
use crate::visualization::shapes::polyhedron_mesh;

/// Root of everything the composer spawns.
#[derive(Component)]
pub struct SpaceRoot;

/// Entities other systems look up per body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyNodes {
    /// Satellites attach their own orbit pivots here.
    pub orbit_pivot: Entity,
    pub label_anchor: Option<Entity>,
}

/// Scene entities indexed by `BodyHandle`.
#[derive(Resource, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<BodyNodes>,
}

impl SceneGraph {
    /// Nodes must be pushed in registry order.
    pub fn push(&mut self, nodes: BodyNodes) {
        self.nodes.push(nodes);
    }

    pub fn nodes(&self, handle: BodyHandle) -> Option<&BodyNodes> {
        self.nodes.get(handle.index())
    }

    /// Label anchors in registry order.
    pub fn label_anchors(&self) -> impl Iterator<Item = Entity> + '_ {
        self.nodes.iter().filter_map(|nodes| nodes.label_anchor)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Local transforms of a body's orbit pivot and body pivot.
pub fn pivot_transforms(
    body: &CelestialBody,
    parent: Option<&CelestialBody>,
) -> (Transform, Transform) {
    let origin = parent.map(CelestialBody::placement).unwrap_or(Vec3::ZERO);
    let orbit = Spin::new(body.orbit_rate).starting_at(body.orbit_phase);
    let spin = Spin::new(body.rotation_rate).tilted(body.tilt());

    (
        Transform::from_translation(origin).with_rotation(orbit.rotation()),
        Transform::from_translation(body.placement()).with_rotation(spin.rotation()),
    )
}

pub fn compose_scene(
    mut commands: Commands,
    registry: Res<BodyRegistry>,
    config: Res<SceneConfig>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut glow_materials: ResMut<Assets<FresnelMaterial>>,
) {
    let root = commands
        .spawn((
            SpaceRoot,
            Transform::default(),
            Visibility::default(),
            Name::new("Space Root"),
        ))
        .id();

    if registry.is_empty() {
        warn!("No bodies registered; the scene holds decorations only");
    }

    let mut graph = SceneGraph {
        nodes: Vec::with_capacity(registry.len()),
    };
    let load = |path: &str| asset_server.load::<Image>(path.to_string());

    for (_, body) in registry.all() {
        let parent = body.parent.as_ref().and_then(|id| registry.body(id));
        // Parents register first, so their nodes already exist.
        let parent_entity = body
            .parent
            .as_ref()
            .and_then(|id| registry.find(id))
            .and_then(|handle| graph.nodes(handle))
            .map(|nodes| nodes.orbit_pivot)
            .unwrap_or(root);
        let (orbit_transform, body_transform) = pivot_transforms(body, parent);

        let orbit_pivot = commands
            .spawn((
                OrbitPivot,
                orbit_transform,
                Visibility::default(),
                Spin::new(body.orbit_rate).starting_at(body.orbit_phase),
                Name::new(format!("{} orbit", body.id)),
                ChildOf(parent_entity),
            ))
            .id();

        let body_pivot = commands
            .spawn((
                BodyPivot,
                body_transform,
                Visibility::default(),
                Spin::new(body.rotation_rate).tilted(body.tilt()),
                Name::new(format!("{} pivot", body.id)),
                ChildOf(orbit_pivot),
            ))
            .id();

        let mesh_handle = meshes.add(polyhedron_mesh(&body.shape));
        let (material, textures) = body_material(&body.surface, load);
        let material_handle = materials.add(material);

        let mut mesh_entity = commands.spawn((
            Mesh3d(mesh_handle.clone()),
            MeshMaterial3d(material_handle.clone()),
            Transform::default(),
            BodyMesh {
                body: body.id.clone(),
                radius: body.shape.radius,
            },
            Name::new(body.id.to_string()),
            ChildOf(body_pivot),
        ));
        if body.pickable {
            mesh_entity.insert(PickTarget);
        }
        if !textures.is_empty() {
            mesh_entity.insert(PendingSurface {
                owner: body.id.to_string(),
                material: material_handle,
                textures,
            });
        }

        for layer in &body.layers {
            let mut layer_entity = commands.spawn((
                Mesh3d(mesh_handle.clone()),
                Transform::from_scale(Vec3::splat(layer.scale)),
                Spin::new(layer.extra_spin),
                Name::new(format!("{} {:?}", body.id, layer.kind)),
                ChildOf(body_pivot),
            ));
            if layer.kind == LayerKind::Glow {
                layer_entity.insert(MeshMaterial3d(glow_materials.add(FresnelMaterial::default())));
            } else {
                let (material, textures) = layer_material(layer, load);
                let handle = materials.add(material);
                layer_entity.insert(MeshMaterial3d(handle.clone()));
                if !textures.is_empty() {
                    layer_entity.insert(PendingSurface {
                        owner: body.id.to_string(),
                        material: handle,
                        textures,
                    });
                }
            }
        }

        let label_anchor = body.label_position().map(|position| {
            commands
                .spawn((
                    LabelAnchor {
                        body: body.id.clone(),
                        text: body.label_text().unwrap_or_default().to_string(),
                    },
                    Transform::from_translation(position),
                    Name::new(format!("{} label", body.id)),
                    ChildOf(orbit_pivot),
                ))
                .id()
        });

        graph.push(BodyNodes {
            orbit_pivot,
            label_anchor,
        });
    }

    spawn_decorations(
        &mut commands,
        &mut meshes,
        &mut materials,
        &asset_server,
        config.features(),
        root,
    );

    info!(
        "Composed {} bodies for the {:?} profile",
        graph.len(),
        config.profile
    );
    commands.insert_resource(graph);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::registry::Annotation;
    use crate::bodies::{BodyId, ShapeKind, ShapeSpec, build_registry};
    use crate::core::config::SceneProfile;
    use crate::visualization::animation::{AnimationConfig, advance_spins};
    use bevy::transform::TransformPlugin;

    fn scene_app(registry: BodyRegistry, config: SceneConfig) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default(), TransformPlugin))
            .init_asset::<Image>()
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .init_asset::<FresnelMaterial>()
            .insert_resource(registry)
            .insert_resource(config)
            .init_resource::<AnimationConfig>()
            .add_systems(Startup, compose_scene)
            .add_systems(Update, advance_spins);
        app
    }

    fn mesh_of(app: &mut App, id: &str) -> Entity {
        let mut meshes = app.world_mut().query::<(Entity, &BodyMesh)>();
        meshes
            .iter(app.world())
            .find(|(_, mesh)| mesh.body.as_str() == id)
            .map(|(entity, _)| entity)
            .unwrap()
    }

    fn world_translation(app: &App, entity: Entity) -> Vec3 {
        app.world()
            .get::<GlobalTransform>(entity)
            .map(GlobalTransform::translation)
            .unwrap()
    }

    #[test]
    fn pivots_place_the_body_at_its_offset() {
        let earth = CelestialBody::new("earth", ShapeSpec::new(ShapeKind::Icosahedron, 1.0, 0))
            .at(2.0, 0.0, 0.0);
        let moon = CelestialBody::new("moon", ShapeSpec::new(ShapeKind::Icosahedron, 0.25, 0))
            .at(25.0, 0.0, 0.0)
            .phased(std::f32::consts::FRAC_PI_2)
            .around("earth");

        let (orbit, pivot) = pivot_transforms(&moon, Some(&earth));
        assert_eq!(orbit.translation, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(pivot.translation, Vec3::new(25.0, 0.0, 0.0));

        let world = orbit.transform_point(pivot.translation);
        assert!((world - Vec3::new(2.0, 0.0, -25.0)).length() < 1e-4);
    }

    #[test]
    fn every_body_gets_one_mesh() {
        let config = SceneConfig {
            profile: SceneProfile::Labeled,
            ..default()
        };
        let registry = build_registry(&config).unwrap();
        let count = registry.len();
        let mut app = scene_app(registry, config);
        app.update();

        let graph = app.world().resource::<SceneGraph>();
        assert_eq!(graph.len(), count);

        let mut meshes = app.world_mut().query::<&BodyMesh>();
        assert_eq!(meshes.iter(app.world()).count(), count);

        let mut pickable = app
            .world_mut()
            .query_filtered::<&BodyMesh, With<PickTarget>>();
        let ids: Vec<_> = pickable
            .iter(app.world())
            .map(|m| m.body.to_string())
            .collect();
        assert_eq!(ids, vec!["moon".to_string()]);
    }

    #[test]
    fn exact_label_anchor_tracks_the_mesh() {
        let earth = CelestialBody::new("earth", ShapeSpec::new(ShapeKind::Icosahedron, 1.0, 1))
            .tilted(-23.4)
            .spinning(0.002)
            .orbiting(0.01);
        let rock = CelestialBody::new("rock", ShapeSpec::new(ShapeKind::Dodecahedron, 0.05, 1))
            .at(3.0, 0.5, 0.0)
            .tilted(10.0)
            .spinning(0.3)
            .orbiting(0.05)
            .phased(1.2)
            .around("earth")
            .annotated(Annotation::label("rock"));
        let registry = BodyRegistry::from_bodies([earth, rock]).unwrap();
        let mut app = scene_app(registry, SceneConfig::default());

        for _ in 0..50 {
            app.update();
            let graph = app.world().resource::<SceneGraph>();
            let handle = app
                .world()
                .resource::<BodyRegistry>()
                .find(&BodyId::new("rock"))
                .unwrap();
            let anchor = graph.nodes(handle).unwrap().label_anchor.unwrap();
            let mesh = mesh_of(&mut app, "rock");
            let mesh = world_translation(&app, mesh);
            let label = world_translation(&app, anchor);
            assert!((mesh - label).length() < 1e-4, "mesh {mesh} label {label}");
        }
    }

    #[test]
    fn offset_anchor_keeps_its_offset() {
        let moon = CelestialBody::new("moon", ShapeSpec::new(ShapeKind::Icosahedron, 0.25, 0))
            .at(25.0, 0.0, 0.0)
            .orbiting(0.001)
            .annotated(Annotation::label("Moon").offset_by([1.0, 0.0, 0.0]));
        let registry = BodyRegistry::from_bodies([moon]).unwrap();
        let mut app = scene_app(registry, SceneConfig::default());
        app.update();

        let handle = app
            .world()
            .resource::<BodyRegistry>()
            .find(&BodyId::new("moon"))
            .unwrap();
        let nodes = app
            .world()
            .resource::<SceneGraph>()
            .nodes(handle)
            .copied()
            .unwrap();
        let mesh = mesh_of(&mut app, "moon");
        let mesh = world_translation(&app, mesh);
        let label = world_translation(&app, nodes.label_anchor.unwrap());
        assert!(((label - mesh).length() - 1.0).abs() < 1e-4);
    }
}
