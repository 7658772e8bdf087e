//! Decorative scene elements: the Moon's orbit ring, the inside-out star sphere and the starfield.
//! None of these are annotated or pickable.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::PrimitiveTopology;
use bevy::prelude::*;
use bevy::render::render_resource::Face;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::bodies::catalog::MOON_ORBIT_RADIUS;
use crate::core::config::ProfileFeatures;
use crate::visualization::animation::Spin;
use crate::visualization::materials::{PendingSurface, TextureSlot, TrackedTexture};

const RING_SEGMENTS: usize = 500;
const STAR_SPHERE_RADIUS: f32 = 30.0;
const STAR_SPHERE_SECTORS: u32 = 60;
const STAR_SPHERE_TEXTURE: &str = "textures/stars.jpg";
const STAR_COUNT: usize = 500;
const STARFIELD_SEED: u64 = 0x5eed_57a2;
const STARFIELD_SPIN: f32 = -0.0002;

#[derive(Component)]
pub struct OrbitRing;

#[derive(Component)]
pub struct StarSphere;

#[derive(Component)]
pub struct Starfield;

/// Closed circle in the XZ plane drawn as a line strip.
pub fn orbit_ring_mesh(radius: f32, segments: usize) -> Mesh {
    let segments = segments.max(3);
    let positions: Vec<Vec3> = (0..=segments)
        .map(|i| {
            let theta = i as f32 / segments as f32 * TAU;
            Vec3::new(radius * theta.cos(), 0.0, radius * theta.sin())
        })
        .collect();

    Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
}

/// Star positions on a spherical shell between radius 25 and 50, with a per-star brightness.
/// The same seed always yields the same field.
pub fn starfield_points(count: usize, seed: u64) -> Vec<(Vec3, f32)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let radius: f32 = rng.gen_range(25.0..50.0);
            let theta: f32 = rng.gen_range(0.0..TAU);
            let phi = rng.gen_range(-1.0_f32..=1.0).acos();
            let position = Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            );
            let brightness: f32 = rng.gen_range(0.4..=1.0);
            (position, brightness)
        })
        .collect()
}

pub fn starfield_mesh(stars: &[(Vec3, f32)]) -> Mesh {
    let positions: Vec<Vec3> = stars.iter().map(|(p, _)| *p).collect();
    let colors: Vec<[f32; 4]> = stars
        .iter()
        .map(|(_, b)| {
            // Slightly blue-white, like the rest of the scene's palette.
            let color = LinearRgba::from(Color::hsl(216.0, 0.2, *b));
            [color.red, color.green, color.blue, 1.0]
        })
        .collect();

    Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
}

/// Spawn the decorations a profile asks for under `root`.
pub fn spawn_decorations(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    asset_server: &AssetServer,
    features: ProfileFeatures,
    root: Entity,
) {
    if features.orbit_ring {
        commands.spawn((
            Mesh3d(meshes.add(orbit_ring_mesh(MOON_ORBIT_RADIUS, RING_SEGMENTS))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::WHITE,
                unlit: true,
                ..default()
            })),
            Transform::default(),
            OrbitRing,
            Name::new("Orbit Ring"),
            ChildOf(root),
        ));
    }

    if features.star_sphere {
        let sphere = Sphere::new(STAR_SPHERE_RADIUS)
            .mesh()
            .uv(STAR_SPHERE_SECTORS, STAR_SPHERE_SECTORS);
        let texture = TrackedTexture::load(TextureSlot::Backdrop, STAR_SPHERE_TEXTURE, asset_server);
        let material = materials.add(StandardMaterial {
            base_color_texture: Some(texture.handle.clone()),
            unlit: true,
            // Seen from inside.
            cull_mode: Some(Face::Front),
            ..default()
        });
        commands.spawn((
            Mesh3d(meshes.add(sphere)),
            MeshMaterial3d(material.clone()),
            Transform::default(),
            StarSphere,
            PendingSurface {
                owner: "star sphere".to_string(),
                material,
                textures: vec![texture],
            },
            Name::new("Star Sphere"),
            ChildOf(root),
        ));
    }

    if features.starfield {
        let stars = starfield_points(STAR_COUNT, STARFIELD_SEED);
        commands.spawn((
            Mesh3d(meshes.add(starfield_mesh(&stars))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::WHITE,
                unlit: true,
                ..default()
            })),
            Transform::default(),
            Spin::new(STARFIELD_SPIN),
            Starfield,
            Name::new("Starfield"),
            ChildOf(root),
        ));
    }

    debug!(
        "Decorations: ring={} star_sphere={} starfield={}",
        features.orbit_ring, features.star_sphere, features.starfield
    );
}
