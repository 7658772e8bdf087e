use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

use crate::bodies::{ShapeKind, ShapeSpec};

const PHI: f32 = 1.618_034; // Golden ratio
const INV_PHI: f32 = 1.0 / PHI;

/// Build a body mesh: a base polyhedron whose faces are split into a
/// `(detail + 1)^2` triangle grid and projected onto the sphere of `radius`.
pub fn polyhedron_mesh(spec: &ShapeSpec) -> Mesh {
    let triangles = polyhedron_triangles(spec.kind, spec.detail, spec.radius);
    let flat = spec.detail == 0;

    let mut positions = Vec::with_capacity(triangles.len() * 3);
    let mut normals = Vec::with_capacity(triangles.len() * 3);
    let mut uvs = Vec::with_capacity(triangles.len() * 3);

    for tri in &triangles {
        let face_normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
        let mut tri_uvs = triangle_uvs(tri);
        fix_texture_seam(&mut tri_uvs);

        for (vertex, uv) in tri.iter().zip(tri_uvs) {
            positions.push(*vertex);
            // Faceted look at detail 0, smooth sphere otherwise.
            normals.push(if flat {
                face_normal
            } else {
                vertex.normalize_or_zero()
            });
            uvs.push(uv);
        }
    }

    let indices: Vec<u32> = (0..positions.len() as u32).collect();
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_indices(Indices::U32(indices));
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    // Tangents are only needed for parallax (bump) mapping.
    if let Err(err) = mesh.generate_tangents() {
        warn!("Could not generate tangents for {:?} mesh: {}", spec.kind, err);
    }

    mesh
}

/// Outward-wound triangles of the subdivided polyhedron, scaled to `radius`.
pub fn polyhedron_triangles(kind: ShapeKind, detail: u32, radius: f32) -> Vec<[Vec3; 3]> {
    let (vertices, indices) = base_polyhedron(kind);
    let mut triangles = Vec::with_capacity(indices.len() / 3 * ((detail as usize + 1).pow(2)));

    for face in indices.chunks(3) {
        let a = vertices[face[0] as usize];
        let b = vertices[face[1] as usize];
        let c = vertices[face[2] as usize];
        subdivide_face(a, b, c, detail, &mut triangles);
    }

    for tri in triangles.iter_mut() {
        for vertex in tri.iter_mut() {
            *vertex = vertex.normalize() * radius;
        }
        // Keep counter-clockwise winding when seen from outside.
        let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
        if normal.dot(tri[0] + tri[1] + tri[2]) < 0.0 {
            tri.swap(1, 2);
        }
    }

    triangles
}

/// Split face `abc` into a triangular grid with `detail + 1` segments per edge.
fn subdivide_face(a: Vec3, b: Vec3, c: Vec3, detail: u32, out: &mut Vec<[Vec3; 3]>) {
    let cols = detail as usize + 1;
    let mut grid: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);

    for i in 0..=cols {
        let t = i as f32 / cols as f32;
        let aj = a.lerp(c, t);
        let bj = b.lerp(c, t);
        let rows = cols - i;
        let row = if rows == 0 {
            vec![aj]
        } else {
            (0..=rows)
                .map(|j| aj.lerp(bj, j as f32 / rows as f32))
                .collect()
        };
        grid.push(row);
    }

    for i in 0..cols {
        for j in 0..(2 * (cols - i) - 1) {
            let k = j / 2;
            if j % 2 == 0 {
                out.push([grid[i][k + 1], grid[i + 1][k], grid[i][k]]);
            } else {
                out.push([grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]);
            }
        }
    }
}

fn triangle_uvs(tri: &[Vec3; 3]) -> [[f32; 2]; 3] {
    let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
    let mut uvs = [[0.0; 2]; 3];
    for (uv, vertex) in uvs.iter_mut().zip(tri) {
        let dir = vertex.normalize_or_zero();
        // Longitude is undefined at the poles; borrow the face's.
        let lon_source = if dir.x * dir.x + dir.z * dir.z < 1e-8 {
            centroid
        } else {
            dir
        };
        let u = lon_source.z.atan2(-lon_source.x) / TAU + 0.5;
        let v = 0.5 - dir.y.clamp(-1.0, 1.0).asin() / PI;
        *uv = [u, v];
    }
    uvs
}

/// Triangles straddling the texture's wrap-around meridian get their
/// low-u vertices shifted by one full turn.
fn fix_texture_seam(uvs: &mut [[f32; 2]; 3]) {
    let du01 = (uvs[0][0] - uvs[1][0]).abs();
    let du02 = (uvs[0][0] - uvs[2][0]).abs();
    let du12 = (uvs[1][0] - uvs[2][0]).abs();
    let max_du = du01.max(du02).max(du12);

    if max_du > 0.5 {
        for uv in uvs.iter_mut() {
            if uv[0] < 0.25 {
                uv[0] += 1.0;
            }
        }
    }
}

fn base_polyhedron(kind: ShapeKind) -> (Vec<Vec3>, &'static [u32]) {
    match kind {
        ShapeKind::Tetrahedron => (
            vec![
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(-1.0, -1.0, 1.0),
                Vec3::new(-1.0, 1.0, -1.0),
                Vec3::new(1.0, -1.0, -1.0),
            ],
            &[2, 1, 0, 0, 3, 2, 1, 3, 0, 2, 3, 1],
        ),
        ShapeKind::Octahedron => (
            vec![
                Vec3::X,
                Vec3::NEG_X,
                Vec3::Y,
                Vec3::NEG_Y,
                Vec3::Z,
                Vec3::NEG_Z,
            ],
            &[
                0, 2, 4, 0, 4, 3, 0, 3, 5, 0, 5, 2, 1, 2, 5, 1, 5, 3, 1, 3, 4, 1, 4, 2,
            ],
        ),
        ShapeKind::Icosahedron => (
            vec![
                Vec3::new(-1.0, PHI, 0.0),
                Vec3::new(1.0, PHI, 0.0),
                Vec3::new(-1.0, -PHI, 0.0),
                Vec3::new(1.0, -PHI, 0.0),
                Vec3::new(0.0, -1.0, PHI),
                Vec3::new(0.0, 1.0, PHI),
                Vec3::new(0.0, -1.0, -PHI),
                Vec3::new(0.0, 1.0, -PHI),
                Vec3::new(PHI, 0.0, -1.0),
                Vec3::new(PHI, 0.0, 1.0),
                Vec3::new(-PHI, 0.0, -1.0),
                Vec3::new(-PHI, 0.0, 1.0),
            ],
            &[
                0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10,
                7, 6, 7, 1, 8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6,
                2, 10, 8, 6, 7, 9, 8, 1,
            ],
        ),
        ShapeKind::Dodecahedron => (
            vec![
                // (±1, ±1, ±1)
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(-1.0, -1.0, 1.0),
                Vec3::new(-1.0, 1.0, -1.0),
                Vec3::new(-1.0, 1.0, 1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(1.0, -1.0, 1.0),
                Vec3::new(1.0, 1.0, -1.0),
                Vec3::new(1.0, 1.0, 1.0),
                // (0, ±1/φ, ±φ)
                Vec3::new(0.0, -INV_PHI, -PHI),
                Vec3::new(0.0, -INV_PHI, PHI),
                Vec3::new(0.0, INV_PHI, -PHI),
                Vec3::new(0.0, INV_PHI, PHI),
                // (±1/φ, ±φ, 0)
                Vec3::new(-INV_PHI, -PHI, 0.0),
                Vec3::new(-INV_PHI, PHI, 0.0),
                Vec3::new(INV_PHI, -PHI, 0.0),
                Vec3::new(INV_PHI, PHI, 0.0),
                // (±φ, 0, ±1/φ)
                Vec3::new(-PHI, 0.0, -INV_PHI),
                Vec3::new(PHI, 0.0, -INV_PHI),
                Vec3::new(-PHI, 0.0, INV_PHI),
                Vec3::new(PHI, 0.0, INV_PHI),
            ],
            &[
                3, 11, 7, 3, 7, 15, 3, 15, 13, 7, 19, 17, 7, 17, 6, 7, 6, 15, 17, 4, 8, 17, 8, 10,
                17, 10, 6, 8, 0, 16, 8, 16, 2, 8, 2, 10, 0, 12, 1, 0, 1, 18, 0, 18, 16, 6, 10, 2,
                6, 2, 13, 6, 13, 15, 2, 16, 18, 2, 18, 3, 2, 3, 13, 18, 1, 9, 18, 9, 11, 18, 11,
                3, 4, 14, 12, 4, 12, 0, 4, 0, 8, 11, 9, 5, 11, 5, 19, 11, 19, 7, 19, 5, 14, 19, 14,
                4, 19, 4, 17, 1, 12, 14, 1, 14, 5, 1, 5, 9,
            ],
        ),
    }
}
