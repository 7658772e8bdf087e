//! Components tagging the entities spawned for each body

use bevy::prelude::*;

use crate::bodies::registry::BodyId;

/// Rotation anchor at the parent's origin that carries a body's revolution.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct OrbitPivot;

/// Rotation anchor at the body's placement that carries its self-spin.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct BodyPivot;

/// The one mesh node of a body.
#[derive(Component, Clone, Debug)]
pub struct BodyMesh {
    pub body: BodyId,
    pub radius: f32,
}

/// Marks a body mesh as eligible for pointer hit-testing.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct PickTarget;

/// 3D point whose projection positions a body's overlay label.
#[derive(Component, Clone, Debug)]
pub struct LabelAnchor {
    pub body: BodyId,
    pub text: String,
}
