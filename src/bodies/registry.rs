//! Declarative body definitions and the registry that validates them.

use bevy::prelude::*;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable, unique identifier of a celestial body.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub String);

impl BodyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Index of a body inside the [`BodyRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(usize);

impl BodyHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Base polyhedron a body mesh is subdivided from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Tetrahedron,
    Octahedron,
    Icosahedron,
    Dodecahedron,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeSpec {
    pub kind: ShapeKind,
    /// Each base face is split into `(detail + 1)^2` triangles.
    #[serde(default)]
    pub detail: u32,
    pub radius: f32,
}

impl ShapeSpec {
    pub fn new(kind: ShapeKind, radius: f32, detail: u32) -> Self {
        Self {
            kind,
            detail,
            radius,
        }
    }
}

/// Texture paths (relative to the asset root) for one surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceMaps {
    pub diffuse: Option<String>,
    pub bump: Option<String>,
    pub specular: Option<String>,
    pub alpha: Option<String>,
    pub bump_scale: f32,
}

impl Default for SurfaceMaps {
    fn default() -> Self {
        Self {
            diffuse: None,
            bump: None,
            specular: None,
            alpha: None,
            bump_scale: 0.015,
        }
    }
}

impl SurfaceMaps {
    pub fn diffuse(path: &str) -> Self {
        Self {
            diffuse: Some(path.to_string()),
            ..default()
        }
    }

    pub fn with_bump(mut self, path: &str, scale: f32) -> Self {
        self.bump = Some(path.to_string());
        self.bump_scale = scale;
        self
    }

    pub fn with_specular(mut self, path: &str) -> Self {
        self.specular = Some(path.to_string());
        self
    }

    pub fn with_alpha(mut self, path: &str) -> Self {
        self.alpha = Some(path.to_string());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Unlit night-side lights, blended additively.
    Lights,
    /// Translucent cloud shell.
    Clouds,
    /// Fresnel rim glow.
    Glow,
}

/// Extra shell drawn around a body with the body's own geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceLayer {
    pub kind: LayerKind,
    #[serde(default)]
    pub maps: SurfaceMaps,
    #[serde(default = "one")]
    pub scale: f32,
    /// Spin added on top of the body pivot's own rotation, per frame.
    #[serde(default)]
    pub extra_spin: f32,
    #[serde(default = "one")]
    pub opacity: f32,
}

fn one() -> f32 {
    1.0
}

impl SurfaceLayer {
    pub fn new(kind: LayerKind, maps: SurfaceMaps) -> Self {
        Self {
            kind,
            maps,
            scale: 1.0,
            extra_spin: 0.0,
            opacity: 1.0,
        }
    }

    pub fn scaled(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn drifting(mut self, extra_spin: f32) -> Self {
        self.extra_spin = extra_spin;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Where a body's label anchor sits relative to the body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPlacement {
    /// On the body mesh itself.
    #[default]
    Exact,
    /// At a fixed offset from the body's placement.
    Offset([f32; 3]),
}

/// Rich information shown in a body's popup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopupContent {
    pub description: String,
    pub diameter: String,
    pub impact_chance: String,
    pub closest_approach: String,
    pub approach_date: Option<NaiveDate>,
    pub media_asset_path: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub label_text: String,
    #[serde(default)]
    pub label_placement: LabelPlacement,
    #[serde(default)]
    pub popup: Option<PopupContent>,
    /// Media shown in the generic popup when there is no rich content.
    #[serde(default)]
    pub media_asset_path: Option<String>,
}

impl Annotation {
    pub fn label(text: &str) -> Self {
        Self {
            label_text: text.to_string(),
            label_placement: LabelPlacement::Exact,
            popup: None,
            media_asset_path: None,
        }
    }

    pub fn offset_by(mut self, offset: [f32; 3]) -> Self {
        self.label_placement = LabelPlacement::Offset(offset);
        self
    }

    pub fn with_popup(mut self, popup: PopupContent) -> Self {
        self.popup = Some(popup);
        self
    }

    pub fn with_media(mut self, path: &str) -> Self {
        self.media_asset_path = Some(path.to_string());
        self
    }
}

/// Static definition of one body in the scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CelestialBody {
    pub id: BodyId,
    pub shape: ShapeSpec,
    #[serde(default)]
    pub surface: SurfaceMaps,
    #[serde(default)]
    pub layers: Vec<SurfaceLayer>,
    #[serde(default)]
    pub placement: [f32; 3],
    #[serde(default)]
    pub tilt_deg: f32,
    #[serde(default)]
    pub rotation_rate: f32,
    #[serde(default)]
    pub orbit_rate: f32,
    #[serde(default)]
    pub orbit_phase: f32,
    #[serde(default)]
    pub parent: Option<BodyId>,
    #[serde(default)]
    pub pickable: bool,
    #[serde(default)]
    pub annotation: Option<Annotation>,
}

impl CelestialBody {
    pub fn new(id: &str, shape: ShapeSpec) -> Self {
        Self {
            id: BodyId::new(id),
            shape,
            surface: SurfaceMaps::default(),
            layers: Vec::new(),
            placement: [0.0; 3],
            tilt_deg: 0.0,
            rotation_rate: 0.0,
            orbit_rate: 0.0,
            orbit_phase: 0.0,
            parent: None,
            pickable: false,
            annotation: None,
        }
    }

    pub fn with_surface(mut self, surface: SurfaceMaps) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_layer(mut self, layer: SurfaceLayer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.placement = [x, y, z];
        self
    }

    pub fn tilted(mut self, tilt_deg: f32) -> Self {
        self.tilt_deg = tilt_deg;
        self
    }

    pub fn spinning(mut self, rotation_rate: f32) -> Self {
        self.rotation_rate = rotation_rate;
        self
    }

    pub fn orbiting(mut self, orbit_rate: f32) -> Self {
        self.orbit_rate = orbit_rate;
        self
    }

    pub fn phased(mut self, orbit_phase: f32) -> Self {
        self.orbit_phase = orbit_phase;
        self
    }

    pub fn around(mut self, parent: &str) -> Self {
        self.parent = Some(BodyId::new(parent));
        self
    }

    pub fn pickable(mut self, pickable: bool) -> Self {
        self.pickable = pickable;
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn placement(&self) -> Vec3 {
        Vec3::from_array(self.placement)
    }

    /// Fixed roll of the body pivot; self-spin happens about the tilted Y axis.
    pub fn tilt(&self) -> Quat {
        Quat::from_rotation_z(self.tilt_deg.to_radians())
    }

    pub fn label_text(&self) -> Option<&str> {
        self.annotation.as_ref().map(|a| a.label_text.as_str())
    }

    /// Label anchor position relative to the orbit pivot.
    pub fn label_position(&self) -> Option<Vec3> {
        let annotation = self.annotation.as_ref()?;
        Some(match annotation.label_placement {
            LabelPlacement::Exact => self.placement(),
            LabelPlacement::Offset(offset) => self.placement() + Vec3::from_array(offset),
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate body id `{0}`")]
    DuplicateId(BodyId),

    #[error("body `{id}` has invalid radius {radius}")]
    InvalidRadius { id: BodyId, radius: f32 },

    #[error("body `{id}` references unknown parent `{parent}`")]
    UnknownParent { id: BodyId, parent: BodyId },
}

/// Every body in the scene, in registration order.
#[derive(Resource, Debug, Default)]
pub struct BodyRegistry {
    bodies: Vec<CelestialBody>,
    index: HashMap<BodyId, BodyHandle>,
}

impl BodyRegistry {
    pub fn from_bodies(
        bodies: impl IntoIterator<Item = CelestialBody>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for body in bodies {
            registry.register(body)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, body: CelestialBody) -> Result<BodyHandle, RegistryError> {
        if self.index.contains_key(&body.id) {
            return Err(RegistryError::DuplicateId(body.id));
        }
        let radius = body.shape.radius;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(RegistryError::InvalidRadius {
                id: body.id,
                radius,
            });
        }
        if let Some(parent) = &body.parent
            && !self.index.contains_key(parent)
        {
            return Err(RegistryError::UnknownParent {
                id: body.id.clone(),
                parent: parent.clone(),
            });
        }

        let handle = BodyHandle(self.bodies.len());
        self.index.insert(body.id.clone(), handle);
        self.bodies.push(body);
        Ok(handle)
    }

    pub fn find(&self, id: &BodyId) -> Option<BodyHandle> {
        self.index.get(id).copied()
    }

    pub fn get(&self, handle: BodyHandle) -> &CelestialBody {
        &self.bodies[handle.0]
    }

    pub fn body(&self, id: &BodyId) -> Option<&CelestialBody> {
        self.find(id).map(|handle| self.get(handle))
    }

    pub fn all(&self) -> impl Iterator<Item = (BodyHandle, &CelestialBody)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, body)| (BodyHandle(i), body))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
