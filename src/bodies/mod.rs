//! Celestial body definitions
//!
//! This module holds the declarative body records, the registry that validates
//! them, the built-in catalogs for each scene profile, and the components used
//! to tag the entities spawned for each body.

pub mod catalog;
pub mod components;
pub mod registry;

pub use components::{BodyMesh, BodyPivot, LabelAnchor, OrbitPivot, PickTarget};
pub use registry::{
    BodyHandle, BodyId, BodyRegistry, CelestialBody, LayerKind, RegistryError, ShapeKind,
    ShapeSpec, SurfaceLayer, SurfaceMaps,
};

use crate::core::config::SceneConfig;

/// Build the registry for a configuration: the profile catalog followed by any extra bodies.
pub fn build_registry(config: &SceneConfig) -> Result<BodyRegistry, RegistryError> {
    let bodies = catalog::bodies_for(config.profile)
        .into_iter()
        .chain(config.extra_bodies.iter().cloned());
    BodyRegistry::from_bodies(bodies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_bodies_are_validated() {
        let mut config = SceneConfig::default();
        config.extra_bodies.push(CelestialBody::new(
            "yr4_2024",
            ShapeSpec::new(ShapeKind::Dodecahedron, 0.03, 1),
        ));
        let registry = build_registry(&config).unwrap();
        assert!(registry.find(&BodyId::new("yr4_2024")).is_some());

        config.extra_bodies.push(CelestialBody::new(
            "moon",
            ShapeSpec::new(ShapeKind::Icosahedron, 0.25, 2),
        ));
        assert_eq!(
            build_registry(&config).unwrap_err(),
            RegistryError::DuplicateId(BodyId::new("moon"))
        );
    }
}
