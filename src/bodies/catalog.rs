//! Built-in body tables for each scene profile.

use chrono::NaiveDate;

use crate::bodies::registry::{
    Annotation, CelestialBody, LayerKind, PopupContent, ShapeKind, ShapeSpec, SurfaceLayer,
    SurfaceMaps,
};
use crate::core::config::SceneProfile;

pub const EARTH_RADIUS: f32 = 1.0;
pub const MOON_RADIUS: f32 = 0.25;
pub const ASTEROID_RADIUS: f32 = 0.05;
pub const MOON_ORBIT_RADIUS: f32 = 25.0;

const EARTH_TILT_DEG: f32 = -23.4;
const EARTH_SPIN: f32 = 0.002;
const CLOUD_DRIFT: f32 = 0.0003;
const MOON_ORBIT_RATE: f32 = 0.001;
const ASTEROID_TEXTURE: &str = "textures/asteroid.jpg";
const ASTEROID_BUMP_SCALE: f32 = 0.015;
/// Slow tumble given to small bodies in the extended profile.
const NEO_TUMBLE: f32 = 0.01;

/// Bodies for a profile, in registration order (parents first).
pub fn bodies_for(profile: SceneProfile) -> Vec<CelestialBody> {
    let mut bodies = vec![earth(), moon(profile)];

    match profile {
        SceneProfile::Minimal => {
            bodies.push(asteroid(&NEOS[0]));
        }
        SceneProfile::Labeled => {
            bodies.extend(NEOS.iter().map(|neo| {
                asteroid(neo).annotated(neo.annotation())
            }));
        }
        SceneProfile::Extended => {
            bodies.extend(NEOS.iter().map(|neo| {
                let mut body = asteroid(neo)
                    .annotated(neo.annotation().with_popup(neo.popup()))
                    .pickable(true)
                    .spinning(NEO_TUMBLE);
                if neo.id == "apophis" {
                    body = body.orbiting(0.0002);
                }
                body
            }));
        }
    }

    bodies
}

fn earth() -> CelestialBody {
    CelestialBody::new(
        "earth",
        ShapeSpec::new(ShapeKind::Icosahedron, EARTH_RADIUS, 12),
    )
    .with_surface(
        SurfaceMaps::diffuse("textures/00_earthmap1k.jpg")
            .with_specular("textures/02_earthspec1k.jpg")
            .with_bump("textures/01_earthbump1k.jpg", 0.04),
    )
    .with_layer(SurfaceLayer::new(
        LayerKind::Lights,
        SurfaceMaps::diffuse("textures/03_earthlights1k.jpg"),
    ))
    .with_layer(
        SurfaceLayer::new(
            LayerKind::Clouds,
            SurfaceMaps::diffuse("textures/04_earthcloudmap.jpg")
                .with_alpha("textures/05_earthcloudmaptrans.jpg"),
        )
        .scaled(1.003)
        .drifting(CLOUD_DRIFT)
        .with_opacity(0.5),
    )
    .with_layer(SurfaceLayer::new(LayerKind::Glow, SurfaceMaps::default()).scaled(1.01))
    .tilted(EARTH_TILT_DEG)
    .spinning(EARTH_SPIN)
}

fn moon(profile: SceneProfile) -> CelestialBody {
    let mut annotation = Annotation::label("Moon")
        .offset_by([1.0, 0.0, 0.0])
        .with_media("gif/moon.gif");
    if profile == SceneProfile::Extended {
        annotation = annotation.with_popup(PopupContent {
            description: "Earth's only natural satellite, tidally locked so the same face \
                          always points toward us."
                .to_string(),
            diameter: "3,474 km".to_string(),
            impact_chance: "None".to_string(),
            closest_approach: "~363,000 km (perigee)".to_string(),
            approach_date: None,
            media_asset_path: Some("gif/moon.gif".to_string()),
        });
    }

    CelestialBody::new("moon", ShapeSpec::new(ShapeKind::Icosahedron, MOON_RADIUS, 12))
        .with_surface(
            SurfaceMaps::diffuse("textures/06_moonmap4k.jpg")
                .with_bump("textures/07_moonbump4k.jpg", 0.01),
        )
        .at(MOON_ORBIT_RADIUS, 0.0, 0.0)
        .around("earth")
        .orbiting(MOON_ORBIT_RATE)
        .pickable(true)
        .annotated(annotation)
}

fn asteroid(neo: &NeoEntry) -> CelestialBody {
    let [x, y, z] = neo.placement;
    CelestialBody::new(neo.id, ShapeSpec::new(neo.kind, neo.radius, neo.detail))
        .with_surface(
            SurfaceMaps::diffuse(ASTEROID_TEXTURE).with_bump(ASTEROID_TEXTURE, ASTEROID_BUMP_SCALE),
        )
        .at(x, y, z)
        .phased(neo.orbit_phase)
}

struct NeoEntry {
    id: &'static str,
    label: &'static str,
    kind: ShapeKind,
    radius: f32,
    detail: u32,
    placement: [f32; 3],
    orbit_phase: f32,
    label_offset: [f32; 3],
    description: &'static str,
    diameter: &'static str,
    impact_chance: &'static str,
    closest_approach: &'static str,
    approach_date: (i32, u32, u32),
}

impl NeoEntry {
    fn annotation(&self) -> Annotation {
        let label = Annotation::label(self.label);
        if self.label_offset == [0.0; 3] {
            label
        } else {
            label.offset_by(self.label_offset)
        }
    }

    fn popup(&self) -> PopupContent {
        let (y, m, d) = self.approach_date;
        PopupContent {
            description: self.description.to_string(),
            diameter: self.diameter.to_string(),
            impact_chance: self.impact_chance.to_string(),
            closest_approach: self.closest_approach.to_string(),
            approach_date: NaiveDate::from_ymd_opt(y, m, d),
            media_asset_path: Some(format!("gif/{}.gif", self.id)),
        }
    }
}

// Orbit phases are starting yaw angles, in radians.
const NEOS: [NeoEntry; 8] = [
    NeoEntry {
        id: "apophis",
        label: "apophis",
        kind: ShapeKind::Tetrahedron,
        radius: ASTEROID_RADIUS,
        detail: 2,
        placement: [2.5, 0.0, 0.0],
        orbit_phase: 0.0,
        label_offset: [0.1, 0.0, 0.0],
        description: "Stony asteroid that will pass Earth closer than geostationary satellites.",
        diameter: "~340 m",
        impact_chance: "0% for at least the next century",
        closest_approach: "~38,000 km from Earth's centre",
        approach_date: (2029, 4, 13),
    },
    NeoEntry {
        id: "bennu",
        label: "bennu",
        kind: ShapeKind::Dodecahedron,
        radius: 0.072,
        detail: 1,
        placement: [19.5, 2.0, 0.0],
        orbit_phase: -180.0,
        label_offset: [0.1, 0.0, 0.0],
        description: "Carbon-rich rubble pile sampled by the OSIRIS-REx mission.",
        diameter: "~490 m",
        impact_chance: "1 in 2,700 (2182)",
        closest_approach: "~200,000 km",
        approach_date: (2135, 9, 25),
    },
    NeoEntry {
        id: "md_2011",
        label: "MD_2011",
        kind: ShapeKind::Dodecahedron,
        radius: 0.03,
        detail: 1,
        placement: [-1.7, -1.0, 0.0],
        orbit_phase: 90.0,
        label_offset: [0.0, 0.0, 0.0],
        description: "Small Apollo asteroid that skimmed past above the South Atlantic.",
        diameter: "~6 m",
        impact_chance: "0%",
        closest_approach: "~12,300 km altitude",
        approach_date: (2011, 6, 27),
    },
    NeoEntry {
        id: "chelyabinsk",
        label: "Chelyabinsk",
        kind: ShapeKind::Dodecahedron,
        radius: 0.01,
        detail: 1,
        placement: [0.9, 0.58, 0.0],
        orbit_phase: 0.0,
        label_offset: [0.0, 0.0, 0.0],
        description: "Superbolide that exploded over Chelyabinsk Oblast, Russia.",
        diameter: "~18 m",
        impact_chance: "Impacted (airburst)",
        closest_approach: "Atmospheric entry",
        approach_date: (2013, 2, 15),
    },
    NeoEntry {
        id: "tc3_2008",
        label: "TC3_2008",
        kind: ShapeKind::Dodecahedron,
        radius: 0.005,
        detail: 1,
        placement: [1.0, 0.0, 0.0],
        orbit_phase: 0.0,
        label_offset: [0.0, 0.0, 0.0],
        description: "First asteroid spotted before impact; fragments fell in Sudan.",
        diameter: "~4 m",
        impact_chance: "Impacted (airburst)",
        closest_approach: "Atmospheric entry",
        approach_date: (2008, 10, 7),
    },
    NeoEntry {
        id: "dz2_2023",
        label: "DZ2_2023",
        kind: ShapeKind::Dodecahedron,
        radius: 0.02,
        detail: 1,
        placement: [13.0, 0.0, 0.0],
        orbit_phase: -156.0,
        label_offset: [0.0, 0.0, 0.0],
        description: "Apollo asteroid that passed at about half the lunar distance.",
        diameter: "~40-90 m",
        impact_chance: "Ruled out for 2026",
        closest_approach: "~175,000 km",
        approach_date: (2023, 3, 25),
    },
    NeoEntry {
        id: "tu24_2007",
        label: "TU24_2007",
        kind: ShapeKind::Dodecahedron,
        radius: 0.1,
        detail: 1,
        placement: [40.0, 0.0, 0.0],
        orbit_phase: 5.4,
        label_offset: [0.0, 0.0, 0.0],
        description: "Apollo asteroid discovered by the Catalina Sky Survey.",
        diameter: "~250 m",
        impact_chance: "0%",
        closest_approach: "~554,000 km",
        approach_date: (2008, 1, 29),
    },
    NeoEntry {
        id: "xf11_1997",
        label: "XF11_1997",
        kind: ShapeKind::Dodecahedron,
        radius: 0.1,
        detail: 1,
        placement: [70.0, 0.0, 0.0],
        orbit_phase: 4.5,
        label_offset: [0.0, 0.0, 0.0],
        description: "Kilometre-sized asteroid once feared to threaten Earth in 2028.",
        diameter: "~1.3 km",
        impact_chance: "0% (ruled out)",
        closest_approach: "~930,000 km",
        approach_date: (2028, 10, 26),
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::registry::BodyRegistry;

    #[test]
    fn every_profile_registers_cleanly() {
        for profile in [
            SceneProfile::Minimal,
            SceneProfile::Labeled,
            SceneProfile::Extended,
        ] {
            let registry = BodyRegistry::from_bodies(bodies_for(profile))
                .unwrap_or_else(|e| panic!("{profile:?}: {e}"));
            assert!(registry.len() >= 3);
        }
    }

    #[test]
    fn minimal_and_labeled_only_pick_the_moon() {
        for profile in [SceneProfile::Minimal, SceneProfile::Labeled] {
            let pickable: Vec<_> = bodies_for(profile)
                .into_iter()
                .filter(|b| b.pickable)
                .map(|b| b.id.0)
                .collect();
            assert_eq!(pickable, vec!["moon".to_string()]);
        }
    }

    #[test]
    fn extended_picks_every_annotated_body() {
        let bodies = bodies_for(SceneProfile::Extended);
        assert_eq!(bodies.len(), 10);
        for body in &bodies {
            assert_eq!(body.pickable, body.annotation.is_some(), "{}", body.id);
        }
        let neos_with_popups = bodies
            .iter()
            .filter_map(|b| b.annotation.as_ref())
            .filter(|a| a.popup.is_some())
            .count();
        assert_eq!(neos_with_popups, 9);
    }

    #[test]
    fn earth_layers_keep_source_rates() {
        let earth = earth();
        assert_eq!(earth.rotation_rate, 0.002);
        let clouds = earth
            .layers
            .iter()
            .find(|l| l.kind == LayerKind::Clouds)
            .unwrap();
        assert!((earth.rotation_rate + clouds.extra_spin - 0.0023).abs() < 1e-7);
        assert_eq!(clouds.scale, 1.003);
    }
}
