//! Scene lighting

use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;

/// Marker component for the sun directional light
#[derive(Component)]
pub struct SunLight;

const SUN_POSITION: Vec3 = Vec3::new(-2.0, 0.5, 1.5);

pub fn spawn_sun_light(mut commands: Commands) {
    // Keeps the night side and far NEOs faintly visible.
    commands.insert_resource(GlobalAmbientLight {
        brightness: 80.0,
        ..default()
    });

    // Only the direction matters for a directional light; it points at the origin.
    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            ..default()
        },
        SunLight,
        Transform::from_translation(SUN_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
        Name::new("Sun Light"),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sun_shines_toward_the_origin() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_systems(Startup, spawn_sun_light);
        app.update();

        let mut suns = app
            .world_mut()
            .query_filtered::<&Transform, With<SunLight>>();
        let transform = suns.single(app.world()).unwrap();
        let toward_origin = (-SUN_POSITION).normalize();
        assert!(transform.forward().dot(toward_origin) > 0.999);
        assert!(app.world().contains_resource::<GlobalAmbientLight>());
    }
}
