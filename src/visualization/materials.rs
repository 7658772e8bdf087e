//! Surface materials for bodies and their layers, and recovery from textures that fail to load.

use bevy::asset::LoadState;
use bevy::pbr::ParallaxMappingMethod;
use bevy::prelude::*;

use crate::bodies::{LayerKind, SurfaceLayer, SurfaceMaps};

/// Which material input a texture feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureSlot {
    Diffuse,
    Bump,
    Specular,
    /// Texture of an unlit backdrop; without it the backdrop is plain black.
    Backdrop,
    /// Popup image, shown outside any material.
    Media,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{owner}: {slot:?} map '{path}' failed to load")]
pub struct AssetMissingError {
    /// Body id, or the name of a decoration.
    pub owner: String,
    pub slot: TextureSlot,
    pub path: String,
}

#[derive(Clone, Debug)]
pub struct TrackedTexture {
    pub slot: TextureSlot,
    pub path: String,
    pub handle: Handle<Image>,
}

impl TrackedTexture {
    pub fn load(slot: TextureSlot, path: &str, asset_server: &AssetServer) -> Self {
        Self {
            slot,
            path: path.to_string(),
            handle: asset_server.load(path.to_string()),
        }
    }
}

/// Textures of a material that have not finished loading yet.
#[derive(Component, Clone, Debug)]
pub struct PendingSurface {
    pub owner: String,
    pub material: Handle<StandardMaterial>,
    pub textures: Vec<TrackedTexture>,
}

/// Load outcome of one tracked texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureStatus {
    Loading,
    Loaded,
    Failed,
}

/// Material for a body mesh. `load` resolves an asset path to an image handle.
pub fn body_material(
    maps: &SurfaceMaps,
    mut load: impl FnMut(&str) -> Handle<Image>,
) -> (StandardMaterial, Vec<TrackedTexture>) {
    let mut tracked = Vec::new();
    let mut track = |slot: TextureSlot, path: &str| {
        let handle = load(path);
        tracked.push(TrackedTexture {
            slot,
            path: path.to_string(),
            handle: handle.clone(),
        });
        handle
    };

    let mut material = StandardMaterial {
        perceptual_roughness: 0.9,
        reflectance: 0.2,
        ..default()
    };

    if let Some(path) = &maps.diffuse {
        material.base_color_texture = Some(track(TextureSlot::Diffuse, path));
    } else {
        material.base_color = Color::srgb(0.55, 0.55, 0.55);
    }
    if let Some(path) = &maps.bump {
        material.depth_map = Some(track(TextureSlot::Bump, path));
        material.parallax_depth_scale = maps.bump_scale;
        material.parallax_mapping_method = ParallaxMappingMethod::Occlusion;
        material.max_parallax_layer_count = 16.0;
    }
    if let Some(path) = &maps.specular {
        // Bright texels (oceans) keep a strong highlight, black ones (land) lose it.
        material.specular_tint_texture = Some(track(TextureSlot::Specular, path));
        material.specular_tint = Color::WHITE;
        material.perceptual_roughness = 0.5;
        material.reflectance = 0.5;
    }
    if maps.alpha.is_some() {
        // Black texels vanish under additive blending, which is what the mask is for.
        material.alpha_mode = AlphaMode::Add;
    }

    (material, tracked)
}

/// Material for a lights or clouds shell. Glow layers use `FresnelMaterial` instead.
pub fn layer_material(
    layer: &SurfaceLayer,
    load: impl FnMut(&str) -> Handle<Image>,
) -> (StandardMaterial, Vec<TrackedTexture>) {
    let (mut material, tracked) = body_material(&layer.maps, load);
    match layer.kind {
        LayerKind::Lights => {
            material.unlit = true;
            material.alpha_mode = AlphaMode::Add;
        }
        LayerKind::Clouds => {
            material.alpha_mode = AlphaMode::Add;
            material.base_color = Color::srgba(1.0, 1.0, 1.0, layer.opacity);
        }
        LayerKind::Glow => {}
    }
    // Layers are shells, not relief.
    material.depth_map = None;
    (material, tracked)
}

/// Drop a failed map from a material so it renders without that effect.
pub fn clear_slot(material: &mut StandardMaterial, slot: TextureSlot) {
    match slot {
        TextureSlot::Diffuse => {
            material.base_color_texture = None;
            material.base_color = Color::srgb(0.55, 0.55, 0.55);
        }
        TextureSlot::Bump => material.depth_map = None,
        TextureSlot::Specular => material.specular_tint_texture = None,
        TextureSlot::Backdrop => {
            material.base_color_texture = None;
            material.base_color = Color::BLACK;
        }
        TextureSlot::Media => {}
    }
}

pub fn texture_status(asset_server: &AssetServer, handle: &Handle<Image>) -> TextureStatus {
    match asset_server.load_state(handle.id()) {
        LoadState::Loaded => TextureStatus::Loaded,
        LoadState::Failed(_) => TextureStatus::Failed,
        _ => TextureStatus::Loading,
    }
}

/// Forget settled textures and report the failed ones.
pub fn settle_textures(
    owner: &str,
    textures: &mut Vec<TrackedTexture>,
    status: impl Fn(&Handle<Image>) -> TextureStatus,
) -> Vec<AssetMissingError> {
    let mut failed = Vec::new();
    textures.retain(|texture| match status(&texture.handle) {
        TextureStatus::Loading => true,
        TextureStatus::Loaded => false,
        TextureStatus::Failed => {
            failed.push(AssetMissingError {
                owner: owner.to_string(),
                slot: texture.slot,
                path: texture.path.clone(),
            });
            false
        }
    });
    failed
}

pub fn degrade_missing_textures(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut pending: Query<(Entity, &mut PendingSurface)>,
) {
    for (entity, mut surface) in pending.iter_mut() {
        let surface = &mut *surface;
        let failed = settle_textures(&surface.owner, &mut surface.textures, |handle| {
            texture_status(&asset_server, handle)
        });

        if !failed.is_empty()
            && let Some(material) = materials.get_mut(&surface.material)
        {
            for err in &failed {
                clear_slot(material, err.slot);
                warn!("{}; rendering without it", err);
            }
        }

        if surface.textures.is_empty() {
            commands.entity(entity).remove::<PendingSurface>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_load(_: &str) -> Handle<Image> {
        Handle::default()
    }

    #[test]
    fn body_material_uses_every_present_map() {
        let maps = SurfaceMaps::diffuse("textures/00_earthmap1k.jpg")
            .with_bump("textures/01_earthbump1k.jpg", 0.04)
            .with_specular("textures/02_earthspec1k.jpg");
        let (material, tracked) = body_material(&maps, no_load);

        assert!(material.base_color_texture.is_some());
        assert!(material.depth_map.is_some());
        assert_eq!(material.parallax_depth_scale, 0.04);
        assert!(material.specular_tint_texture.is_some());
        assert!(material.metallic_roughness_texture.is_none());
        let slots: Vec<_> = tracked.iter().map(|t| t.slot).collect();
        assert_eq!(
            slots,
            vec![TextureSlot::Diffuse, TextureSlot::Bump, TextureSlot::Specular]
        );
    }

    #[test]
    fn absent_maps_are_skipped() {
        let (material, tracked) = body_material(&SurfaceMaps::default(), no_load);
        assert!(tracked.is_empty());
        assert!(material.base_color_texture.is_none());
        assert!(material.depth_map.is_none());
        assert!(matches!(material.alpha_mode, AlphaMode::Opaque));
    }

    #[test]
    fn cloud_layer_blends_additively_at_its_opacity() {
        let clouds = SurfaceLayer::new(
            LayerKind::Clouds,
            SurfaceMaps::diffuse("textures/04_earthcloudmap.jpg")
                .with_alpha("textures/05_earthcloudmaptrans.jpg"),
        )
        .with_opacity(0.5);
        let (material, _) = layer_material(&clouds, no_load);
        assert!(matches!(material.alpha_mode, AlphaMode::Add));
        assert_eq!(material.base_color.alpha(), 0.5);

        let lights = SurfaceLayer::new(
            LayerKind::Lights,
            SurfaceMaps::diffuse("textures/03_earthlights1k.jpg"),
        );
        let (material, _) = layer_material(&lights, no_load);
        assert!(material.unlit);
    }

    #[test]
    fn failed_textures_are_reported_once() {
        let (mut material, textures) = body_material(
            &SurfaceMaps::diffuse("textures/06_moonmap4k.jpg")
                .with_bump("textures/missing.jpg", 0.01),
            no_load,
        );
        let mut surface = PendingSurface {
            owner: "moon".to_string(),
            material: Handle::default(),
            textures,
        };

        let failed = settle_textures(&surface.owner, &mut surface.textures, |_| {
            TextureStatus::Loading
        });
        assert!(failed.is_empty());
        assert_eq!(surface.textures.len(), 2);

        // Handles are all equal here, so key off the tracked order instead.
        let calls = std::cell::Cell::new(0);
        let failed = settle_textures(&surface.owner, &mut surface.textures, |_| {
            let n = calls.get();
            calls.set(n + 1);
            if n == 0 {
                TextureStatus::Loaded
            } else {
                TextureStatus::Failed
            }
        });
        assert_eq!(calls.get(), 2);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].slot, TextureSlot::Bump);
        assert_eq!(failed[0].path, "textures/missing.jpg");
        assert_eq!(failed[0].owner, "moon");
        assert!(surface.textures.is_empty());

        clear_slot(&mut material, failed[0].slot);
        assert!(material.depth_map.is_none());
        assert!(material.base_color_texture.is_some());
    }

    #[test]
    fn backdrop_without_texture_goes_black() {
        let mut material = StandardMaterial {
            base_color_texture: Some(Handle::default()),
            unlit: true,
            ..default()
        };
        clear_slot(&mut material, TextureSlot::Backdrop);
        assert!(material.base_color_texture.is_none());
        assert_eq!(material.base_color, Color::BLACK);
    }
}
