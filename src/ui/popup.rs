//! The single informational popup opened by picking a body.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::bodies::{BodyId, BodyRegistry, CelestialBody};
use crate::core::viewport::OverlayRoot;
use crate::ui::picking::BodyPicked;
use crate::visualization::materials::{
    AssetMissingError, TextureSlot, TextureStatus, TrackedTexture, texture_status,
};

const PANEL_WIDTH: f32 = 320.0;
const MEDIA_HEIGHT: f32 = 180.0;

/// Which popup, if any, is on screen.
#[derive(Resource, Clone, Debug, Default, PartialEq, Eq)]
pub enum PopupState {
    #[default]
    Closed,
    Open(BodyId),
}

/// Outcome of feeding an input to [`PopupState`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PopupTransition {
    Unchanged,
    Opened(BodyId),
    Replaced { from: BodyId, to: BodyId },
    Closed(BodyId),
}

impl PopupState {
    /// A pick result arrived. Misses never change the state.
    pub fn on_pick(&mut self, hit: Option<&BodyId>) -> PopupTransition {
        let Some(body) = hit else {
            return PopupTransition::Unchanged;
        };
        let previous = std::mem::replace(self, PopupState::Open(body.clone()));
        match previous {
            PopupState::Closed => PopupTransition::Opened(body.clone()),
            PopupState::Open(from) => PopupTransition::Replaced {
                from,
                to: body.clone(),
            },
        }
    }

    /// The close button was activated.
    pub fn on_dismiss(&mut self) -> PopupTransition {
        match std::mem::take(self) {
            PopupState::Closed => PopupTransition::Unchanged,
            PopupState::Open(body) => PopupTransition::Closed(body),
        }
    }
}

/// The close button of the open popup was pressed.
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct PopupDismissed;

/// Root node of a popup panel.
#[derive(Component)]
pub struct PopupPanel {
    pub body: BodyId,
}

#[derive(Component)]
pub struct PopupCloseButton;

/// Preloaded popup images keyed by body. Images that fail to load are dropped and their popups
/// open without media.
#[derive(Resource, Clone, Debug, Default)]
pub struct PopupMedia {
    images: HashMap<BodyId, TrackedTexture>,
    loading: Vec<BodyId>,
}

impl PopupMedia {
    pub fn insert(&mut self, body: BodyId, texture: TrackedTexture) {
        self.loading.push(body.clone());
        self.images.insert(body, texture);
    }

    pub fn image(&self, body: &BodyId) -> Option<Handle<Image>> {
        self.images.get(body).map(|texture| texture.handle.clone())
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Stop watching loaded images and drop failed ones.
    pub fn settle(
        &mut self,
        status: impl Fn(&Handle<Image>) -> TextureStatus,
    ) -> Vec<AssetMissingError> {
        let mut failed = Vec::new();
        let images = &mut self.images;
        self.loading.retain(|body| {
            let Some(texture) = images.get(body) else {
                return false;
            };
            match status(&texture.handle) {
                TextureStatus::Loading => true,
                TextureStatus::Loaded => false,
                TextureStatus::Failed => {
                    if let Some(texture) = images.remove(body) {
                        failed.push(AssetMissingError {
                            owner: body.to_string(),
                            slot: texture.slot,
                            path: texture.path,
                        });
                    }
                    false
                }
            }
        });
        failed
    }
}

/// What a popup shows, independent of how it is painted.
#[derive(Clone, Debug, PartialEq)]
pub struct PopupView {
    pub title: String,
    pub description: Option<String>,
    pub facts: Vec<(&'static str, String)>,
    pub media_asset_path: Option<String>,
}

pub fn popup_view(body: &CelestialBody) -> PopupView {
    let title = body
        .label_text()
        .map(str::to_string)
        .unwrap_or_else(|| body.id.to_string());
    let annotation = body.annotation.as_ref();
    let fallback_media = annotation.and_then(|a| a.media_asset_path.clone());

    match annotation.and_then(|a| a.popup.as_ref()) {
        Some(popup) => {
            let mut facts = vec![
                ("Diameter", popup.diameter.clone()),
                ("Impact chance", popup.impact_chance.clone()),
                ("Closest approach", popup.closest_approach.clone()),
            ];
            if let Some(date) = popup.approach_date {
                facts.push(("Approach date", date.format("%B %-d, %Y").to_string()));
            }
            PopupView {
                title,
                description: Some(popup.description.clone()),
                facts,
                media_asset_path: popup.media_asset_path.clone().or(fallback_media),
            }
        }
        None => PopupView {
            title,
            description: None,
            facts: Vec::new(),
            media_asset_path: fallback_media,
        },
    }
}

pub fn load_popup_media(
    mut commands: Commands,
    registry: Res<BodyRegistry>,
    asset_server: Res<AssetServer>,
) {
    let mut media = PopupMedia::default();
    for (_, body) in registry.all().filter(|(_, body)| body.pickable) {
        if let Some(path) = popup_view(body).media_asset_path {
            media.insert(
                body.id.clone(),
                TrackedTexture::load(TextureSlot::Media, &path, &asset_server),
            );
        }
    }
    debug!("Queued {} popup images", media.len());
    commands.insert_resource(media);
}

pub fn drop_missing_popup_media(asset_server: Res<AssetServer>, mut media: ResMut<PopupMedia>) {
    if media.loading.is_empty() {
        return;
    }
    for err in media.settle(|handle| texture_status(&asset_server, handle)) {
        warn!("{}; popup opens without it", err);
    }
}

/// Turn close-button presses into [`PopupDismissed`].
pub fn popup_close_button(
    buttons: Query<&Interaction, (Changed<Interaction>, With<PopupCloseButton>)>,
    mut dismissed: MessageWriter<PopupDismissed>,
) {
    if buttons
        .iter()
        .any(|interaction| *interaction == Interaction::Pressed)
    {
        dismissed.write(PopupDismissed);
    }
}

pub fn apply_popup_transitions(
    mut commands: Commands,
    mut picks: MessageReader<BodyPicked>,
    mut dismissals: MessageReader<PopupDismissed>,
    mut state: ResMut<PopupState>,
    registry: Res<BodyRegistry>,
    media: Res<PopupMedia>,
    overlay: Query<Entity, With<OverlayRoot>>,
    panels: Query<(Entity, &PopupPanel)>,
) {
    let dismissed = dismissals.read().count() > 0;
    // Only the last pick of a frame matters.
    let picked = picks.read().last().map(|picked| picked.0.body.clone());

    if dismissed {
        if let PopupTransition::Closed(body) = state.on_dismiss() {
            info!("Popup closed for {}", body);
        }
        despawn_panels(&mut commands, &panels);
    }

    let Some(body_id) = picked else {
        return;
    };
    let Some(body) = registry.body(&body_id) else {
        warn!("Picked unknown body {}", body_id);
        return;
    };

    match state.on_pick(Some(&body_id)) {
        PopupTransition::Opened(id) => info!("Popup opened for {}", id),
        PopupTransition::Replaced { from, to } => info!("Popup for {} replaced by {}", from, to),
        PopupTransition::Unchanged | PopupTransition::Closed(_) => return,
    }

    if !dismissed {
        despawn_panels(&mut commands, &panels);
    }
    let view = popup_view(body);
    let image = media.image(&body_id);
    spawn_popup(&mut commands, overlay.iter().next(), &body_id, &view, image);
}

fn despawn_panels(commands: &mut Commands, panels: &Query<(Entity, &PopupPanel)>) {
    for (entity, panel) in panels.iter() {
        debug!("Despawning popup panel for {}", panel.body);
        commands.entity(entity).despawn();
    }
}

fn spawn_popup(
    commands: &mut Commands,
    parent: Option<Entity>,
    body: &BodyId,
    view: &PopupView,
    image: Option<Handle<Image>>,
) -> Entity {
    let mut panel = commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Percent(50.0),
            top: Val::Percent(50.0),
            width: Val::Px(PANEL_WIDTH),
            margin: UiRect {
                left: Val::Px(-PANEL_WIDTH / 2.0),
                top: Val::Px(-MEDIA_HEIGHT),
                ..default()
            },
            flex_direction: FlexDirection::Column,
            padding: UiRect::all(Val::Px(12.0)),
            row_gap: Val::Px(6.0),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.8)),
        Interaction::default(),
        GlobalZIndex(10),
        PopupPanel { body: body.clone() },
        Name::new(format!("{} popup", body)),
    ));
    if let Some(parent) = parent {
        panel.insert(ChildOf(parent));
    }
    let panel = panel.id();

    commands.spawn((
        Text::new(view.title.clone()),
        TextFont::from_font_size(18.0),
        TextColor(Color::WHITE),
        ChildOf(panel),
    ));

    if let Some(handle) = image {
        commands.spawn((
            ImageNode::new(handle),
            Node {
                width: Val::Percent(100.0),
                height: Val::Px(MEDIA_HEIGHT),
                ..default()
            },
            ChildOf(panel),
        ));
    }

    if let Some(description) = &view.description {
        commands.spawn((
            Text::new(description.clone()),
            TextFont::from_font_size(13.0),
            TextColor(Color::srgb(0.85, 0.85, 0.85)),
            ChildOf(panel),
        ));
    }

    for (label, value) in &view.facts {
        commands.spawn((
            Text::new(format!("{label}: {value}")),
            TextFont::from_font_size(12.0),
            TextColor(Color::WHITE),
            ChildOf(panel),
        ));
    }

    commands
        .spawn((
            Button,
            Node {
                align_self: AlignSelf::FlexEnd,
                padding: UiRect::axes(Val::Px(10.0), Val::Px(4.0)),
                ..default()
            },
            BackgroundColor(Color::srgb(0.25, 0.25, 0.3)),
            PopupCloseButton,
            ChildOf(panel),
        ))
        .with_child((
            Text::new("Close"),
            TextFont::from_font_size(12.0),
            TextColor(Color::WHITE),
        ));

    panel
}
