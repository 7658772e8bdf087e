//! User interface module
//!
//! This module handles the 2D overlay: body labels, click picking and the
//! informational popup.

use bevy::camera::CameraUpdateSystems;
use bevy::prelude::*;
use bevy::transform::TransformSystems;

pub mod labels;
pub mod picking;
pub mod popup;

pub use picking::{BodyPicked, resolve_click_picks};
pub use popup::{PopupDismissed, PopupState};

use crate::visualization::advance_spins;

/// Plugin for overlay labels, picking and popups
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PopupState>()
            .init_resource::<popup::PopupMedia>()
            .add_message::<BodyPicked>()
            .add_message::<PopupDismissed>()
            .add_systems(
                Startup,
                (labels::spawn_overlay_root, popup::load_popup_media),
            )
            .add_systems(PostStartup, labels::spawn_overlay_labels)
            .add_systems(
                Update,
                (
                    (
                        resolve_click_picks,
                        popup::popup_close_button,
                        popup::apply_popup_transitions,
                    )
                        .chain()
                        .before(advance_spins),
                    popup::drop_missing_popup_media,
                ),
            )
            .add_systems(
                PostUpdate,
                labels::sync_overlay_labels
                    .after(TransformSystems::Propagate)
                    .after(CameraUpdateSystems),
            );
    }
}
