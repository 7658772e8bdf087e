//! Per-frame spin of orbit pivots, body pivots, surface layers and the starfield.

use bevy::prelude::*;
use std::f32::consts::TAU;

use crate::core::config::AnimationTiming;

/// How spin increments are scaled each frame.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationConfig {
    pub timing: AnimationTiming,
}

/// Rotation about the local (tilted) Y axis that advances every frame.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    /// Radians added per frame at the reference rate.
    pub rate: f32,
    /// Current angle, always in `[0, 2π)`.
    pub angle: f32,
    /// Fixed orientation the spin is applied under.
    pub tilt: Quat,
}

impl Spin {
    pub fn new(rate: f32) -> Self {
        Self {
            rate,
            angle: 0.0,
            tilt: Quat::IDENTITY,
        }
    }

    pub fn starting_at(mut self, angle: f32) -> Self {
        self.angle = angle.rem_euclid(TAU);
        self
    }

    pub fn tilted(mut self, tilt: Quat) -> Self {
        self.tilt = tilt;
        self
    }

    pub fn advance(&mut self, increment: f32) {
        self.angle = (self.angle + increment).rem_euclid(TAU);
    }

    pub fn rotation(&self) -> Quat {
        self.tilt * Quat::from_rotation_y(self.angle)
    }
}

/// Multiplier applied to every per-frame rate.
pub fn frame_scale(timing: AnimationTiming, delta_secs: f32) -> f32 {
    match timing {
        AnimationTiming::PerFrame => 1.0,
        AnimationTiming::FrameDelta { reference_fps } => delta_secs * reference_fps,
    }
}

pub fn advance_spins(
    time: Res<Time>,
    config: Res<AnimationConfig>,
    mut spins: Query<(&mut Spin, &mut Transform)>,
) {
    let scale = frame_scale(config.timing, time.delta_secs());
    for (mut spin, mut transform) in spins.iter_mut() {
        if spin.rate == 0.0 {
            continue;
        }
        let increment = spin.rate * scale;
        spin.advance(increment);
        transform.rotation = spin.rotation();
    }
}
