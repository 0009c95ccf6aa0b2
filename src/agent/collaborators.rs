//! Capabilities an agent consumes from its host
//!
//! The decision core only talks to these traits. `headless` provides plain
//! implementations so the simulation runs without an engine.

use crate::core::types::Vec3;

/// Path following
pub trait Navigation {
    fn set_destination(&mut self, point: Vec3);

    /// Path distance left to the current destination
    fn remaining_distance(&self) -> f32;

    fn set_speed(&mut self, speed: f32);

    fn set_stopped(&mut self, stopped: bool);

    fn position(&self) -> Vec3;

    /// Unit facing direction
    fn forward(&self) -> Vec3;
}

/// Line of sight and angle queries against the level
pub trait SpatialQuery {
    /// True if something on `mask` blocks the ray within `max_distance`
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: u32) -> bool;

    /// Angle between two directions in degrees
    fn angle_between(&self, a: Vec3, b: Vec3) -> f32 {
        if a.length_squared() == 0.0 || b.length_squared() == 0.0 {
            return 0.0;
        }
        a.angle_between(b).to_degrees()
    }
}

pub trait AudioPlayback {
    fn play_at_position(&mut self, clip: &str, position: Vec3, volume: f32, pitch: f32);
}

pub trait AnimationTrigger {
    fn fire(&mut self, event: &str);
}

/// Something that can perform a timed attack
pub trait AttackCapable {
    fn is_attacking(&self) -> bool;

    /// Start an attack; returns false if one is already running
    fn trigger(&mut self) -> bool;
}
