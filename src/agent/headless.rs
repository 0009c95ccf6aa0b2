//! Engine-free collaborators used by the simulation runner and tests

use std::collections::VecDeque;

use crate::agent::collaborators::{AnimationTrigger, AudioPlayback, Navigation, SpatialQuery};
use crate::core::types::Vec3;

/// Moves in a straight line toward its destination at the set speed
#[derive(Debug, Clone)]
pub struct KinematicNavigator {
    position: Vec3,
    destination: Option<Vec3>,
    forward: Vec3,
    speed: f32,
    stopped: bool,
}

impl KinematicNavigator {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            destination: None,
            forward: Vec3::Z,
            speed: 0.0,
            stopped: false,
        }
    }

    pub fn with_forward(mut self, forward: Vec3) -> Self {
        self.forward = forward.try_normalize().unwrap_or(Vec3::Z);
        self
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Move for `dt` seconds; turning is instant
    pub fn step(&mut self, dt: f32) {
        let Some(destination) = self.destination else {
            return;
        };
        if self.stopped || self.speed <= 0.0 {
            return;
        }

        let to_target = destination - self.position;
        let distance = to_target.length();
        if distance <= f32::EPSILON {
            return;
        }

        let direction = to_target / distance;
        self.forward = direction;
        let travel = (self.speed * dt).min(distance);
        self.position += direction * travel;
    }
}

impl Navigation for KinematicNavigator {
    fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
    }

    fn remaining_distance(&self) -> f32 {
        self.destination
            .map(|d| d.distance(self.position))
            .unwrap_or(0.0)
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn forward(&self) -> Vec3 {
        self.forward
    }
}

/// Sphere that blocks sight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occluder {
    pub center: Vec3,
    pub radius: f32,
    pub layer: u32,
}

/// Empty level with optional spherical occluders
#[derive(Debug, Clone, Default)]
pub struct OpenSpace {
    pub occluders: Vec<Occluder>,
}

impl OpenSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_occluder(mut self, center: Vec3, radius: f32) -> Self {
        self.occluders.push(Occluder {
            center,
            radius,
            layer: 1,
        });
        self
    }
}

impl SpatialQuery for OpenSpace {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: u32) -> bool {
        let Some(dir) = direction.try_normalize() else {
            return false;
        };
        self.occluders
            .iter()
            .filter(|o| o.layer & mask != 0)
            .any(|o| {
                // Closest approach of the ray to the sphere center
                let along = (o.center - origin).dot(dir).clamp(0.0, max_distance);
                let closest = origin + dir * along;
                closest.distance_squared(o.center) <= o.radius * o.radius
            })
    }
}

/// One recorded playback
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedClip {
    pub clip: String,
    pub position: Vec3,
    pub volume: f32,
    pub pitch: f32,
}

/// Entries a recording log keeps before dropping the oldest
pub const LOG_CAPACITY: usize = 256;

fn push_bounded<T>(log: &mut VecDeque<T>, capacity: usize, entry: T) {
    if capacity == 0 {
        return;
    }
    if log.len() == capacity {
        log.pop_front();
    }
    log.push_back(entry);
}

/// Records the most recent audio cues instead of playing them
#[derive(Debug, Clone)]
pub struct AudioLog {
    pub played: VecDeque<PlayedClip>,
    capacity: usize,
}

impl AudioLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            played: VecDeque::with_capacity(capacity),
            capacity,
        }
    }
}

impl Default for AudioLog {
    fn default() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }
}

impl AudioPlayback for AudioLog {
    fn play_at_position(&mut self, clip: &str, position: Vec3, volume: f32, pitch: f32) {
        tracing::debug!(clip, ?position, volume, pitch, "audio cue");
        let entry = PlayedClip {
            clip: clip.to_string(),
            position,
            volume,
            pitch,
        };
        push_bounded(&mut self.played, self.capacity, entry);
    }
}

/// Records the most recent animation events
#[derive(Debug, Clone)]
pub struct AnimationLog {
    pub fired: VecDeque<String>,
    capacity: usize,
}

impl AnimationLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fired: VecDeque::with_capacity(capacity),
            capacity,
        }
    }
}

impl Default for AnimationLog {
    fn default() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }
}

impl AnimationTrigger for AnimationLog {
    fn fire(&mut self, event: &str) {
        tracing::debug!(event, "animation fired");
        push_bounded(&mut self.fired, self.capacity, event.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigator_reaches_destination_without_overshoot() {
        let mut nav = KinematicNavigator::new(Vec3::ZERO);
        nav.set_destination(Vec3::new(3.0, 0.0, 0.0));
        nav.set_speed(2.0);

        nav.step(1.0);
        assert!((nav.position().x - 2.0).abs() < 1e-5);
        assert_eq!(nav.forward(), Vec3::X);

        nav.step(1.0);
        assert!((nav.position().x - 3.0).abs() < 1e-5);
        assert!(nav.remaining_distance() < 1e-5);
    }

    #[test]
    fn test_stopped_or_zero_speed_does_not_move() {
        let mut nav = KinematicNavigator::new(Vec3::ZERO);
        nav.set_destination(Vec3::X * 5.0);
        nav.step(1.0);
        assert_eq!(nav.position(), Vec3::ZERO);

        nav.set_speed(3.0);
        nav.set_stopped(true);
        nav.step(1.0);
        assert_eq!(nav.position(), Vec3::ZERO);
    }

    #[test]
    fn test_occluder_blocks_only_between_endpoints() {
        let space = OpenSpace::new().with_occluder(Vec3::new(5.0, 0.0, 0.0), 1.0);
        assert!(space.raycast(Vec3::ZERO, Vec3::X, 10.0, 1));
        // Behind the origin
        assert!(!space.raycast(Vec3::ZERO, -Vec3::X, 10.0, 1));
        // Not reaching it
        assert!(!space.raycast(Vec3::ZERO, Vec3::X, 3.0, 1));
        // Other layer
        assert!(!space.raycast(Vec3::ZERO, Vec3::X, 10.0, 2));
    }

    #[test]
    fn test_angle_between_degrees() {
        let space = OpenSpace::new();
        assert!((space.angle_between(Vec3::X, Vec3::Z) - 90.0).abs() < 1e-3);
        assert_eq!(space.angle_between(Vec3::ZERO, Vec3::Z), 0.0);
    }

    #[test]
    fn test_logs_record_calls() {
        let mut audio = AudioLog::default();
        audio.play_at_position("NPC Groan", Vec3::ONE, 1.0, 1.05);
        assert_eq!(audio.played[0].clip, "NPC Groan");

        let mut anim = AnimationLog::default();
        anim.fire("attack");
        assert_eq!(anim.fired, ["attack".to_string()]);
    }

    #[test]
    fn test_logs_keep_only_the_most_recent_entries() {
        let mut audio = AudioLog::with_capacity(3);
        for i in 0..10 {
            audio.play_at_position(&format!("clip{}", i), Vec3::ZERO, 1.0, 1.0);
        }
        assert_eq!(audio.played.len(), 3);
        assert_eq!(audio.played[0].clip, "clip7");
        assert_eq!(audio.played[2].clip, "clip9");

        let mut anim = AnimationLog::with_capacity(2);
        for event in ["attack", "groan", "turn"] {
            anim.fire(event);
        }
        assert_eq!(anim.fired, ["groan".to_string(), "turn".to_string()]);

        let mut silent = AudioLog::with_capacity(0);
        silent.play_at_position("NPC Groan", Vec3::ZERO, 1.0, 1.0);
        assert!(silent.played.is_empty());
    }
}
