//! Agent-local memory of recently heard sounds

use serde::{Deserialize, Serialize};

use crate::core::types::{SimTime, SoundTag, Vec3};

/// A sound an agent heard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerceivedSound {
    /// When it was heard
    pub timestamp: SimTime,
    pub origin: Vec3,
    /// Distance to the origin at the moment it was heard
    pub initial_distance: f32,
    pub tag: SoundTag,
}

impl PerceivedSound {
    pub fn new(timestamp: SimTime, origin: Vec3, initial_distance: f32, tag: SoundTag) -> Self {
        Self {
            timestamp,
            origin,
            initial_distance,
            tag,
        }
    }

    pub fn age(&self, now: SimTime) -> f32 {
        now - self.timestamp
    }
}

/// Time-bounded list of perceived sounds, oldest first
#[derive(Debug, Clone)]
pub struct PerceptionBuffer {
    sounds: Vec<PerceivedSound>,
    lifetime: f32,
}

impl PerceptionBuffer {
    pub fn new(lifetime: f32) -> Self {
        Self {
            sounds: Vec::new(),
            lifetime,
        }
    }

    pub fn push(&mut self, sound: PerceivedSound) {
        self.sounds.push(sound);
    }

    /// Drop entries whose lifetime has run out; returns how many
    pub fn prune(&mut self, now: SimTime) -> usize {
        let before = self.sounds.len();
        let lifetime = self.lifetime;
        self.sounds.retain(|s| now < s.timestamp + lifetime);
        before - self.sounds.len()
    }

    pub fn as_slice(&self) -> &[PerceivedSound] {
        &self.sounds
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    pub fn clear(&mut self) {
        self.sounds.clear();
    }
}
