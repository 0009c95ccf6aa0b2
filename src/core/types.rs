//! Core type definitions used throughout the codebase

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use glam::Vec3;

/// Unique identifier for entities (emitters, listeners, relays, agents, targets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell entities apart in logs
        let s = self.0.simple().to_string();
        write!(f, "{}", &s[..8])
    }
}

/// Simulation time in seconds since world start
pub type SimTime = f32;

/// Category of a sound. Closed set; suspicion tables are indexed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SoundTag {
    General,
    Debug,
    Player,
    Environment,
    Resonance,
    Lyre,
    Npc,
    Stone,
    Bell,
    Door,
}

impl SoundTag {
    pub const COUNT: usize = 10;

    pub const ALL: [SoundTag; SoundTag::COUNT] = [
        SoundTag::General,
        SoundTag::Debug,
        SoundTag::Player,
        SoundTag::Environment,
        SoundTag::Resonance,
        SoundTag::Lyre,
        SoundTag::Npc,
        SoundTag::Stone,
        SoundTag::Bell,
        SoundTag::Door,
    ];

    /// Dense index for enum-keyed arrays
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            SoundTag::General => "General",
            SoundTag::Debug => "Debug",
            SoundTag::Player => "Player",
            SoundTag::Environment => "Environment",
            SoundTag::Resonance => "Resonance",
            SoundTag::Lyre => "Lyre",
            SoundTag::Npc => "Npc",
            SoundTag::Stone => "Stone",
            SoundTag::Bell => "Bell",
            SoundTag::Door => "Door",
        }
    }
}

impl fmt::Display for SoundTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SoundTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoundTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown sound tag '{}'", s))
    }
}

/// Convert a `[x, y, z]` triple from config files
pub fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::from_array(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_equality() {
        let a = EntityId::new();
        let b = a;
        assert_eq!(a, b);
        assert_ne!(a, EntityId::new());
    }

    #[test]
    fn test_sound_tag_index_matches_all_order() {
        for (i, tag) in SoundTag::ALL.iter().enumerate() {
            assert_eq!(tag.index(), i);
        }
    }

    #[test]
    fn test_sound_tag_parse() {
        assert_eq!("Stone".parse::<SoundTag>(), Ok(SoundTag::Stone));
        assert_eq!("npc".parse::<SoundTag>(), Ok(SoundTag::Npc));
        assert!("Thunder".parse::<SoundTag>().is_err());
    }

    #[test]
    fn test_entity_id_display_is_short() {
        let id = EntityId::new();
        assert_eq!(id.to_string().len(), 8);
    }
}
