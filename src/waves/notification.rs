//! Notification tokens carried by a travelling wave

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, SoundTag, Vec3};
use crate::waves::params::WaveParams;

/// Entities that sourced or relayed one causal chain of sound
///
/// Insertion ordered, no duplicates. A relay found in here must not
/// re-emit for this chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorHistory(Vec<EntityId>);

impl ContributorHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History of a fresh chain started by `origin`
    pub fn started_by(origin: EntityId) -> Self {
        Self(vec![origin])
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.0.contains(&entity)
    }

    /// Add an entity; returns false if it was already present
    pub fn push(&mut self, entity: EntityId) -> bool {
        if self.contains(entity) {
            return false;
        }
        self.0.push(entity);
        true
    }

    /// Copy of this history extended by `entity`
    pub fn extended(&self, entity: EntityId) -> Self {
        let mut next = self.clone();
        next.push(entity);
        next
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityId> {
        self.0.iter()
    }
}

impl FromIterator<EntityId> for ContributorHistory {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        let mut history = ContributorHistory::new();
        for entity in iter {
            history.push(entity);
        }
        history
    }
}

/// What a listener receives when a wavefront passes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundNotification {
    pub origin_entity: EntityId,
    pub origin: Vec3,
    pub tag: SoundTag,
    pub params: WaveParams,
    pub history: ContributorHistory,
}

impl SoundNotification {
    /// Build a notification, making sure the origin is part of its history
    pub fn new(
        origin_entity: EntityId,
        origin: Vec3,
        tag: SoundTag,
        params: WaveParams,
        history: Option<ContributorHistory>,
    ) -> Self {
        let mut history = history.unwrap_or_default();
        history.push(origin_entity);
        Self {
            origin_entity,
            origin,
            tag,
            params,
            history,
        }
    }

    pub fn distance_to(&self, position: Vec3) -> f32 {
        self.origin.distance(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_always_in_history() {
        let origin = EntityId::new();
        let n = SoundNotification::new(origin, Vec3::ZERO, SoundTag::Bell, WaveParams::default(), None);
        assert!(n.history.contains(origin));
        assert_eq!(n.history.len(), 1);
    }

    #[test]
    fn test_inherited_history_is_kept_and_extended() {
        let a = EntityId::new();
        let b = EntityId::new();
        let history = ContributorHistory::started_by(a);
        let n = SoundNotification::new(b, Vec3::ZERO, SoundTag::Lyre, WaveParams::default(), Some(history));
        assert_eq!(n.history.iter().copied().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_push_rejects_duplicates() {
        let a = EntityId::new();
        let mut history = ContributorHistory::started_by(a);
        assert!(!history.push(a));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_extended_leaves_original_untouched() {
        let a = EntityId::new();
        let b = EntityId::new();
        let history = ContributorHistory::started_by(a);
        let next = history.extended(b);
        assert_eq!(history.len(), 1);
        assert!(next.contains(a) && next.contains(b));
    }
}
