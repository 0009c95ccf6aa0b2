//! Timed emissions for wave patterns
//!
//! Each pattern wave becomes one entry keyed by absolute fire time. Entries
//! are polled every tick; destroying the owner drops its pending entries.

use crate::core::types::{EntityId, SimTime, SoundTag, Vec3};
use crate::waves::notification::ContributorHistory;
use crate::waves::params::{WaveParams, WavePattern};

/// Where a scheduled wave is emitted from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmissionSource {
    /// Fixed world position
    Point(Vec3),
    /// Position of an entity at fire time (moving source)
    Follow(EntityId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEmission {
    pub fire_at: SimTime,
    pub owner: EntityId,
    pub source: EmissionSource,
    pub tag: SoundTag,
    pub params: WaveParams,
    pub history: Option<ContributorHistory>,
}

#[derive(Debug, Clone, Default)]
pub struct EmissionSchedule {
    pending: Vec<ScheduledEmission>,
}

impl EmissionSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every wave of `pattern`, relative to `now`
    pub fn schedule_pattern(
        &mut self,
        now: SimTime,
        owner: EntityId,
        source: EmissionSource,
        tag: SoundTag,
        pattern: &WavePattern,
        history: Option<&ContributorHistory>,
    ) {
        for wave in &pattern.waves {
            self.pending.push(ScheduledEmission {
                fire_at: now + wave.time_offset.max(0.0),
                owner,
                source,
                tag,
                params: wave.params,
                history: history.cloned(),
            });
        }
    }

    /// Remove and return entries due at `now`, in fire-time order
    pub fn take_due(&mut self, now: SimTime) -> Vec<ScheduledEmission> {
        let mut due = Vec::new();
        self.pending.retain(|e| {
            if e.fire_at <= now {
                due.push(e.clone());
                false
            } else {
                true
            }
        });
        // Stable sort keeps scheduling order for equal fire times
        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at));
        due
    }

    /// Drop everything `owner` still has pending. Returns how many.
    pub fn cancel_owner(&mut self, owner: EntityId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|e| e.owner != owner);
        before - self.pending.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_for(&self, owner: EntityId) -> usize {
        self.pending.iter().filter(|e| e.owner == owner).count()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waves::params::PatternWave;

    fn pattern(offsets: &[f32]) -> WavePattern {
        WavePattern::new(
            offsets
                .iter()
                .map(|&o| PatternWave::new(o, WaveParams::default()))
                .collect(),
        )
    }

    #[test]
    fn test_entries_fire_at_their_offsets() {
        let mut schedule = EmissionSchedule::new();
        let owner = EntityId::new();
        schedule.schedule_pattern(
            1.0,
            owner,
            EmissionSource::Point(Vec3::ZERO),
            SoundTag::Bell,
            &pattern(&[0.0, 0.5, 1.0]),
            None,
        );

        assert_eq!(schedule.take_due(1.0).len(), 1);
        assert!(schedule.take_due(1.4).is_empty());
        assert_eq!(schedule.take_due(1.6).len(), 1);
        assert_eq!(schedule.take_due(5.0).len(), 1);
        assert_eq!(schedule.pending_count(), 0);
    }

    #[test]
    fn test_cancel_owner_only_drops_that_owner() {
        let mut schedule = EmissionSchedule::new();
        let a = EntityId::new();
        let b = EntityId::new();
        let p = pattern(&[0.5, 1.0]);
        schedule.schedule_pattern(0.0, a, EmissionSource::Follow(a), SoundTag::Npc, &p, None);
        schedule.schedule_pattern(0.0, b, EmissionSource::Follow(b), SoundTag::Npc, &p, None);

        assert_eq!(schedule.cancel_owner(a), 2);
        assert_eq!(schedule.pending_for(a), 0);
        assert_eq!(schedule.pending_for(b), 2);
    }

    #[test]
    fn test_due_entries_sorted_by_fire_time() {
        let mut schedule = EmissionSchedule::new();
        let owner = EntityId::new();
        schedule.schedule_pattern(
            0.0,
            owner,
            EmissionSource::Point(Vec3::ZERO),
            SoundTag::Door,
            &pattern(&[0.3, 0.1, 0.2]),
            None,
        );
        let due = schedule.take_due(1.0);
        let times: Vec<f32> = due.iter().map(|e| e.fire_at).collect();
        assert_eq!(times, vec![0.1, 0.2, 0.3]);
    }
}
