//! Sound field - owns the wave pool, detection volumes and pattern schedule
//!
//! One `tick` does, in order:
//! 1. advance the clock
//! 2. fire scheduled pattern waves that are due
//! 3. advance the pool (finished slots are freed)
//! 4. grow each detection volume and sweep it over the listeners
//! 5. tear down volumes whose front reached their radius
//!
//! Waves added while the caller handles deliveries start growing next tick.

use crate::core::config::WaveConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, SimTime, SoundTag, Vec3};
use crate::waves::material::{Emission, SoundMaterial};
use crate::waves::notification::{ContributorHistory, SoundNotification};
use crate::waves::params::{WaveParams, WavePattern};
use crate::waves::pool::WaveSlotPool;
use crate::waves::schedule::{EmissionSchedule, EmissionSource};
use crate::waves::volume::{Listener, PropagationVolume, SoundDelivery};

/// A wave that was allocated during a tick
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedWave {
    pub slot: usize,
    pub origin_entity: EntityId,
    pub position: Vec3,
    pub tag: SoundTag,
}

/// A scheduled wave that could not be emitted
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedWave {
    pub origin_entity: EntityId,
    pub tag: SoundTag,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    PoolFull,
    SourceGone,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::PoolFull => "pool full",
            DropReason::SourceGone => "source gone",
        }
    }
}

/// Everything that happened in the field during one tick
#[derive(Debug, Clone, Default)]
pub struct FieldTick {
    pub deliveries: Vec<SoundDelivery>,
    pub emitted: Vec<EmittedWave>,
    pub dropped: Vec<DroppedWave>,
    pub finished: Vec<usize>,
}

pub struct SoundField {
    config: WaveConfig,
    pool: WaveSlotPool,
    volumes: Vec<PropagationVolume>,
    schedule: EmissionSchedule,
    now: SimTime,
}

impl SoundField {
    /// Build an empty field; fails if the wave bounds are inconsistent
    pub fn new(config: WaveConfig) -> Result<Self> {
        config.validate()?;
        let pool = WaveSlotPool::with_capacity(config.capacity);
        Ok(Self {
            config,
            pool,
            volumes: Vec::new(),
            schedule: EmissionSchedule::new(),
            now: 0.0,
        })
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    pub fn pool(&self) -> &WaveSlotPool {
        &self.pool
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn active_waves(&self) -> usize {
        self.pool.active_count()
    }

    pub fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    pub fn pending_emissions(&self) -> usize {
        self.schedule.pending_count()
    }

    /// Start one wavefront at `position`
    ///
    /// `history` is the chain this wave continues; leave it `None` for a new
    /// sound. A full pool is reported as `EchoError::PoolExhausted`.
    pub fn add_sound_wave(
        &mut self,
        origin_entity: EntityId,
        position: Vec3,
        tag: SoundTag,
        params: WaveParams,
        history: Option<ContributorHistory>,
    ) -> Result<usize> {
        params.validate()?;
        let slot = self.pool.allocate(position, params)?;
        let notification = SoundNotification::new(origin_entity, position, tag, params, history);
        tracing::debug!(
            slot,
            origin = %origin_entity,
            %tag,
            radius = params.radius,
            "sound wave added"
        );
        self.volumes.push(PropagationVolume::new(slot, notification));
        Ok(slot)
    }

    /// Start a wave shaped by a sound material
    pub fn emit_from_material(
        &mut self,
        origin_entity: EntityId,
        position: Vec3,
        tag: SoundTag,
        material: &SoundMaterial,
        emission: Emission,
        history: Option<ContributorHistory>,
    ) -> Result<usize> {
        let params = material.wave_params(emission, &self.config);
        self.add_sound_wave(origin_entity, position, tag, params, history)
    }

    /// Queue every wave of `pattern` from `source`, starting now
    pub fn add_sound_wave_pattern(
        &mut self,
        owner: EntityId,
        source: EmissionSource,
        tag: SoundTag,
        pattern: &WavePattern,
        history: Option<&ContributorHistory>,
    ) -> Result<()> {
        for wave in &pattern.waves {
            wave.params.validate()?;
        }
        self.schedule
            .schedule_pattern(self.now, owner, source, tag, pattern, history);
        Ok(())
    }

    /// Force a wave to stop; its detection volume goes with it
    ///
    /// False if the slot was not running.
    pub fn stop_sound_wave(&mut self, index: usize) -> bool {
        if !self.pool.release(index) {
            return false;
        }
        self.volumes.retain(|v| v.slot != index);
        true
    }

    /// Drop pending pattern waves of a destroyed entity
    pub fn cancel_patterns(&mut self, owner: EntityId) -> usize {
        let cancelled = self.schedule.cancel_owner(owner);
        if cancelled > 0 {
            tracing::debug!(owner = %owner, cancelled, "pattern emissions cancelled");
        }
        cancelled
    }

    /// Clear all waves, volumes and pending emissions (scene reset)
    pub fn reset(&mut self) {
        self.pool.reset();
        self.volumes.clear();
        self.schedule.clear();
    }

    /// Advance the field by `dt` seconds
    ///
    /// `position_of` resolves followed entities for moving pattern sources;
    /// returning `None` drops the emission.
    pub fn tick<F>(&mut self, dt: f32, listeners: &[Listener], position_of: F) -> FieldTick
    where
        F: Fn(EntityId) -> Option<Vec3>,
    {
        let mut out = FieldTick::default();
        self.now += dt;

        for entry in self.schedule.take_due(self.now) {
            let position = match entry.source {
                EmissionSource::Point(p) => Some(p),
                EmissionSource::Follow(entity) => position_of(entity),
            };
            let Some(position) = position else {
                tracing::debug!(owner = %entry.owner, "scheduled wave dropped, source gone");
                out.dropped.push(DroppedWave {
                    origin_entity: entry.owner,
                    tag: entry.tag,
                    reason: DropReason::SourceGone,
                });
                continue;
            };

            match self.add_sound_wave(entry.owner, position, entry.tag, entry.params, entry.history) {
                Ok(slot) => out.emitted.push(EmittedWave {
                    slot,
                    origin_entity: entry.owner,
                    position,
                    tag: entry.tag,
                }),
                Err(_) => out.dropped.push(DroppedWave {
                    origin_entity: entry.owner,
                    tag: entry.tag,
                    reason: DropReason::PoolFull,
                }),
            }
        }

        out.finished = self.pool.advance(dt);

        for volume in &mut self.volumes {
            volume.advance(dt);
            out.deliveries.extend(volume.sweep(listeners));
        }
        self.volumes.retain(|v| !v.is_finished());

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EchoError;
    use crate::waves::params::PatternWave;

    fn field(capacity: usize) -> SoundField {
        SoundField::new(WaveConfig {
            capacity,
            ..WaveConfig::default()
        })
        .unwrap()
    }

    fn no_entities(_: EntityId) -> Option<Vec3> {
        None
    }

    #[test]
    fn test_inverted_bounds_rejected_at_construction() {
        let radius = WaveConfig {
            min_radius: 60.0,
            max_radius: 50.0,
            ..WaveConfig::default()
        };
        assert!(matches!(SoundField::new(radius), Err(EchoError::Config(_))));

        let intensity = WaveConfig {
            min_intensity: 4.0,
            max_intensity: 3.0,
            ..WaveConfig::default()
        };
        assert!(matches!(SoundField::new(intensity), Err(EchoError::Config(_))));

        let empty = WaveConfig {
            capacity: 0,
            ..WaveConfig::default()
        };
        assert!(SoundField::new(empty).is_err());
    }

    #[test]
    fn test_add_rejects_invalid_params() {
        let mut f = field(4);
        let bad = WaveParams {
            radius: 0.0,
            ..WaveParams::default()
        };
        assert!(f.add_sound_wave(EntityId::new(), Vec3::ZERO, SoundTag::General, bad, None).is_err());
        assert_eq!(f.active_waves(), 0);
    }

    #[test]
    fn test_wave_and_volume_finish_together() {
        let mut f = field(4);
        let params = WaveParams::new(4.0, 8.0).unwrap();
        let slot = f
            .add_sound_wave(EntityId::new(), Vec3::ZERO, SoundTag::Bell, params, None)
            .unwrap();

        let first = f.tick(0.25, &[], no_entities);
        assert!(first.finished.is_empty());
        assert_eq!(f.volume_count(), 1);

        let second = f.tick(0.25, &[], no_entities);
        assert_eq!(second.finished, vec![slot]);
        assert_eq!(f.volume_count(), 0);
        assert_eq!(f.active_waves(), 0);
    }

    #[test]
    fn test_stop_removes_volume() {
        let mut f = field(4);
        let slot = f
            .add_sound_wave(EntityId::new(), Vec3::ZERO, SoundTag::Door, WaveParams::default(), None)
            .unwrap();
        assert!(f.stop_sound_wave(slot));
        assert_eq!(f.volume_count(), 0);

        let listener = Listener::new(EntityId::new(), Vec3::ZERO);
        assert!(f.tick(0.1, &[listener], no_entities).deliveries.is_empty());
        assert!(!f.stop_sound_wave(99));
        assert!(!f.stop_sound_wave(slot));
    }

    #[test]
    fn test_pattern_follows_moving_source() {
        let mut f = field(4);
        let owner = EntityId::new();
        let pattern = WavePattern::new(vec![PatternWave::new(0.0, WaveParams::default())]);
        f.add_sound_wave_pattern(owner, EmissionSource::Follow(owner), SoundTag::Npc, &pattern, None)
            .unwrap();

        let target = Vec3::new(3.0, 0.0, 4.0);
        let tick = f.tick(0.1, &[], |id| (id == owner).then_some(target));
        assert_eq!(tick.emitted.len(), 1);
        assert_eq!(tick.emitted[0].position, target);
    }

    #[test]
    fn test_pattern_from_missing_source_is_dropped() {
        let mut f = field(4);
        let owner = EntityId::new();
        f.add_sound_wave_pattern(
            owner,
            EmissionSource::Follow(owner),
            SoundTag::Npc,
            &WavePattern::default(),
            None,
        )
        .unwrap();
        let tick = f.tick(0.1, &[], no_entities);
        assert_eq!(tick.dropped.len(), 1);
        assert_eq!(tick.dropped[0].reason, DropReason::SourceGone);
    }

    #[test]
    fn test_scheduled_wave_into_full_pool_is_dropped() {
        let mut f = field(1);
        f.add_sound_wave(EntityId::new(), Vec3::ZERO, SoundTag::General, WaveParams::default(), None)
            .unwrap();
        f.add_sound_wave_pattern(
            EntityId::new(),
            EmissionSource::Point(Vec3::ONE),
            SoundTag::Bell,
            &WavePattern::default(),
            None,
        )
        .unwrap();
        let tick = f.tick(0.1, &[], no_entities);
        assert_eq!(tick.dropped[0].reason, DropReason::PoolFull);
        assert_eq!(f.active_waves(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut f = field(4);
        f.add_sound_wave(EntityId::new(), Vec3::ZERO, SoundTag::General, WaveParams::default(), None)
            .unwrap();
        f.add_sound_wave_pattern(
            EntityId::new(),
            EmissionSource::Point(Vec3::ZERO),
            SoundTag::Bell,
            &WavePattern::default(),
            None,
        )
        .unwrap();
        f.reset();
        assert_eq!(f.active_waves(), 0);
        assert_eq!(f.volume_count(), 0);
        assert_eq!(f.pending_emissions(), 0);
    }
}
