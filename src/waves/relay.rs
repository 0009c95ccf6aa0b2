//! Resonance relays: listeners that answer certain sounds with a wave of
//! their own
//!
//! Loops are cut by the contributor history: a relay already in a chain's
//! history never sources that chain again.

use serde::{Deserialize, Serialize};

use crate::core::config::WaveConfig;
use crate::core::types::{EntityId, SoundTag, Vec3};
use crate::waves::material::Emission;
use crate::waves::notification::{ContributorHistory, SoundNotification};

/// `1 - distance / radius`, clamped to `[0, 1]`
pub fn distance_damper(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / radius).clamp(0.0, 1.0)
}

/// A re-emission the relay wants to make
#[derive(Debug, Clone, PartialEq)]
pub struct ResonanceEmission {
    pub position: Vec3,
    pub tag: SoundTag,
    pub emission: Emission,
    pub history: ContributorHistory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResonanceRelay {
    pub entity: EntityId,
    /// Base attenuation of this object (1 = passes magnitude through)
    pub resonance: f32,
    /// Where re-emitted waves start
    pub resonance_point: Vec3,
    /// Tag of the waves this relay emits
    pub emit_tag: SoundTag,
    /// Incoming tags that make the relay resonate
    pub triggers: Vec<SoundTag>,
}

impl ResonanceRelay {
    pub fn new(entity: EntityId, resonance_point: Vec3) -> Self {
        Self {
            entity,
            resonance: 1.0,
            resonance_point,
            emit_tag: SoundTag::Resonance,
            triggers: vec![SoundTag::Resonance, SoundTag::Lyre],
        }
    }

    pub fn with_resonance(mut self, resonance: f32) -> Self {
        self.resonance = resonance.max(0.0);
        self
    }

    pub fn with_emit_tag(mut self, tag: SoundTag) -> Self {
        self.emit_tag = tag;
        self
    }

    pub fn is_triggered_by(&self, tag: SoundTag) -> bool {
        self.triggers.contains(&tag)
    }

    /// Answer a notification heard at `relay_position`
    ///
    /// `None` when the tag does not trigger this relay, when the relay is
    /// already part of the chain, or when the attenuated wave has no radius.
    pub fn respond(
        &self,
        notification: &SoundNotification,
        relay_position: Vec3,
        config: &WaveConfig,
    ) -> Option<ResonanceEmission> {
        if notification.history.contains(self.entity) {
            return None;
        }
        if !self.is_triggered_by(notification.tag) {
            return None;
        }

        let damper = distance_damper(
            notification.distance_to(relay_position),
            notification.params.radius,
        );
        let gain = damper * self.resonance;

        let radius = (notification.params.radius * gain * config.resonance_radius_multiplier)
            .clamp(config.min_radius, config.max_radius);
        let intensity = (notification.params.intensity * gain * config.resonance_intensity_multiplier)
            .clamp(config.min_intensity, config.max_intensity);

        if radius <= 0.0 {
            return None;
        }

        Some(ResonanceEmission {
            position: self.resonance_point,
            tag: self.emit_tag,
            emission: Emission { radius, intensity },
            history: notification.history.extended(self.entity),
        })
    }

    /// Answer a direct hit by a thrown stone at `impact_speed`
    ///
    /// Only stones make a relay ring when struck; this starts a new chain.
    pub fn strike(
        &self,
        striker_tag: SoundTag,
        impact_speed: f32,
        impact_point: Vec3,
        config: &WaveConfig,
    ) -> Option<ResonanceEmission> {
        if striker_tag != SoundTag::Stone {
            return None;
        }
        let loudness = impact_speed * self.resonance;
        let radius = (loudness * config.resonance_radius_multiplier)
            .clamp(config.min_radius, config.max_radius);
        let intensity = (loudness * config.resonance_intensity_multiplier)
            .clamp(config.min_intensity, config.max_intensity);
        if radius <= 0.0 {
            return None;
        }
        Some(ResonanceEmission {
            position: impact_point,
            tag: self.emit_tag,
            emission: Emission { radius, intensity },
            history: ContributorHistory::new(),
        })
    }
}
