//! Per-category trust table
//!
//! Each sound category carries the probability (0-100) that it means a real
//! threat. Agents lower learnable categories after fruitless investigations.

use crate::core::config::SuspicionConfig;
use crate::core::error::{EchoError, Result};
use crate::core::types::SoundTag;

/// Probability of a category that always means a threat
pub const CERTAIN: f32 = 100.0;

/// Residue below this fraction of one learning step counts as zero
const DRIFT_TOLERANCE: f32 = 1e-3;

/// Tuned starting values
pub const DEFAULT_PRESETS: [(SoundTag, f32); SoundTag::COUNT] = [
    (SoundTag::General, 0.0),
    (SoundTag::Debug, 0.0),
    (SoundTag::Player, 100.0),
    (SoundTag::Environment, 0.0),
    (SoundTag::Resonance, 95.0),
    (SoundTag::Lyre, 100.0),
    (SoundTag::Npc, 90.0),
    (SoundTag::Stone, 100.0),
    (SoundTag::Bell, 80.0),
    (SoundTag::Door, 100.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct SuspicionModel {
    probabilities: [f32; SoundTag::COUNT],
    learnable: [bool; SoundTag::COUNT],
    credible: SoundTag,
}

impl Default for SuspicionModel {
    fn default() -> Self {
        let mut probabilities = [0.0; SoundTag::COUNT];
        for (tag, p) in DEFAULT_PRESETS {
            probabilities[tag.index()] = p;
        }
        let mut learnable = [false; SoundTag::COUNT];
        learnable[SoundTag::Stone.index()] = true;

        Self {
            probabilities,
            learnable,
            credible: SoundTag::Player,
        }
    }
}

impl SuspicionModel {
    /// Build the table from config, rejecting incomplete or unknown entries
    pub fn from_config(config: &SuspicionConfig) -> Result<Self> {
        let mut probabilities = [f32::NAN; SoundTag::COUNT];
        for (name, &p) in &config.presets {
            let tag: SoundTag = name.parse().map_err(EchoError::Config)?;
            if !probabilities[tag.index()].is_nan() {
                return Err(EchoError::Config(format!(
                    "suspicion preset for {} given twice",
                    tag
                )));
            }
            if !(0.0..=CERTAIN).contains(&p) {
                return Err(EchoError::Config(format!(
                    "suspicion preset for {} must be within 0..=100, got {}",
                    tag, p
                )));
            }
            probabilities[tag.index()] = p;
        }

        let missing: Vec<&str> = SoundTag::ALL
            .iter()
            .filter(|tag| probabilities[tag.index()].is_nan())
            .map(|tag| tag.name())
            .collect();
        if !missing.is_empty() {
            return Err(EchoError::Config(format!(
                "suspicion presets missing for: {}",
                missing.join(", ")
            )));
        }

        let credible: SoundTag = config.credible.parse().map_err(EchoError::Config)?;
        if probabilities[credible.index()] != CERTAIN {
            return Err(EchoError::Config(format!(
                "credible category {} must be preset to 100",
                credible
            )));
        }

        let mut learnable = [false; SoundTag::COUNT];
        for name in &config.learnable {
            let tag: SoundTag = name.parse().map_err(EchoError::Config)?;
            if tag == credible {
                return Err(EchoError::Config(format!(
                    "credible category {} cannot be learnable",
                    tag
                )));
            }
            learnable[tag.index()] = true;
        }

        Ok(Self {
            probabilities,
            learnable,
            credible,
        })
    }

    pub fn lookup(&self, tag: SoundTag) -> f32 {
        self.probabilities[tag.index()]
    }

    pub fn is_learnable(&self, tag: SoundTag) -> bool {
        self.learnable[tag.index()]
    }

    pub fn credible_tag(&self) -> SoundTag {
        self.credible
    }

    pub fn is_credible(&self, tag: SoundTag) -> bool {
        tag == self.credible
    }

    /// Lower a learnable category by `100 / steps`, never below zero
    ///
    /// Returns true if the probability changed.
    pub fn debunk(&mut self, tag: SoundTag, steps: f32) -> bool {
        if !self.is_learnable(tag) || steps <= 0.0 {
            return false;
        }

        let step = CERTAIN / steps;
        let current = self.probabilities[tag.index()];
        let next = current - step;
        let next = if next <= step * DRIFT_TOLERANCE { 0.0 } else { next };

        self.probabilities[tag.index()] = next;
        tracing::debug!(%tag, from = current, to = next, "suspicion lowered");
        next != current
    }

    /// Snapshot of all categories, in `SoundTag::ALL` order
    pub fn entries(&self) -> impl Iterator<Item = (SoundTag, f32)> + '_ {
        SoundTag::ALL.iter().map(move |&tag| (tag, self.lookup(tag)))
    }
}
