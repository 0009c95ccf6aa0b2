//! Simulation configuration with documented constants
//!
//! All tuning numbers are collected here with explanations of their purpose
//! and how they interact with each other. Every section can be overridden
//! from a TOML file; missing keys fall back to the defaults below.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{EchoError, Result};
use crate::core::types::SoundTag;
use crate::perception::suspicion::{SuspicionModel, DEFAULT_PRESETS};
use crate::waves::material::MaterialKind;
use crate::waves::params::{WaveParams, WavePattern};

/// Global bounds and multipliers for wave emission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    // === POOL ===
    /// Maximum number of simultaneously travelling wavefronts
    ///
    /// Allocation beyond this fails closed; older waves are never evicted.
    pub capacity: usize,

    // === SHAPE ===
    /// Propagation speed used for material emissions (m/s)
    pub speed: f32,
    /// Border width handed to presentation (fraction of wave width)
    pub border_width: f32,
    /// Fade-out strength handed to presentation
    pub fade_out: f32,
    pub hard_wave: bool,
    pub soft_wave: bool,

    // === RADIUS BOUNDS ===
    /// Smallest radius a material emission can have
    pub min_radius: f32,
    /// Largest radius a material emission can have
    ///
    /// Also the reference for audio volume normalization.
    pub max_radius: f32,
    /// Loudness to radius factor for collisions
    ///
    /// At 0.5 a 1 kg object hitting a hard floor (softness 0.2) at 10 m/s
    /// produces a 4 m wave.
    pub collision_radius_multiplier: f32,
    /// Scales re-emitted radius for resonance relays
    pub resonance_radius_multiplier: f32,

    // === INTENSITY BOUNDS ===
    pub min_intensity: f32,
    pub max_intensity: f32,
    /// Loudness to intensity factor for collisions
    ///
    /// Deliberately small: collision loudness is in kg*m/s and quickly
    /// saturates the intensity range otherwise.
    pub collision_intensity_multiplier: f32,
    pub resonance_intensity_multiplier: f32,

    // === WIDTH BOUNDS ===
    /// Width at pitch 1.0 (high pitch = thin wave)
    pub min_width: f32,
    /// Width at pitch 0.0 (low pitch = thick wave)
    pub max_width: f32,

    // === COLOR ===
    /// Ring tint per material kind (RGB)
    pub color_water: [f32; 3],
    pub color_ceramic: [f32; 3],
    pub color_stone: [f32; 3],
    pub color_metal: [f32; 3],

    // === AUDIO ===
    /// Scales radius/max_radius into an audio volume before clamping to 0..1
    pub audio_volume_multiplier: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            capacity: 32,
            speed: 8.0,
            border_width: 0.15,
            fade_out: 2.0,
            hard_wave: true,
            soft_wave: false,
            min_radius: 0.0,
            max_radius: 50.0,
            collision_radius_multiplier: 0.5,
            resonance_radius_multiplier: 1.0,
            min_intensity: 0.33,
            max_intensity: 3.0,
            collision_intensity_multiplier: 0.003,
            resonance_intensity_multiplier: 1.0,
            min_width: 0.5,
            max_width: 15.0,
            color_water: [0.35, 0.6, 1.0],
            color_ceramic: [0.95, 0.85, 0.7],
            color_stone: [0.7, 0.7, 0.7],
            color_metal: [1.0, 0.8, 0.35],
            audio_volume_multiplier: 1.2,
        }
    }
}

impl WaveConfig {
    /// Check bounds that the emission clamps rely on
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(EchoError::Config("waves.capacity must be at least 1".into()));
        }
        if self.speed <= 0.0 {
            return Err(EchoError::Config(format!(
                "waves.speed must be positive, got {}",
                self.speed
            )));
        }
        if self.min_radius < 0.0 || self.min_radius > self.max_radius {
            return Err(EchoError::Config(format!(
                "waves.min_radius ({}) must be within 0..=max_radius ({})",
                self.min_radius, self.max_radius
            )));
        }
        if self.min_intensity > self.max_intensity {
            return Err(EchoError::Config(format!(
                "waves.min_intensity ({}) should be <= max_intensity ({})",
                self.min_intensity, self.max_intensity
            )));
        }
        if self.min_width < 0.0 || self.min_width > self.max_width {
            return Err(EchoError::Config(format!(
                "waves.min_width ({}) must be within 0..=max_width ({})",
                self.min_width, self.max_width
            )));
        }
        Ok(())
    }

    pub fn color_of(&self, kind: MaterialKind) -> [f32; 3] {
        match kind {
            MaterialKind::Water => self.color_water,
            MaterialKind::Ceramic => self.color_ceramic,
            MaterialKind::Stone => self.color_stone,
            MaterialKind::Metal => self.color_metal,
        }
    }
}

/// Per-agent behaviour tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    // === MOVEMENT ===
    /// Patrol speed (m/s)
    pub walk_speed: f32,
    /// Speed while chasing a sound or the target (m/s)
    pub chase_speed: f32,
    /// Remaining path distance at which a waypoint counts as reached
    pub stopping_distance: f32,
    /// Distance to a sound origin at which the investigation is over
    pub arrival_threshold: f32,
    /// Pause after reaching a waypoint or investigating a sound (seconds)
    pub waiting_time: f32,

    // === HEARING ===
    /// Sounds at or within this distance are ignored (except the credible threat)
    ///
    /// Stops agents from chasing their own groans or those of a neighbour
    /// walking right next to them.
    pub minimum_sound_distance: f32,
    /// How long a perceived sound stays in the perception buffer (seconds)
    pub sound_input_lifetime: f32,
    /// Fruitless investigations until a learnable category is ignored
    pub times_before_learned: f32,

    // === SIGHT & COMBAT ===
    pub sight_range: f32,
    pub attack_range: f32,
    /// Field of view in degrees (full cone, not half angle)
    pub fov_angle: f32,
    /// Layer mask for occlusion raycasts
    pub sight_mask: u32,
    /// Attack lasts this long; re-triggering is suppressed meanwhile
    pub attack_duration: f32,

    // === VOCALIZATION ===
    pub min_groan_interval: f32,
    pub max_groan_interval: f32,
    pub groan_volume: f32,
    /// Pitch is drawn from 1 +/- jitter
    pub groan_pitch_jitter: f32,
    pub attack_volume: f32,
    pub attack_pitch_jitter: f32,
    pub groan_wave: WaveParams,
    pub attack_pattern: WavePattern,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            walk_speed: 2.5,
            chase_speed: 6.0,
            stopping_distance: 0.5,
            arrival_threshold: 1.1,
            waiting_time: 1.0,
            minimum_sound_distance: 2.0,
            sound_input_lifetime: 3.0,
            times_before_learned: 3.0,
            sight_range: 5.0,
            attack_range: 2.0,
            fov_angle: 100.0,
            sight_mask: 1,
            attack_duration: 1.0,
            min_groan_interval: 5.0,
            max_groan_interval: 10.0,
            groan_volume: 1.0,
            groan_pitch_jitter: 0.1,
            attack_volume: 1.0,
            attack_pitch_jitter: 0.1,
            groan_wave: WaveParams::default(),
            attack_pattern: WavePattern::default(),
        }
    }
}

/// Initial trust table for sound categories
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspicionConfig {
    /// Probability (0-100) that a category means a real threat, by tag name
    ///
    /// Must name every tag exactly once.
    pub presets: BTreeMap<String, f32>,
    /// Categories agents can learn to ignore
    pub learnable: Vec<String>,
    /// The category that always passes perception filters; pinned at 100
    pub credible: String,
}

impl Default for SuspicionConfig {
    fn default() -> Self {
        let presets = DEFAULT_PRESETS
            .into_iter()
            .map(|(tag, p)| (tag.name().to_string(), p))
            .collect();

        Self {
            presets,
            learnable: vec![SoundTag::Stone.name().to_string()],
            credible: SoundTag::Player.name().to_string(),
        }
    }
}

/// Configuration for the simulation systems
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub waves: WaveConfig,
    pub agent: AgentConfig,
    pub suspicion: SuspicionConfig,
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        self.waves.validate()?;

        let a = &self.agent;
        if a.walk_speed < 0.0 || a.chase_speed < 0.0 {
            return Err(EchoError::Config("agent speeds must not be negative".into()));
        }
        if a.attack_range > a.sight_range {
            return Err(EchoError::Config(format!(
                "agent.attack_range ({}) should be <= sight_range ({})",
                a.attack_range, a.sight_range
            )));
        }
        if a.times_before_learned < 1.0 {
            return Err(EchoError::Config(format!(
                "agent.times_before_learned must be >= 1, got {}",
                a.times_before_learned
            )));
        }
        if a.min_groan_interval > a.max_groan_interval {
            return Err(EchoError::Config(format!(
                "agent.min_groan_interval ({}) should be <= max_groan_interval ({})",
                a.min_groan_interval, a.max_groan_interval
            )));
        }
        if a.sound_input_lifetime <= 0.0 {
            return Err(EchoError::Config("agent.sound_input_lifetime must be positive".into()));
        }
        a.groan_wave.validate()?;
        for wave in &a.attack_pattern.waves {
            wave.params.validate()?;
        }

        // Tag table completeness is checked by the suspicion model itself
        SuspicionModel::from_config(&self.suspicion)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [waves]
            capacity = 8

            [agent]
            chase_speed = 7.5
            "#,
        )
        .unwrap();
        assert_eq!(config.waves.capacity, 8);
        assert_eq!(config.waves.max_radius, 50.0);
        assert_eq!(config.agent.chase_speed, 7.5);
        assert_eq!(config.agent.walk_speed, 2.5);
    }

    #[test]
    fn test_missing_suspicion_tag_is_fatal() {
        let mut config = SimulationConfig::default();
        config.suspicion.presets.remove("Bell");
        assert!(matches!(config.validate(), Err(EchoError::Config(_))));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = SimulationConfig::default();
        config.waves.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_attack_range_beyond_sight_rejected() {
        let mut config = SimulationConfig::default();
        config.agent.attack_range = 10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let result = SimulationConfig::from_toml_str("[waves\ncapacity = ");
        assert!(matches!(result, Err(EchoError::TomlError(_))));
    }
}
