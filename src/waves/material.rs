//! Sound materials: how an object turns loudness into a wave
//!
//! Influence on wave parameters:
//! - mass and impact speed drive radius and intensity
//! - pitch drives wave width (high pitch = thin wave)
//! - surface softness cushions collisions

use serde::{Deserialize, Serialize};

use crate::core::config::WaveConfig;
use crate::waves::params::WaveParams;

/// Softness of a surface with no explicit material
pub const DEFAULT_SOFTNESS: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaterialKind {
    #[default]
    Water,
    Ceramic,
    Stone,
    Metal,
}

/// Radius and intensity of an emission before it becomes a wave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission {
    pub radius: f32,
    pub intensity: f32,
}

/// Sound-producing properties of an object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundMaterial {
    pub kind: MaterialKind,
    /// Relative pitch from low (0) to high (1)
    pub pitch: f32,
    /// Playback volume before radius normalization
    pub base_volume: f32,
    /// Playback pitch of the audio clip
    pub audio_pitch: f32,
}

impl Default for SoundMaterial {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Water,
            pitch: 0.5,
            base_volume: 1.0,
            audio_pitch: 1.0,
        }
    }
}

impl SoundMaterial {
    pub fn new(kind: MaterialKind, pitch: f32) -> Self {
        Self {
            kind,
            pitch: pitch.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    /// Wave parameters for an emission from this material
    pub fn wave_params(&self, emission: Emission, config: &WaveConfig) -> WaveParams {
        let t = self.pitch.clamp(0.0, 1.0);
        let width = config.max_width + (config.min_width - config.max_width) * t;

        WaveParams {
            radius: emission.radius,
            speed: config.speed,
            width,
            hard_wave: config.hard_wave,
            soft_wave: config.soft_wave,
            color: config.color_of(self.kind),
            intensity: emission.intensity,
            fade_strength: config.fade_out,
            border_width: config.border_width,
        }
    }

    /// Playback volume for an emission of the given radius
    pub fn audio_volume(&self, radius: f32, config: &WaveConfig) -> f32 {
        let normalized = if config.max_radius > 0.0 {
            (radius / config.max_radius * config.audio_volume_multiplier).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.base_volume * normalized
    }
}

/// Loudness of an impact: `mass * speed * (1 - softness)`
pub fn collision_loudness(mass: f32, impact_speed: f32, surface_softness: f32) -> f32 {
    mass * impact_speed * (1.0 - surface_softness.clamp(0.0, 1.0))
}

/// Emission of an object hitting a surface
pub fn collision_emission(loudness: f32, config: &WaveConfig) -> Emission {
    Emission {
        radius: (loudness * config.collision_radius_multiplier)
            .clamp(config.min_radius, config.max_radius),
        intensity: (loudness * config.collision_intensity_multiplier)
            .clamp(config.min_intensity, config.max_intensity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_maps_width_between_bounds() {
        let config = WaveConfig::default();
        let emission = Emission { radius: 10.0, intensity: 1.0 };

        let low = SoundMaterial::new(MaterialKind::Stone, 0.0).wave_params(emission, &config);
        let high = SoundMaterial::new(MaterialKind::Stone, 1.0).wave_params(emission, &config);
        assert_eq!(low.width, config.max_width);
        assert_eq!(high.width, config.min_width);
        assert_eq!(low.speed, config.speed);
        assert_eq!(low.color, config.color_stone);
    }

    #[test]
    fn test_soft_surface_cushions_collision() {
        let hard = collision_loudness(1.0, 10.0, 0.1);
        let soft = collision_loudness(1.0, 10.0, 0.66);
        assert!(soft < hard);
        assert!((collision_loudness(2.0, 5.0, 0.0) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_collision_emission_is_clamped() {
        let config = WaveConfig::default();
        let loud = collision_emission(10_000.0, &config);
        assert_eq!(loud.radius, config.max_radius);
        assert_eq!(loud.intensity, config.max_intensity);

        let quiet = collision_emission(8.0, &config);
        assert!((quiet.radius - 4.0).abs() < 1e-6);
        assert_eq!(quiet.intensity, config.min_intensity);
    }

    #[test]
    fn test_audio_volume_saturates() {
        let config = WaveConfig::default();
        let material = SoundMaterial::default();
        assert_eq!(material.audio_volume(config.max_radius, &config), 1.0);
        assert!((material.audio_volume(25.0, &config) - 0.6).abs() < 1e-6);
    }
}
