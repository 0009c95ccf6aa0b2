//! Wave parameters and timed wave patterns

use serde::{Deserialize, Serialize};

use crate::core::error::{EchoError, Result};

/// Shape and strength of one wavefront
///
/// Consumed by the pool, the detection volume and presentation alike;
/// none of them own it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    /// Maximum radius in meters; the wave ends when its front gets here
    pub radius: f32,
    /// Front speed in m/s
    pub speed: f32,
    /// Visual width of the ring in meters
    pub width: f32,
    /// Hard edged ring
    pub hard_wave: bool,
    /// Glow-like ring
    pub soft_wave: bool,
    /// Ring tint (RGB); intensity acts as its alpha
    pub color: [f32; 3],
    /// Brightness proxy, also used as loudness for resonance
    pub intensity: f32,
    pub fade_strength: f32,
    pub border_width: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            radius: 20.0,
            speed: 8.0,
            width: 5.0,
            hard_wave: true,
            soft_wave: false,
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            fade_strength: 2.0,
            border_width: 0.15,
        }
    }
}

impl WaveParams {
    /// Validated constructor for the two values every wave needs
    pub fn new(radius: f32, speed: f32) -> Result<Self> {
        let params = Self {
            radius,
            speed,
            ..Self::default()
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Check `radius > 0`, `speed > 0`, `width >= 0`
    pub fn validate(&self) -> Result<()> {
        if !(self.radius > 0.0) || !self.radius.is_finite() {
            return Err(EchoError::InvalidWave(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.speed > 0.0) || !self.speed.is_finite() {
            return Err(EchoError::InvalidWave(format!(
                "speed must be positive, got {}",
                self.speed
            )));
        }
        if !(self.width >= 0.0) {
            return Err(EchoError::InvalidWave(format!(
                "width must not be negative, got {}",
                self.width
            )));
        }
        Ok(())
    }

    /// Seconds from emission until the front reaches `radius`
    pub fn duration(&self) -> f32 {
        self.radius / self.speed
    }

    /// Presentation mode: hard (1), soft (2), both (3), invisible (0)
    pub fn wave_mode(&self) -> u8 {
        u8::from(self.hard_wave) + 2 * u8::from(self.soft_wave)
    }
}

/// One wave inside a pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternWave {
    /// Absolute offset from pattern start (seconds)
    pub time_offset: f32,
    #[serde(default)]
    pub params: WaveParams,
}

impl PatternWave {
    pub fn new(time_offset: f32, params: WaveParams) -> Self {
        Self { time_offset, params }
    }

    /// Time offset plus wave duration
    pub fn duration(&self) -> f32 {
        self.time_offset + self.params.duration()
    }
}

/// Several waves emitted from one source on a timetable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavePattern {
    pub waves: Vec<PatternWave>,
}

impl Default for WavePattern {
    fn default() -> Self {
        Self {
            waves: vec![PatternWave::new(0.0, WaveParams::default())],
        }
    }
}

impl WavePattern {
    pub fn new(waves: Vec<PatternWave>) -> Self {
        Self { waves }
    }

    /// Time until the last wave of the pattern has finished
    pub fn duration(&self) -> f32 {
        self.waves
            .iter()
            .map(PatternWave::duration)
            .fold(0.0, f32::max)
    }
}
