//! Timed attacks and vocalization timing

use rand::Rng;

use crate::agent::collaborators::AttackCapable;
use crate::core::types::SimTime;

/// Attack with a fixed duration; re-triggering is ignored while it runs
#[derive(Debug, Clone)]
pub struct Attacker {
    duration: f32,
    remaining: f32,
}

impl Attacker {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            remaining: 0.0,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

impl AttackCapable for Attacker {
    fn is_attacking(&self) -> bool {
        self.remaining > 0.0
    }

    fn trigger(&mut self) -> bool {
        if self.is_attacking() {
            return false;
        }
        self.remaining = self.duration;
        true
    }
}

/// Pitch drawn uniformly from `1 +/- jitter`
pub fn jittered_pitch<R: Rng>(rng: &mut R, jitter: f32) -> f32 {
    let jitter = jitter.abs();
    rng.gen_range(1.0 - jitter..=1.0 + jitter)
}

/// Fires at random intervals in `[min, max]`
#[derive(Debug, Clone)]
pub struct GroanTimer {
    min_interval: f32,
    max_interval: f32,
    last: SimTime,
    interval: f32,
}

impl GroanTimer {
    pub fn new<R: Rng>(rng: &mut R, min_interval: f32, max_interval: f32) -> Self {
        let mut timer = Self {
            min_interval,
            max_interval: max_interval.max(min_interval),
            last: 0.0,
            interval: 0.0,
        };
        timer.interval = timer.draw(rng);
        timer
    }

    fn draw<R: Rng>(&self, rng: &mut R) -> f32 {
        rng.gen_range(self.min_interval..=self.max_interval)
    }

    pub fn next_at(&self) -> SimTime {
        self.last + self.interval
    }

    /// True when a groan is due at `now`; the next interval is drawn then
    pub fn poll<R: Rng>(&mut self, now: SimTime, rng: &mut R) -> bool {
        if now < self.next_at() {
            return false;
        }
        self.last = now;
        self.interval = self.draw(rng);
        true
    }
}
