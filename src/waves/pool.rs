//! Fixed-capacity table of travelling wavefronts
//!
//! Slots are scanned first-free on allocation. A full pool rejects new
//! waves instead of evicting old ones.

use crate::core::error::{EchoError, Result};
use crate::core::types::Vec3;
use crate::waves::params::WaveParams;

/// Default pool size, matched by presentation buffers
pub const MAX_WAVES: usize = 32;

/// Relative slack when deciding whether a front has reached its radius
const REACH_TOLERANCE: f64 = 1e-6;

/// Distance covered by a front
///
/// Accumulated in f64 so that a wave finishes on the tick
/// `ceil(radius / (speed * dt))` regardless of how many ticks it lives.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrontTravel(f64);

impl FrontTravel {
    pub fn advance(&mut self, speed: f32, dt: f32) {
        self.0 += f64::from(speed) * f64::from(dt);
    }

    pub fn reached(&self, radius: f32) -> bool {
        self.0 >= f64::from(radius) * (1.0 - REACH_TOLERANCE)
    }

    /// Front radius, clamped to `radius`
    pub fn front(&self, radius: f32) -> f32 {
        if self.reached(radius) {
            radius
        } else {
            (self.0 as f32).min(radius)
        }
    }
}

/// One wavefront in the pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSlot {
    pub origin: Vec3,
    /// Current front radius, clamped to `params.radius`
    pub front_radius: f32,
    pub params: WaveParams,
    pub active: bool,
    travel: FrontTravel,
}

impl WaveSlot {
    fn empty() -> Self {
        Self {
            origin: Vec3::ZERO,
            front_radius: 0.0,
            params: WaveParams::default(),
            active: false,
            travel: FrontTravel::default(),
        }
    }

    /// Remaining fraction of the wave's life (1 at spawn, 0 at the end)
    pub fn remaining_fraction(&self) -> f32 {
        (1.0 - self.front_radius / self.params.radius).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct WaveSlotPool {
    slots: Vec<WaveSlot>,
}

impl WaveSlotPool {
    pub fn new() -> Self {
        Self::with_capacity(MAX_WAVES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![WaveSlot::empty(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| s.active)
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.slots.get(index).map(|s| s.active).unwrap_or(false)
    }

    pub fn slot(&self, index: usize) -> Option<&WaveSlot> {
        self.slots.get(index)
    }

    /// Active slots with their indices
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &WaveSlot)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.active)
    }

    /// Claim the first free slot for a new wave
    pub fn allocate(&mut self, origin: Vec3, params: WaveParams) -> Result<usize> {
        let Some(index) = self.slots.iter().position(|s| !s.active) else {
            tracing::warn!(
                capacity = self.capacity(),
                "could not add sound wave, pool capacity reached"
            );
            return Err(EchoError::PoolExhausted {
                capacity: self.capacity(),
            });
        };

        self.slots[index] = WaveSlot {
            origin,
            front_radius: 0.0,
            params,
            active: true,
            travel: FrontTravel::default(),
        };
        Ok(index)
    }

    /// Grow every active front by `speed * dt`
    ///
    /// Returns the slots that finished this tick; they are already free.
    pub fn advance(&mut self, dt: f32) -> Vec<usize> {
        let mut finished = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if !slot.active {
                continue;
            }
            slot.travel.advance(slot.params.speed, dt);
            slot.front_radius = slot.travel.front(slot.params.radius);
            if slot.travel.reached(slot.params.radius) {
                slot.active = false;
                finished.push(index);
            }
        }
        finished
    }

    /// Force a slot inactive
    ///
    /// Returns true only if the slot was active; out-of-range indices are
    /// logged and return false.
    pub fn release(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                let was_active = slot.active;
                slot.active = false;
                was_active
            }
            None => {
                tracing::warn!(
                    index,
                    capacity = self.capacity(),
                    "could not stop sound wave, index out of range"
                );
                false
            }
        }
    }

    /// Deactivate everything (scene reset)
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            *slot = WaveSlot::empty();
        }
    }
}

impl Default for WaveSlotPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(radius: f32, speed: f32) -> WaveParams {
        WaveParams::new(radius, speed).unwrap()
    }

    #[test]
    fn test_allocate_returns_first_free_index() {
        let mut pool = WaveSlotPool::with_capacity(4);
        assert_eq!(pool.allocate(Vec3::ZERO, params(10.0, 1.0)).unwrap(), 0);
        assert_eq!(pool.allocate(Vec3::ZERO, params(10.0, 1.0)).unwrap(), 1);
        pool.release(0);
        assert_eq!(pool.allocate(Vec3::ONE, params(10.0, 1.0)).unwrap(), 0);
    }

    #[test]
    fn test_full_pool_rejects_without_eviction() {
        let mut pool = WaveSlotPool::with_capacity(2);
        pool.allocate(Vec3::ZERO, params(10.0, 1.0)).unwrap();
        pool.allocate(Vec3::X, params(12.0, 1.0)).unwrap();
        pool.advance(0.5);

        let err = pool.allocate(Vec3::Y, params(5.0, 1.0)).unwrap_err();
        assert!(err.is_pool_exhausted());
        assert_eq!(pool.active_count(), 2);
        assert_eq!(pool.slot(1).unwrap().origin, Vec3::X);
        assert!((pool.slot(1).unwrap().front_radius - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_advance_grows_and_frees_on_completion() {
        let mut pool = WaveSlotPool::with_capacity(1);
        pool.allocate(Vec3::ZERO, params(2.0, 1.0)).unwrap();

        assert!(pool.advance(1.0).is_empty());
        assert!(pool.is_active(0));

        let finished = pool.advance(1.5);
        assert_eq!(finished, vec![0]);
        assert!(!pool.is_active(0));
        assert_eq!(pool.slot(0).unwrap().front_radius, 2.0);
    }

    #[test]
    fn test_release_out_of_range_is_harmless() {
        let mut pool = WaveSlotPool::with_capacity(1);
        assert!(!pool.release(7));
    }

    #[test]
    fn test_release_reports_only_real_stops() {
        let mut pool = WaveSlotPool::with_capacity(2);
        let slot = pool.allocate(Vec3::ZERO, params(5.0, 1.0)).unwrap();
        assert!(pool.release(slot));
        assert!(!pool.release(slot));
        // Never allocated
        assert!(!pool.release(1));
    }

    #[test]
    fn test_reset_clears_all_slots() {
        let mut pool = WaveSlotPool::new();
        for _ in 0..5 {
            pool.allocate(Vec3::ZERO, params(3.0, 1.0)).unwrap();
        }
        pool.reset();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.capacity(), MAX_WAVES);
    }

    #[test]
    fn test_remaining_fraction() {
        let mut pool = WaveSlotPool::with_capacity(1);
        pool.allocate(Vec3::ZERO, params(4.0, 1.0)).unwrap();
        pool.advance(1.0);
        assert!((pool.slot(0).unwrap().remaining_fraction() - 0.75).abs() < 1e-6);
    }
}
