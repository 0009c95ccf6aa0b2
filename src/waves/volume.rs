//! Growing detection shell attached to each wavefront
//!
//! The shell is thin: a listener hears the wave once, on the tick the front
//! sweeps across its distance from the origin. Standing inside the sphere
//! afterwards does nothing.

use ahash::AHashSet;

use crate::core::types::{EntityId, Vec3};
use crate::waves::notification::SoundNotification;
use crate::waves::pool::FrontTravel;

/// Anything that can hear waves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Listener {
    pub id: EntityId,
    pub position: Vec3,
}

impl Listener {
    pub fn new(id: EntityId, position: Vec3) -> Self {
        Self { id, position }
    }
}

/// A notification reaching one listener
#[derive(Debug, Clone, PartialEq)]
pub struct SoundDelivery {
    pub listener: EntityId,
    /// Listener distance from the wave origin at the moment of crossing
    pub distance: f32,
    pub notification: SoundNotification,
}

#[derive(Debug, Clone)]
pub struct PropagationVolume {
    /// Pool slot of the wave this volume belongs to
    pub slot: usize,
    pub notification: SoundNotification,
    previous_radius: f32,
    front_radius: f32,
    travel: FrontTravel,
    swept: bool,
    notified: AHashSet<EntityId>,
}

impl PropagationVolume {
    pub fn new(slot: usize, notification: SoundNotification) -> Self {
        Self {
            slot,
            notification,
            previous_radius: 0.0,
            front_radius: 0.0,
            travel: FrontTravel::default(),
            swept: false,
            notified: AHashSet::new(),
        }
    }

    pub fn front_radius(&self) -> f32 {
        self.front_radius
    }

    /// Grow the shell, never past the wave's maximum radius
    pub fn advance(&mut self, dt: f32) {
        let params = &self.notification.params;
        self.previous_radius = self.front_radius;
        self.travel.advance(params.speed, dt);
        self.front_radius = self.travel.front(params.radius);
    }

    /// Listeners whose distance the front crossed since the last sweep
    ///
    /// The first sweep has an open lower bound so a listener sitting on the
    /// origin still hears the wave.
    pub fn sweep(&mut self, listeners: &[Listener]) -> Vec<SoundDelivery> {
        let origin = self.notification.origin;
        let first = !self.swept;
        self.swept = true;

        let mut deliveries = Vec::new();
        for listener in listeners {
            let distance = origin.distance(listener.position);
            let crossed = distance <= self.front_radius && (first || distance > self.previous_radius);
            if crossed && self.notified.insert(listener.id) {
                deliveries.push(SoundDelivery {
                    listener: listener.id,
                    distance,
                    notification: self.notification.clone(),
                });
            }
        }
        deliveries
    }

    /// True once the front has reached the wave's radius
    pub fn is_finished(&self) -> bool {
        self.travel.reached(self.notification.params.radius)
    }

    pub fn notified_count(&self) -> usize {
        self.notified.len()
    }
}
