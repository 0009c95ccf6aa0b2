//! Perception ingestion - which notifications an agent pays attention to

use crate::core::types::{SimTime, Vec3};
use crate::perception::arbiter::pick_best;
use crate::perception::buffer::{PerceivedSound, PerceptionBuffer};
use crate::perception::suspicion::SuspicionModel;
use crate::waves::notification::SoundNotification;

/// Why a notification was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The category has been learned to be harmless
    Learned,
    /// The source is too close to the listener (usually its own voice)
    TooClose,
}

/// Accept or reject a notification heard at `listener`
///
/// The credible-threat category skips both checks.
pub fn admit(
    notification: &SoundNotification,
    listener: Vec3,
    suspicion: &SuspicionModel,
    minimum_distance: f32,
) -> std::result::Result<f32, Rejection> {
    let distance = notification.distance_to(listener);
    if suspicion.is_credible(notification.tag) {
        return Ok(distance);
    }
    if suspicion.lookup(notification.tag) == 0.0 {
        return Err(Rejection::Learned);
    }
    if distance <= minimum_distance {
        return Err(Rejection::TooClose);
    }
    Ok(distance)
}

/// An agent's ears: filter, buffer and current best candidate
#[derive(Debug, Clone)]
pub struct Hearing {
    buffer: PerceptionBuffer,
    minimum_distance: f32,
    selected: Option<PerceivedSound>,
    /// Set when a sound was accepted; cleared once it has been investigated
    pub perceived: bool,
}

impl Hearing {
    pub fn new(minimum_distance: f32, lifetime: f32) -> Self {
        Self {
            buffer: PerceptionBuffer::new(lifetime),
            minimum_distance,
            selected: None,
            perceived: false,
        }
    }

    /// Feed one notification; on success the selection is re-arbitrated
    pub fn receive(
        &mut self,
        notification: &SoundNotification,
        listener: Vec3,
        suspicion: &SuspicionModel,
        now: SimTime,
    ) -> std::result::Result<PerceivedSound, Rejection> {
        let distance = admit(notification, listener, suspicion, self.minimum_distance)?;
        let sound = PerceivedSound::new(now, notification.origin, distance, notification.tag);
        self.buffer.push(sound);
        self.selected = pick_best(self.buffer.as_slice(), suspicion, now).copied();
        self.perceived = true;
        Ok(sound)
    }

    /// Expire old entries; the current selection is kept until investigated
    pub fn prune(&mut self, now: SimTime) {
        self.buffer.prune(now);
    }

    pub fn selected(&self) -> Option<&PerceivedSound> {
        self.selected.as_ref()
    }

    /// Investigation finished: drop the flag and the selection
    pub fn settle(&mut self) {
        self.perceived = false;
        self.selected = None;
    }

    pub fn buffer(&self) -> &PerceptionBuffer {
        &self.buffer
    }
}
