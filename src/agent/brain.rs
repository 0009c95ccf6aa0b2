//! Decision core - per-agent state machine
//!
//! Every update:
//! 1. expire old sounds
//! 2. look for the target (field of view, occlusion, ranges)
//! 3. resolve the state by priority
//! 4. run the state's behaviour against the navigation and attack
//!    capabilities
//!
//! The core owns its suspicion table and hearing; it never touches the
//! sound field directly. Side effects of an attack (animation, attack
//! waves, audio) are the caller's job, signalled through `DecisionReport`.

use crate::agent::collaborators::{AttackCapable, Navigation, SpatialQuery};
use crate::agent::sensing::{sense_target, SightInputs};
use crate::agent::state::{resolve_state, AgentState, StateInputs};
use crate::core::config::AgentConfig;
use crate::core::types::{SimTime, SoundTag, Vec3};
use crate::perception::buffer::PerceivedSound;
use crate::perception::hearing::{Hearing, Rejection};
use crate::perception::suspicion::SuspicionModel;
use crate::waves::notification::SoundNotification;

/// What one update did
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionReport {
    pub previous: AgentState,
    pub state: AgentState,
    /// Category lowered after a fruitless investigation, with its new value
    pub learned: Option<(SoundTag, f32)>,
    /// The investigated sound, when the agent arrived at it this update
    pub investigated: Option<PerceivedSound>,
    pub attack_started: bool,
    pub sight: SightInputs,
}

impl DecisionReport {
    pub fn state_changed(&self) -> bool {
        self.previous != self.state
    }
}

#[derive(Debug, Clone)]
pub struct DecisionCore {
    config: AgentConfig,
    suspicion: SuspicionModel,
    hearing: Hearing,
    waypoints: Vec<Vec3>,
    waypoint_index: usize,
    state: AgentState,
    standing_still: bool,
    started_standing: SimTime,
}

impl DecisionCore {
    pub fn new(config: AgentConfig, suspicion: SuspicionModel, waypoints: Vec<Vec3>) -> Self {
        let hearing = Hearing::new(config.minimum_sound_distance, config.sound_input_lifetime);
        Self {
            config,
            suspicion,
            hearing,
            waypoints,
            waypoint_index: 0,
            state: AgentState::Idle,
            standing_still: false,
            started_standing: 0.0,
        }
    }

    /// Put the agent on its first waypoint at walking speed
    ///
    /// Missing waypoints or target are reported once here; the dependent
    /// behaviour then does nothing.
    pub fn begin(&mut self, nav: &mut impl Navigation, has_target: bool) {
        if !has_target {
            tracing::warn!("agent has no target assigned, chase and attack disabled");
        }
        nav.set_speed(self.config.walk_speed);
        match self.waypoints.first() {
            Some(&first) => {
                nav.set_stopped(false);
                nav.set_destination(first);
            }
            None => {
                tracing::warn!("agent has no waypoints, patrol disabled");
                nav.set_stopped(true);
            }
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn suspicion(&self) -> &SuspicionModel {
        &self.suspicion
    }

    pub fn hearing(&self) -> &Hearing {
        &self.hearing
    }

    pub fn is_standing_still(&self) -> bool {
        self.standing_still
    }

    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.waypoints.get(self.waypoint_index).copied()
    }

    /// Perception ingestion for one notification heard at `position`
    pub fn receive_sound(
        &mut self,
        notification: &SoundNotification,
        position: Vec3,
        now: SimTime,
    ) -> std::result::Result<PerceivedSound, Rejection> {
        let result = self
            .hearing
            .receive(notification, position, &self.suspicion, now);
        match &result {
            Ok(sound) => tracing::debug!(
                tag = %sound.tag,
                distance = sound.initial_distance,
                "sound perceived"
            ),
            Err(reason) => tracing::trace!(tag = %notification.tag, ?reason, "sound ignored"),
        }
        result
    }

    /// Run one decision step
    pub fn update<N, S, A>(
        &mut self,
        now: SimTime,
        target: Option<Vec3>,
        nav: &mut N,
        space: &S,
        attacker: &mut A,
    ) -> DecisionReport
    where
        N: Navigation,
        S: SpatialQuery,
        A: AttackCapable,
    {
        self.hearing.prune(now);

        let sight = match target {
            Some(target) => sense_target(nav.position(), nav.forward(), target, space, &self.config),
            None => SightInputs::default(),
        };

        let previous = self.state;
        self.state = resolve_state(StateInputs {
            target_in_attack_range: sight.in_attack_range,
            target_in_sight: sight.in_sight,
            hearing_sound: self.hearing.perceived,
            standing_still: self.standing_still,
        });
        if self.state != previous {
            tracing::debug!(from = %previous, to = %self.state, "agent state changed");
        }

        let mut report = DecisionReport {
            previous,
            state: self.state,
            learned: None,
            investigated: None,
            attack_started: false,
            sight,
        };

        match self.state {
            AgentState::Idle => self.patrol(now, nav),
            AgentState::ChaseSound => self.chase_sound(now, nav, &mut report),
            AgentState::ChaseTarget => {
                nav.set_speed(self.config.chase_speed);
                if let Some(target) = target {
                    nav.set_stopped(false);
                    nav.set_destination(target);
                }
            }
            AgentState::Attack => {
                nav.set_speed(0.0);
                if !attacker.is_attacking() {
                    report.attack_started = attacker.trigger();
                }
            }
            AgentState::StandStill => {
                nav.set_speed(0.0);
                if now - self.started_standing >= self.config.waiting_time {
                    self.standing_still = false;
                    nav.set_speed(self.config.walk_speed);
                }
            }
        }

        report
    }

    fn pause(&mut self, now: SimTime) {
        self.standing_still = true;
        self.started_standing = now;
    }

    fn patrol(&mut self, now: SimTime, nav: &mut impl Navigation) {
        nav.set_speed(self.config.walk_speed);
        let Some(waypoint) = self.current_waypoint() else {
            return;
        };
        nav.set_stopped(false);
        nav.set_destination(waypoint);
        if nav.remaining_distance() <= self.config.stopping_distance {
            self.pause(now);
            self.waypoint_index = (self.waypoint_index + 1) % self.waypoints.len();
            if let Some(next) = self.current_waypoint() {
                nav.set_destination(next);
            }
        }
    }

    fn chase_sound(&mut self, now: SimTime, nav: &mut impl Navigation, report: &mut DecisionReport) {
        nav.set_speed(self.config.chase_speed);
        let Some(sound) = self.hearing.selected().copied() else {
            // Flag without a candidate: nothing left to follow
            self.hearing.settle();
            return;
        };

        nav.set_stopped(false);
        nav.set_destination(sound.origin);
        if nav.position().distance(sound.origin) < self.config.arrival_threshold {
            if self.suspicion.debunk(sound.tag, self.config.times_before_learned) {
                report.learned = Some((sound.tag, self.suspicion.lookup(sound.tag)));
            }
            report.investigated = Some(sound);
            self.hearing.settle();
            self.pause(now);
        }
    }
}
