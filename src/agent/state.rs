//! Agent behaviour states and their priority

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AgentState {
    /// Patrol the waypoint loop
    #[default]
    Idle,
    /// Walk to the origin of the most urgent sound
    ChaseSound,
    /// Pursue the visible target
    ChaseTarget,
    /// Target in reach
    Attack,
    /// Pause after a waypoint or a fruitless investigation
    StandStill,
}

impl AgentState {
    pub fn name(self) -> &'static str {
        match self {
            AgentState::Idle => "Idle",
            AgentState::ChaseSound => "ChaseSound",
            AgentState::ChaseTarget => "ChaseTarget",
            AgentState::Attack => "Attack",
            AgentState::StandStill => "StandStill",
        }
    }

    /// States that move at chase speed
    pub fn is_chasing(self) -> bool {
        matches!(self, AgentState::ChaseSound | AgentState::ChaseTarget)
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the state choice depends on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateInputs {
    pub target_in_attack_range: bool,
    pub target_in_sight: bool,
    pub hearing_sound: bool,
    pub standing_still: bool,
}

/// First match wins: Attack, ChaseTarget, ChaseSound, StandStill, Idle
pub fn resolve_state(inputs: StateInputs) -> AgentState {
    if inputs.target_in_attack_range {
        AgentState::Attack
    } else if inputs.target_in_sight {
        AgentState::ChaseTarget
    } else if inputs.hearing_sound {
        AgentState::ChaseSound
    } else if inputs.standing_still {
        AgentState::StandStill
    } else {
        AgentState::Idle
    }
}
