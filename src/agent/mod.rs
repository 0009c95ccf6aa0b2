//! Listening agents: sight, decision making and the capabilities they drive

pub mod brain;
pub mod collaborators;
pub mod headless;
pub mod sensing;
pub mod state;
pub mod striker;

pub use brain::{DecisionCore, DecisionReport};
pub use collaborators::{AnimationTrigger, AttackCapable, AudioPlayback, Navigation, SpatialQuery};
pub use headless::{AnimationLog, AudioLog, KinematicNavigator, OpenSpace, Occluder, PlayedClip, LOG_CAPACITY};
pub use sensing::{sense_target, SightInputs};
pub use state::{resolve_state, AgentState, StateInputs};
pub use striker::{jittered_pitch, Attacker, GroanTimer};
