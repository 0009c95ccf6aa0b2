pub mod scenario;
pub mod script;
pub mod tick;
pub mod world;

pub use scenario::Scenario;
pub use script::{run_due_actions, ScriptedAction};
pub use tick::{run_simulation_tick, SimulationEvent};
pub use world::{Emitter, Npc, RelayObject, SimWorld, Target};
