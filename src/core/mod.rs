pub mod config;
pub mod error;
pub mod types;

pub use config::{AgentConfig, SimulationConfig, SuspicionConfig, WaveConfig};
pub use error::{EchoError, Result};
pub use types::{EntityId, SimTime, SoundTag, Vec3};
