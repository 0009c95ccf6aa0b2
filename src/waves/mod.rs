//! Sound propagation engine
//!
//! Wavefronts live in a fixed-capacity pool. Each one carries a growing
//! detection shell that notifies listeners as it sweeps past them; relays
//! may answer with attenuated waves of their own.

pub mod field;
pub mod material;
pub mod notification;
pub mod params;
pub mod pool;
pub mod relay;
pub mod schedule;
pub mod volume;

pub use field::{DropReason, DroppedWave, EmittedWave, FieldTick, SoundField};
pub use material::{collision_emission, collision_loudness, Emission, MaterialKind, SoundMaterial};
pub use notification::{ContributorHistory, SoundNotification};
pub use params::{PatternWave, WaveParams, WavePattern};
pub use pool::{WaveSlot, WaveSlotPool, MAX_WAVES};
pub use relay::{distance_damper, ResonanceEmission, ResonanceRelay};
pub use schedule::{EmissionSchedule, EmissionSource, ScheduledEmission};
pub use volume::{Listener, PropagationVolume, SoundDelivery};
