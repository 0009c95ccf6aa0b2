//! Hearing and judgement: what an agent notices and which sound it follows

pub mod arbiter;
pub mod buffer;
pub mod hearing;
pub mod suspicion;

pub use arbiter::{pick_best, score};
pub use buffer::{PerceivedSound, PerceptionBuffer};
pub use hearing::{admit, Hearing, Rejection};
pub use suspicion::{SuspicionModel, CERTAIN, DEFAULT_PRESETS};
