//! Echo Warden - sound propagation and hearing-driven NPC behaviour
//!
//! Wavefronts travel through a bounded pool, notify listeners as they sweep
//! past, and may be answered by resonating objects. Agents weigh what they
//! hear against a learned trust table and decide whether to patrol,
//! investigate, chase or attack.

pub mod agent;
pub mod core;
pub mod perception;
pub mod simulation;
pub mod waves;
