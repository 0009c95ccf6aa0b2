//! Sight: is the target visible, and is it in reach

use crate::agent::collaborators::SpatialQuery;
use crate::core::config::AgentConfig;
use crate::core::types::Vec3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SightInputs {
    pub in_sight: bool,
    pub in_attack_range: bool,
}

/// Check the target against the field of view, occluders and both ranges
///
/// A target outside the cone or behind an occluder counts as neither seen
/// nor in reach.
pub fn sense_target(
    position: Vec3,
    forward: Vec3,
    target: Vec3,
    space: &impl SpatialQuery,
    config: &AgentConfig,
) -> SightInputs {
    let to_target = target - position;
    let distance = to_target.length();
    if distance <= f32::EPSILON {
        return SightInputs {
            in_sight: true,
            in_attack_range: true,
        };
    }
    let direction = to_target / distance;

    if space.angle_between(forward, direction) >= config.fov_angle / 2.0 {
        return SightInputs::default();
    }
    if space.raycast(position, direction, distance, config.sight_mask) {
        return SightInputs::default();
    }

    SightInputs {
        in_sight: distance <= config.sight_range,
        in_attack_range: distance <= config.attack_range,
    }
}
