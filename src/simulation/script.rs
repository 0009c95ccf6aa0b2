//! Timed scenario actions: sounds, impacts, strikes and removals
//!
//! Entities are referenced by scenario name and resolved when the action
//! fires, so an action aimed at a destroyed entity is skipped.

use serde::{Deserialize, Serialize};

use crate::agent::collaborators::AudioPlayback;
use crate::core::types::{EntityId, SimTime, SoundTag, Vec3};
use crate::simulation::tick::SimulationEvent;
use crate::simulation::world::SimWorld;
use crate::waves::material::{
    collision_emission, collision_loudness, Emission, SoundMaterial, DEFAULT_SOFTNESS,
};
use crate::waves::params::{WaveParams, WavePattern};
use crate::waves::schedule::EmissionSource;

fn default_softness() -> f32 {
    DEFAULT_SOFTNESS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptedAction {
    /// One wave from an entity's current position
    Emit {
        at: SimTime,
        source: String,
        tag: SoundTag,
        #[serde(default)]
        params: WaveParams,
    },
    /// A timed wave pattern that follows the source
    Pattern {
        at: SimTime,
        source: String,
        tag: SoundTag,
        pattern: WavePattern,
    },
    /// Something of `mass` hits the ground next to `source`
    Impact {
        at: SimTime,
        source: String,
        tag: SoundTag,
        mass: f32,
        speed: f32,
        #[serde(default = "default_softness")]
        softness: f32,
    },
    /// A thrown object hits a relay directly
    Strike {
        at: SimTime,
        relay: String,
        striker: SoundTag,
        speed: f32,
    },
    Destroy {
        at: SimTime,
        entity: String,
    },
}

impl ScriptedAction {
    pub fn at(&self) -> SimTime {
        match self {
            ScriptedAction::Emit { at, .. }
            | ScriptedAction::Pattern { at, .. }
            | ScriptedAction::Impact { at, .. }
            | ScriptedAction::Strike { at, .. }
            | ScriptedAction::Destroy { at, .. } => *at,
        }
    }

    /// Entity names this action refers to
    pub fn referenced_names(&self) -> Vec<&str> {
        match self {
            ScriptedAction::Emit { source, .. }
            | ScriptedAction::Pattern { source, .. }
            | ScriptedAction::Impact { source, .. } => vec![source.as_str()],
            ScriptedAction::Strike { relay, .. } => vec![relay.as_str()],
            ScriptedAction::Destroy { entity, .. } => vec![entity.as_str()],
        }
    }
}

/// Fire every action due at or before `now`
pub fn run_due_actions(world: &mut SimWorld, now: SimTime, events: &mut Vec<SimulationEvent>) {
    let due = world.script.partition_point(|a| a.at() <= now);
    let actions: Vec<ScriptedAction> = world.script.drain(..due).collect();
    for action in actions {
        apply(world, action, now, events);
    }
}

fn apply(world: &mut SimWorld, action: ScriptedAction, time: SimTime, events: &mut Vec<SimulationEvent>) {
    match action {
        ScriptedAction::Emit { source, tag, params, .. } => {
            let Some((id, position)) = resolve(world, &source) else {
                return;
            };
            match world.field.add_sound_wave(id, position, tag, params, None) {
                Ok(slot) => events.push(SimulationEvent::WaveEmitted {
                    time,
                    slot,
                    source,
                    tag,
                    radius: params.radius,
                }),
                Err(e) => events.push(SimulationEvent::WaveDropped {
                    time,
                    source,
                    tag,
                    reason: e.to_string(),
                }),
            }
        }
        ScriptedAction::Pattern { source, tag, pattern, .. } => {
            let Some((id, _)) = resolve(world, &source) else {
                return;
            };
            if let Err(e) = world
                .field
                .add_sound_wave_pattern(id, EmissionSource::Follow(id), tag, &pattern, None)
            {
                tracing::warn!(%source, error = %e, "pattern rejected");
            }
        }
        ScriptedAction::Impact { source, tag, mass, speed, softness, .. } => {
            let Some((id, position)) = resolve(world, &source) else {
                return;
            };
            let material = world
                .emitters
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.material)
                .unwrap_or_default();
            let emission = collision_emission(
                collision_loudness(mass, speed, softness),
                world.field.config(),
            );
            emit_material_wave(world, &source, position, tag, &material, emission, time, events);
        }
        ScriptedAction::Strike { relay, striker, speed, .. } => {
            let Some(object) = world.relays.iter().find(|r| r.name == relay).cloned() else {
                tracing::debug!(%relay, "strike target gone");
                return;
            };
            if let Some(answer) = object
                .relay
                .strike(striker, speed, object.position, world.field.config())
            {
                emit_material_wave(
                    world,
                    &relay,
                    answer.position,
                    answer.tag,
                    &object.material,
                    answer.emission,
                    time,
                    events,
                );
            }
        }
        ScriptedAction::Destroy { entity, .. } => {
            let Some(id) = world.find(&entity) else {
                return;
            };
            if world.destroy_entity(id).is_ok() {
                events.push(SimulationEvent::EntityDestroyed { time, entity });
            }
        }
    }
}

fn resolve(world: &SimWorld, name: &str) -> Option<(EntityId, Vec3)> {
    let id = world.find(name)?;
    let position = world.position_of(id)?;
    Some((id, position))
}

fn emit_material_wave(
    world: &mut SimWorld,
    source: &str,
    position: Vec3,
    tag: SoundTag,
    material: &SoundMaterial,
    emission: Emission,
    time: SimTime,
    events: &mut Vec<SimulationEvent>,
) {
    let Some(id) = world.find(source) else {
        return;
    };
    let volume = material.audio_volume(emission.radius, world.field.config());
    match world
        .field
        .emit_from_material(id, position, tag, material, emission, None)
    {
        Ok(slot) => {
            world
                .audio
                .play_at_position(source, position, volume, material.audio_pitch);
            events.push(SimulationEvent::WaveEmitted {
                time,
                slot,
                source: source.to_string(),
                tag,
                radius: emission.radius,
            });
        }
        Err(e) => events.push(SimulationEvent::WaveDropped {
            time,
            source: source.to_string(),
            tag,
            reason: e.to_string(),
        }),
    }
}
