//! Tick system - orchestrates simulation updates
//!
//! One tick, in order:
//! 1. scripted actions due this tick
//! 2. sound field: clock, pattern waves, pool advance, detection sweep
//! 3. deliveries to relays (re-emission) and agents (perception)
//! 4. agent decisions, attacks
//! 5. movement and timers
//! 6. groans
//!
//! Detection always sees wavefronts already advanced this tick. Waves
//! created in steps 3-6 start growing on the next tick.

use std::fmt;

use serde::Serialize;

use crate::agent::collaborators::{AnimationTrigger, AudioPlayback};
use crate::agent::state::AgentState;
use crate::agent::striker::jittered_pitch;
use crate::core::types::{SimTime, SoundTag};
use crate::simulation::script::run_due_actions;
use crate::simulation::world::SimWorld;
use crate::waves::schedule::EmissionSource;

/// Events generated during a simulation tick
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum SimulationEvent {
    /// A wavefront was allocated
    WaveEmitted {
        time: SimTime,
        slot: usize,
        source: String,
        tag: SoundTag,
        radius: f32,
    },
    /// A wave could not be emitted (pool full, source gone, bad parameters)
    WaveDropped {
        time: SimTime,
        source: String,
        tag: SoundTag,
        reason: String,
    },
    /// An agent accepted a sound into its perception buffer
    SoundHeard {
        time: SimTime,
        agent: String,
        tag: SoundTag,
        distance: f32,
    },
    /// A relay answered a wave with one of its own
    Resonated {
        time: SimTime,
        relay: String,
        tag: SoundTag,
        radius: f32,
        /// Entities in the causal chain so far, relay included
        chain: usize,
    },
    StateChanged {
        time: SimTime,
        agent: String,
        from: AgentState,
        to: AgentState,
    },
    /// A fruitless investigation lowered a category's suspicion
    Learned {
        time: SimTime,
        agent: String,
        tag: SoundTag,
        suspicion: f32,
    },
    AttackStarted {
        time: SimTime,
        agent: String,
    },
    EntityDestroyed {
        time: SimTime,
        entity: String,
    },
}

impl fmt::Display for SimulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationEvent::WaveEmitted { time, slot, source, tag, radius } => write!(
                f,
                "[{:7.2}] wave #{} {} from {} (radius {:.1})",
                time, slot, tag, source, radius
            ),
            SimulationEvent::WaveDropped { time, source, tag, reason } => {
                write!(f, "[{:7.2}] wave {} from {} dropped: {}", time, tag, source, reason)
            }
            SimulationEvent::SoundHeard { time, agent, tag, distance } => {
                write!(f, "[{:7.2}] {} hears {} at {:.1}m", time, agent, tag, distance)
            }
            SimulationEvent::Resonated { time, relay, tag, radius, chain } => write!(
                f,
                "[{:7.2}] {} resonates {} (radius {:.1}, chain of {})",
                time, relay, tag, radius, chain
            ),
            SimulationEvent::StateChanged { time, agent, from, to } => {
                write!(f, "[{:7.2}] {}: {} -> {}", time, agent, from, to)
            }
            SimulationEvent::Learned { time, agent, tag, suspicion } => write!(
                f,
                "[{:7.2}] {} trusts {} less ({:.1})",
                time, agent, tag, suspicion
            ),
            SimulationEvent::AttackStarted { time, agent } => {
                write!(f, "[{:7.2}] {} attacks", time, agent)
            }
            SimulationEvent::EntityDestroyed { time, entity } => {
                write!(f, "[{:7.2}] {} destroyed", time, entity)
            }
        }
    }
}

/// Run a single simulation tick of `dt` seconds
///
/// Returns the events that occurred, in the order they happened.
pub fn run_simulation_tick(world: &mut SimWorld, dt: f32) -> Vec<SimulationEvent> {
    let mut events = Vec::new();
    world.current_tick += 1;

    let due = world.now() + dt;
    run_due_actions(world, due, &mut events);
    propagate_sound(world, dt, &mut events);
    update_agents(world, &mut events);
    advance_motion(world, dt);
    groan(world, &mut events);

    events
}

/// Field tick plus delivery to relays and agents
fn propagate_sound(world: &mut SimWorld, dt: f32, events: &mut Vec<SimulationEvent>) {
    let positions = world.entity_positions();
    let listeners = world.listeners();
    let tick = world
        .field
        .tick(dt, &listeners, |id| positions.get(&id).copied());
    let now = world.field.now();

    for wave in &tick.emitted {
        events.push(SimulationEvent::WaveEmitted {
            time: now,
            slot: wave.slot,
            source: world.name_of(wave.origin_entity),
            tag: wave.tag,
            radius: world
                .field
                .pool()
                .slot(wave.slot)
                .map(|s| s.params.radius)
                .unwrap_or_default(),
        });
    }
    for dropped in &tick.dropped {
        events.push(SimulationEvent::WaveDropped {
            time: now,
            source: world.name_of(dropped.origin_entity),
            tag: dropped.tag,
            reason: dropped.reason.as_str().to_string(),
        });
    }

    for delivery in &tick.deliveries {
        let notification = &delivery.notification;

        if let Some(object) = world.relays.iter().find(|r| r.id() == delivery.listener) {
            let Some(answer) = object
                .relay
                .respond(notification, object.position, world.field.config())
            else {
                continue;
            };
            let chain = answer.history.len();
            match world.field.emit_from_material(
                object.id(),
                answer.position,
                answer.tag,
                &object.material,
                answer.emission,
                Some(answer.history),
            ) {
                Ok(_) => {
                    tracing::debug!(relay = %object.name, tag = %answer.tag, chain, "resonance");
                    let volume = object
                        .material
                        .audio_volume(answer.emission.radius, world.field.config());
                    world.audio.play_at_position(
                        &object.name,
                        answer.position,
                        volume,
                        object.material.audio_pitch,
                    );
                    events.push(SimulationEvent::Resonated {
                        time: now,
                        relay: object.name.clone(),
                        tag: answer.tag,
                        radius: answer.emission.radius,
                        chain,
                    });
                }
                Err(e) => {
                    tracing::debug!(relay = %object.name, error = %e, "resonance dropped");
                }
            }
            continue;
        }

        if let Some(npc) = world.npcs.iter_mut().find(|n| n.id == delivery.listener) {
            let position = npc.position();
            if let Ok(sound) = npc.brain.receive_sound(notification, position, now) {
                events.push(SimulationEvent::SoundHeard {
                    time: now,
                    agent: npc.name.clone(),
                    tag: sound.tag,
                    distance: sound.initial_distance,
                });
            }
        }
    }
}

/// Decision step for every agent; attacks start their side effects here
fn update_agents(world: &mut SimWorld, events: &mut Vec<SimulationEvent>) {
    let now = world.now();
    let target = world.target.as_ref().map(|t| t.position);

    for npc in world.npcs.iter_mut() {
        let report = npc
            .brain
            .update(now, target, &mut npc.nav, &world.space, &mut npc.attacker);

        if report.state_changed() {
            events.push(SimulationEvent::StateChanged {
                time: now,
                agent: npc.name.clone(),
                from: report.previous,
                to: report.state,
            });
        }
        if let Some((tag, suspicion)) = report.learned {
            events.push(SimulationEvent::Learned {
                time: now,
                agent: npc.name.clone(),
                tag,
                suspicion,
            });
        }
        if report.attack_started {
            let agent = &world.config.agent;
            npc.animation.fire("attack");
            if let Err(e) = world.field.add_sound_wave_pattern(
                npc.id,
                EmissionSource::Follow(npc.id),
                SoundTag::Npc,
                &agent.attack_pattern,
                None,
            ) {
                tracing::warn!(agent = %npc.name, error = %e, "attack pattern rejected");
            }
            let pitch = jittered_pitch(&mut world.rng, agent.attack_pitch_jitter);
            world
                .audio
                .play_at_position("NPC Attack", npc.position(), agent.attack_volume, pitch);
            events.push(SimulationEvent::AttackStarted {
                time: now,
                agent: npc.name.clone(),
            });
        }
    }
}

fn advance_motion(world: &mut SimWorld, dt: f32) {
    for npc in world.npcs.iter_mut() {
        npc.nav.step(dt);
        npc.attacker.tick(dt);
    }
    if let Some(target) = world.target.as_mut() {
        target.step(dt);
    }
}

/// Ambient vocalization; agents ignore their own groans by distance
fn groan(world: &mut SimWorld, events: &mut Vec<SimulationEvent>) {
    let now = world.now();
    for npc in world.npcs.iter_mut() {
        if !npc.groan.poll(now, &mut world.rng) {
            continue;
        }
        let agent = &world.config.agent;
        let position = npc.position();
        match world
            .field
            .add_sound_wave(npc.id, position, SoundTag::Npc, agent.groan_wave, None)
        {
            Ok(slot) => {
                let pitch = jittered_pitch(&mut world.rng, agent.groan_pitch_jitter);
                world
                    .audio
                    .play_at_position("NPC Groan", position, agent.groan_volume, pitch);
                events.push(SimulationEvent::WaveEmitted {
                    time: now,
                    slot,
                    source: npc.name.clone(),
                    tag: SoundTag::Npc,
                    radius: agent.groan_wave.radius,
                });
            }
            Err(e) => events.push(SimulationEvent::WaveDropped {
                time: now,
                source: npc.name.clone(),
                tag: SoundTag::Npc,
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::Vec3;
    use crate::waves::material::{MaterialKind, SoundMaterial};
    use crate::waves::params::WaveParams;
    use crate::waves::relay::ResonanceRelay;

    fn quiet_world() -> SimWorld {
        let mut config = SimulationConfig::default();
        // Keep groans out of the way
        config.agent.min_groan_interval = 1000.0;
        config.agent.max_groan_interval = 1000.0;
        SimWorld::new(config, 3).unwrap()
    }

    #[test]
    fn test_agent_hears_and_chases_wave() {
        let mut world = quiet_world();
        let bell = world
            .add_emitter("bell", Vec3::new(6.0, 0.0, 0.0), SoundMaterial::default())
            .unwrap();
        world.spawn_npc("warden", Vec3::ZERO, Vec3::Z, vec![]).unwrap();
        world
            .field
            .add_sound_wave(bell, Vec3::new(6.0, 0.0, 0.0), SoundTag::Bell, WaveParams::new(10.0, 10.0).unwrap(), None)
            .unwrap();

        let mut all = Vec::new();
        for _ in 0..10 {
            all.extend(run_simulation_tick(&mut world, 0.1));
        }

        let heard = all
            .iter()
            .filter(|e| matches!(e, SimulationEvent::SoundHeard { .. }))
            .count();
        assert_eq!(heard, 1);
        assert!(all.iter().any(|e| matches!(
            e,
            SimulationEvent::StateChanged { to: AgentState::ChaseSound, .. }
        )));
    }

    #[test]
    fn test_relay_resonates_once() {
        let mut world = quiet_world();
        let lyre = world
            .add_emitter("lyre", Vec3::ZERO, SoundMaterial::default())
            .unwrap();
        world
            .add_relay(
                "gong",
                Vec3::new(2.0, 0.0, 0.0),
                |id| ResonanceRelay::new(id, Vec3::new(2.0, 0.0, 0.0)),
                SoundMaterial::new(MaterialKind::Metal, 0.8),
            )
            .unwrap();
        world
            .field
            .add_sound_wave(lyre, Vec3::ZERO, SoundTag::Lyre, WaveParams::new(8.0, 8.0).unwrap(), None)
            .unwrap();

        let mut resonated = 0;
        for _ in 0..40 {
            resonated += run_simulation_tick(&mut world, 0.1)
                .iter()
                .filter(|e| matches!(e, SimulationEvent::Resonated { .. }))
                .count();
        }
        // The gong's own wave passes the gong, but it is in that chain already
        assert_eq!(resonated, 1);
        assert!(!world.audio.played.is_empty());
    }

    #[test]
    fn test_agent_groans_on_schedule() {
        let mut config = SimulationConfig::default();
        config.agent.min_groan_interval = 0.5;
        config.agent.max_groan_interval = 0.5;
        let mut world = SimWorld::new(config, 1).unwrap();
        world.spawn_npc("warden", Vec3::ZERO, Vec3::Z, vec![]).unwrap();

        let mut groans = 0;
        for _ in 0..12 {
            for event in run_simulation_tick(&mut world, 0.1) {
                if let SimulationEvent::WaveEmitted { tag: SoundTag::Npc, .. } = event {
                    groans += 1;
                }
                assert!(!matches!(event, SimulationEvent::SoundHeard { .. }));
            }
        }
        assert_eq!(groans, 2);
        assert_eq!(world.audio.played.iter().filter(|c| c.clip == "NPC Groan").count(), 2);
    }

    #[test]
    fn test_attack_fires_animation_pattern_and_audio() {
        let mut world = quiet_world();
        world
            .set_target("player", Vec3::new(0.0, 0.0, 1.0), vec![], 0.0)
            .unwrap();
        let npc = world.spawn_npc("warden", Vec3::ZERO, Vec3::Z, vec![]).unwrap();

        let events = run_simulation_tick(&mut world, 0.1);
        assert!(events
            .iter()
            .any(|e| matches!(e, SimulationEvent::AttackStarted { .. })));

        let warden = world.npc(npc).unwrap();
        assert_eq!(warden.animation.fired, ["attack".to_string()]);
        assert!(world.audio.played.iter().any(|c| c.clip == "NPC Attack"));

        // The pattern's first wave fires on the next tick, from the agent
        let next = run_simulation_tick(&mut world, 0.1);
        assert!(next.iter().any(|e| matches!(
            e,
            SimulationEvent::WaveEmitted { tag: SoundTag::Npc, source, .. } if source == "warden"
        )));
    }

    #[test]
    fn test_events_serialize_with_tag() {
        let event = SimulationEvent::AttackStarted {
            time: 1.5,
            agent: "warden".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"AttackStarted\""));
        assert!(event.to_string().contains("warden attacks"));
    }
}
