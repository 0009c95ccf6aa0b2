//! Integration tests for agent perception, learning and decisions

use std::path::Path;

use echo_warden::agent::AgentState;
use echo_warden::core::config::SimulationConfig;
use echo_warden::core::types::{SoundTag, Vec3};
use echo_warden::perception::{pick_best, score, PerceivedSound, SuspicionModel};
use echo_warden::simulation::{run_simulation_tick, Scenario, SimWorld, SimulationEvent};
use echo_warden::waves::{SoundMaterial, WaveParams};

#[test]
fn test_stone_is_ignored_after_three_fruitless_chases() {
    let mut model = SuspicionModel::default();
    assert_eq!(model.lookup(SoundTag::Stone), 100.0);

    assert!(model.debunk(SoundTag::Stone, 3.0));
    assert!(model.debunk(SoundTag::Stone, 3.0));
    assert!(model.debunk(SoundTag::Stone, 3.0));
    assert_eq!(model.lookup(SoundTag::Stone), 0.0);

    assert!(!model.debunk(SoundTag::Stone, 3.0));
    assert_eq!(model.lookup(SoundTag::Stone), 0.0);

    // Not learnable, left alone
    assert!(!model.debunk(SoundTag::Bell, 3.0));
    assert_eq!(model.lookup(SoundTag::Bell), 80.0);
}

#[test]
fn test_near_certain_sound_beats_far_doubtful_one() {
    let model = SuspicionModel::default();
    let stone = PerceivedSound::new(1.0, Vec3::new(5.0, 0.0, 0.0), 5.0, SoundTag::Stone);
    let bell = PerceivedSound::new(1.0, Vec3::new(90.0, 0.0, 0.0), 90.0, SoundTag::Bell);

    assert_eq!(score(&stone, &model, 1.0), 5.0);
    assert_eq!(score(&bell, &model, 1.0), 110.0);

    let sounds = [bell, stone];
    assert_eq!(pick_best(&sounds, &model, 1.0), Some(&stone));
}

fn world_with_groans(interval: f32) -> SimWorld {
    let mut config = SimulationConfig::default();
    config.agent.min_groan_interval = interval;
    config.agent.max_groan_interval = interval;
    SimWorld::new(config, 21).unwrap()
}

#[test]
fn test_attack_outranks_a_pending_sound() {
    let mut world = world_with_groans(1000.0);
    world
        .set_target("player", Vec3::new(0.0, 0.0, 1.5), Vec::new(), 0.0)
        .unwrap();
    let bell = world
        .add_emitter("bell", Vec3::new(6.0, 0.0, 0.0), SoundMaterial::default())
        .unwrap();
    let warden = world.spawn_npc("warden", Vec3::ZERO, Vec3::Z, vec![]).unwrap();
    world
        .field
        .add_sound_wave(bell, Vec3::new(6.0, 0.0, 0.0), SoundTag::Bell, WaveParams::new(10.0, 10.0).unwrap(), None)
        .unwrap();

    let mut events = Vec::new();
    for _ in 0..10 {
        events.extend(run_simulation_tick(&mut world, 0.1));
    }

    assert!(events
        .iter()
        .any(|e| matches!(e, SimulationEvent::SoundHeard { tag: SoundTag::Bell, .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, SimulationEvent::AttackStarted { .. })));

    let npc = world.npc(warden).unwrap();
    assert_eq!(npc.brain.state(), AgentState::Attack);
    assert!(npc.animation.fired.iter().any(|a| a == "attack"));
}

#[test]
fn test_agent_ignores_its_own_groan() {
    let mut world = world_with_groans(0.5);
    world.spawn_npc("warden", Vec3::ZERO, Vec3::Z, vec![]).unwrap();

    let mut events = Vec::new();
    for _ in 0..40 {
        events.extend(run_simulation_tick(&mut world, 0.1));
    }
    assert!(events
        .iter()
        .any(|e| matches!(e, SimulationEvent::WaveEmitted { tag: SoundTag::Npc, .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, SimulationEvent::SoundHeard { .. })));
}

fn run_cavern(seed: u64) -> Vec<SimulationEvent> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(Scenario::bundled_path("cavern"));
    let scenario = Scenario::load(&path).unwrap();
    let mut world = scenario.build(SimulationConfig::default(), seed).unwrap();
    let mut events = Vec::new();
    for _ in 0..300 {
        events.extend(run_simulation_tick(&mut world, 0.05));
    }
    events
}

#[test]
fn test_cavern_is_deterministic_for_a_seed() {
    let first = run_cavern(7);
    let second = run_cavern(7);
    assert_eq!(first, second);

    assert!(first
        .iter()
        .any(|e| matches!(e, SimulationEvent::Resonated { .. })));

    // Pattern at 10s, lyre destroyed at 10.7s: the third wave never starts
    let late_lyre_waves = first
        .iter()
        .filter(|e| matches!(
            e,
            SimulationEvent::WaveEmitted { time, source, .. } if source == "lyre" && *time > 9.0
        ))
        .count();
    assert_eq!(late_lyre_waves, 2);
    assert!(first
        .iter()
        .any(|e| matches!(e, SimulationEvent::EntityDestroyed { entity, .. } if entity == "lyre")));
}
