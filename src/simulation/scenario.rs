//! Scenario files - scene layout and script loaded from TOML

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{EchoError, Result};
use crate::core::types::{vec3, SoundTag, Vec3};
use crate::simulation::script::ScriptedAction;
use crate::simulation::world::SimWorld;
use crate::waves::material::SoundMaterial;
use crate::waves::relay::ResonanceRelay;

fn default_forward() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

fn default_resonance() -> f32 {
    1.0
}

fn default_emit_tag() -> SoundTag {
    SoundTag::Resonance
}

fn default_triggers() -> Vec<SoundTag> {
    vec![SoundTag::Resonance, SoundTag::Lyre]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub position: [f32; 3],
    #[serde(default = "default_forward")]
    pub forward: [f32; 3],
    #[serde(default)]
    pub waypoints: Vec<[f32; 3]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySpec {
    pub name: String,
    pub position: [f32; 3],
    /// Defaults to `position`
    #[serde(default)]
    pub resonance_point: Option<[f32; 3]>,
    #[serde(default = "default_resonance")]
    pub resonance: f32,
    #[serde(default = "default_emit_tag")]
    pub emit_tag: SoundTag,
    #[serde(default = "default_triggers")]
    pub triggers: Vec<SoundTag>,
    #[serde(default)]
    pub material: SoundMaterial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name: String,
    pub position: [f32; 3],
    #[serde(default)]
    pub path: Vec<[f32; 3]>,
    #[serde(default)]
    pub speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterSpec {
    pub name: String,
    pub position: [f32; 3],
    #[serde(default)]
    pub material: SoundMaterial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccluderSpec {
    pub center: [f32; 3],
    pub radius: f32,
}

/// A complete scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub target: Option<TargetSpec>,
    pub agents: Vec<AgentSpec>,
    pub relays: Vec<RelaySpec>,
    pub emitters: Vec<EmitterSpec>,
    pub occluders: Vec<OccluderSpec>,
    pub script: Vec<ScriptedAction>,
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut scenario = Self::from_toml_str(&content)?;
        if scenario.name.is_empty() {
            scenario.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(scenario)
    }

    /// Path of a bundled scenario by name
    pub fn bundled_path(name: &str) -> PathBuf {
        PathBuf::from("data/scenarios").join(format!("{}.toml", name))
    }

    /// Instantiate the scene
    ///
    /// The target is placed before agents so they know they have one.
    /// Script actions naming unknown entities are rejected here rather than
    /// silently skipped later.
    pub fn build(&self, config: SimulationConfig, seed: u64) -> Result<SimWorld> {
        let mut world = SimWorld::new(config, seed)?;

        for occluder in &self.occluders {
            world.space = std::mem::take(&mut world.space)
                .with_occluder(vec3(occluder.center), occluder.radius);
        }
        if let Some(target) = &self.target {
            let path = target.path.iter().copied().map(vec3).collect();
            world.set_target(&target.name, vec3(target.position), path, target.speed)?;
        }
        for emitter in &self.emitters {
            world.add_emitter(&emitter.name, vec3(emitter.position), emitter.material)?;
        }
        for spec in &self.relays {
            let position = vec3(spec.position);
            let point = spec.resonance_point.map(vec3).unwrap_or(position);
            world.add_relay(
                &spec.name,
                position,
                |id| {
                    let mut relay = ResonanceRelay::new(id, point)
                        .with_resonance(spec.resonance)
                        .with_emit_tag(spec.emit_tag);
                    relay.triggers = spec.triggers.clone();
                    relay
                },
                spec.material,
            )?;
        }
        for agent in &self.agents {
            let waypoints: Vec<Vec3> = agent.waypoints.iter().copied().map(vec3).collect();
            world.spawn_npc(&agent.name, vec3(agent.position), vec3(agent.forward), waypoints)?;
        }

        for action in &self.script {
            for name in action.referenced_names() {
                if world.find(name).is_none() {
                    return Err(EchoError::Config(format!(
                        "script action at {}s refers to unknown entity '{}'",
                        action.at(),
                        name
                    )));
                }
            }
            world.schedule(action.clone());
        }

        tracing::info!(
            scenario = %self.name,
            agents = world.npcs.len(),
            relays = world.relays.len(),
            actions = self.script.len(),
            "scenario built"
        );
        Ok(world)
    }
}
