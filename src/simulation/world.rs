//! Simulation world - owns the sound field and every entity in the scene

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::agent::brain::DecisionCore;
use crate::agent::collaborators::Navigation;
use crate::agent::headless::{AnimationLog, AudioLog, KinematicNavigator, OpenSpace};
use crate::agent::striker::{Attacker, GroanTimer};
use crate::core::config::SimulationConfig;
use crate::core::error::{EchoError, Result};
use crate::core::types::{EntityId, SimTime, Vec3};
use crate::perception::suspicion::SuspicionModel;
use crate::simulation::script::ScriptedAction;
use crate::waves::field::SoundField;
use crate::waves::material::SoundMaterial;
use crate::waves::relay::ResonanceRelay;
use crate::waves::volume::Listener;

/// A listening, patrolling agent
pub struct Npc {
    pub id: EntityId,
    pub name: String,
    pub brain: DecisionCore,
    pub nav: KinematicNavigator,
    pub attacker: Attacker,
    pub animation: AnimationLog,
    pub groan: GroanTimer,
}

impl Npc {
    pub fn position(&self) -> Vec3 {
        self.nav.position()
    }
}

/// A static object that resonates
#[derive(Debug, Clone)]
pub struct RelayObject {
    pub name: String,
    pub position: Vec3,
    pub relay: ResonanceRelay,
    pub material: SoundMaterial,
}

impl RelayObject {
    pub fn id(&self) -> EntityId {
        self.relay.entity
    }
}

/// The tracked threat; walks a looped path
#[derive(Debug, Clone)]
pub struct Target {
    pub id: EntityId,
    pub name: String,
    pub position: Vec3,
    pub path: Vec<Vec3>,
    pub speed: f32,
    path_index: usize,
}

impl Target {
    pub fn step(&mut self, dt: f32) {
        let Some(&goal) = self.path.get(self.path_index) else {
            return;
        };
        let to_goal = goal - self.position;
        let distance = to_goal.length();
        let travel = self.speed * dt;
        if distance <= travel {
            self.position = goal;
            self.path_index = (self.path_index + 1) % self.path.len();
        } else {
            self.position += to_goal / distance * travel;
        }
    }
}

/// A named point that scripted sounds come from
#[derive(Debug, Clone)]
pub struct Emitter {
    pub id: EntityId,
    pub name: String,
    pub position: Vec3,
    pub material: SoundMaterial,
}

pub struct SimWorld {
    pub config: SimulationConfig,
    pub field: SoundField,
    pub npcs: Vec<Npc>,
    pub relays: Vec<RelayObject>,
    pub emitters: Vec<Emitter>,
    pub target: Option<Target>,
    pub space: OpenSpace,
    pub audio: AudioLog,
    pub rng: ChaCha8Rng,
    pub current_tick: u64,
    /// Pending scripted actions, ordered by time
    pub(crate) script: Vec<ScriptedAction>,
    suspicion: SuspicionModel,
    names: AHashMap<String, EntityId>,
}

impl SimWorld {
    /// Build an empty world; fails if the config is inconsistent
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let suspicion = SuspicionModel::from_config(&config.suspicion)?;
        let field = SoundField::new(config.waves.clone())?;

        Ok(Self {
            config,
            field,
            npcs: Vec::new(),
            relays: Vec::new(),
            emitters: Vec::new(),
            target: None,
            space: OpenSpace::new(),
            audio: AudioLog::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            current_tick: 0,
            script: Vec::new(),
            suspicion,
            names: AHashMap::new(),
        })
    }

    pub fn now(&self) -> SimTime {
        self.field.now()
    }

    fn register(&mut self, name: &str, id: EntityId) -> Result<()> {
        if self.names.contains_key(name) {
            return Err(EchoError::Config(format!("entity name '{}' used twice", name)));
        }
        self.names.insert(name.to_string(), id);
        Ok(())
    }

    pub fn spawn_npc(
        &mut self,
        name: &str,
        position: Vec3,
        forward: Vec3,
        waypoints: Vec<Vec3>,
    ) -> Result<EntityId> {
        let id = EntityId::new();
        self.register(name, id)?;

        let agent = &self.config.agent;
        let brain = DecisionCore::new(agent.clone(), self.suspicion.clone(), waypoints);
        let groan = GroanTimer::new(&mut self.rng, agent.min_groan_interval, agent.max_groan_interval);
        let mut npc = Npc {
            id,
            name: name.to_string(),
            brain,
            nav: KinematicNavigator::new(position).with_forward(forward),
            attacker: Attacker::new(agent.attack_duration),
            animation: AnimationLog::default(),
            groan,
        };
        let _span = tracing::debug_span!("npc", name).entered();
        npc.brain.begin(&mut npc.nav, self.target.is_some());

        tracing::debug!(%id, name, ?position, "npc spawned");
        self.npcs.push(npc);
        Ok(id)
    }

    pub fn add_relay(
        &mut self,
        name: &str,
        position: Vec3,
        relay: impl FnOnce(EntityId) -> ResonanceRelay,
        material: SoundMaterial,
    ) -> Result<EntityId> {
        let id = EntityId::new();
        self.register(name, id)?;
        self.relays.push(RelayObject {
            name: name.to_string(),
            position,
            relay: relay(id),
            material,
        });
        Ok(id)
    }

    /// Place the target; must happen before NPCs are spawned to count for them
    pub fn set_target(&mut self, name: &str, position: Vec3, path: Vec<Vec3>, speed: f32) -> Result<EntityId> {
        let id = EntityId::new();
        self.register(name, id)?;
        self.target = Some(Target {
            id,
            name: name.to_string(),
            position,
            path,
            speed: speed.max(0.0),
            path_index: 0,
        });
        Ok(id)
    }

    pub fn add_emitter(&mut self, name: &str, position: Vec3, material: SoundMaterial) -> Result<EntityId> {
        let id = EntityId::new();
        self.register(name, id)?;
        self.emitters.push(Emitter {
            id,
            name: name.to_string(),
            position,
            material,
        });
        Ok(id)
    }

    /// Queue a scripted action; the queue stays sorted by time
    pub fn schedule(&mut self, action: ScriptedAction) {
        let at = action.at();
        let index = self.script.partition_point(|a| a.at() <= at);
        self.script.insert(index, action);
    }

    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    pub fn name_of(&self, id: EntityId) -> String {
        self.names
            .iter()
            .find(|(_, v)| **v == id)
            .map(|(k, _)| k.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn position_of(&self, id: EntityId) -> Option<Vec3> {
        if let Some(npc) = self.npcs.iter().find(|n| n.id == id) {
            return Some(npc.position());
        }
        if let Some(relay) = self.relays.iter().find(|r| r.id() == id) {
            return Some(relay.position);
        }
        if let Some(emitter) = self.emitters.iter().find(|e| e.id == id) {
            return Some(emitter.position);
        }
        self.target
            .as_ref()
            .filter(|t| t.id == id)
            .map(|t| t.position)
    }

    /// Snapshot of every live entity's position
    pub fn entity_positions(&self) -> AHashMap<EntityId, Vec3> {
        let mut positions = AHashMap::new();
        for npc in &self.npcs {
            positions.insert(npc.id, npc.position());
        }
        for relay in &self.relays {
            positions.insert(relay.id(), relay.position);
        }
        for emitter in &self.emitters {
            positions.insert(emitter.id, emitter.position);
        }
        if let Some(target) = &self.target {
            positions.insert(target.id, target.position);
        }
        positions
    }

    /// Everything that can hear: relays and NPCs
    pub fn listeners(&self) -> Vec<Listener> {
        self.relays
            .iter()
            .map(|r| Listener::new(r.id(), r.position))
            .chain(self.npcs.iter().map(|n| Listener::new(n.id, n.position())))
            .collect()
    }

    pub fn npc(&self, id: EntityId) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.id == id)
    }

    pub fn npc_by_name(&self, name: &str) -> Option<&Npc> {
        self.find(name).and_then(|id| self.npc(id))
    }

    /// Remove an entity; its pending pattern waves are cancelled
    pub fn destroy_entity(&mut self, id: EntityId) -> Result<()> {
        let before = self.npcs.len() + self.relays.len() + self.emitters.len();
        self.npcs.retain(|n| n.id != id);
        self.relays.retain(|r| r.id() != id);
        self.emitters.retain(|e| e.id != id);
        let mut removed = before != self.npcs.len() + self.relays.len() + self.emitters.len();
        if self.target.as_ref().is_some_and(|t| t.id == id) {
            self.target = None;
            removed = true;
        }
        if !removed {
            return Err(EchoError::EntityNotFound(id));
        }

        self.names.retain(|_, v| *v != id);
        self.field.cancel_patterns(id);
        tracing::debug!(%id, "entity destroyed");
        Ok(())
    }

    /// Clear all sound state; entities stay
    pub fn reset_sounds(&mut self) {
        self.field.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SoundTag;
    use crate::waves::params::{PatternWave, WaveParams, WavePattern};
    use crate::waves::schedule::EmissionSource;

    fn world() -> SimWorld {
        SimWorld::new(SimulationConfig::default(), 42).unwrap()
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut w = world();
        w.add_emitter("bell", Vec3::ZERO, SoundMaterial::default()).unwrap();
        assert!(w.add_emitter("bell", Vec3::ONE, SoundMaterial::default()).is_err());
    }

    #[test]
    fn test_position_lookup() {
        let mut w = world();
        let target = w.set_target("player", Vec3::X, vec![], 0.0).unwrap();
        let npc = w.spawn_npc("warden", Vec3::Z, Vec3::Z, vec![]).unwrap();
        assert_eq!(w.position_of(target), Some(Vec3::X));
        assert_eq!(w.position_of(npc), Some(Vec3::Z));
        assert_eq!(w.entity_positions().len(), 2);
        assert_eq!(w.listeners().len(), 1);
    }

    #[test]
    fn test_destroy_cancels_patterns() {
        let mut w = world();
        let bell = w.add_emitter("bell", Vec3::ZERO, SoundMaterial::default()).unwrap();
        let pattern = WavePattern::new(vec![
            PatternWave::new(1.0, WaveParams::default()),
            PatternWave::new(2.0, WaveParams::default()),
        ]);
        w.field
            .add_sound_wave_pattern(bell, EmissionSource::Follow(bell), SoundTag::Bell, &pattern, None)
            .unwrap();
        assert_eq!(w.field.pending_emissions(), 2);

        w.destroy_entity(bell).unwrap();
        assert_eq!(w.field.pending_emissions(), 0);
        assert!(w.find("bell").is_none());
        assert!(matches!(w.destroy_entity(bell), Err(EchoError::EntityNotFound(_))));
    }

    #[test]
    fn test_target_walks_looped_path() {
        let mut w = world();
        w.set_target("player", Vec3::ZERO, vec![Vec3::X, Vec3::ZERO], 1.0).unwrap();
        let target = w.target.as_mut().unwrap();
        target.step(0.5);
        assert!((target.position.x - 0.5).abs() < 1e-5);
        target.step(0.5);
        assert_eq!(target.position, Vec3::X);
        target.step(0.25);
        assert!((target.position.x - 0.75).abs() < 1e-5);
    }
}
