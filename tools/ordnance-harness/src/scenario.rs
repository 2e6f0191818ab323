//! Scenario files: engine config, targets to place, and a fire schedule.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use glam::Vec2;
use serde::Deserialize;

use ordnance_core::content::ContentPack;
use ordnance_core::descriptor::BehaviorDescriptor;
use ordnance_core::enums::TargetKind;
use ordnance_core::error::ContentError;
use ordnance_core::registry::DescriptorRegistry;
use ordnance_core::types::Team;
use ordnance_sim::sandbox::SandboxWorld;
use ordnance_sim::{EngineConfig, SpawnContext};

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("shot references unknown descriptor `{0}`")]
    UnknownDescriptor(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetSpec {
    pub team: Team,
    pub kind: TargetKind,
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_hit_size")]
    pub hit_size: f32,
    pub health: f32,
    #[serde(default)]
    pub armor: f32,
}

fn default_hit_size() -> f32 {
    8.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShotSpec {
    pub descriptor: String,
    pub team: Team,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    /// Tick on which the shot is fired.
    #[serde(default)]
    pub tick: u64,
    #[serde(default)]
    pub damage: Option<f32>,
    #[serde(default = "one")]
    pub velocity_scale: f32,
    #[serde(default = "one")]
    pub lifetime_scale: f32,
}

fn one() -> f32 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
    #[serde(default)]
    pub shots: Vec<ShotSpec>,
}

fn default_ticks() -> u64 {
    120
}

/// A scenario with its shots resolved against a loaded registry.
pub struct Prepared {
    pub scenario: Scenario,
    pub registry: Arc<DescriptorRegistry>,
    /// Shots grouped by firing tick.
    pub schedule: BTreeMap<u64, Vec<(Arc<BehaviorDescriptor>, SpawnContext)>>,
}

impl Prepared {
    /// Fresh battlefield with every scenario target placed.
    pub fn world(&self) -> SandboxWorld {
        let mut world = SandboxWorld::new();
        for t in &self.scenario.targets {
            let position = Vec2::new(t.x, t.y);
            let id = match t.kind {
                TargetKind::Building => world.spawn_building(t.team, position, t.hit_size, t.health),
                kind => world.spawn_unit_target(t.team, kind, position, t.hit_size, t.health),
            };
            if t.armor > 0.0 {
                world.set_armor(id, t.armor);
            }
        }
        world
    }
}

pub fn read(path: &Path) -> Result<String, ScenarioError> {
    std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_registry(content: &Path) -> Result<DescriptorRegistry, ScenarioError> {
    let pack = ContentPack::from_json(&read(content)?)?;
    let mut registry = DescriptorRegistry::new();
    let loaded = pack.load_into(&mut registry)?;
    tracing::info!(descriptors = loaded.len(), path = %content.display(), "content pack loaded");
    Ok(registry)
}

pub fn prepare(content: &Path, scenario: &Path) -> Result<Prepared, ScenarioError> {
    let registry = load_registry(content)?;
    let scenario: Scenario = serde_json::from_str(&read(scenario)?)?;

    let mut schedule: BTreeMap<u64, Vec<_>> = BTreeMap::new();
    for shot in &scenario.shots {
        let descriptor = registry
            .by_name(&shot.descriptor)
            .ok_or_else(|| ScenarioError::UnknownDescriptor(shot.descriptor.clone()))?;
        let mut ctx = SpawnContext::new(shot.team, Vec2::new(shot.x, shot.y), shot.angle)
            .with_scales(shot.velocity_scale, shot.lifetime_scale);
        ctx.damage = shot.damage;
        schedule.entry(shot.tick).or_default().push((descriptor, ctx));
    }

    Ok(Prepared {
        scenario,
        registry: Arc::new(registry),
        schedule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACK: &str = include_str!("../scenarios/artillery.content.json");
    const SKIRMISH: &str = include_str!("../scenarios/skirmish.json");

    #[test]
    fn sample_pack_loads() {
        let mut registry = DescriptorRegistry::new();
        let loaded = ContentPack::from_json(PACK)
            .unwrap()
            .load_into(&mut registry)
            .unwrap();
        assert_eq!(loaded.len(), 5);
        let shell = registry.by_name("artillery-shell").unwrap();
        assert!(shell.despawn_hit);
        assert!(shell.frag.as_ref().and_then(|f| f.child()).is_some());
    }

    #[test]
    fn sample_scenario_references_known_descriptors() {
        let mut registry = DescriptorRegistry::new();
        ContentPack::from_json(PACK)
            .unwrap()
            .load_into(&mut registry)
            .unwrap();
        let scenario: Scenario = serde_json::from_str(SKIRMISH).unwrap();
        assert_eq!(scenario.config.seed, 7);
        assert_eq!(scenario.targets.len(), 5);
        assert!(scenario
            .shots
            .iter()
            .all(|s| registry.by_name(&s.descriptor).is_some()));
    }
}
