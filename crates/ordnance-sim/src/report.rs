//! Per-tick output of the engine.

use glam::Vec2;
use serde::Serialize;

use ordnance_core::enums::RemovalCause;
use ordnance_core::events::FxEvent;
use ordnance_core::types::TargetId;

use crate::pool::ProjectileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HitKind {
    /// Direct contact with a unit or structure.
    Direct,
    /// Area damage around an impact point.
    Splash,
    /// Healing applied to a friendly structure.
    Heal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HitRecord {
    pub projectile: ProjectileId,
    pub target: TargetId,
    pub kind: HitKind,
    /// Amount actually applied.
    pub amount: f32,
}

/// One generated chain branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainRecord {
    pub source: ProjectileId,
    pub origin: Vec2,
    /// Initial branch heading in degrees, before segment jitter.
    pub angle: f32,
    pub segments: u32,
    pub endpoint: Vec2,
    /// Whether a strike was queued at the endpoint.
    pub strike_queued: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RemovalRecord {
    pub projectile: ProjectileId,
    pub cause: RemovalCause,
    pub position: Vec2,
}

/// Everything that happened since the previous tick.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub fx: Vec<FxEvent>,
    pub hits: Vec<HitRecord>,
    pub chains: Vec<ChainRecord>,
    pub spawned: Vec<ProjectileId>,
    pub removed: Vec<RemovalRecord>,
    pub units_spawned: u32,
    /// Child spawns dropped by the depth bound.
    pub suppressed_spawns: u32,
    /// Projectiles removed after a step fault.
    pub faults: u32,
    /// Live projectiles after the tick.
    pub live: usize,
}

impl TickReport {
    pub fn direct_hits_on(&self, target: TargetId) -> usize {
        self.hits
            .iter()
            .filter(|h| h.target == target && h.kind == HitKind::Direct)
            .count()
    }
}
