//! Interfaces to the world the engine runs against.
//!
//! The engine never reaches for global state: every entry point receives a
//! `Battlefield` handle, which bundles the spatial index, the target mutation
//! surface, and the tile service.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use ordnance_core::enums::{LiquidKind, StatusEffect, TargetKind};
use ordnance_core::types::{TargetId, Team, TileRef, UnitKindId};

/// Read-only view of a hittable target at query time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub id: TargetId,
    pub team: Team,
    pub kind: TargetKind,
    pub position: Vec2,
    pub hit_size: f32,
    pub health: f32,
    pub max_health: f32,
    pub under_construction: bool,
}

impl TargetInfo {
    pub fn damaged(&self) -> bool {
        self.health < self.max_health
    }

    pub fn is_building(&self) -> bool {
        matches!(self.kind, TargetKind::Building)
    }
}

/// A unit created by a "spawn unit instead" descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSpawn {
    pub kind: UnitKindId,
    pub team: Team,
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
}

/// Deterministic spatial queries. Equal inputs must yield equal outputs in
/// equal order.
pub trait SpatialIndex {
    /// Current state of one target.
    fn target(&self, id: TargetId) -> Option<TargetInfo>;

    /// Closest target to `origin` within `radius` accepted by `filter`.
    /// Ties break on the lower id.
    fn nearest_target(
        &self,
        origin: Vec2,
        radius: f32,
        filter: &mut dyn FnMut(&TargetInfo) -> bool,
    ) -> Option<TargetInfo>;

    /// Every target whose center lies within `radius` of `origin`, ordered by id.
    fn targets_in_radius(&self, origin: Vec2, radius: f32) -> Vec<TargetInfo>;

    /// Targets whose hit circle touches the swept segment `from -> to` widened
    /// by `radius`, ordered by distance along the segment then by id.
    fn intersecting(&self, from: Vec2, to: Vec2, radius: f32) -> Vec<TargetInfo>;
}

/// Mutations applied to targets. Applied immediately and visible to later queries.
pub trait TargetEffects {
    /// Apply damage; returns the amount actually taken after armor.
    fn damage(&mut self, target: TargetId, amount: f32, pierce_armor: bool) -> f32;
    fn heal(&mut self, target: TargetId, amount: f32);
    fn apply_status(&mut self, target: TargetId, status: StatusEffect, duration: f32);
    fn impulse(&mut self, target: TargetId, impulse: Vec2);
    /// Deny regeneration for `duration` ticks.
    fn suppress(&mut self, target: TargetId, duration: f32);
    fn kill(&mut self, target: TargetId);
    fn spawn_unit(&mut self, spawn: UnitSpawn);
}

/// Tile grid access.
pub trait TileWorld {
    fn tile_at(&self, position: Vec2) -> Option<TileRef>;
    fn ignite_fire(&mut self, tile: TileRef);
    fn deposit_liquid(&mut self, tile: TileRef, liquid: LiquidKind, amount: f32);
}

/// Everything the engine needs from the surrounding simulation.
pub trait Battlefield: SpatialIndex + TargetEffects + TileWorld {
    /// Run `action` for every target within `radius` of `origin` that belongs to
    /// `team` (any team when `None`) and passes `predicate`.
    fn for_each_in_radius(
        &mut self,
        team: Option<Team>,
        origin: Vec2,
        radius: f32,
        predicate: impl Fn(&TargetInfo) -> bool,
        mut action: impl FnMut(&mut Self, &TargetInfo),
    ) where
        Self: Sized,
    {
        for target in self.targets_in_radius(origin, radius) {
            if team.map_or(true, |t| t == target.team) && predicate(&target) {
                action(self, &target);
            }
        }
    }
}

impl<T: SpatialIndex + TargetEffects + TileWorld> Battlefield for T {}
