//! In-memory battlefield backed by a hecs world.
//!
//! Used by tests and the harness. Queries are ordered by target id so equal
//! inputs always give equal outputs.

use std::cmp::Ordering;

use glam::Vec2;
use hecs::{Entity, World};
use serde::Serialize;

use ordnance_core::constants::MIN_ARMOR_DAMAGE;
use ordnance_core::enums::{LiquidKind, StatusEffect, TargetKind};
use ordnance_core::types::{TargetId, Team, TileRef};

use crate::services::{SpatialIndex, TargetEffects, TargetInfo, TileWorld, UnitSpawn};

/// Health given to units created by unit-spawn descriptors.
const SPAWNED_UNIT_HEALTH: f32 = 100.0;
const SPAWNED_UNIT_HIT_SIZE: f32 = 8.0;

#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub team: Team,
    pub kind: TargetKind,
    pub position: Vec2,
    pub hit_size: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    pub armor: f32,
}

/// Marker for structures still being built.
#[derive(Debug, Clone, Copy)]
pub struct UnderConstruction;

#[derive(Debug, Clone, Default)]
pub struct Statuses(pub Vec<(StatusEffect, f32)>);

/// Accumulated impulse.
#[derive(Debug, Clone, Copy, Default)]
pub struct Momentum(pub Vec2);

/// Remaining regeneration suppression, in ticks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Suppressed(pub f32);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PuddleDeposit {
    pub tile: TileRef,
    pub liquid: LiquidKind,
    pub amount: f32,
}

/// Bookkeeping visible to tests and tooling.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SandboxLog {
    pub fires: Vec<TileRef>,
    pub puddles: Vec<PuddleDeposit>,
    pub units: Vec<UnitSpawn>,
    pub killed: Vec<TargetId>,
}

#[derive(Default)]
pub struct SandboxWorld {
    world: World,
    log: SandboxLog,
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_unit_target(
        &mut self,
        team: Team,
        kind: TargetKind,
        position: Vec2,
        hit_size: f32,
        health: f32,
    ) -> TargetId {
        let entity = self.world.spawn((
            Body {
                team,
                kind,
                position,
                hit_size,
            },
            Health {
                current: health,
                max: health,
                armor: 0.0,
            },
            Statuses::default(),
            Momentum::default(),
        ));
        target_id(entity)
    }

    pub fn spawn_building(&mut self, team: Team, position: Vec2, hit_size: f32, health: f32) -> TargetId {
        let entity = self.world.spawn((
            Body {
                team,
                kind: TargetKind::Building,
                position,
                hit_size,
            },
            Health {
                current: health,
                max: health,
                armor: 0.0,
            },
            Suppressed::default(),
        ));
        target_id(entity)
    }

    pub fn set_armor(&mut self, id: TargetId, armor: f32) {
        if let Some(mut health) = self.component_mut::<Health>(id) {
            health.armor = armor;
        }
    }

    pub fn set_health(&mut self, id: TargetId, current: f32) {
        if let Some(mut health) = self.component_mut::<Health>(id) {
            health.current = current.min(health.max);
        }
    }

    pub fn set_under_construction(&mut self, id: TargetId) {
        if let Some(entity) = entity(id) {
            let _ = self.world.insert_one(entity, UnderConstruction);
        }
    }

    pub fn move_target(&mut self, id: TargetId, position: Vec2) {
        if let Some(mut body) = self.component_mut::<Body>(id) {
            body.position = position;
        }
    }

    pub fn health(&self, id: TargetId) -> Option<f32> {
        let entity = entity(id)?;
        self.world.get::<&Health>(entity).ok().map(|h| h.current)
    }

    pub fn statuses(&self, id: TargetId) -> Vec<(StatusEffect, f32)> {
        entity(id)
            .and_then(|e| self.world.get::<&Statuses>(e).ok().map(|s| s.0.clone()))
            .unwrap_or_default()
    }

    pub fn momentum(&self, id: TargetId) -> Option<Vec2> {
        let entity = entity(id)?;
        self.world.get::<&Momentum>(entity).ok().map(|m| m.0)
    }

    pub fn suppressed(&self, id: TargetId) -> f32 {
        entity(id)
            .and_then(|e| self.world.get::<&Suppressed>(e).ok().map(|s| s.0))
            .unwrap_or(0.0)
    }

    pub fn log(&self) -> &SandboxLog {
        &self.log
    }

    pub fn target_count(&self) -> usize {
        self.world.len() as usize
    }

    fn component_mut<T: hecs::Component>(&mut self, id: TargetId) -> Option<hecs::RefMut<'_, T>> {
        let entity = entity(id)?;
        self.world.get::<&mut T>(entity).ok()
    }

    fn all_targets(&self) -> Vec<TargetInfo> {
        let mut query = self
            .world
            .query::<(&Body, &Health, Option<&UnderConstruction>)>();
        let mut targets: Vec<TargetInfo> = query
            .iter()
            .map(|(entity, (body, health, construction))| TargetInfo {
                id: target_id(entity),
                team: body.team,
                kind: body.kind,
                position: body.position,
                hit_size: body.hit_size,
                health: health.current,
                max_health: health.max,
                under_construction: construction.is_some(),
            })
            .collect();
        targets.sort_by_key(|t| t.id);
        targets
    }
}

fn target_id(entity: Entity) -> TargetId {
    TargetId(entity.to_bits().get())
}

fn entity(id: TargetId) -> Option<Entity> {
    Entity::from_bits(id.0)
}

/// Parameter along `from -> to` of the point closest to `point`, in `[0, 1]`.
fn segment_param(from: Vec2, to: Vec2, point: Vec2) -> f32 {
    let seg = to - from;
    let len_sq = seg.length_squared();
    if len_sq <= f32::EPSILON {
        return 0.0;
    }
    ((point - from).dot(seg) / len_sq).clamp(0.0, 1.0)
}

impl SpatialIndex for SandboxWorld {
    fn target(&self, id: TargetId) -> Option<TargetInfo> {
        self.all_targets().into_iter().find(|t| t.id == id)
    }

    fn nearest_target(
        &self,
        origin: Vec2,
        radius: f32,
        filter: &mut dyn FnMut(&TargetInfo) -> bool,
    ) -> Option<TargetInfo> {
        let mut best: Option<(f32, TargetInfo)> = None;
        for target in self.all_targets() {
            let distance = target.position.distance(origin);
            if distance > radius || !filter(&target) {
                continue;
            }
            // Candidates arrive in id order, so strict less keeps the lower id on ties.
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, target));
            }
        }
        best.map(|(_, t)| t)
    }

    fn targets_in_radius(&self, origin: Vec2, radius: f32) -> Vec<TargetInfo> {
        self.all_targets()
            .into_iter()
            .filter(|t| t.position.distance(origin) <= radius)
            .collect()
    }

    fn intersecting(&self, from: Vec2, to: Vec2, radius: f32) -> Vec<TargetInfo> {
        let mut hits: Vec<(f32, TargetInfo)> = self
            .all_targets()
            .into_iter()
            .filter_map(|t| {
                let param = segment_param(from, to, t.position);
                let closest = from + (to - from) * param;
                (closest.distance(t.position) <= radius + t.hit_size / 2.0).then_some((param, t))
            })
            .collect();
        hits.sort_by(|a, b| match a.0.total_cmp(&b.0) {
            Ordering::Equal => a.1.id.cmp(&b.1.id),
            other => other,
        });
        hits.into_iter().map(|(_, t)| t).collect()
    }
}

impl TargetEffects for SandboxWorld {
    fn damage(&mut self, target: TargetId, amount: f32, pierce_armor: bool) -> f32 {
        let Some(entity) = entity(target) else {
            return 0.0;
        };
        let (applied, dead) = {
            let Ok(mut health) = self.world.get::<&mut Health>(entity) else {
                return 0.0;
            };
            let applied = if pierce_armor {
                amount
            } else {
                (amount - health.armor).max(amount * MIN_ARMOR_DAMAGE)
            };
            health.current -= applied;
            (applied, health.current <= 0.0)
        };
        if dead {
            let _ = self.world.despawn(entity);
            self.log.killed.push(target);
        }
        applied
    }

    fn heal(&mut self, target: TargetId, amount: f32) {
        if let Some(mut health) = self.component_mut::<Health>(target) {
            health.current = (health.current + amount).min(health.max);
        }
    }

    fn apply_status(&mut self, target: TargetId, status: StatusEffect, duration: f32) {
        if let Some(mut statuses) = self.component_mut::<Statuses>(target) {
            match statuses.0.iter_mut().find(|(s, _)| *s == status) {
                Some(entry) => entry.1 = entry.1.max(duration),
                None => statuses.0.push((status, duration)),
            }
        }
    }

    fn impulse(&mut self, target: TargetId, impulse: Vec2) {
        if let Some(mut momentum) = self.component_mut::<Momentum>(target) {
            momentum.0 += impulse;
        }
    }

    fn suppress(&mut self, target: TargetId, duration: f32) {
        if let Some(mut suppressed) = self.component_mut::<Suppressed>(target) {
            suppressed.0 = suppressed.0.max(duration);
        }
    }

    fn kill(&mut self, target: TargetId) {
        if let Some(entity) = entity(target) {
            if self.world.despawn(entity).is_ok() {
                self.log.killed.push(target);
            }
        }
    }

    fn spawn_unit(&mut self, spawn: UnitSpawn) {
        let entity = self.world.spawn((
            Body {
                team: spawn.team,
                kind: TargetKind::Ground,
                position: spawn.position,
                hit_size: SPAWNED_UNIT_HIT_SIZE,
            },
            Health {
                current: SPAWNED_UNIT_HEALTH,
                max: SPAWNED_UNIT_HEALTH,
                armor: 0.0,
            },
            Statuses::default(),
            Momentum(spawn.velocity),
        ));
        tracing::trace!(target = target_id(entity).0, "sandbox unit spawned");
        self.log.units.push(spawn);
    }
}

impl TileWorld for SandboxWorld {
    fn tile_at(&self, position: Vec2) -> Option<TileRef> {
        position.is_finite().then(|| TileRef::containing(position))
    }

    fn ignite_fire(&mut self, tile: TileRef) {
        self.log.fires.push(tile);
    }

    fn deposit_liquid(&mut self, tile: TileRef, liquid: LiquidKind, amount: f32) {
        match self
            .log
            .puddles
            .iter_mut()
            .find(|p| p.tile == tile && p.liquid == liquid)
        {
            Some(puddle) => puddle.amount += amount,
            None => self.log.puddles.push(PuddleDeposit {
                tile,
                liquid,
                amount,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armor_has_a_floor() {
        let mut world = SandboxWorld::new();
        let id = world.spawn_unit_target(Team::CRUX, TargetKind::Ground, Vec2::ZERO, 8.0, 100.0);
        world.set_armor(id, 50.0);
        assert!((world.damage(id, 20.0, false) - 2.0).abs() < 1e-6);
        assert!((world.damage(id, 20.0, true) - 20.0).abs() < 1e-6);
        assert!((world.health(id).unwrap() - 78.0).abs() < 1e-4);
    }

    #[test]
    fn lethal_damage_removes_target() {
        let mut world = SandboxWorld::new();
        let id = world.spawn_building(Team::CRUX, Vec2::ZERO, 8.0, 10.0);
        world.damage(id, 15.0, false);
        assert!(world.health(id).is_none());
        assert_eq!(world.log().killed, vec![id]);
        assert!(world.target(id).is_none());
    }

    #[test]
    fn intersecting_orders_along_segment() {
        let mut world = SandboxWorld::new();
        let far = world.spawn_unit_target(Team::CRUX, TargetKind::Ground, Vec2::new(30.0, 0.0), 4.0, 10.0);
        let near = world.spawn_unit_target(Team::CRUX, TargetKind::Ground, Vec2::new(10.0, 1.0), 4.0, 10.0);
        world.spawn_unit_target(Team::CRUX, TargetKind::Ground, Vec2::new(20.0, 30.0), 4.0, 10.0);
        let hits: Vec<_> = world
            .intersecting(Vec2::ZERO, Vec2::new(40.0, 0.0), 1.0)
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(hits, vec![near, far]);
    }

    #[test]
    fn heal_is_capped_at_max() {
        let mut world = SandboxWorld::new();
        let id = world.spawn_building(Team::SHARDED, Vec2::ZERO, 8.0, 100.0);
        world.set_health(id, 40.0);
        world.heal(id, 500.0);
        assert_eq!(world.health(id), Some(100.0));
    }
}
