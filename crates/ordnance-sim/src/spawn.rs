//! Spawn factory: descriptor + spawn context -> projectile.
//!
//! Nothing here draws randomness, so a creation message replayed on another
//! peer yields the same initial state.

use std::sync::Arc;

use ordnance_core::descriptor::BehaviorDescriptor;
use ordnance_core::types::trns;

use crate::engine::EngineConfig;
use crate::pool::{ProjectileId, ProjectilePool};
use crate::projectile::{Launch, Owner, OwnerRef, SpawnContext};
use crate::services::{Battlefield, UnitSpawn};
use crate::systems::Outbox;

/// Create a projectile (or, for unit-spawn descriptors on the authority, a
/// unit). Returns `None` when no projectile was produced.
pub fn create<W: Battlefield>(
    pool: &mut ProjectilePool,
    config: &EngineConfig,
    world: &mut W,
    descriptor: &Arc<BehaviorDescriptor>,
    ctx: SpawnContext,
    depth: u8,
    out: &mut Outbox,
) -> Option<ProjectileId> {
    if depth > config.max_spawn_depth {
        tracing::debug!(
            descriptor = %descriptor.name,
            depth,
            max = config.max_spawn_depth,
            "child spawn suppressed by depth bound"
        );
        out.report.suppressed_spawns += 1;
        return None;
    }

    if let Some(unit) = &descriptor.spawn_unit {
        if config.role.is_authority() {
            let spawn = UnitSpawn {
                kind: unit.kind,
                team: ctx.team,
                position: ctx.origin,
                rotation: ctx.angle,
                velocity: trns(ctx.angle, unit.speed * ctx.velocity_scale),
            };
            tracing::trace!(kind = unit.kind.0, team = ctx.team.0, "unit spawned in place of projectile");
            world.spawn_unit(spawn);
            out.report.units_spawned += 1;
        }
        return None;
    }

    let delta = config.delta;
    let base_velocity = trns(ctx.angle, descriptor.speed * ctx.velocity_scale);
    let position = if descriptor.back_move {
        ctx.origin - base_velocity * delta
    } else {
        ctx.origin
    };
    let mut velocity = base_velocity;
    if descriptor.keep_velocity {
        if let Some(owner_velocity) = ctx.owner.and_then(|o| o.velocity) {
            velocity += owner_velocity;
        }
    }

    let lifetime = descriptor.lifetime * ctx.lifetime_scale;
    let damage = ctx.damage.unwrap_or(descriptor.damage) * config.damage_multiplier;

    if descriptor.kill_shooter {
        if let Some(Owner {
            id: OwnerRef::Target(shooter),
            ..
        }) = ctx.owner
        {
            world.kill(shooter);
        }
    }

    let id = pool.acquire(Launch {
        descriptor: Arc::clone(descriptor),
        team: ctx.team,
        owner: ctx.owner,
        origin: ctx.origin,
        aim: ctx.aim,
        position,
        velocity,
        age: if descriptor.instant_disappear { lifetime } else { 0.0 },
        lifetime,
        damage,
        damage_multiplier: config.damage_multiplier,
        velocity_scale: ctx.velocity_scale,
        lifetime_scale: ctx.lifetime_scale,
        depth,
        seed: config.seed,
        motion: ctx.motion,
    });
    out.report.spawned.push(id);

    for child in &descriptor.spawn_bullets {
        if let Some(child) = child.get() {
            let owner = Owner {
                id: OwnerRef::Projectile(id),
                velocity: Some(velocity),
            };
            out.queue(
                child,
                SpawnContext::new(ctx.team, ctx.origin, ctx.angle).with_owner(owner),
                depth.saturating_add(1),
            );
        }
    }

    Some(id)
}
