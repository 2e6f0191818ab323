//! Collision resolver.
//!
//! Per projectile: ALIVE -> HIT on a valid contact, then either back to ALIVE
//! with the pierce budget reduced, or TERMINAL. Terminal hits on hostiles run
//! the full hit routine (area, fragments, chains) before release.

use std::sync::Arc;

use glam::Vec2;

use ordnance_core::constants::KNOCKBACK_SCALE;
use ordnance_core::descriptor::BehaviorDescriptor;
use ordnance_core::enums::{RemovalCause, StatusEffect, TargetKind};
use ordnance_core::events::FxEvent;
use ordnance_core::types::trns;

use crate::projectile::Projectile;
use crate::report::{HitKind, HitRecord};
use crate::services::{Battlefield, TargetInfo};
use crate::systems::{area, Outbox};

/// Resolve contacts along the segment travelled this tick.
/// Returns a removal cause when the projectile must be released.
pub fn run<W: Battlefield>(
    world: &mut W,
    p: &mut Projectile,
    from: Vec2,
    out: &mut Outbox,
) -> Option<RemovalCause> {
    if !p.collides {
        return None;
    }
    let descriptor = Arc::clone(&p.descriptor);
    let candidates = world.intersecting(from, p.position, descriptor.hit_size / 2.0);

    for target in candidates {
        if !valid_hit(&descriptor, p, &target) {
            continue;
        }
        p.mark_collided(target.id);

        let building = target.is_building();
        if building {
            hit_building(world, p, &target, out);
        } else {
            hit_unit(world, p, &target, out);
        }

        if let Some(remaining) = &mut p.pierce_remaining {
            *remaining = remaining.saturating_sub(1);
        }
        let pierces = if building {
            descriptor.pierce_building
        } else {
            descriptor.pierce
        };
        if pierces && p.pierce_remaining != Some(0) {
            continue;
        }

        // Terminal.
        p.hit = true;
        if target.team != p.team {
            let at = if building { target.position } else { p.position };
            area::detonate(world, p, at, out);
        }
        if !pierces || descriptor.remove_after_pierce {
            return Some(RemovalCause::Hit);
        }
        p.collides = false;
        return None;
    }
    None
}

/// Team, kind, and repeat filters for a contact.
pub fn valid_hit(descriptor: &BehaviorDescriptor, p: &Projectile, target: &TargetInfo) -> bool {
    if p.has_collided(target.id) {
        return false;
    }
    let friendly = target.team == p.team;
    match target.kind {
        TargetKind::Air | TargetKind::Ground => {
            descriptor.collides
                && descriptor.collides_with(target.kind)
                && (!friendly || descriptor.collides_team)
        }
        TargetKind::Building => {
            if !(descriptor.collides_tiles && descriptor.collides_ground) {
                return false;
            }
            if !friendly {
                return true;
            }
            if descriptor.heals() {
                target.damaged() && !target.under_construction
            } else {
                descriptor.collides_team
            }
        }
    }
}

fn hit_building<W: Battlefield>(
    world: &mut W,
    p: &Projectile,
    target: &TargetInfo,
    out: &mut Outbox,
) {
    let descriptor = Arc::clone(&p.descriptor);
    let friendly = target.team == p.team;

    if friendly && descriptor.heals() {
        let amount = heal_amount(&descriptor, target.max_health);
        world.heal(target.id, amount);
        out.fx(FxEvent::Heal {
            position: target.position,
            color: descriptor.presentation.heal_color,
        });
        out.report.hits.push(HitRecord {
            projectile: p.id(),
            target: target.id,
            kind: HitKind::Heal,
            amount,
        });
        return;
    }

    if descriptor.make_fire && !friendly {
        if let Some(tile) = world.tile_at(target.position) {
            world.ignite_fire(tile);
        }
    }

    let amount = p.damage * descriptor.building_damage_multiplier;
    let applied = world.damage(target.id, amount, descriptor.pierce_armor);
    out.report.hits.push(HitRecord {
        projectile: p.id(),
        target: target.id,
        kind: HitKind::Direct,
        amount: applied,
    });
}

fn hit_unit<W: Battlefield>(world: &mut W, p: &Projectile, target: &TargetInfo, out: &mut Outbox) {
    let descriptor = Arc::clone(&p.descriptor);

    let applied = world.damage(target.id, p.damage, descriptor.pierce_armor);
    out.report.hits.push(HitRecord {
        projectile: p.id(),
        target: target.id,
        kind: HitKind::Direct,
        amount: applied,
    });

    if descriptor.knockback != 0.0 {
        let strength = descriptor.knockback * KNOCKBACK_SCALE;
        let impulse = if descriptor.impact {
            let reverse = if descriptor.knockback < 0.0 { 180.0 } else { 0.0 };
            trns(p.rotation() + reverse, strength.abs())
        } else {
            (target.position - p.position).normalize_or_zero() * strength
        };
        world.impulse(target.id, impulse);
    }

    if descriptor.status != StatusEffect::None {
        world.apply_status(target.id, descriptor.status, descriptor.status_duration);
    }
}

/// Heal applied to a structure with `max_health`.
pub fn heal_amount(descriptor: &BehaviorDescriptor, max_health: f32) -> f32 {
    descriptor.heal_percent / 100.0 * max_health + descriptor.heal_amount
}
