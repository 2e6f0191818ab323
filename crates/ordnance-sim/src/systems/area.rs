//! The hit routine: presentation, fragments, puddles, fires, suppression,
//! splash damage/healing, and chain branches around an impact point.

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;

use ordnance_core::constants::SPLASH_FALLOFF;
use ordnance_core::enums::{StatusEffect, TargetKind};
use ordnance_core::events::FxEvent;

use crate::projectile::Projectile;
use crate::report::{HitKind, HitRecord};
use crate::services::{Battlefield, TargetInfo};
use crate::systems::collision::heal_amount;
use crate::systems::{chain, frag, spread, Outbox};

/// Run every configured on-hit effect at `at`.
pub fn detonate<W: Battlefield>(world: &mut W, p: &mut Projectile, at: Vec2, out: &mut Outbox) {
    let descriptor = Arc::clone(&p.descriptor);
    let fx = &descriptor.presentation;

    if let Some(effect) = fx.hit_effect {
        out.fx(FxEvent::Effect {
            effect,
            position: at,
            rotation: p.rotation(),
            color: fx.hit_color,
        });
    }
    if let Some(sound) = fx.hit_sound {
        out.fx(FxEvent::Sound {
            sound,
            position: at,
            volume: fx.hit_sound_volume,
            pitch: fx.hit_sound_pitch,
        });
    }
    if fx.hit_shake > 0.0 {
        out.fx(FxEvent::Shake {
            intensity: fx.hit_shake,
            duration: fx.hit_shake,
            position: at,
        });
    }

    frag::scatter(p, at, out);
    deposit_puddles(world, p, at);
    ignite(world, p, at);
    suppress(world, p, at);
    splash(world, p, at, out);
    chain::branch(p, at, out);
}

fn deposit_puddles<W: Battlefield>(world: &mut W, p: &mut Projectile, at: Vec2) {
    let Some(puddles) = p.descriptor.puddles.clone() else {
        return;
    };
    for _ in 0..puddles.count {
        let point = at + Vec2::new(
            spread(&mut p.rng, puddles.range),
            spread(&mut p.rng, puddles.range),
        );
        if let Some(tile) = world.tile_at(point) {
            world.deposit_liquid(tile, puddles.liquid, puddles.amount);
        }
    }
}

fn ignite<W: Battlefield>(world: &mut W, p: &mut Projectile, at: Vec2) {
    let Some(incendiary) = p.descriptor.incendiary.clone() else {
        return;
    };
    if incendiary.chance <= 0.0 || p.rng.gen::<f32>() >= incendiary.chance {
        return;
    }
    for _ in 0..incendiary.amount {
        let point = at + Vec2::new(
            spread(&mut p.rng, incendiary.spread),
            spread(&mut p.rng, incendiary.spread),
        );
        if let Some(tile) = world.tile_at(point) {
            world.ignite_fire(tile);
        }
    }
}

fn suppress<W: Battlefield>(world: &mut W, p: &Projectile, at: Vec2) {
    let Some(suppression) = p.descriptor.suppression.as_ref().filter(|s| s.range > 0.0) else {
        return;
    };
    let team = p.team;
    let duration = suppression.duration;
    world.for_each_in_radius(
        None,
        at,
        suppression.range,
        |t| t.is_building() && t.team != team,
        |w, t| w.suppress(t.id, duration),
    );
}

/// Linear falloff from full damage at the center to `SPLASH_FALLOFF` at the edge.
pub fn falloff(distance: f32, radius: f32) -> f32 {
    let t = (distance / radius).clamp(0.0, 1.0);
    (1.0 - t) + t * SPLASH_FALLOFF
}

fn splash<W: Battlefield>(world: &mut W, p: &Projectile, at: Vec2, out: &mut Outbox) {
    let descriptor = Arc::clone(&p.descriptor);
    let Some(spec) = descriptor.splash.as_ref().filter(|s| s.radius > 0.0) else {
        return;
    };
    if p.absorbed {
        return;
    }

    let team = p.team;
    let radius = spec.radius;
    let amount = spec.damage * p.damage_multiplier;
    let source = p.id();
    let reachable = |t: &TargetInfo| match t.kind {
        TargetKind::Air => descriptor.collides_air,
        TargetKind::Ground | TargetKind::Building => descriptor.collides_ground,
    };

    world.for_each_in_radius(
        None,
        at,
        radius,
        |t| t.team != team && reachable(t),
        |w, t| {
            let mut distance = t.position.distance(at);
            if spec.scaled {
                distance = (distance - t.hit_size / 2.0).max(0.0);
            }
            let mut dealt = amount * falloff(distance, radius);
            if t.is_building() {
                dealt *= descriptor.building_damage_multiplier;
            }
            let applied = w.damage(t.id, dealt, false);
            out.report.hits.push(HitRecord {
                projectile: source,
                target: t.id,
                kind: HitKind::Splash,
                amount: applied,
            });
        },
    );

    if descriptor.status != StatusEffect::None {
        world.for_each_in_radius(
            None,
            at,
            radius,
            |t| t.team != team && !t.is_building() && reachable(t),
            |w, t| w.apply_status(t.id, descriptor.status, descriptor.status_duration),
        );
    }

    if descriptor.heals() {
        world.for_each_in_radius(
            Some(team),
            at,
            radius,
            |t| t.is_building() && t.damaged() && !t.under_construction,
            |w, t| {
                let healed = heal_amount(&descriptor, t.max_health);
                w.heal(t.id, healed);
                out.fx(FxEvent::Heal {
                    position: t.position,
                    color: descriptor.presentation.heal_color,
                });
                out.report.hits.push(HitRecord {
                    projectile: source,
                    target: t.id,
                    kind: HitKind::Heal,
                    amount: healed,
                });
            },
        );
    }

    if descriptor.make_fire {
        world.for_each_in_radius(
            None,
            at,
            radius,
            |t| t.is_building() && t.team != team,
            |w, t| {
                if let Some(tile) = w.tile_at(t.position) {
                    w.ignite_fire(tile);
                }
            },
        );
    }
}
