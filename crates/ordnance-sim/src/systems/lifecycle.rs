//! Removal hooks. Every removal path runs through `release`, so the
//! `despawned` and `removed` hooks fire at most once per lifetime.

use std::sync::Arc;

use ordnance_core::enums::RemovalCause;
use ordnance_core::events::FxEvent;

use crate::pool::{ProjectileId, ProjectilePool};
use crate::projectile::Projectile;
use crate::report::RemovalRecord;
use crate::services::Battlefield;
use crate::systems::{area, Outbox};

/// Run the removal hooks for `id` and free its slot. Returns false for stale ids.
pub fn release<W: Battlefield>(
    pool: &mut ProjectilePool,
    id: ProjectileId,
    cause: RemovalCause,
    world: &mut W,
    out: &mut Outbox,
) -> bool {
    let Some(p) = pool.get_mut(id) else {
        return false;
    };

    if cause != RemovalCause::Fault && !p.hit {
        despawned(world, p, out);
    }
    removed(p, out);
    out.report.removed.push(RemovalRecord {
        projectile: id,
        cause,
        position: p.position,
    });

    pool.release(id)
}

/// End-of-life without a terminal hit (expiry, absorption, external removal).
fn despawned<W: Battlefield>(world: &mut W, p: &mut Projectile, out: &mut Outbox) {
    let descriptor = Arc::clone(&p.descriptor);
    let fx = &descriptor.presentation;

    if descriptor.despawn_hit {
        let at = p.position;
        area::detonate(world, p, at, out);
    }
    if let Some(effect) = fx.despawn_effect {
        out.fx(FxEvent::Effect {
            effect,
            position: p.position,
            rotation: p.rotation(),
            color: fx.hit_color,
        });
    }
    if let Some(sound) = fx.despawn_sound {
        out.fx(FxEvent::Sound {
            sound,
            position: p.position,
            volume: 1.0,
            pitch: 1.0,
        });
    }
    if fx.despawn_shake > 0.0 {
        out.fx(FxEvent::Shake {
            intensity: fx.despawn_shake,
            duration: fx.despawn_shake,
            position: p.position,
        });
    }
}

/// Any removal: hand the remaining trail to presentation for a fade-out.
fn removed(p: &Projectile, out: &mut Outbox) {
    let trail = &p.descriptor.trail;
    if trail.length > 0 && !p.trail.is_empty() {
        out.fx(FxEvent::TrailFade {
            points: p.trail.positions(),
            width: trail.width,
            color: trail.color,
        });
    }
}
