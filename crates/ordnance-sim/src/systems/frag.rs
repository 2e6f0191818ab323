//! Fragmentation: scatter child projectiles around an impact point.

use std::sync::Arc;

use glam::Vec2;

use ordnance_core::constants::{FRAG_OFFSET_MAX, FRAG_OFFSET_MIN};
use ordnance_core::types::trns;

use crate::projectile::{Owner, OwnerRef, Projectile, SpawnContext};
use crate::systems::{between, spread, Outbox};

pub fn scatter(p: &mut Projectile, at: Vec2, out: &mut Outbox) {
    let descriptor = Arc::clone(&p.descriptor);
    let Some(frag) = &descriptor.frag else {
        return;
    };
    let Some(child) = frag.child() else {
        return;
    };

    let owner = Owner {
        id: OwnerRef::Projectile(p.id()),
        velocity: Some(p.velocity),
    };
    let rotation = p.rotation();
    let depth = p.depth.saturating_add(1);

    for _ in 0..frag.count {
        let offset = between(&mut p.rng, FRAG_OFFSET_MIN, FRAG_OFFSET_MAX);
        let angle = rotation + spread(&mut p.rng, frag.cone / 2.0) + frag.angle;
        let velocity_scale = between(&mut p.rng, frag.velocity_min, frag.velocity_max);
        let lifetime_scale = between(&mut p.rng, frag.life_min, frag.life_max);
        let ctx = SpawnContext::new(p.team, at + trns(angle, offset), angle)
            .with_owner(owner)
            .with_scales(velocity_scale, lifetime_scale);
        out.queue(child, ctx, depth);
    }
}
