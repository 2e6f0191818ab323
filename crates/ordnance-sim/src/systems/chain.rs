//! Chain branches (lightning).
//!
//! Each branch walks a fixed number of jittered segments from the impact
//! point and queues one strike projectile at its endpoint. Strikes are
//! ordinary child projectiles, so recursion is bounded by the spawn depth.

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;

use ordnance_core::constants::{CHAIN_SEGMENT_JITTER, CHAIN_SEGMENT_LENGTH};
use ordnance_core::events::FxEvent;
use ordnance_core::types::trns;

use crate::projectile::{Projectile, SpawnContext};
use crate::report::ChainRecord;
use crate::systems::{spread, Outbox};

pub fn branch(p: &mut Projectile, at: Vec2, out: &mut Outbox) {
    let descriptor = Arc::clone(&p.descriptor);
    let Some(chain) = descriptor.chain.as_ref().filter(|c| c.count > 0) else {
        return;
    };
    let damage = if chain.damage < 0.0 {
        descriptor.damage
    } else {
        chain.damage
    };
    let center = p.rotation() + chain.angle;

    for _ in 0..chain.count {
        let angle = center + spread(&mut p.rng, chain.cone / 2.0);
        let extra = if chain.length_rand > 0 {
            p.rng.gen_range(0..=chain.length_rand)
        } else {
            0
        };
        let segments = chain.length + extra;

        let mut points = Vec::with_capacity(segments as usize + 1);
        points.push(at);
        let mut cursor = at;
        let mut heading = angle;
        for _ in 0..segments {
            cursor += trns(heading, CHAIN_SEGMENT_LENGTH);
            points.push(cursor);
            heading += spread(&mut p.rng, CHAIN_SEGMENT_JITTER);
        }

        let strike_queued = match chain.strike_descriptor() {
            Some(strike) => {
                let ctx = SpawnContext::new(p.team, cursor, heading).with_damage(damage);
                out.queue(strike, ctx, p.depth.saturating_add(1));
                true
            }
            None => false,
        };

        out.report.chains.push(ChainRecord {
            source: p.id(),
            origin: at,
            angle,
            segments,
            endpoint: cursor,
            strike_queued,
        });
        out.fx(FxEvent::ChainBranch {
            points,
            color: chain.color,
        });
    }
}
