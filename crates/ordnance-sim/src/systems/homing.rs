//! Homing guidance: gradual turn toward the closest eligible target.
//!
//! The heading moves toward the target bearing by at most
//! `power * delta * HOMING_TURN_SCALE` degrees per tick.

use std::sync::Arc;

use ordnance_core::constants::HOMING_TURN_SCALE;
use ordnance_core::enums::TargetKind;
use ordnance_core::types::{angle_between, move_toward, with_angle};

use crate::projectile::Projectile;
use crate::services::{Battlefield, TargetInfo};

/// Steer `p` toward a target, if homing is configured and active.
pub fn run<W: Battlefield>(world: &W, p: &mut Projectile, delta: f32) {
    let descriptor = Arc::clone(&p.descriptor);
    let Some(homing) = descriptor.active_homing() else {
        return;
    };
    if p.age < homing.delay {
        return;
    }

    let origin = p.aim.unwrap_or(p.position);
    let heals = descriptor.heals();
    let mut filter = |t: &TargetInfo| eligible(p, t, heals);
    let target = world.nearest_target(origin, homing.range, &mut filter);

    let Some(target) = target else {
        p.homing_target = None;
        return;
    };

    let max_turn = homing.power * delta * HOMING_TURN_SCALE;
    let desired = angle_between(p.position, target.position);
    let heading = move_toward(p.rotation(), desired, max_turn);
    p.velocity = with_angle(p.velocity, heading);
    p.homing_target = Some(target.id);
}

/// Whether `target` may be homed on. Healing projectiles also seek damaged
/// friendly structures; everything else seeks hostiles only.
fn eligible(p: &Projectile, target: &TargetInfo, heals: bool) -> bool {
    let descriptor = &p.descriptor;
    if p.has_collided(target.id) {
        return false;
    }
    match target.kind {
        TargetKind::Air | TargetKind::Ground => {
            descriptor.collides_with(target.kind) && target.team != p.team
        }
        TargetKind::Building => {
            descriptor.collides_ground
                && (target.team != p.team || (heals && target.damaged() && !target.under_construction))
        }
    }
}
