//! Per-projectile systems run each tick.
//!
//! Systems are plain functions over one `&mut Projectile` and the injected
//! battlefield. They own no state; results go to the shared `Outbox`.

pub mod area;
pub mod chain;
pub mod collision;
pub mod frag;
pub mod homing;
pub mod lifecycle;
pub mod movement;

use std::sync::Arc;

use rand::Rng;

use ordnance_core::descriptor::BehaviorDescriptor;
use ordnance_core::enums::RemovalCause;
use ordnance_core::error::StepError;
use ordnance_core::events::FxEvent;

use crate::engine::EngineConfig;
use crate::projectile::{Projectile, SpawnContext};
use crate::report::TickReport;
use crate::services::Battlefield;

/// A child projectile waiting to be materialized after the current pass.
#[derive(Debug, Clone)]
pub struct PendingSpawn {
    pub descriptor: Arc<BehaviorDescriptor>,
    pub ctx: SpawnContext,
    pub depth: u8,
}

/// Accumulates everything systems produce between two ticks.
#[derive(Debug, Default)]
pub struct Outbox {
    pub report: TickReport,
    pub spawns: Vec<PendingSpawn>,
}

impl Outbox {
    pub fn fx(&mut self, event: FxEvent) {
        self.report.fx.push(event);
    }

    pub fn queue(&mut self, descriptor: &Arc<BehaviorDescriptor>, ctx: SpawnContext, depth: u8) {
        self.spawns.push(PendingSpawn {
            descriptor: Arc::clone(descriptor),
            ctx,
            depth,
        });
    }
}

/// What the stepper decided for one projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Alive,
    Remove(RemovalCause),
}

/// Advance one projectile by one tick.
pub fn step<W: Battlefield>(
    world: &mut W,
    projectile: &mut Projectile,
    config: &EngineConfig,
    out: &mut Outbox,
) -> Result<StepOutcome, StepError> {
    let delta = config.delta;

    // 1. Trail history
    if config.record_trails {
        movement::update_trail(projectile);
    }

    // 2. Steering
    homing::run(world, projectile, delta);
    movement::weave(projectile, delta);

    // 3. Trail effects
    movement::emit_trail_effects(projectile, delta, out);

    // 4. Integration and drag
    let from = projectile.position;
    movement::integrate(projectile, delta)?;

    // 5. Collision
    if let Some(cause) = collision::run(world, projectile, from, out) {
        return Ok(StepOutcome::Remove(cause));
    }

    // 6. Age
    projectile.age += delta;
    if projectile.age >= projectile.lifetime {
        return Ok(StepOutcome::Remove(RemovalCause::Expired));
    }

    Ok(StepOutcome::Alive)
}

/// Uniform value in `[-amount, amount]`.
pub(crate) fn spread(rng: &mut impl Rng, amount: f32) -> f32 {
    (rng.gen::<f32>() * 2.0 - 1.0) * amount
}

/// Uniform value between `min` and `max`; tolerates `min > max`.
pub(crate) fn between(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    min + (max - min) * rng.gen::<f32>()
}
