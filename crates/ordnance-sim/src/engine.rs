//! Projectile engine: the entry point of the crate.
//!
//! `ProjectileEngine` owns the projectile pool and per-tick output. The world
//! it acts on is passed into every call, never stored, so two engines can be
//! driven side by side against independent battlefields.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use ordnance_core::constants::{DEFAULT_MAX_SPAWN_DEPTH, DEFAULT_POOL_CAPACITY};
use ordnance_core::descriptor::BehaviorDescriptor;
use ordnance_core::enums::{RemovalCause, Role};
use ordnance_core::message::CreateProjectile;
use ordnance_core::registry::DescriptorRegistry;
use ordnance_core::types::{DescriptorId, SimTime};

use crate::pool::{ProjectileId, ProjectilePool};
use crate::projectile::{Projectile, SpawnContext};
use crate::replication::{self, ReplicationTransport};
use crate::report::TickReport;
use crate::services::Battlefield;
use crate::spawn;
use crate::systems::{self, lifecycle, Outbox, StepOutcome};

/// Configuration for an engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Mixed into every projectile's identifier-seeded random source.
    pub seed: u64,
    pub role: Role,
    /// Ticks advanced per step.
    pub delta: f32,
    /// Global multiplier on direct and splash damage.
    pub damage_multiplier: f32,
    /// Headless peers may skip trail history.
    pub record_trails: bool,
    /// Deepest fragment/chain/spawn-on-create generation that may spawn.
    pub max_spawn_depth: u8,
    pub pool_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            role: Role::Authority,
            delta: 1.0,
            damage_multiplier: 1.0,
            record_trails: true,
            max_spawn_depth: DEFAULT_MAX_SPAWN_DEPTH,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

pub struct ProjectileEngine {
    registry: Arc<DescriptorRegistry>,
    config: EngineConfig,
    pool: ProjectilePool,
    time: SimTime,
    outbox: Outbox,
}

impl ProjectileEngine {
    pub fn new(registry: Arc<DescriptorRegistry>, config: EngineConfig) -> Self {
        Self {
            registry,
            pool: ProjectilePool::with_capacity(config.pool_capacity),
            config,
            time: SimTime::default(),
            outbox: Outbox::default(),
        }
    }

    pub fn registry(&self) -> &DescriptorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Create a projectile locally. Children spawned on creation are
    /// materialized immediately.
    pub fn create<W: Battlefield>(
        &mut self,
        world: &mut W,
        descriptor: &Arc<BehaviorDescriptor>,
        ctx: SpawnContext,
    ) -> Option<ProjectileId> {
        let id = spawn::create(
            &mut self.pool,
            &self.config,
            world,
            descriptor,
            ctx,
            0,
            &mut self.outbox,
        );
        self.flush_spawns(world);
        id
    }

    /// Create by registry identity. Unknown identities produce nothing.
    pub fn create_by_id<W: Battlefield>(
        &mut self,
        world: &mut W,
        descriptor: DescriptorId,
        ctx: SpawnContext,
    ) -> Option<ProjectileId> {
        let descriptor = Arc::clone(self.registry.get(descriptor)?);
        self.create(world, &descriptor, ctx)
    }

    /// Create locally and, on the authority, broadcast the creation message.
    ///
    /// The authority builds its own projectile from the broadcast message, so
    /// owner, aim and motion strategy in `ctx` are not part of a replicated
    /// creation.
    pub fn create_replicated<W: Battlefield, T: ReplicationTransport>(
        &mut self,
        world: &mut W,
        transport: &mut T,
        descriptor: &Arc<BehaviorDescriptor>,
        ctx: SpawnContext,
    ) -> Option<ProjectileId> {
        if !self.config.role.is_authority() {
            return self.create(world, descriptor, ctx);
        }
        let Some(id) = descriptor.id else {
            tracing::warn!(
                descriptor = %descriptor.name,
                "unregistered descriptor cannot be replicated"
            );
            return self.create(world, descriptor, ctx);
        };
        let msg = replication::message_for(id, &ctx);
        transport.send(&msg.encode());
        self.create(world, descriptor, replication::context_for(&msg))
    }

    /// Apply a received creation message. Malformed payloads and unknown
    /// descriptors are dropped.
    pub fn receive<W: Battlefield>(&mut self, world: &mut W, payload: &[u8]) -> Option<ProjectileId> {
        let msg = match CreateProjectile::decode(payload) {
            Ok(msg) => msg,
            Err(err) => {
                tracing::warn!(%err, "dropping malformed creation message");
                return None;
            }
        };
        let Some(descriptor) = self.registry.get(msg.descriptor).cloned() else {
            tracing::debug!(descriptor = msg.descriptor.0, "dropping creation message for unknown descriptor");
            return None;
        };
        self.create(world, &descriptor, replication::context_for(&msg))
    }

    /// Advance every live projectile by one tick and return everything that
    /// happened since the previous tick.
    pub fn tick<W: Battlefield>(&mut self, world: &mut W) -> TickReport {
        for id in self.pool.live_ids() {
            let Some(projectile) = self.pool.get_mut(id) else {
                continue;
            };
            let cause = match systems::step(world, projectile, &self.config, &mut self.outbox) {
                Ok(StepOutcome::Alive) => continue,
                Ok(StepOutcome::Remove(cause)) => cause,
                Err(err) => {
                    tracing::warn!(projectile = %id, %err, "projectile step fault; removing");
                    self.outbox.report.faults += 1;
                    RemovalCause::Fault
                }
            };
            lifecycle::release(&mut self.pool, id, cause, world, &mut self.outbox);
        }

        self.flush_spawns(world);
        self.time.advance(self.config.delta);

        let mut report = std::mem::take(&mut self.outbox.report);
        report.tick = self.time.tick;
        report.live = self.pool.live();
        report
    }

    /// External removal request. Runs the same hooks as natural expiry.
    pub fn remove<W: Battlefield>(&mut self, world: &mut W, id: ProjectileId) -> bool {
        let removed = lifecycle::release(&mut self.pool, id, RemovalCause::External, world, &mut self.outbox);
        self.flush_spawns(world);
        removed
    }

    /// Shield absorption. Only absorbable projectiles are affected; an
    /// absorbed projectile skips splash damage on its way out.
    pub fn absorb<W: Battlefield>(&mut self, world: &mut W, id: ProjectileId) -> bool {
        match self.pool.get_mut(id) {
            Some(p) if p.descriptor.absorbable => p.absorbed = true,
            _ => return false,
        }
        let removed = lifecycle::release(&mut self.pool, id, RemovalCause::Absorbed, world, &mut self.outbox);
        self.flush_spawns(world);
        removed
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.pool.get(id)
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.pool.iter()
    }

    pub fn live_count(&self) -> usize {
        self.pool.live()
    }

    pub fn pool(&self) -> &ProjectilePool {
        &self.pool
    }

    /// Materialize queued child projectiles, including any they queue in turn.
    fn flush_spawns<W: Battlefield>(&mut self, world: &mut W) {
        while !self.outbox.spawns.is_empty() {
            let pending = std::mem::take(&mut self.outbox.spawns);
            for spawn in pending {
                spawn::create(
                    &mut self.pool,
                    &self.config,
                    world,
                    &spawn.descriptor,
                    spawn.ctx,
                    spawn.depth,
                    &mut self.outbox,
                );
            }
        }
    }
}
