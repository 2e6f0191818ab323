//! Replication transport.
//!
//! One outbound message type, fire-and-forget, no acknowledgement. A dropped
//! message means the projectile simply never appears on that peer.

use std::collections::VecDeque;

use ordnance_core::message::CreateProjectile;
use ordnance_core::types::DescriptorId;

use crate::projectile::SpawnContext;

pub trait ReplicationTransport {
    /// Send an encoded creation message to every peer.
    fn send(&mut self, payload: &[u8]);
}

/// Creation message for a locally created projectile.
pub fn message_for(descriptor: DescriptorId, ctx: &SpawnContext) -> CreateProjectile {
    CreateProjectile {
        descriptor,
        team: ctx.team,
        x: ctx.origin.x,
        y: ctx.origin.y,
        angle: ctx.angle,
        damage: ctx.damage.unwrap_or(-1.0),
        velocity_scale: ctx.velocity_scale,
        lifetime_scale: ctx.lifetime_scale,
    }
}

/// Spawn context a replica rebuilds from a creation message.
pub fn context_for(msg: &CreateProjectile) -> SpawnContext {
    let mut ctx = SpawnContext::new(msg.team, glam::Vec2::new(msg.x, msg.y), msg.angle)
        .with_scales(msg.velocity_scale, msg.lifetime_scale);
    ctx.damage = msg.damage_override();
    ctx
}

/// In-process transport that queues payloads for a peer engine. Can drop
/// every n-th message to model unreliable delivery.
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    queue: VecDeque<Vec<u8>>,
    drop_every: Option<usize>,
    sent: usize,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dropping_every(n: usize) -> Self {
        Self {
            drop_every: (n > 0).then_some(n),
            ..Self::default()
        }
    }

    /// Take every queued payload.
    pub fn drain(&mut self) -> Vec<Vec<u8>> {
        self.queue.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl ReplicationTransport for LoopbackTransport {
    fn send(&mut self, payload: &[u8]) {
        self.sent += 1;
        if let Some(n) = self.drop_every {
            if self.sent % n == 0 {
                tracing::trace!(sent = self.sent, "loopback dropped creation message");
                return;
            }
        }
        self.queue.push_back(payload.to_vec());
    }
}
