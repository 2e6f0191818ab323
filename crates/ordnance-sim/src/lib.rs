//! Projectile engine for ORDNANCE.
//!
//! Owns the projectile pool, steps every live projectile at a fixed tick,
//! resolves collisions and area effects against an injected battlefield, and
//! produces a `TickReport` per step. Completely headless and deterministic
//! for a given seed and input sequence.

pub mod engine;
pub mod pool;
pub mod projectile;
pub mod replication;
pub mod report;
pub mod sandbox;
pub mod services;
pub mod spawn;
pub mod systems;

pub use engine::{EngineConfig, ProjectileEngine};
pub use ordnance_core as core;
pub use pool::ProjectileId;
pub use projectile::{Projectile, SpawnContext};
pub use report::TickReport;
