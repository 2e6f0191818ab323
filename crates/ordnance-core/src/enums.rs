//! Enumeration types used throughout the engine.

use serde::{Deserialize, Serialize};

/// Broad class of a hittable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// Flying unit.
    Air,
    /// Ground or naval unit.
    Ground,
    /// Structure occupying one or more tiles.
    Building,
}

/// Status effect applied to units on hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusEffect {
    #[default]
    None,
    Burning,
    Freezing,
    Wet,
    Muddy,
    Melting,
    Sapped,
    Tarred,
    Shocked,
    Blasted,
    Corroded,
    Slow,
    Electrified,
    Disarmed,
}

/// Liquid deposited by puddle-producing descriptors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LiquidKind {
    #[default]
    Water,
    Slag,
    Oil,
    Cryofluid,
    Neoplasm,
}

/// Why a projectile left the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Age reached the scaled lifetime.
    Expired,
    /// Terminal direct hit (pierce budget exhausted).
    Hit,
    /// Absorbed by a shield or similar external collaborator.
    Absorbed,
    /// Removed by an external request.
    External,
    /// Produced a non-finite state during a step.
    Fault,
}

/// Simulation peer role. Only the authority creates units or sends creation messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Authority,
    Replica,
}

impl Role {
    pub fn is_authority(self) -> bool {
        matches!(self, Role::Authority)
    }
}
