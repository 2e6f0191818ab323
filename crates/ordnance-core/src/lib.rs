//! Core types and definitions for the ORDNANCE projectile engine.
//!
//! This crate defines the vocabulary shared by the simulation and its
//! tooling: behavior descriptors, the descriptor registry, content loading,
//! presentation events, the replication creation message, and constants.
//! It holds no simulation state.

pub mod constants;
pub mod content;
pub mod descriptor;
pub mod enums;
pub mod error;
pub mod events;
pub mod message;
pub mod registry;
pub mod types;

#[cfg(test)]
mod tests;
