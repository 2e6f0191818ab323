//! Presentation events emitted by the engine.
//!
//! The engine never waits on these; a presentation layer drains them per tick
//! and plays whatever effect, sound, or shake they describe.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::types::{Color, EffectId, SoundId};

/// Fire-and-forget presentation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FxEvent {
    /// Play an effect at a point.
    Effect {
        effect: EffectId,
        position: Vec2,
        rotation: f32,
        color: Color,
    },
    /// Play a sound at a point.
    Sound {
        sound: SoundId,
        position: Vec2,
        volume: f32,
        pitch: f32,
    },
    /// Shake the camera around a point.
    Shake {
        intensity: f32,
        duration: f32,
        position: Vec2,
    },
    /// Heal pulse on a structure.
    Heal { position: Vec2, color: Color },
    /// Fade-out of a removed projectile's trail.
    TrailFade {
        points: Vec<Vec2>,
        width: f32,
        color: Color,
    },
    /// Vertex path of one chain branch.
    ChainBranch { points: Vec<Vec2>, color: Color },
}
