//! Fundamental identifiers, colors, and 2D angle helpers.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Team affiliation. Teams never damage themselves unless a descriptor says so.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Team(pub u8);

impl Team {
    /// Unowned wreckage and neutral structures.
    pub const DERELICT: Team = Team(0);
    pub const SHARDED: Team = Team(1);
    pub const CRUX: Team = Team(2);
}

/// Stable identity of a hittable target (unit or structure), owned by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub u64);

/// Registry identity of a behavior descriptor. Stable across peers that load
/// the same content in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescriptorId(pub u16);

/// Identity of a presentation effect, interpreted by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectId(pub u16);

/// Identity of a sound, interpreted by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundId(pub u16);

/// Identity of a unit kind spawned by "spawn unit instead" descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitKindId(pub u16);

/// Packed RGBA8888 color, passed through to presentation untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffff_ffff);
    pub const HEAL: Color = Color(0x98ff_a9ff);
    pub const MISSILE_YELLOW_BACK: Color = Color(0xf9_a3_4aff);
    pub const SURGE: Color = Color(0xf3_e9_79ff);
    pub const POWER_LIGHT: Color = Color(0xfb_d3_67ff);
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Tile coordinates in the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileRef {
    pub x: i32,
    pub y: i32,
}

impl TileRef {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile containing a world position.
    pub fn containing(position: Vec2) -> Self {
        let size = crate::constants::TILE_SIZE;
        Self::new(
            (position.x / size).round() as i32,
            (position.y / size).round() as i32,
        )
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each step).
    pub tick: u64,
    /// Elapsed simulation time in ticks (sum of step deltas).
    pub elapsed_ticks: f64,
}

impl SimTime {
    /// Advance by one step of `delta` ticks.
    pub fn advance(&mut self, delta: f32) {
        self.tick += 1;
        self.elapsed_ticks += delta as f64;
    }

    /// Elapsed wall-clock equivalent in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ticks * crate::constants::TICK_SECS
    }
}

/// Vector of length `len` pointing at `degrees`.
pub fn trns(degrees: f32, len: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.cos() * len, rad.sin() * len)
}

/// Heading of a vector in degrees, normalized to `[0, 360)`.
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees().rem_euclid(360.0)
}

/// Heading from one point to another in degrees.
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    angle_of(to - from)
}

/// Signed shortest rotation from `from` to `to`, in `(-180, 180]`.
pub fn angle_delta(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Rotate `from` toward `to` by at most `max_step` degrees.
pub fn move_toward(from: f32, to: f32, max_step: f32) -> f32 {
    let delta = angle_delta(from, to);
    if delta.abs() <= max_step {
        to.rem_euclid(360.0)
    } else {
        (from + max_step.copysign(delta)).rem_euclid(360.0)
    }
}

/// Rotate a vector by `degrees`, keeping its length.
pub fn rotate(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// Replace the heading of a vector, keeping its length.
pub fn with_angle(v: Vec2, degrees: f32) -> Vec2 {
    trns(degrees, v.length())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn move_toward_respects_step() {
        assert!(approx(move_toward(0.0, 90.0, 10.0), 10.0));
        assert!(approx(move_toward(0.0, 270.0, 10.0), 350.0));
        assert!(approx(move_toward(350.0, 5.0, 30.0), 5.0));
    }

    #[test]
    fn angle_delta_takes_short_way() {
        assert!(approx(angle_delta(10.0, 350.0), -20.0));
        assert!(approx(angle_delta(350.0, 10.0), 20.0));
    }

    #[test]
    fn rotate_keeps_length() {
        let v = rotate(Vec2::new(3.0, 4.0), 73.0);
        assert!(approx(v.length(), 5.0));
        let w = with_angle(Vec2::new(3.0, 4.0), 180.0);
        assert!(approx(w.x, -5.0));
        assert!(approx(w.y, 0.0));
    }

    #[test]
    fn tile_lookup_rounds_to_nearest() {
        assert_eq!(TileRef::containing(Vec2::new(3.9, -4.1)), TileRef::new(0, -1));
        assert_eq!(TileRef::containing(Vec2::new(16.0, 8.0)), TileRef::new(2, 1));
    }
}
