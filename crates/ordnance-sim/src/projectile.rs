//! Runtime projectile state and the spawn context it is built from.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use ordnance_core::descriptor::BehaviorDescriptor;
use ordnance_core::types::{angle_of, trns, TargetId, Team};

use crate::pool::ProjectileId;

/// Who fired a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerRef {
    Target(TargetId),
    Projectile(ProjectileId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Owner {
    pub id: OwnerRef,
    /// Owner velocity at fire time, when the owner moves.
    pub velocity: Option<Vec2>,
}

/// Bespoke trajectory added on top of velocity integration.
pub trait MotionStrategy: fmt::Debug + Send + Sync {
    /// Extra displacement for this step.
    fn displace(&self, projectile: &Projectile, delta: f32) -> Vec2;
}

/// Sideways sinusoidal drift around the heading.
#[derive(Debug, Clone, Copy)]
pub struct Helix {
    pub scale: f32,
    pub magnitude: f32,
    pub offset: f32,
}

impl MotionStrategy for Helix {
    fn displace(&self, projectile: &Projectile, delta: f32) -> Vec2 {
        let lateral = ((projectile.age + self.offset) / self.scale).sin() * self.magnitude;
        trns(projectile.rotation() + 90.0, lateral * delta)
    }
}

/// Inputs to the spawn factory.
#[derive(Debug, Clone)]
pub struct SpawnContext {
    pub owner: Option<Owner>,
    pub team: Team,
    pub origin: Vec2,
    pub aim: Option<Vec2>,
    /// Firing angle in degrees.
    pub angle: f32,
    pub velocity_scale: f32,
    pub lifetime_scale: f32,
    /// Replaces the descriptor's direct damage.
    pub damage: Option<f32>,
    pub motion: Option<Arc<dyn MotionStrategy>>,
}

impl SpawnContext {
    pub fn new(team: Team, origin: Vec2, angle: f32) -> Self {
        Self {
            owner: None,
            team,
            origin,
            aim: None,
            angle,
            velocity_scale: 1.0,
            lifetime_scale: 1.0,
            damage: None,
            motion: None,
        }
    }

    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_aim(mut self, aim: Vec2) -> Self {
        self.aim = Some(aim);
        self
    }

    pub fn with_scales(mut self, velocity_scale: f32, lifetime_scale: f32) -> Self {
        self.velocity_scale = velocity_scale;
        self.lifetime_scale = lifetime_scale;
        self
    }

    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = Some(damage);
        self
    }

    pub fn with_motion(mut self, motion: Arc<dyn MotionStrategy>) -> Self {
        self.motion = Some(motion);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: Vec2,
    pub width: f32,
}

/// Bounded history of recent positions, newest last.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
}

impl Trail {
    /// Append a point, evicting the oldest beyond `length`.
    pub fn push(&mut self, position: Vec2, width: f32, length: usize) {
        if length == 0 {
            self.points.clear();
            return;
        }
        self.points.push_back(TrailPoint { position, width });
        while self.points.len() > length {
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.points.iter().map(|p| p.position).collect()
    }
}

/// Fully resolved initial state produced by the spawn factory.
#[derive(Debug, Clone)]
pub struct Launch {
    pub descriptor: Arc<BehaviorDescriptor>,
    pub team: Team,
    pub owner: Option<Owner>,
    pub origin: Vec2,
    pub aim: Option<Vec2>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub age: f32,
    pub lifetime: f32,
    pub damage: f32,
    pub damage_multiplier: f32,
    pub velocity_scale: f32,
    pub lifetime_scale: f32,
    pub depth: u8,
    /// Engine seed; mixed with the assigned id.
    pub seed: u64,
    pub motion: Option<Arc<dyn MotionStrategy>>,
}

/// A live simulated projectile.
#[derive(Debug)]
pub struct Projectile {
    id: ProjectileId,
    pub descriptor: Arc<BehaviorDescriptor>,
    pub team: Team,
    pub owner: Option<Owner>,
    pub origin: Vec2,
    pub aim: Option<Vec2>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub age: f32,
    pub lifetime: f32,
    pub damage: f32,
    pub damage_multiplier: f32,
    pub velocity_scale: f32,
    pub lifetime_scale: f32,
    /// Remaining pierce budget; `None` when unbounded.
    pub pierce_remaining: Option<u32>,
    /// Cleared once a non-removing projectile exhausts its pierce budget.
    pub collides: bool,
    /// Ended by a terminal hit; despawn effects are skipped.
    pub hit: bool,
    pub absorbed: bool,
    /// Generation of fragment/chain/spawn-on-create ancestry.
    pub depth: u8,
    pub trail: Trail,
    pub(crate) collided: HashSet<TargetId>,
    pub(crate) weave_sign: f32,
    pub(crate) trail_timer: f32,
    pub(crate) homing_target: Option<TargetId>,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) motion: Option<Arc<dyn MotionStrategy>>,
}

impl Projectile {
    pub fn new(id: ProjectileId, launch: Launch) -> Self {
        let seed = instance_seed(launch.seed, id);
        let mut projectile = Self {
            id,
            descriptor: Arc::clone(&launch.descriptor),
            team: launch.team,
            owner: None,
            origin: Vec2::ZERO,
            aim: None,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            age: 0.0,
            lifetime: 0.0,
            damage: 0.0,
            damage_multiplier: 1.0,
            velocity_scale: 1.0,
            lifetime_scale: 1.0,
            pierce_remaining: None,
            collides: true,
            hit: false,
            absorbed: false,
            depth: 0,
            trail: Trail::default(),
            collided: HashSet::new(),
            weave_sign: 1.0,
            trail_timer: 0.0,
            homing_target: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            motion: None,
        };
        projectile.reset(id, launch);
        projectile
    }

    /// Reinitialize for a new lifetime. Clears every piece of scratch state.
    pub fn reset(&mut self, id: ProjectileId, launch: Launch) {
        let seed = instance_seed(launch.seed, id);
        let descriptor = launch.descriptor;

        self.id = id;
        self.team = launch.team;
        self.owner = launch.owner;
        self.origin = launch.origin;
        self.aim = launch.aim;
        self.position = launch.position;
        self.velocity = launch.velocity;
        self.age = launch.age;
        self.lifetime = launch.lifetime;
        self.damage = launch.damage;
        self.damage_multiplier = launch.damage_multiplier;
        self.velocity_scale = launch.velocity_scale;
        self.lifetime_scale = launch.lifetime_scale;
        self.pierce_remaining = (descriptor.pierce_cap >= 1).then_some(descriptor.pierce_cap as u32);
        self.collides = true;
        self.hit = false;
        self.absorbed = false;
        self.depth = launch.depth;
        self.trail.clear();
        self.collided.clear();
        self.weave_sign = match &descriptor.weave {
            Some(weave) if weave.random && seed & 1 == 1 => -1.0,
            _ => 1.0,
        };
        self.trail_timer = 0.0;
        self.homing_target = None;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.motion = launch.motion;
        self.descriptor = descriptor;
    }

    pub fn id(&self) -> ProjectileId {
        self.id
    }

    /// Heading in degrees.
    pub fn rotation(&self) -> f32 {
        angle_of(self.velocity)
    }

    /// Fraction of lifetime elapsed, in `[0, 1]`.
    pub fn fin(&self) -> f32 {
        if self.lifetime <= 0.0 {
            1.0
        } else {
            (self.age / self.lifetime).clamp(0.0, 1.0)
        }
    }

    pub fn has_collided(&self, target: TargetId) -> bool {
        self.collided.contains(&target)
    }

    pub fn mark_collided(&mut self, target: TargetId) {
        self.collided.insert(target);
    }

    pub fn collided_count(&self) -> usize {
        self.collided.len()
    }

    /// Last target homing steered toward.
    pub fn homing_target(&self) -> Option<TargetId> {
        self.homing_target
    }
}

/// Per-instance seed: engine seed mixed with the projectile identity.
fn instance_seed(seed: u64, id: ProjectileId) -> u64 {
    let mut z = seed ^ id.to_bits().wrapping_mul(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn launch() -> Launch {
        Launch {
            descriptor: Arc::new(BehaviorDescriptor::new("test", 2.0, 1.0)),
            team: Team::SHARDED,
            owner: None,
            origin: Vec2::ZERO,
            aim: None,
            position: Vec2::ZERO,
            velocity: Vec2::new(2.0, 0.0),
            age: 0.0,
            lifetime: 40.0,
            damage: 1.0,
            damage_multiplier: 1.0,
            velocity_scale: 1.0,
            lifetime_scale: 1.0,
            depth: 0,
            seed: 7,
            motion: None,
        }
    }

    #[test]
    fn trail_is_bounded() {
        let mut trail = Trail::default();
        for i in 0..10 {
            trail.push(Vec2::new(i as f32, 0.0), 1.0, 4);
        }
        assert_eq!(trail.len(), 4);
        assert_eq!(trail.positions().first(), Some(&Vec2::new(6.0, 0.0)));
        assert_eq!(trail.positions().last(), Some(&Vec2::new(9.0, 0.0)));
    }

    #[test]
    fn seed_depends_on_identity() {
        let a = instance_seed(7, ProjectileId::new(0, 0));
        let b = instance_seed(7, ProjectileId::new(0, 1));
        let c = instance_seed(8, ProjectileId::new(0, 0));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, instance_seed(7, ProjectileId::new(0, 0)));
    }

    #[test]
    fn fin_is_clamped_lifetime_fraction() {
        let mut p = Projectile::new(ProjectileId::new(0, 0), launch());
        assert_eq!(p.fin(), 0.0);
        p.age = 10.0;
        assert!((p.fin() - 0.25).abs() < 1e-6);
        p.age = 55.0;
        assert_eq!(p.fin(), 1.0);
        p.lifetime = 0.0;
        assert_eq!(p.fin(), 1.0);
    }

    #[test]
    fn helix_displaces_perpendicular_to_heading() {
        let p = Projectile::new(ProjectileId::new(0, 0), launch());
        let helix = Helix {
            scale: 2.0,
            magnitude: 3.0,
            offset: std::f32::consts::PI,
        };
        let d = helix.displace(&p, 1.0);
        assert!(d.x.abs() < 1e-5);
        assert!((d.y - 3.0).abs() < 1e-5, "got {d:?}");
    }

    #[test]
    fn rotation_follows_velocity() {
        let mut p = Projectile::new(ProjectileId::new(0, 0), launch());
        assert!(p.rotation().abs() < 1e-4);
        p.velocity = Vec2::new(0.0, -3.0);
        assert!((p.rotation() - 270.0).abs() < 1e-3);
    }
}
