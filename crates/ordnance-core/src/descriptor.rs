//! Behavior descriptors: the declarative configuration of one projectile kind.
//!
//! A descriptor is a flat record of physics and collision parameters plus
//! optional sub-behavior blocks. A block that is absent is disabled. After
//! [`BehaviorDescriptor::finalize`] runs (through the registry) the descriptor
//! is shared behind an `Arc` and never mutated again; variants are produced
//! with [`crate::registry::DescriptorRegistry::derive`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{LiquidKind, StatusEffect, TargetKind};
use crate::error::ContentError;
use crate::registry::DescriptorRegistry;
use crate::types::{Color, DescriptorId, EffectId, SoundId, UnitKindId};

/// Reference from one descriptor to another, by name.
///
/// Deserialized from a plain string; the registry resolves the target when the
/// referencing descriptor is finalized.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DescriptorLink {
    name: String,
    target: Option<Arc<BehaviorDescriptor>>,
}

impl DescriptorLink {
    /// Unresolved link to a descriptor name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
        }
    }

    /// Link already pointing at a finalized descriptor.
    pub fn to(target: Arc<BehaviorDescriptor>) -> Self {
        Self {
            name: target.name.clone(),
            target: Some(target),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> Option<&Arc<BehaviorDescriptor>> {
        self.target.as_ref()
    }

    fn resolve(&mut self, owner: &str, registry: &DescriptorRegistry) -> Result<(), ContentError> {
        if self.target.is_none() {
            let target = registry
                .by_name(&self.name)
                .ok_or_else(|| ContentError::UnknownReference {
                    from: owner.to_string(),
                    to: self.name.clone(),
                })?;
            self.target = Some(target);
        }
        Ok(())
    }
}

impl From<String> for DescriptorLink {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl From<DescriptorLink> for String {
    fn from(link: DescriptorLink) -> Self {
        link.name
    }
}

impl fmt::Debug for DescriptorLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DescriptorLink({})", self.name)
    }
}

/// Area damage around the impact point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplashSpec {
    pub damage: f32,
    /// Disabled unless positive.
    pub radius: f32,
    /// Measure distance to the target's edge instead of its center.
    pub scaled: bool,
}

impl Default for SplashSpec {
    fn default() -> Self {
        Self {
            damage: 0.0,
            radius: -1.0,
            scaled: false,
        }
    }
}

/// Child projectiles scattered on impact or expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FragSpec {
    pub bullet: DescriptorLink,
    pub count: u32,
    pub cone: f32,
    pub angle: f32,
    pub velocity_min: f32,
    pub velocity_max: f32,
    pub life_min: f32,
    pub life_max: f32,
    /// Variant of `bullet` that never inherits its parent's velocity.
    #[serde(skip)]
    child: Option<Arc<BehaviorDescriptor>>,
}

impl FragSpec {
    pub fn new(bullet: DescriptorLink, count: u32) -> Self {
        Self {
            bullet,
            count,
            ..Default::default()
        }
    }

    /// Descriptor actually spawned for each fragment.
    pub fn child(&self) -> Option<&Arc<BehaviorDescriptor>> {
        self.child.as_ref()
    }
}

impl Default for FragSpec {
    fn default() -> Self {
        Self {
            bullet: DescriptorLink::named(""),
            count: 9,
            cone: 360.0,
            angle: 0.0,
            velocity_min: 0.2,
            velocity_max: 1.0,
            life_min: 1.0,
            life_max: 1.0,
            child: None,
        }
    }
}

/// Branching secondary strikes (lightning) generated at the impact point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSpec {
    pub count: u32,
    /// Segments per branch.
    pub length: u32,
    /// Extra segments drawn uniformly from `0..=length_rand`.
    pub length_rand: u32,
    /// Negative means "use the direct damage".
    pub damage: f32,
    pub cone: f32,
    pub angle: f32,
    pub color: Color,
    /// Descriptor spawned at each branch endpoint. Defaults to a built-in strike.
    pub strike: Option<DescriptorLink>,
    #[serde(skip)]
    resolved_strike: Option<Arc<BehaviorDescriptor>>,
}

impl ChainSpec {
    pub fn new(count: u32, length: u32) -> Self {
        Self {
            count,
            length,
            ..Default::default()
        }
    }

    /// Strike descriptor after defaulting.
    pub fn strike_descriptor(&self) -> Option<&Arc<BehaviorDescriptor>> {
        self.resolved_strike.as_ref()
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self {
            count: 0,
            length: 5,
            length_rand: 0,
            damage: -1.0,
            cone: 360.0,
            angle: 0.0,
            color: Color::SURGE,
            strike: None,
            resolved_strike: None,
        }
    }
}

/// Gradual steering toward a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomingSpec {
    /// Turn budget factor; at or below a small epsilon homing is off.
    pub power: f32,
    pub range: f32,
    /// Age (ticks) before steering starts.
    pub delay: f32,
}

impl Default for HomingSpec {
    fn default() -> Self {
        Self {
            power: 0.0,
            range: 50.0,
            delay: -1.0,
        }
    }
}

/// Sinusoidal lateral rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaveSpec {
    pub scale: f32,
    pub magnitude: f32,
    /// Randomize the initial phase direction per projectile.
    pub random: bool,
}

impl Default for WeaveSpec {
    fn default() -> Self {
        Self {
            scale: 1.0,
            magnitude: 0.0,
            random: true,
        }
    }
}

/// Fires started around the impact point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IncendiarySpec {
    pub amount: u32,
    pub spread: f32,
    /// Probability in `[0, 1]` that any fires start on a given hit.
    pub chance: f32,
}

impl Default for IncendiarySpec {
    fn default() -> Self {
        Self {
            amount: 0,
            spread: 8.0,
            chance: 1.0,
        }
    }
}

/// Field denying enemy regeneration for a while.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuppressionSpec {
    /// Disabled unless positive.
    pub range: f32,
    pub duration: f32,
    /// Pass-through for the presentation layer; not read by the engine.
    pub effect_chance: f32,
}

impl Default for SuppressionSpec {
    fn default() -> Self {
        Self {
            range: -1.0,
            duration: 480.0,
            effect_chance: 50.0,
        }
    }
}

/// Liquid deposited at randomized points near the impact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PuddleSpec {
    pub count: u32,
    pub range: f32,
    pub amount: f32,
    pub liquid: LiquidKind,
}

impl Default for PuddleSpec {
    fn default() -> Self {
        Self {
            count: 0,
            range: 0.0,
            amount: 5.0,
            liquid: LiquidKind::Water,
        }
    }
}

/// Spawn a persistent unit instead of a projectile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSpawnSpec {
    pub kind: UnitKindId,
    pub speed: f32,
    pub lifetime: f32,
}

/// Trail history and trail effect parameters. Passed through to presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailSpec {
    /// History length; disabled unless positive.
    pub length: i32,
    pub width: f32,
    pub color: Color,
    /// Per-tick chance of a trail effect. Disabled unless positive.
    pub chance: f32,
    /// Fixed interval (ticks) between trail effects. Disabled unless positive.
    pub interval: f32,
    pub effect: Option<EffectId>,
    pub param: f32,
    pub rotate: bool,
    pub sin_mag: f32,
    pub sin_scl: f32,
}

impl Default for TrailSpec {
    fn default() -> Self {
        Self {
            length: -1,
            width: 2.0,
            color: Color::MISSILE_YELLOW_BACK,
            chance: -0.0001,
            interval: 0.0,
            effect: None,
            param: 2.0,
            rotate: false,
            sin_mag: 0.0,
            sin_scl: 3.0,
        }
    }
}

/// Effects, sounds, colors, and light. Never interpreted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Presentation {
    pub hit_effect: Option<EffectId>,
    pub despawn_effect: Option<EffectId>,
    /// Pass-through for the firing weapon; not emitted by the engine.
    pub shoot_effect: Option<EffectId>,
    pub heal_effect: Option<EffectId>,
    pub hit_sound: Option<SoundId>,
    pub despawn_sound: Option<SoundId>,
    pub hit_sound_volume: f32,
    pub hit_sound_pitch: f32,
    pub hit_shake: f32,
    pub despawn_shake: f32,
    pub hit_color: Color,
    pub heal_color: Color,
    pub light_color: Color,
    /// Derived from hit size when not positive.
    pub light_radius: f32,
    /// Pass-through for the renderer; not read by the engine.
    pub light_opacity: f32,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            hit_effect: None,
            despawn_effect: None,
            shoot_effect: None,
            heal_effect: None,
            hit_sound: None,
            despawn_sound: None,
            hit_sound_volume: 1.0,
            hit_sound_pitch: 1.0,
            hit_shake: 0.0,
            despawn_shake: 0.0,
            hit_color: Color::WHITE,
            heal_color: Color::HEAL,
            light_color: Color::POWER_LIGHT,
            light_radius: -1.0,
            light_opacity: 0.3,
        }
    }
}

/// Immutable-after-finalize configuration of one projectile kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorDescriptor {
    /// Assigned by the registry.
    #[serde(skip)]
    pub id: Option<DescriptorId>,
    pub name: String,

    // Physics
    pub speed: f32,
    pub lifetime: f32,
    pub drag: f32,
    pub hit_size: f32,
    pub draw_size: f32,
    pub keep_velocity: bool,
    pub back_move: bool,
    pub max_range: f32,
    pub range_override: f32,
    /// Derived on finalize.
    #[serde(skip)]
    pub range: f32,

    // Collision rules
    pub collides: bool,
    pub collides_tiles: bool,
    pub collides_air: bool,
    pub collides_ground: bool,
    pub collides_team: bool,
    /// Pass-through for point-defense hosts; not read by the engine.
    pub hittable: bool,
    /// Pass-through for deflecting hosts; not read by the engine.
    pub reflectable: bool,
    pub absorbable: bool,
    pub pierce: bool,
    pub pierce_building: bool,
    pub pierce_cap: i32,
    pub remove_after_pierce: bool,
    pub instant_disappear: bool,
    pub kill_shooter: bool,

    // Direct hits
    pub damage: f32,
    pub building_damage_multiplier: f32,
    pub pierce_armor: bool,
    pub knockback: f32,
    pub impact: bool,
    pub status: StatusEffect,
    pub status_duration: f32,
    pub heal_percent: f32,
    pub heal_amount: f32,
    pub make_fire: bool,
    pub despawn_hit: bool,
    /// Apply the default-on-hit rules during finalize.
    pub set_defaults: bool,

    // Optional sub-behaviors
    pub splash: Option<SplashSpec>,
    pub frag: Option<FragSpec>,
    pub chain: Option<ChainSpec>,
    pub homing: Option<HomingSpec>,
    pub weave: Option<WeaveSpec>,
    pub incendiary: Option<IncendiarySpec>,
    pub suppression: Option<SuppressionSpec>,
    pub puddles: Option<PuddleSpec>,
    pub spawn_unit: Option<UnitSpawnSpec>,
    pub spawn_bullets: Vec<DescriptorLink>,

    pub trail: TrailSpec,
    pub presentation: Presentation,

    /// Set by `finalize`; left false in literals and use `is_finalized` to read it.
    #[serde(skip)]
    #[doc(hidden)]
    pub finalized: bool,
}

impl Default for BehaviorDescriptor {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            speed: 1.0,
            lifetime: 40.0,
            drag: 0.0,
            hit_size: 4.0,
            draw_size: 40.0,
            keep_velocity: true,
            back_move: true,
            max_range: -1.0,
            range_override: -1.0,
            range: 0.0,
            collides: true,
            collides_tiles: true,
            collides_air: true,
            collides_ground: true,
            collides_team: false,
            hittable: true,
            reflectable: true,
            absorbable: true,
            pierce: false,
            pierce_building: false,
            pierce_cap: -1,
            remove_after_pierce: true,
            instant_disappear: false,
            kill_shooter: false,
            damage: 1.0,
            building_damage_multiplier: 1.0,
            pierce_armor: false,
            knockback: 0.0,
            impact: false,
            status: StatusEffect::None,
            status_duration: 480.0,
            heal_percent: 0.0,
            heal_amount: 0.0,
            make_fire: false,
            despawn_hit: false,
            set_defaults: true,
            splash: None,
            frag: None,
            chain: None,
            homing: None,
            weave: None,
            incendiary: None,
            suppression: None,
            puddles: None,
            spawn_unit: None,
            spawn_bullets: Vec::new(),
            trail: TrailSpec::default(),
            presentation: Presentation::default(),
            finalized: false,
        }
    }
}

impl BehaviorDescriptor {
    /// Unregistered descriptor with default parameters.
    pub fn new(name: impl Into<String>, speed: f32, damage: f32) -> Self {
        Self {
            name: name.into(),
            speed,
            damage,
            ..Default::default()
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Whether direct hits heal friendly structures.
    pub fn heals(&self) -> bool {
        self.heal_percent > 0.0 || self.heal_amount > 0.0
    }

    /// Whether this descriptor may strike targets of `kind`.
    pub fn collides_with(&self, kind: TargetKind) -> bool {
        match kind {
            TargetKind::Air => self.collides_air,
            TargetKind::Ground => self.collides_ground,
            TargetKind::Building => self.collides_tiles,
        }
    }

    pub fn splash_radius(&self) -> f32 {
        self.splash.as_ref().map_or(-1.0, |s| s.radius)
    }

    pub fn chain_count(&self) -> u32 {
        self.chain.as_ref().map_or(0, |c| c.count)
    }

    /// Homing block when it is actually steering.
    pub fn active_homing(&self) -> Option<&HomingSpec> {
        self.homing
            .as_ref()
            .filter(|h| h.power > HOMING_MIN_POWER)
    }

    pub fn trail_length(&self) -> usize {
        self.trail.length.max(0) as usize
    }

    /// Maximum travel distance from launch parameters.
    pub fn calculate_range(&self) -> f32 {
        if self.range_override > 0.0 {
            return self.range_override;
        }
        if let Some(unit) = &self.spawn_unit {
            return unit.lifetime * unit.speed;
        }
        let travel = if self.drag.abs() < FLOAT_EPSILON {
            self.speed * self.lifetime
        } else {
            self.speed * (1.0 - (1.0 - self.drag).powf(self.lifetime)) / self.drag
        };
        travel.max(self.max_range)
    }

    /// Rough damage-per-shot used for target prioritization and UI.
    pub fn estimate_damage(&self) -> f32 {
        let mut sum = self.damage;
        if let Some(splash) = &self.splash {
            sum += splash.damage * SPLASH_ESTIMATE_WEIGHT;
        }
        if let Some(frag) = &self.frag {
            let child = frag.child().or_else(|| frag.bullet.get());
            if let Some(child) = child.filter(|c| c.name != self.name) {
                sum += child.estimate_damage() * frag.count as f32 / 2.0;
            }
        }
        sum
    }

    /// One-time derivation of computed fields. Resolves descriptor links
    /// against `registry` and may register derived fragment variants.
    /// A second call is a no-op.
    pub fn finalize(&mut self, registry: &mut DescriptorRegistry) -> Result<(), ContentError> {
        if self.finalized {
            return Ok(());
        }

        let owner = self.name.clone();
        if let Some(frag) = &mut self.frag {
            frag.bullet.resolve(&owner, registry)?;
        }
        if let Some(strike) = self.chain.as_mut().and_then(|c| c.strike.as_mut()) {
            strike.resolve(&owner, registry)?;
        }
        for link in &mut self.spawn_bullets {
            link.resolve(&owner, registry)?;
        }

        if self.pierce_cap >= 1 {
            self.pierce = true;
        }

        if self.set_defaults {
            let has_chain = self.chain_count() > 0;
            if has_chain && self.status == StatusEffect::None {
                self.status = StatusEffect::Shocked;
            }
            if self.frag.is_some() || self.splash_radius() > 0.0 || has_chain {
                self.despawn_hit = true;
            }
        }

        if let Some(frag) = &mut self.frag {
            if let Some(bullet) = frag.bullet.get() {
                frag.child = Some(registry.without_velocity_inheritance(bullet)?);
            }
        }

        let ground_only = !self.collides_air;
        if let Some(chain) = &mut self.chain {
            chain.resolved_strike = match chain.strike.as_ref().and_then(|s| s.get()) {
                Some(strike) => Some(Arc::clone(strike)),
                None => registry.chain_strike(ground_only),
            };
        }

        if self.presentation.light_radius <= -1.0 {
            self.presentation.light_radius = LIGHT_RADIUS_MIN.max(self.hit_size * LIGHT_RADIUS_PER_HIT_SIZE);
        }

        self.draw_size = self
            .draw_size
            .max(self.trail.length as f32 * self.speed * 2.0);
        self.range = self.calculate_range();
        self.finalized = true;
        Ok(())
    }

    /// Copy that can be edited and finalized again under a new identity.
    pub(crate) fn unfinalized_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.id = None;
        copy.finalized = false;
        copy
    }
}
