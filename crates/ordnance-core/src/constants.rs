//! Simulation constants and tuning parameters.
//!
//! Distances are world units, angles are degrees, and time is measured in
//! ticks unless a name says otherwise.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const TICK_SECS: f64 = 1.0 / TICK_RATE as f64;

/// World units per tile edge.
pub const TILE_SIZE: f32 = 8.0;

/// Values with a magnitude below this are treated as zero (drag, speed).
pub const FLOAT_EPSILON: f32 = 0.000_001;

// --- Homing ---

/// Homing turn budget per tick is `homing_power * delta * HOMING_TURN_SCALE` degrees.
pub const HOMING_TURN_SCALE: f32 = 50.0;

/// Homing power at or below this is treated as disabled.
pub const HOMING_MIN_POWER: f32 = 0.0001;

// --- Direct hits ---

/// Knockback impulse multiplier applied to the configured knockback.
pub const KNOCKBACK_SCALE: f32 = 80.0;

/// Fraction of incoming damage that always gets through unit armor.
pub const MIN_ARMOR_DAMAGE: f32 = 0.1;

// --- Splash ---

/// Damage retained at the edge of a splash radius (linear falloff toward this).
pub const SPLASH_FALLOFF: f32 = 0.4;

/// Weight of splash damage in damage estimates.
pub const SPLASH_ESTIMATE_WEIGHT: f32 = 0.75;

// --- Fragmentation ---

/// Minimum distance from the impact point at which fragments appear.
pub const FRAG_OFFSET_MIN: f32 = 1.0;

/// Maximum distance from the impact point at which fragments appear.
pub const FRAG_OFFSET_MAX: f32 = 7.0;

// --- Chain effects ---

/// Length of one chain branch segment.
pub const CHAIN_SEGMENT_LENGTH: f32 = 6.0;

/// Maximum heading jitter applied between chain segments.
pub const CHAIN_SEGMENT_JITTER: f32 = 15.0;

/// Lifetime of the built-in chain strike descriptors.
pub const CHAIN_STRIKE_LIFETIME: f32 = 10.0;

/// Hit size of the built-in chain strike descriptors.
pub const CHAIN_STRIKE_HIT_SIZE: f32 = 8.0;

/// Status duration applied by the built-in chain strike descriptors.
pub const CHAIN_STRIKE_STATUS_DURATION: f32 = 10.0;

/// Name of the built-in chain strike that hits air and ground.
pub const CHAIN_STRIKE: &str = "chain-strike";

/// Name of the built-in chain strike that only hits ground targets.
pub const CHAIN_STRIKE_GROUND: &str = "chain-strike-ground";

// --- Presentation ---

/// Smallest light radius derived from hit size.
pub const LIGHT_RADIUS_MIN: f32 = 18.0;

/// Light radius per unit of hit size.
pub const LIGHT_RADIUS_PER_HIT_SIZE: f32 = 5.0;

// --- Lifecycle ---

/// Default bound on fragment/chain/spawn-on-create generations.
pub const DEFAULT_MAX_SPAWN_DEPTH: u8 = 4;

/// Default number of projectile slots reserved up front.
pub const DEFAULT_POOL_CAPACITY: usize = 256;
