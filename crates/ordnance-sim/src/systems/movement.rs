//! Kinematic integration, drag, weaving, and trail bookkeeping.

use std::f32::consts::PI;

use rand::Rng;

use ordnance_core::error::StepError;
use ordnance_core::events::FxEvent;
use ordnance_core::types::rotate;

use crate::projectile::Projectile;
use crate::systems::Outbox;

/// Record the current position in the trail history.
pub fn update_trail(p: &mut Projectile) {
    let length = p.descriptor.trail_length();
    if length == 0 {
        return;
    }
    let trail = &p.descriptor.trail;
    let pulse = if trail.sin_mag > 0.0 {
        absin(p.age, trail.sin_scl, trail.sin_mag)
    } else {
        0.0
    };
    let width = trail.width * (1.0 + pulse);
    let position = p.position;
    p.trail.push(position, width, length);
}

/// Rotate the heading along a sine wave.
pub fn weave(p: &mut Projectile, delta: f32) {
    let Some(weave) = &p.descriptor.weave else {
        return;
    };
    if weave.magnitude == 0.0 || weave.scale == 0.0 {
        return;
    }
    let phase = (p.age + PI * weave.scale / 2.0) / weave.scale;
    let degrees = phase.sin() * weave.magnitude * p.weave_sign * delta;
    p.velocity = rotate(p.velocity, degrees);
}

/// Probabilistic and fixed-interval trail effects.
pub fn emit_trail_effects(p: &mut Projectile, delta: f32, out: &mut Outbox) {
    let trail = &p.descriptor.trail;
    let Some(effect) = trail.effect else {
        return;
    };
    let mut emit = false;
    if trail.chance > 0.0 && p.rng.gen::<f32>() < trail.chance * delta {
        emit = true;
    }
    if trail.interval > 0.0 {
        p.trail_timer += delta;
        if p.trail_timer >= trail.interval {
            p.trail_timer = 0.0;
            emit = true;
        }
    }
    if emit {
        let rotation = if trail.rotate { p.rotation() } else { trail.param };
        out.fx(FxEvent::Effect {
            effect,
            position: p.position,
            rotation,
            color: trail.color,
        });
    }
}

/// Move by velocity (plus any motion strategy), then decay velocity by drag.
pub fn integrate(p: &mut Projectile, delta: f32) -> Result<(), StepError> {
    let mut displacement = p.velocity * delta;
    if let Some(motion) = p.motion.clone() {
        displacement += motion.displace(p, delta);
    }
    p.position += displacement;

    let drag = p.descriptor.drag;
    if drag != 0.0 {
        p.velocity *= (1.0 - drag).max(0.0).powf(delta);
    }

    if !p.position.is_finite() {
        return Err(StepError::NonFinitePosition(p.position));
    }
    if !p.velocity.is_finite() {
        return Err(StepError::NonFiniteVelocity(p.velocity));
    }
    Ok(())
}

/// Absolute sine oscillating in `[0, mag]` with period `scl * 2 * PI * 2`.
fn absin(x: f32, scl: f32, mag: f32) -> f32 {
    ((x / (scl * 2.0)).sin() * mag + mag) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use glam::Vec2;
    use ordnance_core::descriptor::{BehaviorDescriptor, WeaveSpec};

    use crate::pool::ProjectileId;
    use crate::projectile::tests::launch;

    fn projectile(descriptor: BehaviorDescriptor, velocity: Vec2) -> Projectile {
        let mut l = launch();
        l.descriptor = Arc::new(descriptor);
        l.velocity = velocity;
        Projectile::new(ProjectileId::new(0, 0), l)
    }

    #[test]
    fn drag_decays_exponentially() {
        let d = BehaviorDescriptor {
            drag: 0.1,
            ..BehaviorDescriptor::new("d", 10.0, 1.0)
        };
        let mut p = projectile(d, Vec2::new(10.0, 0.0));
        integrate(&mut p, 1.0).unwrap();
        assert!((p.position.x - 10.0).abs() < 1e-5);
        assert!((p.velocity.x - 9.0).abs() < 1e-5);
        integrate(&mut p, 2.0).unwrap();
        assert!((p.position.x - 28.0).abs() < 1e-4);
        assert!((p.velocity.x - 9.0 * 0.81).abs() < 1e-4);
    }

    #[test]
    fn weave_preserves_speed() {
        let d = BehaviorDescriptor {
            weave: Some(WeaveSpec {
                scale: 4.0,
                magnitude: 3.0,
                random: false,
            }),
            ..BehaviorDescriptor::new("w", 2.0, 1.0)
        };
        let mut p = projectile(d, Vec2::new(2.0, 0.0));
        for i in 0..20 {
            p.age = i as f32;
            weave(&mut p, 1.0);
        }
        assert!((p.velocity.length() - 2.0).abs() < 1e-4);
        assert!(p.velocity.y.abs() > 1e-3, "heading should have changed");
    }

    #[test]
    fn non_finite_position_is_a_fault() {
        let mut p = projectile(BehaviorDescriptor::new("n", 1.0, 1.0), Vec2::new(f32::NAN, 0.0));
        assert!(matches!(
            integrate(&mut p, 1.0),
            Err(StepError::NonFinitePosition(_))
        ));
    }

    #[test]
    fn absin_stays_in_range() {
        for i in 0..100 {
            let v = absin(i as f32 * 0.37, 3.0, 0.5);
            assert!((0.0..=0.5 + 1e-6).contains(&v));
        }
    }
}
