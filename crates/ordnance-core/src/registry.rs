//! Descriptor registry: assigns stable identities and owns finalized descriptors.
//!
//! Identities are handed out in registration order, so two peers that load the
//! same content in the same order agree on every [`DescriptorId`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::*;
use crate::descriptor::BehaviorDescriptor;
use crate::enums::StatusEffect;
use crate::error::ContentError;
use crate::types::{Color, DescriptorId};

#[derive(Debug)]
pub struct DescriptorRegistry {
    entries: Vec<Arc<BehaviorDescriptor>>,
    by_name: HashMap<String, DescriptorId>,
    /// Inert fragment variants keyed by the descriptor they were derived from.
    frag_variants: HashMap<DescriptorId, Arc<BehaviorDescriptor>>,
}

impl DescriptorRegistry {
    /// Registry holding only the built-in chain strike descriptors.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
            frag_variants: HashMap::new(),
        };
        for (name, collides_air) in [(CHAIN_STRIKE, true), (CHAIN_STRIKE_GROUND, false)] {
            let strike = chain_strike_descriptor(name, collides_air);
            // Built-ins have no links and unique names.
            if let Err(err) = registry.register(strike) {
                tracing::error!(%err, name, "failed to register built-in descriptor");
            }
        }
        registry
    }

    /// Finalize `descriptor` and assign it the next identity.
    pub fn register(
        &mut self,
        mut descriptor: BehaviorDescriptor,
    ) -> Result<Arc<BehaviorDescriptor>, ContentError> {
        if self.by_name.contains_key(&descriptor.name) {
            return Err(ContentError::DuplicateName(descriptor.name));
        }
        descriptor.finalize(self)?;
        // Finalize may have registered fragment variants; identity is taken after.
        let id = u16::try_from(self.entries.len())
            .map(DescriptorId)
            .map_err(|_| ContentError::RegistryFull)?;
        descriptor.id = Some(id);
        let descriptor = Arc::new(descriptor);
        self.by_name.insert(descriptor.name.clone(), id);
        self.entries.push(Arc::clone(&descriptor));
        tracing::trace!(id = id.0, name = %descriptor.name, range = descriptor.range, "descriptor registered");
        Ok(descriptor)
    }

    /// Deep copy of `base` under a new name and identity, edited then finalized.
    /// Linked sub-descriptors stay shared read-only with `base`.
    pub fn derive(
        &mut self,
        base: &BehaviorDescriptor,
        name: impl Into<String>,
        edit: impl FnOnce(&mut BehaviorDescriptor),
    ) -> Result<Arc<BehaviorDescriptor>, ContentError> {
        let mut copy = base.unfinalized_copy();
        copy.name = name.into();
        edit(&mut copy);
        self.register(copy)
    }

    /// Variant of `descriptor` that never inherits its owner's velocity.
    pub fn without_velocity_inheritance(
        &mut self,
        descriptor: &Arc<BehaviorDescriptor>,
    ) -> Result<Arc<BehaviorDescriptor>, ContentError> {
        if !descriptor.keep_velocity {
            return Ok(Arc::clone(descriptor));
        }
        let Some(id) = descriptor.id else {
            let mut copy = descriptor.unfinalized_copy();
            copy.keep_velocity = false;
            copy.finalize(self)?;
            return Ok(Arc::new(copy));
        };
        if let Some(variant) = self.frag_variants.get(&id) {
            return Ok(Arc::clone(variant));
        }
        let name = format!("{}~frag", descriptor.name);
        let variant = self.derive(descriptor, name, |d| d.keep_velocity = false)?;
        self.frag_variants.insert(id, Arc::clone(&variant));
        Ok(variant)
    }

    /// Built-in strike spawned at chain branch endpoints.
    pub fn chain_strike(&self, ground_only: bool) -> Option<Arc<BehaviorDescriptor>> {
        self.by_name(if ground_only {
            CHAIN_STRIKE_GROUND
        } else {
            CHAIN_STRIKE
        })
    }

    pub fn get(&self, id: DescriptorId) -> Option<&Arc<BehaviorDescriptor>> {
        self.entries.get(id.0 as usize)
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<BehaviorDescriptor>> {
        self.by_name
            .get(name)
            .and_then(|id| self.get(*id))
            .cloned()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<BehaviorDescriptor>> {
        self.entries.iter()
    }
}

impl Default for DescriptorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Near-stationary piercing strike that damages everything it overlaps once.
fn chain_strike_descriptor(name: &str, collides_air: bool) -> BehaviorDescriptor {
    BehaviorDescriptor {
        name: name.to_string(),
        speed: 0.0001,
        damage: 0.0,
        lifetime: CHAIN_STRIKE_LIFETIME,
        hit_size: CHAIN_STRIKE_HIT_SIZE,
        keep_velocity: false,
        back_move: false,
        collides_air,
        pierce: true,
        pierce_building: true,
        hittable: false,
        reflectable: false,
        absorbable: false,
        building_damage_multiplier: 0.25,
        status: StatusEffect::Shocked,
        status_duration: CHAIN_STRIKE_STATUS_DURATION,
        presentation: crate::descriptor::Presentation {
            light_color: Color::WHITE,
            ..Default::default()
        },
        ..Default::default()
    }
}
