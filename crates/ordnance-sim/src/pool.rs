//! Generational slot arena for projectiles.
//!
//! Released slots keep their projectile allocation; the next acquisition
//! resets it in place (trail, hit set, scratch state) before handing it out.
//! When no slot is free the arena grows.

use serde::{Deserialize, Serialize};

use crate::projectile::{Launch, Projectile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId {
    pub index: u32,
    pub generation: u32,
}

impl ProjectileId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Stable 64-bit value for seeding per-projectile randomness.
    pub fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }
}

impl std::fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}g{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    alive: bool,
    projectile: Option<Projectile>,
}

#[derive(Debug, Default)]
pub struct ProjectilePool {
    slots: Vec<Slot>,
    free_indices: Vec<u32>,
    live: usize,
    grown: usize,
}

impl ProjectilePool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_indices: Vec::new(),
            live: 0,
            grown: 0,
        }
    }

    /// Place a freshly launched projectile, reusing a released slot if any.
    pub fn acquire(&mut self, launch: Launch) -> ProjectileId {
        self.live += 1;
        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            slot.alive = true;
            let id = ProjectileId::new(index, slot.generation);
            match &mut slot.projectile {
                Some(projectile) => projectile.reset(id, launch),
                None => slot.projectile = Some(Projectile::new(id, launch)),
            }
            return id;
        }

        if self.slots.len() == self.slots.capacity() {
            self.grown += 1;
        }
        let index = self.slots.len() as u32;
        let id = ProjectileId::new(index, 0);
        self.slots.push(Slot {
            generation: 0,
            alive: true,
            projectile: Some(Projectile::new(id, launch)),
        });
        id
    }

    /// Mark a slot free. Returns false for stale or unknown ids.
    pub fn release(&mut self, id: ProjectileId) -> bool {
        match self.slots.get_mut(id.index as usize) {
            Some(slot) if slot.alive && slot.generation == id.generation => {
                slot.alive = false;
                self.free_indices.push(id.index);
                self.live -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_alive(&self, id: ProjectileId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.alive && s.generation == id.generation)
            .and_then(|s| s.projectile.as_ref())
    }

    pub fn get_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.alive && s.generation == id.generation)
            .and_then(|s| s.projectile.as_mut())
    }

    /// Live ids in slot order.
    pub fn live_ids(&self) -> Vec<ProjectileId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.alive)
            .map(|(i, s)| ProjectileId::new(i as u32, s.generation))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.slots
            .iter()
            .filter(|s| s.alive)
            .filter_map(|s| s.projectile.as_ref())
    }

    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of slots ever created.
    pub fn slots(&self) -> usize {
        self.slots.len()
    }

    /// Times an acquisition had to grow past the reserved capacity.
    pub fn grown(&self) -> usize {
        self.grown
    }
}
