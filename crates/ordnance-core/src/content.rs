//! JSON content packs.
//!
//! A pack is `{ "descriptors": [ ... ] }`. Descriptors may reference each other
//! by name in any order; they are registered dependencies-first. Unknown names
//! and reference cycles are rejected here so the engine never sees them.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::descriptor::BehaviorDescriptor;
use crate::error::ContentError;
use crate::registry::DescriptorRegistry;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentPack {
    pub descriptors: Vec<BehaviorDescriptor>,
}

impl ContentPack {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Register every descriptor of the pack, returning them in pack order.
    pub fn load_into(
        &self,
        registry: &mut DescriptorRegistry,
    ) -> Result<Vec<Arc<BehaviorDescriptor>>, ContentError> {
        let mut index = HashMap::new();
        for (i, descriptor) in self.descriptors.iter().enumerate() {
            if index.insert(descriptor.name.as_str(), i).is_some()
                || registry.contains_name(&descriptor.name)
            {
                return Err(ContentError::DuplicateName(descriptor.name.clone()));
            }
            if descriptor.speed < 0.0 || descriptor.lifetime < 0.0 {
                tracing::warn!(
                    name = %descriptor.name,
                    speed = descriptor.speed,
                    lifetime = descriptor.lifetime,
                    "negative speed or lifetime accepted as-is"
                );
            }
        }

        let mut loader = Loader {
            pack: self,
            index,
            state: vec![Visit::Pending; self.descriptors.len()],
            stack: Vec::new(),
        };
        for i in 0..self.descriptors.len() {
            loader.visit(i, registry)?;
        }

        Ok(self
            .descriptors
            .iter()
            .filter_map(|d| registry.by_name(&d.name))
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Pending,
    InProgress,
    Done,
}

struct Loader<'a> {
    pack: &'a ContentPack,
    index: HashMap<&'a str, usize>,
    state: Vec<Visit>,
    stack: Vec<usize>,
}

impl<'a> Loader<'a> {
    fn visit(&mut self, i: usize, registry: &mut DescriptorRegistry) -> Result<(), ContentError> {
        match self.state[i] {
            Visit::Done => return Ok(()),
            Visit::InProgress => {
                let start = self.stack.iter().position(|&s| s == i).unwrap_or(0);
                let mut cycle: Vec<String> = self.stack[start..]
                    .iter()
                    .map(|&s| self.pack.descriptors[s].name.clone())
                    .collect();
                cycle.push(self.pack.descriptors[i].name.clone());
                return Err(ContentError::CyclicReference(cycle));
            }
            Visit::Pending => {}
        }

        self.state[i] = Visit::InProgress;
        self.stack.push(i);
        let pack = self.pack;
        let descriptor = &pack.descriptors[i];
        for dep in references(descriptor) {
            if let Some(&j) = self.index.get(dep) {
                self.visit(j, registry)?;
            } else if !registry.contains_name(dep) {
                return Err(ContentError::UnknownReference {
                    from: descriptor.name.clone(),
                    to: dep.to_string(),
                });
            }
        }
        self.stack.pop();

        registry.register(descriptor.clone())?;
        self.state[i] = Visit::Done;
        Ok(())
    }
}

/// Names of every descriptor `descriptor` links to.
fn references(descriptor: &BehaviorDescriptor) -> Vec<&str> {
    let mut names = Vec::new();
    if let Some(frag) = &descriptor.frag {
        names.push(frag.bullet.name());
    }
    if let Some(strike) = descriptor.chain.as_ref().and_then(|c| c.strike.as_ref()) {
        names.push(strike.name());
    }
    names.extend(descriptor.spawn_bullets.iter().map(|l| l.name()));
    names
}
