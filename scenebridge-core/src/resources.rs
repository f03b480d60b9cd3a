//! External resource id allocation
//!
//! New resources take the lowest positive id that is free, so merging into a
//! file with gaps in its ids fills the gaps before growing the range. A locator
//! that already has a resource keeps its id, including a string id such as
//! `1_r4l0k` written by newer editors.

use std::collections::BTreeSet;

use crate::document::{ExternalResource, SceneDocument};
use crate::grammar::FormatGrammar;

/// Result of asking for a resource id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub id: u32,
    /// Id token that references must use
    pub key: String,
    /// The locator already had an id; no new block is needed
    pub existing: bool,
}

/// Smallest positive integer not in `used`
pub fn lowest_free_id(used: &BTreeSet<u32>) -> u32 {
    let mut candidate = 1;
    for id in used.range(1..) {
        if *id != candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}

impl SceneDocument {
    /// Get the id for `locator`, reserving a new one if needed
    ///
    /// Repeated calls with the same locator return the same id. A fresh id is
    /// reserved immediately so a different locator cannot receive it.
    pub fn allocate_resource(&mut self, locator: &str) -> Allocation {
        if let Some(resource) = self.find_resource_by_locator(locator) {
            return Allocation {
                id: resource.id,
                key: resource.key.clone(),
                existing: true,
            };
        }
        if let Some(id) = self.reserved.get(locator) {
            return Allocation {
                id: *id,
                key: id.to_string(),
                existing: false,
            };
        }

        let used: BTreeSet<u32> = self
            .resources
            .values()
            .map(|r| r.id)
            .chain(self.reserved.values().copied())
            .collect();
        let id = lowest_free_id(&used);
        self.reserved.insert(locator.to_string(), id);
        tracing::debug!(id, locator, "Allocated resource id");

        Allocation {
            id,
            key: id.to_string(),
            existing: false,
        }
    }

    /// Get the id token of a texture resource, adding its block when it is new
    pub fn add_texture_resource(&mut self, locator: &str, grammar: &FormatGrammar) -> String {
        let allocation = self.allocate_resource(locator);
        if !allocation.existing {
            self.insert_resource(ExternalResource {
                id: allocation.id,
                key: allocation.key.clone(),
                locator: locator.to_string(),
                text: format!(
                    "[ext_resource path=\"{}\" type=\"{}\" id={}]\n",
                    locator,
                    grammar.texture_type,
                    grammar.resource_id_value(&allocation.key)
                ),
            });
        }
        allocation.key
    }
}
