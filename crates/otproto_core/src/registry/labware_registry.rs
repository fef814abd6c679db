//! Labware registry.
//!
//! # Invariants
//! - At most one item per slot, and only standard deck slots are accepted.
//! - Handles issued by another registry never resolve here.
//! - `identities[handle]` and `by_identity[identity]` are always mutual inverses.

use crate::catalog::LabwareCatalog;
use crate::config::DECK_SLOTS;
use crate::document::{LabwareRecord, RecordMap};
use crate::error::{BuildError, BuildResult};
use crate::model::labware::{LabwareHandle, LabwareItem};
use crate::registry::{generate_identity, next_registry_id};
use log::info;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Owns every labware item placed on the deck.
#[derive(Debug)]
pub struct LabwareRegistry {
    id: u64,
    catalog: Arc<LabwareCatalog>,
    items: Vec<LabwareItem>,
    identities: Vec<String>,
    by_identity: HashMap<String, LabwareHandle>,
    by_slot: BTreeMap<String, LabwareHandle>,
}

impl LabwareRegistry {
    pub fn new(catalog: Arc<LabwareCatalog>) -> Self {
        Self {
            id: next_registry_id(),
            catalog,
            items: Vec::new(),
            identities: Vec::new(),
            by_identity: HashMap::new(),
            by_slot: BTreeMap::new(),
        }
    }

    pub fn catalog(&self) -> &LabwareCatalog {
        &self.catalog
    }

    /// Places a catalog model into `slot`.
    ///
    /// # Errors
    /// - `InvalidSlot` when `slot` is not one of the deck slots.
    /// - `SlotOccupied` when `slot` already holds an item.
    /// - `UnknownLabware` when the catalog has no `model` definition.
    ///
    /// The registry is left untouched on error.
    pub fn load(&mut self, model: &str, slot: &str, display_name: &str) -> BuildResult<LabwareHandle> {
        if !DECK_SLOTS.contains(&slot) {
            return Err(BuildError::InvalidSlot(slot.to_string()));
        }
        if let Some(occupant) = self.by_slot.get(slot) {
            return Err(BuildError::SlotOccupied {
                slot: slot.to_string(),
                occupant: self.identities[occupant.index].clone(),
            });
        }

        let definition = self
            .catalog
            .get(model)
            .ok_or_else(|| BuildError::UnknownLabware(model.to_string()))?;

        let prefix = if display_name.is_empty() {
            definition.name.as_str()
        } else {
            display_name
        };
        let identity = generate_identity(prefix, |candidate| {
            self.by_identity.contains_key(candidate)
        });

        let handle = LabwareHandle::new(self.id, self.items.len());
        self.items
            .push(LabwareItem::new(handle, definition, slot, display_name));
        self.identities.push(identity.clone());
        self.by_identity.insert(identity.clone(), handle);
        self.by_slot.insert(slot.to_string(), handle);

        info!(
            "event=labware_load module=labware status=ok id={} model={} slot={}",
            identity, model, slot
        );
        Ok(handle)
    }

    pub fn get(&self, handle: LabwareHandle) -> Option<&LabwareItem> {
        self.items.get(self.index_of(handle)?)
    }

    pub fn get_mut(&mut self, handle: LabwareHandle) -> Option<&mut LabwareItem> {
        let index = self.index_of(handle)?;
        self.items.get_mut(index)
    }

    /// Like [`get`](Self::get), but reports a foreign handle as `UnknownEntity`.
    pub fn item(&self, handle: LabwareHandle) -> BuildResult<&LabwareItem> {
        self.get(handle)
            .ok_or_else(|| BuildError::UnknownEntity(handle.to_string()))
    }

    pub(crate) fn item_mut(&mut self, handle: LabwareHandle) -> BuildResult<&mut LabwareItem> {
        self.get_mut(handle)
            .ok_or_else(|| BuildError::UnknownEntity(handle.to_string()))
    }

    /// Exported identity of `handle`.
    pub fn identity(&self, handle: LabwareHandle) -> Option<&str> {
        self.identities
            .get(self.index_of(handle)?)
            .map(String::as_str)
    }

    /// Handle registered under an exported identity.
    pub fn find(&self, identity: &str) -> Option<LabwareHandle> {
        self.by_identity.get(identity).copied()
    }

    /// Item currently placed in `slot`.
    pub fn in_slot(&self, slot: &str) -> Option<LabwareHandle> {
        self.by_slot.get(slot).copied()
    }

    /// Standard deck slots without an item, in deck order.
    pub fn free_slots(&self) -> Vec<&'static str> {
        DECK_SLOTS
            .iter()
            .copied()
            .filter(|slot| !self.by_slot.contains_key(*slot))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    fn index_of(&self, handle: LabwareHandle) -> Option<usize> {
        (handle.registry == self.id).then_some(handle.index)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in load order.
    pub fn iter(&self) -> impl Iterator<Item = &LabwareItem> + '_ {
        self.items.iter()
    }

    /// `identity -> {model, slot, display-name}` in load order.
    pub fn to_document(&self) -> RecordMap<LabwareRecord> {
        RecordMap::new(
            self.items
                .iter()
                .zip(&self.identities)
                .map(|(item, identity)| {
                    (
                        identity.clone(),
                        LabwareRecord {
                            model: item.model().to_string(),
                            slot: item.slot().to_string(),
                            display_name: item.display_name().to_string(),
                        },
                    )
                })
                .collect(),
        )
    }
}
