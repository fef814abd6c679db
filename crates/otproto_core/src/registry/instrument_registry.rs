//! Instrument registry.
//!
//! # Invariants
//! - At most one pipette per mount.
//! - Assigned tip racks always reference labware in the same protocol.
//! - Handles issued by another registry never resolve here.

use crate::document::{PipetteRecord, RecordMap};
use crate::error::{BuildError, BuildResult};
use crate::model::instrument::{InstrumentHandle, InstrumentItem, Mount, PipetteModel};
use crate::model::labware::LabwareHandle;
use crate::registry::{generate_identity, next_registry_id};
use crate::registry::labware_registry::LabwareRegistry;
use log::{info, warn};
use std::collections::{BTreeMap, HashMap};

/// Request model for provisioning one pipette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipetteConfig {
    pub mount: Mount,
    /// Tip racks scanned in this order when no pickup location is given.
    pub tip_racks: Vec<LabwareHandle>,
    /// Labware model loaded automatically once the racks are exhausted.
    pub tip_model: Option<String>,
}

impl Default for PipetteConfig {
    fn default() -> Self {
        Self {
            mount: Mount::Left,
            tip_racks: Vec::new(),
            tip_model: None,
        }
    }
}

impl PipetteConfig {
    pub fn on(mount: Mount) -> Self {
        Self {
            mount,
            ..Self::default()
        }
    }

    pub fn with_tip_racks(mut self, racks: impl IntoIterator<Item = LabwareHandle>) -> Self {
        self.tip_racks.extend(racks);
        self
    }

    pub fn with_tip_model(mut self, model: impl Into<String>) -> Self {
        self.tip_model = Some(model.into());
        self
    }
}

/// Owns every pipette mounted on the robot.
#[derive(Debug)]
pub struct InstrumentRegistry {
    id: u64,
    items: Vec<InstrumentItem>,
    identities: Vec<String>,
    by_identity: HashMap<String, InstrumentHandle>,
    by_mount: BTreeMap<Mount, InstrumentHandle>,
}

impl Default for InstrumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self {
            id: next_registry_id(),
            items: Vec::new(),
            identities: Vec::new(),
            by_identity: HashMap::new(),
            by_mount: BTreeMap::new(),
        }
    }

    /// Mounts a pipette of `model`.
    ///
    /// Single- or multi-channel behavior follows the model's channel layout.
    ///
    /// # Errors
    /// - `MountOccupied` when `config.mount` already holds a pipette.
    /// - `UnknownEntity` when a tip rack handle is not in `labware`.
    pub fn add_pipette(
        &mut self,
        model: PipetteModel,
        config: PipetteConfig,
        labware: &LabwareRegistry,
    ) -> BuildResult<InstrumentHandle> {
        if let Some(occupant) = self.by_mount.get(&config.mount) {
            return Err(BuildError::MountOccupied {
                mount: config.mount,
                occupant: self.identities[occupant.index].clone(),
            });
        }

        for rack in &config.tip_racks {
            let item = labware.item(*rack)?;
            if !item.definition().is_tiprack {
                warn!(
                    "event=pipette_add module=instrument status=warn reason=not_a_tip_rack model={} rack_model={}",
                    model,
                    item.model()
                );
            }
        }

        let identity = generate_identity(model.as_str(), |candidate| {
            self.by_identity.contains_key(candidate)
        });

        let handle = InstrumentHandle::new(self.id, self.items.len());
        self.items.push(InstrumentItem::new(
            handle,
            model,
            config.mount,
            config.tip_racks,
            config.tip_model,
        ));
        self.identities.push(identity.clone());
        self.by_identity.insert(identity.clone(), handle);
        self.by_mount.insert(config.mount, handle);

        info!(
            "event=pipette_add module=instrument status=ok id={} model={} mount={}",
            identity, model, config.mount
        );
        Ok(handle)
    }

    pub fn get(&self, handle: InstrumentHandle) -> Option<&InstrumentItem> {
        self.items.get(self.index_of(handle)?)
    }

    pub fn item(&self, handle: InstrumentHandle) -> BuildResult<&InstrumentItem> {
        self.get(handle)
            .ok_or_else(|| BuildError::UnknownEntity(handle.to_string()))
    }

    pub(crate) fn item_mut(&mut self, handle: InstrumentHandle) -> BuildResult<&mut InstrumentItem> {
        let index = self
            .index_of(handle)
            .ok_or_else(|| BuildError::UnknownEntity(handle.to_string()))?;
        self.items
            .get_mut(index)
            .ok_or_else(|| BuildError::UnknownEntity(handle.to_string()))
    }

    pub fn identity(&self, handle: InstrumentHandle) -> Option<&str> {
        self.identities
            .get(self.index_of(handle)?)
            .map(String::as_str)
    }

    pub fn find(&self, identity: &str) -> Option<InstrumentHandle> {
        self.by_identity.get(identity).copied()
    }

    pub fn on_mount(&self, mount: Mount) -> Option<InstrumentHandle> {
        self.by_mount.get(&mount).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    fn index_of(&self, handle: InstrumentHandle) -> Option<usize> {
        (handle.registry == self.id).then_some(handle.index)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrumentItem> + '_ {
        self.items.iter()
    }

    /// `identity -> {mount, model}` in creation order.
    pub fn to_document(&self) -> RecordMap<PipetteRecord> {
        RecordMap::new(
            self.items
                .iter()
                .zip(&self.identities)
                .map(|(item, identity)| {
                    (
                        identity.clone(),
                        PipetteRecord {
                            mount: item.mount(),
                            model: item.model(),
                        },
                    )
                })
                .collect(),
        )
    }
}
