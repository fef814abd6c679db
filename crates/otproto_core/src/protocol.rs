//! Protocol aggregate root.
//!
//! # Responsibility
//! - Compose the labware, instrument and command registries.
//! - Provision the fixed trash on construction.
//! - Assemble the exported protocol document.
//!
//! # Invariants
//! - The trash is always the first labware item, in its reserved slot.
//! - Export is read-only; it never mutates any registry.

use crate::catalog::LabwareCatalog;
use crate::config::{ProtocolConfig, TRASH_DISPLAY_NAME, TRASH_MODEL, TRASH_SLOT};
use crate::document::{ProtocolDocument, RobotDescriptor, Subprocedure};
use crate::error::BuildResult;
use crate::model::instrument::{InstrumentHandle, PipetteModel};
use crate::model::labware::{LabwareHandle, WellRef, WellSelector};
use crate::registry::command_registry::CommandRegistry;
use crate::registry::instrument_registry::{InstrumentRegistry, PipetteConfig};
use crate::registry::labware_registry::LabwareRegistry;
use crate::service::pipette::Pipette;
use std::sync::Arc;

/// In-memory protocol under construction.
///
/// Not synchronized: build one protocol per thread.
#[derive(Debug)]
pub struct Protocol {
    config: ProtocolConfig,
    labware: LabwareRegistry,
    instruments: InstrumentRegistry,
    commands: CommandRegistry,
    trash: LabwareHandle,
}

impl Protocol {
    /// Creates a protocol backed by the builtin labware catalog.
    pub fn new() -> BuildResult<Self> {
        Self::with_catalog(LabwareCatalog::builtin()?, ProtocolConfig::default())
    }

    /// Creates a protocol with a caller-supplied catalog and document fields.
    ///
    /// # Errors
    /// - `UnknownLabware` when `catalog` lacks the trash definition.
    pub fn with_catalog(catalog: Arc<LabwareCatalog>, config: ProtocolConfig) -> BuildResult<Self> {
        let mut labware = LabwareRegistry::new(catalog);
        let trash = labware.load(TRASH_MODEL, TRASH_SLOT, TRASH_DISPLAY_NAME)?;
        Ok(Self {
            config,
            labware,
            instruments: InstrumentRegistry::new(),
            commands: CommandRegistry::new(),
            trash,
        })
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ProtocolConfig {
        &mut self.config
    }

    pub fn labware(&self) -> &LabwareRegistry {
        &self.labware
    }

    pub fn labware_mut(&mut self) -> &mut LabwareRegistry {
        &mut self.labware
    }

    pub fn instruments(&self) -> &InstrumentRegistry {
        &self.instruments
    }

    pub(crate) fn instruments_mut(&mut self) -> &mut InstrumentRegistry {
        &mut self.instruments
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub(crate) fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    pub fn trash(&self) -> LabwareHandle {
        self.trash
    }

    /// First well of the trash, the default drop-tip target.
    pub fn trash_well(&self) -> BuildResult<WellRef> {
        self.labware.item(self.trash)?.wells(0)
    }

    /// Places labware; see [`LabwareRegistry::load`].
    pub fn load_labware(
        &mut self,
        model: &str,
        slot: &str,
        display_name: &str,
    ) -> BuildResult<LabwareHandle> {
        self.labware.load(model, slot, display_name)
    }

    /// Resolves a well of a placed labware item.
    pub fn well(
        &self,
        labware: LabwareHandle,
        selector: impl Into<WellSelector>,
    ) -> BuildResult<WellRef> {
        self.labware.item(labware)?.wells(selector)
    }

    /// Mounts a pipette; see [`InstrumentRegistry::add_pipette`].
    pub fn add_pipette(
        &mut self,
        model: PipetteModel,
        config: PipetteConfig,
    ) -> BuildResult<InstrumentHandle> {
        self.instruments.add_pipette(model, config, &self.labware)
    }

    /// Command-issuing handle for a mounted pipette.
    pub fn pipette(&mut self, handle: InstrumentHandle) -> BuildResult<Pipette<'_>> {
        self.instruments.item(handle)?;
        Ok(Pipette::new(self, handle))
    }

    pub fn to_document(&self) -> ProtocolDocument {
        ProtocolDocument {
            protocol_schema: self.config.protocol_schema.clone(),
            robot: RobotDescriptor {
                model: self.config.robot_model.clone(),
            },
            designer_application: self.config.designer_application.clone(),
            metadata: self.config.metadata.clone(),
            labware: self.labware.to_document(),
            pipettes: self.instruments.to_document(),
            procedure: vec![Subprocedure {
                subprocedure: self.commands.to_document(),
            }],
        }
    }

    /// Pretty-printed JSON of [`to_document`](Self::to_document).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_document())
    }
}
