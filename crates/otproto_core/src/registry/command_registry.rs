//! Append-only command timeline and reference resolution.

use crate::error::{BuildError, BuildResult};
use crate::model::command::{Command, ResolvedTarget};
use crate::model::instrument::InstrumentHandle;
use crate::model::labware::Location;
use crate::registry::instrument_registry::InstrumentRegistry;
use crate::registry::labware_registry::LabwareRegistry;
use log::debug;

/// Ordered command history. Order is execution order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one command and returns it.
    pub fn append(&mut self, command: Command) -> &Command {
        debug!(
            "event=command_append module=command status=ok index={} kind={}",
            self.commands.len(),
            command.kind()
        );
        self.commands.push(command);
        &self.commands[self.commands.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    pub fn last(&self) -> Option<&Command> {
        self.commands.last()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> + '_ {
        self.commands.iter()
    }

    /// Commands in append order.
    pub fn to_document(&self) -> Vec<Command> {
        self.commands.clone()
    }
}

/// Freezes a pipette + location into exported identities.
///
/// Lookups go through the registries' handle -> identity indexes.
pub(crate) fn resolve_target(
    instruments: &InstrumentRegistry,
    labware: &LabwareRegistry,
    pipette: InstrumentHandle,
    location: &Location,
) -> BuildResult<ResolvedTarget> {
    let pipette_id = instruments
        .identity(pipette)
        .ok_or_else(|| BuildError::UnknownEntity(pipette.to_string()))?;
    let handle = location.well.labware;
    let labware_id = labware
        .identity(handle)
        .ok_or_else(|| BuildError::UnknownEntity(handle.to_string()))?;
    let well = labware
        .item(handle)?
        .well(location.well)
        .ok_or_else(|| BuildError::WellNotFound {
            labware: labware_id.to_string(),
            selector: format!("column {} row {}", location.well.column, location.well.row),
        })?;

    Ok(ResolvedTarget {
        pipette: pipette_id.to_string(),
        labware: labware_id.to_string(),
        well: well.label().to_string(),
        position: location.position,
    })
}
