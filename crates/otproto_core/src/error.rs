//! Builder error taxonomy.
//!
//! # Invariants
//! - Every variant is a construction-time validation failure.
//! - A failed call leaves all registries exactly as they were before it.

use crate::catalog::CatalogError;
use crate::model::instrument::Mount;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BuildResult<T> = Result<T, BuildError>;

/// Error returned by labware, instrument and pipette operations.
#[derive(Debug)]
pub enum BuildError {
    /// Slot name is not one of the deck slots.
    InvalidSlot(String),
    /// Target deck slot already holds a labware item.
    SlotOccupied { slot: String, occupant: String },
    /// Target mount already holds a pipette.
    MountOccupied { mount: Mount, occupant: String },
    /// No catalog definition matches the requested model.
    UnknownLabware(String),
    /// Ordinal well selector is negative.
    InvalidSelector(String),
    /// Selector is well-formed but addresses no well of the labware.
    WellNotFound { labware: String, selector: String },
    /// No fully usable tip remains and auto-provisioning did not help.
    OutOfTips { pipette: String },
    /// Handle does not belong to this protocol.
    UnknownEntity(String),
    Catalog(CatalogError),
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSlot(slot) => write!(f, "`{slot}` is not a deck slot"),
            Self::SlotOccupied { slot, occupant } => {
                write!(f, "slot {slot} is already occupied by `{occupant}`")
            }
            Self::MountOccupied { mount, occupant } => {
                write!(f, "mount {mount} is already occupied by `{occupant}`")
            }
            Self::UnknownLabware(model) => write!(f, "unknown labware model: {model}"),
            Self::InvalidSelector(selector) => write!(f, "invalid well selector: {selector}"),
            Self::WellNotFound { labware, selector } => {
                write!(f, "well `{selector}` not found in labware `{labware}`")
            }
            Self::OutOfTips { pipette } => {
                write!(f, "pipette `{pipette}` is out of tips and no tip location was given")
            }
            Self::UnknownEntity(value) => write!(f, "unknown entity: {value}"),
            Self::Catalog(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CatalogError> for BuildError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}
