//! In-memory builder for liquid-handling robot protocols.
//!
//! Callers place labware, mount pipettes and issue pipetting commands on a
//! [`Protocol`], then export the whole graph as one JSON document.

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod model;
pub mod protocol;
pub mod registry;
pub mod service;

pub use catalog::{CatalogError, LabwareCatalog, LabwareDefinition};
pub use config::ProtocolConfig;
pub use document::{LabwareRecord, PipetteRecord, ProtocolDocument, RecordMap};
pub use error::{BuildError, BuildResult};
pub use logging::{default_log_level, init_logging, logging_status, LogDestination};
pub use model::command::{Command, CommandKind, CommandParams, DelayParams, PipettingParams};
pub use model::instrument::{ChannelLayout, InstrumentHandle, InstrumentItem, Mount, PipetteModel};
pub use model::labware::{
    Anchor, LabwareHandle, LabwareItem, Location, Position, Well, WellRef, WellSelector,
};
pub use protocol::Protocol;
pub use registry::command_registry::CommandRegistry;
pub use registry::instrument_registry::{InstrumentRegistry, PipetteConfig};
pub use registry::labware_registry::LabwareRegistry;
pub use service::pipette::Pipette;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
