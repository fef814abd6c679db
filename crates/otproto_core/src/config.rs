//! Protocol-level configuration and deck constants.

use serde_json::{Map, Value};

/// Default protocol schema version written to `protocol-schema`.
pub const DEFAULT_PROTOCOL_SCHEMA: &str = "1.0.0";
/// Default robot model written to `robot.model`.
pub const DEFAULT_ROBOT_MODEL: &str = "OT-2 Standard";

/// Standard deck slots in deck order.
pub const DECK_SLOTS: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12",
];

/// Catalog model of the trash provisioned with every protocol.
pub const TRASH_MODEL: &str = "fixed-trash";
/// Slot reserved for the trash.
pub const TRASH_SLOT: &str = "12";
pub const TRASH_DISPLAY_NAME: &str = "Trash";

/// Display name given to tip racks loaded on demand by a pipette.
pub const AUTO_TIP_RACK_DISPLAY_NAME: &str = "Auto-generated-tip-rack";

/// Static fields of the exported document.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolConfig {
    pub protocol_schema: String,
    pub robot_model: String,
    /// Free-form designer application block.
    pub designer_application: Map<String, Value>,
    /// Free-form protocol metadata (name, author, description, ...).
    pub metadata: Map<String, Value>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            protocol_schema: DEFAULT_PROTOCOL_SCHEMA.to_string(),
            robot_model: DEFAULT_ROBOT_MODEL.to_string(),
            designer_application: Map::new(),
            metadata: Map::new(),
        }
    }
}

impl ProtocolConfig {
    /// Adds one metadata entry, replacing any previous value for `key`.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
