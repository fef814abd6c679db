//! Exported protocol document shapes.
//!
//! Field names here are the external contract consumed by the execution
//! runtime and must not be renamed.

use crate::model::command::Command;
use crate::model::instrument::{Mount, PipetteModel};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

/// Identity-keyed records, serialized as a JSON object in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> RecordMap<T> {
    pub(crate) fn new(entries: Vec<(String, T)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, identity: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(key, _)| key == identity)
            .map(|(_, record)| record)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.entries
            .iter()
            .map(|(key, record)| (key.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Serialize> Serialize for RecordMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, record) in &self.entries {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabwareRecord {
    pub model: String,
    pub slot: String,
    #[serde(rename = "display-name")]
    pub display_name: String,
}

/// Exported instrument record. Tip-rack assignments stay internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipetteRecord {
    pub mount: Mount,
    pub model: PipetteModel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotDescriptor {
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subprocedure {
    pub subprocedure: Vec<Command>,
}

/// Whole-protocol document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolDocument {
    #[serde(rename = "protocol-schema")]
    pub protocol_schema: String,
    pub robot: RobotDescriptor,
    pub designer_application: Map<String, Value>,
    pub metadata: Map<String, Value>,
    pub labware: RecordMap<LabwareRecord>,
    pub pipettes: RecordMap<PipetteRecord>,
    pub procedure: Vec<Subprocedure>,
}

impl ProtocolDocument {
    /// Commands of the single procedure step, in execution order.
    pub fn commands(&self) -> &[Command] {
        self.procedure
            .first()
            .map(|step| step.subprocedure.as_slice())
            .unwrap_or_default()
    }
}
