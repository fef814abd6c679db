//! Timeline command model.
//!
//! # Invariants
//! - Parameters hold exported identities and literal values only, never handles.
//! - A command is immutable once built.

use crate::model::labware::Position;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Fixed set of command kinds understood by the execution runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    Aspirate,
    Dispense,
    AirGap,
    PickUpTip,
    DropTip,
    TouchTip,
    #[serde(rename = "blowout")]
    BlowOut,
    Delay,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aspirate => "aspirate",
            Self::Dispense => "dispense",
            Self::AirGap => "air-gap",
            Self::PickUpTip => "pick-up-tip",
            Self::DropTip => "drop-tip",
            Self::TouchTip => "touch-tip",
            Self::BlowOut => "blowout",
            Self::Delay => "delay",
        }
    }

    /// Whether the kind carries a `volume` parameter.
    pub fn takes_volume(self) -> bool {
        matches!(self, Self::Aspirate | Self::Dispense | Self::AirGap)
    }
}

impl Display for CommandKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A location resolved against the registries at command creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    pub pipette: String,
    pub labware: String,
    pub well: String,
    pub position: Option<Position>,
}

/// Parameters of a pipette-bound command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipettingParams {
    pub pipette: String,
    pub labware: String,
    pub well: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelayParams {
    pub wait: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandParams {
    Pipetting(PipettingParams),
    Delay(DelayParams),
}

/// One timeline entry, serialized as `{"command": kind, "params": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    command: CommandKind,
    params: CommandParams,
}

impl Command {
    /// Builds a pipette-bound command. `volume` is kept only for kinds that take one.
    pub fn pipetting(kind: CommandKind, target: ResolvedTarget, volume: Option<f64>) -> Self {
        Self {
            command: kind,
            params: CommandParams::Pipetting(PipettingParams {
                pipette: target.pipette,
                labware: target.labware,
                well: target.well,
                position: target.position,
                volume: volume.filter(|_| kind.takes_volume()),
            }),
        }
    }

    pub fn delay(wait: f64, message: impl Into<String>) -> Self {
        Self {
            command: CommandKind::Delay,
            params: CommandParams::Delay(DelayParams {
                wait,
                message: message.into(),
            }),
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.command
    }

    pub fn params(&self) -> &CommandParams {
        &self.params
    }

    /// Pipetting parameters, `None` for `delay`.
    pub fn pipetting_params(&self) -> Option<&PipettingParams> {
        match &self.params {
            CommandParams::Pipetting(params) => Some(params),
            CommandParams::Delay(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, CommandKind, ResolvedTarget};
    use crate::model::labware::{Anchor, Position};
    use serde_json::json;

    fn target(position: Option<Position>) -> ResolvedTarget {
        ResolvedTarget {
            pipette: "p10_single_v1-0a1b2c3d".to_string(),
            labware: "plate-deadbeef".to_string(),
            well: "A1".to_string(),
            position,
        }
    }

    #[test]
    fn volume_command_serializes_expected_keys_in_order() {
        let command = Command::pipetting(
            CommandKind::Aspirate,
            target(Some(Position::new(Anchor::Top, 2.0))),
            Some(10.0),
        );
        let text = serde_json::to_string(&command).expect("command serializes");
        assert_eq!(
            text,
            r#"{"command":"aspirate","params":{"pipette":"p10_single_v1-0a1b2c3d","labware":"plate-deadbeef","well":"A1","position":{"anchor":"top","offset":{"z":2.0}},"volume":10.0}}"#
        );
    }

    #[test]
    fn tip_command_omits_volume_and_bare_position() {
        let command = Command::pipetting(CommandKind::DropTip, target(None), Some(5.0));
        let value = serde_json::to_value(&command).expect("command serializes");
        assert_eq!(
            value,
            json!({
                "command": "drop-tip",
                "params": {
                    "pipette": "p10_single_v1-0a1b2c3d",
                    "labware": "plate-deadbeef",
                    "well": "A1"
                }
            })
        );
    }

    #[test]
    fn delay_carries_wait_and_message_only() {
        let value = serde_json::to_value(Command::delay(30.0, "settle")).expect("delay serializes");
        assert_eq!(
            value,
            json!({"command": "delay", "params": {"wait": 30.0, "message": "settle"}})
        );
    }

    #[test]
    fn kind_names_match_wire_names() {
        for kind in [
            CommandKind::Aspirate,
            CommandKind::Dispense,
            CommandKind::AirGap,
            CommandKind::PickUpTip,
            CommandKind::DropTip,
            CommandKind::TouchTip,
            CommandKind::BlowOut,
            CommandKind::Delay,
        ] {
            assert_eq!(
                serde_json::to_value(kind).expect("kind serializes"),
                kind.as_str()
            );
        }
    }
}
