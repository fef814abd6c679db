//! Pipette instrument model.
//!
//! # Invariants
//! - `tip_racks` is append-only; auto-provisioned racks are pushed to the end.
//! - Channel layout is fixed by the model and never changes.

use crate::model::labware::LabwareHandle;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Arena index of an instrument, tagged with the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrumentHandle {
    pub(crate) registry: u64,
    pub(crate) index: usize,
}

impl InstrumentHandle {
    pub(crate) fn new(registry: u64, index: usize) -> Self {
        Self { registry, index }
    }
}

impl Display for InstrumentHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "instrument#{}@registry{}", self.index, self.registry)
    }
}

/// Physical attachment point on the robot gantry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mount {
    Left,
    Right,
}

impl Mount {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl Display for Mount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Head geometry of a pipette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// One nozzle; consumes one tip per pickup.
    Single,
    /// A full column of nozzles; consumes a whole tip-rack column per pickup.
    Multi,
}

/// Supported pipette models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PipetteModel {
    #[serde(rename = "p10_single_v1")]
    P10Single,
    #[serde(rename = "p10_multi_v1")]
    P10Multi,
    #[serde(rename = "p50_single_v1")]
    P50Single,
    #[serde(rename = "p50_multi_v1")]
    P50Multi,
    #[serde(rename = "p300_single_v1")]
    P300Single,
    #[serde(rename = "p300_multi_v1")]
    P300Multi,
    #[serde(rename = "p1000_single_v1")]
    P1000Single,
    #[serde(rename = "p1000_multi_v1")]
    P1000Multi,
}

const ALL_PIPETTE_MODELS: &[PipetteModel] = &[
    PipetteModel::P10Single,
    PipetteModel::P10Multi,
    PipetteModel::P50Single,
    PipetteModel::P50Multi,
    PipetteModel::P300Single,
    PipetteModel::P300Multi,
    PipetteModel::P1000Single,
    PipetteModel::P1000Multi,
];

impl PipetteModel {
    pub fn all() -> &'static [PipetteModel] {
        ALL_PIPETTE_MODELS
    }

    /// Model identifier as exported in the `pipettes` section.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::P10Single => "p10_single_v1",
            Self::P10Multi => "p10_multi_v1",
            Self::P50Single => "p50_single_v1",
            Self::P50Multi => "p50_multi_v1",
            Self::P300Single => "p300_single_v1",
            Self::P300Multi => "p300_multi_v1",
            Self::P1000Single => "p1000_single_v1",
            Self::P1000Multi => "p1000_multi_v1",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim();
        Self::all()
            .iter()
            .copied()
            .find(|model| model.as_str() == normalized)
    }

    pub fn is_multi_channel(self) -> bool {
        self.as_str().contains("multi")
    }

    pub fn layout(self) -> ChannelLayout {
        if self.is_multi_channel() {
            ChannelLayout::Multi
        } else {
            ChannelLayout::Single
        }
    }
}

impl Display for PipetteModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipette mounted on the robot, with its tip-rack bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentItem {
    handle: InstrumentHandle,
    model: PipetteModel,
    mount: Mount,
    tip_racks: Vec<LabwareHandle>,
    tip_model: Option<String>,
}

impl InstrumentItem {
    pub(crate) fn new(
        handle: InstrumentHandle,
        model: PipetteModel,
        mount: Mount,
        tip_racks: Vec<LabwareHandle>,
        tip_model: Option<String>,
    ) -> Self {
        Self {
            handle,
            model,
            mount,
            tip_racks,
            tip_model,
        }
    }

    pub fn handle(&self) -> InstrumentHandle {
        self.handle
    }

    pub fn model(&self) -> PipetteModel {
        self.model
    }

    pub fn mount(&self) -> Mount {
        self.mount
    }

    pub fn layout(&self) -> ChannelLayout {
        self.model.layout()
    }

    /// Tip racks in assignment order.
    pub fn tip_racks(&self) -> &[LabwareHandle] {
        &self.tip_racks
    }

    /// Labware model loaded when the assigned racks run dry.
    pub fn tip_model(&self) -> Option<&str> {
        self.tip_model.as_deref()
    }

    pub(crate) fn push_tip_rack(&mut self, rack: LabwareHandle) {
        self.tip_racks.push(rack);
    }
}
