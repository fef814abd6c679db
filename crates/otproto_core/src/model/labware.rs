//! Placed labware and well addressing.
//!
//! # Responsibility
//! - Materialize a well grid from a catalog definition.
//! - Resolve well selectors (label or column-major ordinal) to `WellRef`s.
//! - Carry per-well tip inventory for tip racks.
//!
//! # Invariants
//! - The well grid mirrors the definition ordering exactly and never changes shape.
//! - A `WellRef` is a plain index triple; it owns nothing.

use crate::catalog::LabwareDefinition;
use crate::error::{BuildError, BuildResult};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Arena index of a labware item, tagged with the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabwareHandle {
    pub(crate) registry: u64,
    pub(crate) index: usize,
}

impl LabwareHandle {
    pub(crate) fn new(registry: u64, index: usize) -> Self {
        Self { registry, index }
    }
}

impl Display for LabwareHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "labware#{}@registry{}", self.index, self.registry)
    }
}

/// Address of one well: owning labware plus column/row in definition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WellRef {
    pub labware: LabwareHandle,
    pub column: usize,
    pub row: usize,
}

impl WellRef {
    /// Location anchored at the top of the well, offset by `z` millimetres.
    pub fn top(self, z: f64) -> Location {
        Location {
            well: self,
            position: Some(Position::new(Anchor::Top, z)),
        }
    }

    /// Location anchored at the bottom of the well, offset by `z` millimetres.
    pub fn bottom(self, z: f64) -> Location {
        Location {
            well: self,
            position: Some(Position::new(Anchor::Bottom, z)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Offset {
    pub z: f64,
}

/// Vertical offset exported under a command's `position` key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub anchor: Anchor,
    pub offset: Offset,
}

impl Position {
    pub fn new(anchor: Anchor, z: f64) -> Self {
        Self {
            anchor,
            offset: Offset { z },
        }
    }
}

/// Command target: a well, optionally refined by an anchor/offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub well: WellRef,
    pub position: Option<Position>,
}

impl From<WellRef> for Location {
    fn from(well: WellRef) -> Self {
        Self {
            well,
            position: None,
        }
    }
}

/// Well selector accepted by [`LabwareItem::wells`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WellSelector {
    /// Exact well label, e.g. `B3`.
    Label(String),
    /// Zero-based column-major index.
    Ordinal(i64),
}

impl Display for WellSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Label(label) => write!(f, "{label}"),
            Self::Ordinal(index) => write!(f, "#{index}"),
        }
    }
}

impl From<&str> for WellSelector {
    fn from(value: &str) -> Self {
        Self::Label(value.to_string())
    }
}

impl From<String> for WellSelector {
    fn from(value: String) -> Self {
        Self::Label(value)
    }
}

impl From<i32> for WellSelector {
    fn from(value: i32) -> Self {
        Self::Ordinal(i64::from(value))
    }
}

impl From<i64> for WellSelector {
    fn from(value: i64) -> Self {
        Self::Ordinal(value)
    }
}

impl From<u32> for WellSelector {
    fn from(value: u32) -> Self {
        Self::Ordinal(i64::from(value))
    }
}

impl From<usize> for WellSelector {
    fn from(value: usize) -> Self {
        Self::Ordinal(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

/// One addressable cavity of a labware item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Well {
    label: String,
    has_tip: bool,
}

impl Well {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            has_tip: true,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Tip inventory flag. Only meaningful for tip-rack wells.
    pub fn has_tip(&self) -> bool {
        self.has_tip
    }

    /// Clears the tip flag, returning whether a tip was present.
    pub(crate) fn take_tip(&mut self) -> bool {
        std::mem::replace(&mut self.has_tip, false)
    }

    pub fn restock(&mut self) {
        self.has_tip = true;
    }
}

/// Labware placed in a deck slot.
#[derive(Debug, Clone)]
pub struct LabwareItem {
    handle: LabwareHandle,
    definition: Arc<LabwareDefinition>,
    slot: String,
    display_name: String,
    columns: Vec<Vec<Well>>,
}

impl LabwareItem {
    pub(crate) fn new(
        handle: LabwareHandle,
        definition: Arc<LabwareDefinition>,
        slot: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        let columns = definition
            .ordering
            .iter()
            .map(|column| column.iter().map(Well::new).collect())
            .collect();
        Self {
            handle,
            definition,
            slot: slot.into(),
            display_name: display_name.into(),
            columns,
        }
    }

    pub fn handle(&self) -> LabwareHandle {
        self.handle
    }

    /// Catalog model name backing this item.
    pub fn model(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &LabwareDefinition {
        &self.definition
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn columns(&self) -> &[Vec<Well>] {
        &self.columns
    }

    /// Resolves a selector to a well address.
    ///
    /// Labels match exactly against any column; ordinals count wells in
    /// column-major order starting at zero.
    ///
    /// # Errors
    /// - `InvalidSelector` for a negative ordinal.
    /// - `WellNotFound` when nothing matches.
    pub fn wells(&self, selector: impl Into<WellSelector>) -> BuildResult<WellRef> {
        let selector = selector.into();
        let found = match &selector {
            WellSelector::Label(label) => self
                .iter_wells()
                .find(|(_, well)| well.label == *label)
                .map(|(well_ref, _)| well_ref),
            WellSelector::Ordinal(index) => {
                let index = usize::try_from(*index).map_err(|_| {
                    BuildError::InvalidSelector(format!(
                        "well ordinal must be non-negative, got {index}"
                    ))
                })?;
                self.iter_wells().nth(index).map(|(well_ref, _)| well_ref)
            }
        };

        found.ok_or_else(|| BuildError::WellNotFound {
            labware: self.display_label().to_string(),
            selector: selector.to_string(),
        })
    }

    /// Wells in column-major order with their addresses.
    pub fn iter_wells(&self) -> impl Iterator<Item = (WellRef, &Well)> + '_ {
        let handle = self.handle;
        self.columns.iter().enumerate().flat_map(move |(column, wells)| {
            wells.iter().enumerate().map(move |(row, well)| {
                (
                    WellRef {
                        labware: handle,
                        column,
                        row,
                    },
                    well,
                )
            })
        })
    }

    pub fn well(&self, well_ref: WellRef) -> Option<&Well> {
        if well_ref.labware != self.handle {
            return None;
        }
        self.columns.get(well_ref.column)?.get(well_ref.row)
    }

    pub(crate) fn well_mut(&mut self, well_ref: WellRef) -> Option<&mut Well> {
        if well_ref.labware != self.handle {
            return None;
        }
        self.columns.get_mut(well_ref.column)?.get_mut(well_ref.row)
    }

    pub(crate) fn column_mut(&mut self, column: usize) -> Option<&mut [Well]> {
        self.columns.get_mut(column).map(Vec::as_mut_slice)
    }

    /// Number of wells still flagged as holding a tip.
    pub fn tips_remaining(&self) -> usize {
        self.iter_wells().filter(|(_, well)| well.has_tip).count()
    }

    /// Marks every well as holding a tip again.
    pub fn restock(&mut self) {
        self.columns.iter_mut().flatten().for_each(Well::restock);
    }

    fn display_label(&self) -> &str {
        if self.display_name.is_empty() {
            self.model()
        } else {
            &self.display_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Anchor, LabwareHandle, LabwareItem, Location, WellRef, WellSelector};
    use crate::catalog::LabwareDefinition;
    use crate::error::BuildError;
    use std::sync::Arc;

    fn plate() -> LabwareItem {
        let definition = LabwareDefinition {
            name: "mini-plate".to_string(),
            format: None,
            is_tiprack: false,
            ordering: vec![
                vec!["A1".to_string(), "B1".to_string()],
                vec!["A2".to_string(), "B2".to_string()],
            ],
        };
        LabwareItem::new(LabwareHandle::new(0, 3), Arc::new(definition), "1", "plate")
    }

    #[test]
    fn ordinal_selection_is_column_major() {
        let item = plate();
        let labels: Vec<_> = (0..4)
            .map(|index| {
                let well_ref = item.wells(index).expect("ordinal in range");
                item.well(well_ref).expect("well exists").label().to_string()
            })
            .collect();
        assert_eq!(labels, ["A1", "B1", "A2", "B2"]);
    }

    #[test]
    fn label_and_first_ordinal_agree() {
        let item = plate();
        assert_eq!(
            item.wells(0).expect("ordinal 0"),
            item.wells("A1").expect("label A1")
        );
        assert_eq!(
            item.wells("B2").expect("label B2"),
            WellRef {
                labware: LabwareHandle::new(0, 3),
                column: 1,
                row: 1,
            }
        );
    }

    #[test]
    fn rejects_invalid_and_missing_selectors() {
        let item = plate();
        assert!(matches!(item.wells(-1), Err(BuildError::InvalidSelector(_))));
        for label in ["", " A1 ", "a1"] {
            assert!(matches!(
                item.wells(label),
                Err(BuildError::WellNotFound { .. })
            ));
        }
        assert!(matches!(
            item.wells(4),
            Err(BuildError::WellNotFound { .. })
        ));
        let err = item.wells("H12").expect_err("unknown label must fail");
        assert!(matches!(
            err,
            BuildError::WellNotFound { ref labware, ref selector }
                if labware == "plate" && selector == "H12"
        ));
    }

    #[test]
    fn top_and_bottom_attach_position() {
        let well = plate().wells("A1").expect("label A1");
        let top = well.top(2.5);
        let position = top.position.expect("top carries a position");
        assert_eq!(position.anchor, Anchor::Top);
        assert_eq!(position.offset.z, 2.5);
        assert_eq!(well.bottom(1.0).position.expect("bottom").anchor, Anchor::Bottom);
        assert_eq!(Location::from(well).position, None);
    }

    #[test]
    fn restock_resets_tip_flags() {
        let mut item = plate();
        let well = item.wells(1).expect("ordinal 1");
        assert!(item.well_mut(well).expect("well").take_tip());
        assert!(!item.well_mut(well).expect("well").take_tip());
        assert_eq!(item.tips_remaining(), 3);

        item.restock();
        assert_eq!(item.tips_remaining(), 4);
    }

    #[test]
    fn selector_display_distinguishes_kinds() {
        assert_eq!(WellSelector::from("C4").to_string(), "C4");
        assert_eq!(WellSelector::from(7).to_string(), "#7");
    }
}
