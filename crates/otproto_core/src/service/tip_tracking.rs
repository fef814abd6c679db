//! Tip inventory scanning.
//!
//! # Invariants
//! - Racks are scanned in assignment order, columns in definition order.
//! - A multi-channel head only accepts a column whose every well holds a tip.

use crate::model::instrument::ChannelLayout;
use crate::model::labware::{LabwareHandle, WellRef};
use crate::registry::labware_registry::LabwareRegistry;

/// Finds the next usable tip across `racks`, or `None` when all are spent.
///
/// For a multi-channel layout the returned well is the first well of the
/// first fully stocked column. Handles missing from `labware` are skipped.
pub fn find_next_tip(
    racks: &[LabwareHandle],
    labware: &LabwareRegistry,
    layout: ChannelLayout,
) -> Option<WellRef> {
    racks
        .iter()
        .filter_map(|rack| labware.get(*rack))
        .find_map(|item| match layout {
            ChannelLayout::Single => item
                .iter_wells()
                .find(|(_, well)| well.has_tip())
                .map(|(well_ref, _)| well_ref),
            ChannelLayout::Multi => item
                .columns()
                .iter()
                .position(|column| column.iter().all(|well| well.has_tip()))
                .map(|column| WellRef {
                    labware: item.handle(),
                    column,
                    row: 0,
                }),
        })
}
