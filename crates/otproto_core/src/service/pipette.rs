//! Pipette command service.
//!
//! # Responsibility
//! - Issue timeline commands on behalf of one mounted pipette.
//! - Drive tip inventory: scanning, auto-provisioning and pickup side effects.
//!
//! # Invariants
//! - Every command is resolved to identities before any state is mutated.
//! - Single-channel pickup clears one well; multi-channel clears one column.
//! - Dropping a tip never touches tip inventory.

use crate::config::{AUTO_TIP_RACK_DISPLAY_NAME, DECK_SLOTS};
use crate::error::{BuildError, BuildResult};
use crate::model::command::{Command, CommandKind, ResolvedTarget};
use crate::model::instrument::{ChannelLayout, InstrumentHandle, InstrumentItem};
use crate::model::labware::{Location, WellRef};
use crate::protocol::Protocol;
use crate::registry::command_registry::resolve_target;
use crate::service::tip_tracking::find_next_tip;
use log::{info, warn};

/// Command-issuing handle for one pipette of a protocol.
///
/// Borrows the protocol mutably; drop it to inspect or edit other entities.
/// Command methods return a copy of the appended command, so results outlive
/// the handle.
pub struct Pipette<'p> {
    protocol: &'p mut Protocol,
    handle: InstrumentHandle,
}

impl<'p> Pipette<'p> {
    pub(crate) fn new(protocol: &'p mut Protocol, handle: InstrumentHandle) -> Self {
        Self { protocol, handle }
    }

    pub fn handle(&self) -> InstrumentHandle {
        self.handle
    }

    /// Read access to the owning protocol.
    pub fn protocol(&self) -> &Protocol {
        &*self.protocol
    }

    pub fn instrument(&self) -> BuildResult<&InstrumentItem> {
        self.protocol.instruments().item(self.handle)
    }

    /// Exported identity of this pipette.
    pub fn identity(&self) -> Option<&str> {
        self.protocol.instruments().identity(self.handle)
    }

    pub fn aspirate(&mut self, volume: f64, location: impl Into<Location>) -> BuildResult<Command> {
        self.push(CommandKind::Aspirate, location.into(), Some(volume))
    }

    pub fn dispense(&mut self, volume: f64, location: impl Into<Location>) -> BuildResult<Command> {
        self.push(CommandKind::Dispense, location.into(), Some(volume))
    }

    pub fn air_gap(&mut self, volume: f64, location: impl Into<Location>) -> BuildResult<Command> {
        self.push(CommandKind::AirGap, location.into(), Some(volume))
    }

    pub fn touch_tip(&mut self, location: impl Into<Location>) -> BuildResult<Command> {
        self.push(CommandKind::TouchTip, location.into(), None)
    }

    pub fn blow_out(&mut self, location: impl Into<Location>) -> BuildResult<Command> {
        self.push(CommandKind::BlowOut, location.into(), None)
    }

    /// Pauses the timeline for `wait` seconds.
    pub fn delay(&mut self, wait: f64, message: impl Into<String>) -> BuildResult<Command> {
        Ok(self
            .protocol
            .commands_mut()
            .append(Command::delay(wait, message))
            .clone())
    }

    /// Finds the next usable tip for this pipette without consuming it.
    pub fn find_next_tip(&self) -> BuildResult<Option<WellRef>> {
        let instrument = self.instrument()?;
        Ok(find_next_tip(
            instrument.tip_racks(),
            self.protocol.labware(),
            instrument.layout(),
        ))
    }

    /// Picks up a tip at `location`, or at the next tip from the assigned racks.
    ///
    /// Without a location, an exhausted pipette with a configured tip model
    /// loads one new rack into the last free slot and retries once.
    ///
    /// # Errors
    /// - `OutOfTips` when no tip is found and provisioning is unavailable or
    ///   did not yield a tip.
    /// - `SlotOccupied` when provisioning finds no free slot.
    pub fn pick_up_tip(&mut self, location: Option<Location>) -> BuildResult<Command> {
        let layout = self.instrument()?.layout();
        let location = match location {
            Some(location) => location,
            None => Location::from(self.next_tip_or_provision()?),
        };

        let target = self.resolve(&location)?;
        let well_ref = location.well;
        let item = self.protocol.labware_mut().item_mut(well_ref.labware)?;
        match layout {
            ChannelLayout::Single => {
                let well = item.well_mut(well_ref).ok_or_else(|| BuildError::WellNotFound {
                    labware: target.labware.clone(),
                    selector: target.well.clone(),
                })?;
                if !well.take_tip() {
                    warn!(
                        "event=pick_up_tip module=pipette status=warn reason=tip_already_used pipette={} labware={} well={}",
                        target.pipette, target.labware, target.well
                    );
                }
            }
            ChannelLayout::Multi => {
                let column = item
                    .column_mut(well_ref.column)
                    .ok_or_else(|| BuildError::WellNotFound {
                        labware: target.labware.clone(),
                        selector: target.well.clone(),
                    })?;
                for well in column {
                    well.take_tip();
                }
            }
        }

        Ok(self
            .protocol
            .commands_mut()
            .append(Command::pipetting(CommandKind::PickUpTip, target, None))
            .clone())
    }

    /// Drops the tip at `location`, defaulting to the trash's first well.
    pub fn drop_tip(&mut self, location: Option<Location>) -> BuildResult<Command> {
        let location = match location {
            Some(location) => location,
            None => Location::from(self.protocol.trash_well()?),
        };
        self.push(CommandKind::DropTip, location, None)
    }

    fn next_tip_or_provision(&mut self) -> BuildResult<WellRef> {
        if let Some(well) = self.find_next_tip()? {
            return Ok(well);
        }

        let tip_model = self.instrument()?.tip_model().map(str::to_string);
        let Some(tip_model) = tip_model else {
            return Err(self.out_of_tips());
        };

        // No free slot: target the last deck slot so the load reports it occupied.
        let slot = self
            .protocol
            .labware()
            .free_slots()
            .last()
            .copied()
            .unwrap_or(DECK_SLOTS[DECK_SLOTS.len() - 1]);
        let rack = self
            .protocol
            .labware_mut()
            .load(&tip_model, slot, AUTO_TIP_RACK_DISPLAY_NAME)?;
        let handle = self.handle;
        self.protocol.instruments_mut().item_mut(handle)?.push_tip_rack(rack);

        info!(
            "event=tip_rack_provision module=pipette status=ok pipette={} model={} slot={}",
            self.identity().unwrap_or_default(),
            tip_model,
            slot
        );

        self.find_next_tip()?.ok_or_else(|| self.out_of_tips())
    }

    fn out_of_tips(&self) -> BuildError {
        BuildError::OutOfTips {
            pipette: self.identity().unwrap_or_default().to_string(),
        }
    }

    fn resolve(&self, location: &Location) -> BuildResult<ResolvedTarget> {
        resolve_target(
            self.protocol.instruments(),
            self.protocol.labware(),
            self.handle,
            location,
        )
    }

    fn push(
        &mut self,
        kind: CommandKind,
        location: Location,
        volume: Option<f64>,
    ) -> BuildResult<Command> {
        let target = self.resolve(&location)?;
        Ok(self
            .protocol
            .commands_mut()
            .append(Command::pipetting(kind, target, volume))
            .clone())
    }
}
