//! Protocol-building services.
//!
//! # Responsibility
//! - Orchestrate registry calls into pipette-level operations.
//! - Own the tip inventory state machine.

pub mod pipette;
pub mod tip_tracking;
