//! Entity model for protocol building.
//!
//! # Responsibility
//! - Define labware, well, instrument and command value types.
//! - Keep entity addressing handle-based; registries own the entities.
//!
//! # Invariants
//! - Handles are arena indexes and never carry ownership.
//! - Commands reference other entities only through exported identities.

pub mod command;
pub mod instrument;
pub mod labware;
