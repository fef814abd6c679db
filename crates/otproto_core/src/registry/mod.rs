//! Entity registries.
//!
//! # Responsibility
//! - Own labware, instruments and commands in arena-style containers.
//! - Issue exported identities and keep identity <-> handle indexes in sync.
//! - Enforce slot and mount uniqueness before anything is inserted.
//!
//! # Invariants
//! - Identities are unique per registry and never reassigned.
//! - Both index directions are written together on insert; nothing is removed.
//! - Command order is append order.
//! - Handles carry the id of the registry that issued them; other registries
//!   treat them as unknown.

pub mod command_registry;
pub mod instrument_registry;
pub mod labware_registry;

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

const IDENTITY_SUFFIX_LEN: usize = 8;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id stamped into every handle a registry issues.
fn next_registry_id() -> u64 {
    NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed)
}

/// Generates `<prefix>-<hex>` candidates until one is not taken.
fn generate_identity(prefix: &str, is_taken: impl Fn(&str) -> bool) -> String {
    loop {
        let suffix = Uuid::new_v4().simple().to_string();
        let candidate = format!("{prefix}-{}", &suffix[..IDENTITY_SUFFIX_LEN]);
        if !is_taken(&candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{generate_identity, next_registry_id};
    use std::cell::Cell;

    #[test]
    fn registry_ids_are_never_reused() {
        let first = next_registry_id();
        let second = next_registry_id();
        assert_ne!(first, 0);
        assert!(second > first);
    }

    #[test]
    fn generate_identity_uses_prefix_and_short_suffix() {
        let identity = generate_identity("culture_block", |_| false);
        let suffix = identity
            .strip_prefix("culture_block-")
            .expect("identity keeps prefix");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generate_identity_retries_on_collision() {
        let attempts = Cell::new(0);
        let identity = generate_identity("rack", |_| {
            attempts.set(attempts.get() + 1);
            attempts.get() < 3
        });
        assert_eq!(attempts.get(), 3);
        assert!(identity.starts_with("rack-"));
    }
}
