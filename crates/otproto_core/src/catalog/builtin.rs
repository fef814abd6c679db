//! Definitions embedded in the binary.

pub(super) const DEFINITIONS: &[(&str, &str)] = &[
    ("96-PCR-flat.json", include_str!("definitions/96-PCR-flat.json")),
    ("96-deep-well.json", include_str!("definitions/96-deep-well.json")),
    ("96-flat.json", include_str!("definitions/96-flat.json")),
    ("fixed-trash.json", include_str!("definitions/fixed-trash.json")),
    ("opentrons-tiprack-300ul.json", include_str!("definitions/opentrons-tiprack-300ul.json")),
    ("tiprack-1000ul.json", include_str!("definitions/tiprack-1000ul.json")),
    ("tiprack-10ul.json", include_str!("definitions/tiprack-10ul.json")),
    ("tiprack-200ul.json", include_str!("definitions/tiprack-200ul.json")),
    ("trough-12row.json", include_str!("definitions/trough-12row.json")),
];
