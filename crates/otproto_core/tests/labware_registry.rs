use otproto_core::{
    BuildError, CatalogError, LabwareCatalog, Protocol, ProtocolConfig,
};
use std::fs;
use std::sync::Arc;

const MINI_RACK: &str = r#"{
    "metadata": {"name": "mini-rack", "isTiprack": true},
    "ordering": [["A1", "B1"], ["A2", "B2"]]
}"#;
const TRASH: &str = r#"{"metadata": {"name": "fixed-trash"}, "ordering": [["A1"]]}"#;

#[test]
fn distinct_slot_loads_all_appear_in_document() {
    let mut protocol = Protocol::new().unwrap();
    let models = ["96-flat", "tiprack-10ul", "96-deep-well", "trough-12row"];
    for (index, model) in models.iter().enumerate() {
        let slot = (index + 1).to_string();
        protocol.load_labware(model, &slot, "item").unwrap();
    }

    let document = protocol.labware().to_document();
    // Trash is provisioned on construction.
    assert_eq!(document.len(), models.len() + 1);
    for (index, model) in models.iter().enumerate() {
        let slot = (index + 1).to_string();
        let handle = protocol.labware().in_slot(&slot).unwrap();
        let identity = protocol.labware().identity(handle).unwrap();
        let record = document.get(identity).unwrap();
        assert_eq!(record.model, *model);
        assert_eq!(record.slot, slot);
        assert_eq!(record.display_name, "item");
    }
}

#[test]
fn occupied_slot_fails_and_leaves_registry_unchanged() {
    let mut protocol = Protocol::new().unwrap();
    protocol.load_labware("96-flat", "5", "plate").unwrap();
    let before = protocol.labware().to_document();

    let err = protocol
        .load_labware("tiprack-10ul", "5", "rack")
        .unwrap_err();
    assert!(matches!(err, BuildError::SlotOccupied { .. }));
    assert_eq!(protocol.labware().to_document(), before);

    let trash_err = protocol.load_labware("96-flat", "12", "late").unwrap_err();
    assert!(matches!(trash_err, BuildError::SlotOccupied { ref slot, .. } if slot == "12"));
}

#[test]
fn identities_are_unique_even_for_equal_display_names() {
    let mut protocol = Protocol::new().unwrap();
    let first = protocol.load_labware("96-flat", "1", "plate").unwrap();
    let second = protocol.load_labware("96-flat", "2", "plate").unwrap();

    let labware = protocol.labware();
    assert_ne!(labware.identity(first), labware.identity(second));
    assert_eq!(labware.find(labware.identity(second).unwrap()), Some(second));
}

#[test]
fn ordinal_zero_matches_first_label_for_every_builtin_definition() {
    let catalog = LabwareCatalog::builtin().unwrap();
    let mut protocol = Protocol::new().unwrap();
    let names: Vec<String> = catalog
        .names()
        .into_iter()
        .filter(|name| *name != "fixed-trash")
        .map(str::to_string)
        .collect();

    for (index, name) in names.iter().enumerate() {
        let slot = (index + 1).to_string();
        let handle = protocol.load_labware(name, &slot, "").unwrap();
        let item = protocol.labware().get(handle).unwrap();
        let first_label = &item.definition().ordering[0][0];
        assert_eq!(item.wells(0).unwrap(), item.wells(first_label.as_str()).unwrap());
    }
}

#[test]
fn protocol_uses_catalog_loaded_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("mini-rack.json"), MINI_RACK).unwrap();
    fs::write(dir.path().join("trash.json"), TRASH).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let catalog = LabwareCatalog::load_dir(dir.path()).unwrap();
    assert_eq!(catalog.names(), ["fixed-trash", "mini-rack"]);

    let mut protocol = Protocol::with_catalog(Arc::new(catalog), ProtocolConfig::default()).unwrap();
    let rack = protocol.load_labware("mini-rack", "1", "rack").unwrap();
    assert_eq!(protocol.labware().get(rack).unwrap().tips_remaining(), 4);

    let err = protocol.load_labware("96-flat", "2", "plate").unwrap_err();
    assert!(matches!(err, BuildError::UnknownLabware(model) if model == "96-flat"));
}

#[test]
fn catalog_without_trash_cannot_back_a_protocol() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("mini-rack.json"), MINI_RACK).unwrap();
    let catalog = LabwareCatalog::load_dir(dir.path()).unwrap();

    let err = Protocol::with_catalog(Arc::new(catalog), ProtocolConfig::default()).unwrap_err();
    assert!(matches!(err, BuildError::UnknownLabware(model) if model == "fixed-trash"));
}

#[test]
fn load_dir_reports_invalid_documents() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("bad.json"),
        r#"{"metadata": {"name": "bad"}, "ordering": [[]]}"#,
    )
    .unwrap();
    let err = LabwareCatalog::load_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidDefinition { name, .. } if name == "bad"));

    let missing = LabwareCatalog::load_dir(dir.path().join("absent")).unwrap_err();
    assert!(matches!(missing, CatalogError::Io { .. }));
}

#[test]
fn only_deck_slots_accept_labware() {
    let mut protocol = Protocol::new().unwrap();
    for slot in ["0", "13", "", "A"] {
        let err = protocol.load_labware("96-flat", slot, "plate").unwrap_err();
        assert!(matches!(err, BuildError::InvalidSlot(ref rejected) if rejected == slot));
    }
    assert_eq!(protocol.labware().len(), 1);
    assert_eq!(protocol.labware().free_slots().len(), 11);
}

#[test]
fn well_labels_match_exactly() {
    let mut protocol = Protocol::new().unwrap();
    let plate = protocol.load_labware("96-flat", "1", "plate").unwrap();

    assert!(protocol.well(plate, "A1").is_ok());
    for label in [" A1 ", "a1", ""] {
        assert!(matches!(
            protocol.well(plate, label),
            Err(BuildError::WellNotFound { .. })
        ));
    }
}
