//! Validates the persona catalog shipped at the workspace root.

use std::path::{Path, PathBuf};

use questioncrafter_core::{PersonaCatalog, UNKNOWN_ROLE};

fn bundled_catalog_path() -> PathBuf {
    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap();
    workspace_root.join("personas.yaml")
}

#[test]
fn bundled_catalog_loads() {
    let catalog = PersonaCatalog::load(bundled_catalog_path())
        .unwrap_or_else(|e| panic!("bundled catalog should load: {e}"));
    assert!(
        catalog.len() >= 3,
        "selection needs at least three personas to choose from"
    );
}

#[test]
fn bundled_personas_are_complete() {
    let catalog = PersonaCatalog::load(bundled_catalog_path()).unwrap();
    for name in catalog.names() {
        let persona = catalog.get(name).unwrap();
        assert_ne!(persona.role, UNKNOWN_ROLE, "{name} has no role");
        assert!(!persona.core_expertise.is_empty(), "{name} has no expertise");
        assert_eq!(&persona.original_role, name);
    }
}
