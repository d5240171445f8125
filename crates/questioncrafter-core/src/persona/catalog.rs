//! Read-only persona catalog loaded once at startup.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CatalogError;

pub const UNKNOWN_ROLE: &str = "Unknown";
pub const UNKNOWN_BACKGROUND: &str = "No background available";

/// A named expert viewpoint with a fixed descriptive profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaDefinition {
    pub name: String,
    pub role: String,
    pub background: String,
    pub core_expertise: Vec<String>,
    pub cognitive_approach: String,
    pub values_and_motivations: String,
    pub communication_style: String,
    pub notable_trait: String,
    /// The catalog key this definition was loaded under.
    pub original_role: String,
}

impl PersonaDefinition {
    /// Stub returned for names the catalog does not know.
    pub fn stub(key: &str) -> Self {
        Self {
            name: key.to_string(),
            role: UNKNOWN_ROLE.to_string(),
            background: UNKNOWN_BACKGROUND.to_string(),
            core_expertise: Vec::new(),
            cognitive_approach: String::new(),
            values_and_motivations: String::new(),
            communication_style: String::new(),
            notable_trait: String::new(),
            original_role: key.to_string(),
        }
    }

    /// Multi-line profile used when introducing the persona to the model.
    pub fn describe(&self) -> String {
        format!(
            "Name: {}\nRole: {}\nBackground: {}\nCore Expertise: {}\nCognitive Approach: {}\n\
             Values and Motivations: {}\nCommunication Style: {}\nNotable Trait: {}",
            self.name,
            self.role,
            self.background,
            self.core_expertise.join(", "),
            self.cognitive_approach,
            self.values_and_motivations,
            self.communication_style,
            self.notable_trait,
        )
    }
}

/// Catalog file entry; every field is optional on disk.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPersona {
    name: Option<String>,
    role: Option<String>,
    background: Option<String>,
    core_expertise: Vec<String>,
    cognitive_approach: String,
    values_and_motivations: String,
    communication_style: String,
    notable_trait: String,
}

impl RawPersona {
    fn into_definition(self, key: &str) -> PersonaDefinition {
        PersonaDefinition {
            name: self.name.unwrap_or_else(|| key.to_string()),
            role: self.role.unwrap_or_else(|| UNKNOWN_ROLE.to_string()),
            background: self
                .background
                .unwrap_or_else(|| UNKNOWN_BACKGROUND.to_string()),
            core_expertise: self.core_expertise,
            cognitive_approach: self.cognitive_approach,
            values_and_motivations: self.values_and_motivations,
            communication_style: self.communication_style,
            notable_trait: self.notable_trait,
            original_role: key.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    personas: serde_yaml::Mapping,
}

/// Immutable persona lookup table.
///
/// Keys keep the order of the source document so prompts list personas the
/// same way every run.
#[derive(Debug, Clone, Default)]
pub struct PersonaCatalog {
    order: Vec<String>,
    entries: HashMap<String, Arc<PersonaDefinition>>,
}

impl PersonaCatalog {
    /// Build a catalog from already-constructed definitions, keyed by
    /// `original_role`. Later duplicates replace earlier ones.
    pub fn from_definitions(definitions: impl IntoIterator<Item = PersonaDefinition>) -> Self {
        let mut catalog = Self::default();
        for definition in definitions {
            let key = definition.original_role.clone();
            if catalog.entries.insert(key.clone(), Arc::new(definition)).is_none() {
                catalog.order.push(key);
            }
        }
        catalog
    }

    /// Parse a YAML document with a top-level `personas:` mapping.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_yaml::from_str(yaml)?;
        let mut definitions = Vec::with_capacity(document.personas.len());
        for (key, value) in document.personas {
            let key = key.as_str().ok_or(CatalogError::NonStringKey)?.to_string();
            let raw: RawPersona = if value.is_null() {
                RawPersona::default()
            } else {
                serde_yaml::from_value(value)?
            };
            definitions.push(raw.into_definition(&key));
        }
        Ok(Self::from_definitions(definitions))
    }

    /// Load the catalog file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_yaml_str(&yaml)?;
        info!(
            path = %path.display(),
            personas = catalog.len(),
            "persona catalog loaded"
        );
        Ok(catalog)
    }

    /// All catalog keys in document order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<PersonaDefinition>> {
        self.entries.get(name).cloned()
    }

    /// Definition for `name`, or [`PersonaDefinition::stub`] if unknown.
    pub fn get_or_stub(&self, name: &str) -> Arc<PersonaDefinition> {
        self.get(name)
            .unwrap_or_else(|| Arc::new(PersonaDefinition::stub(name)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
personas:
  Mathematician:
    name: Ada
    role: Mathematician
    background: Analytical engines
    core_expertise: [algebra, computation]
    cognitive_approach: Formal
  Programmer:
    name: Grace
  Philosopher:
"#;

    #[test]
    fn preserves_document_order() {
        let catalog = PersonaCatalog::from_yaml_str(YAML).unwrap();
        assert_eq!(
            catalog.names(),
            &["Mathematician", "Programmer", "Philosopher"]
        );
    }

    #[test]
    fn missing_fields_get_placeholders() {
        let catalog = PersonaCatalog::from_yaml_str(YAML).unwrap();

        let grace = catalog.get("Programmer").unwrap();
        assert_eq!(grace.name, "Grace");
        assert_eq!(grace.role, UNKNOWN_ROLE);
        assert_eq!(grace.background, UNKNOWN_BACKGROUND);
        assert!(grace.core_expertise.is_empty());
        assert_eq!(grace.original_role, "Programmer");

        let philosopher = catalog.get("Philosopher").unwrap();
        assert_eq!(philosopher.name, "Philosopher");
    }

    #[test]
    fn unknown_name_yields_stub() {
        let catalog = PersonaCatalog::from_yaml_str(YAML).unwrap();
        let stub = catalog.get_or_stub("Astronaut");
        assert_eq!(stub.name, "Astronaut");
        assert_eq!(stub.role, UNKNOWN_ROLE);
        assert_eq!(stub.original_role, "Astronaut");
        assert!(!catalog.contains("Astronaut"));
    }

    #[test]
    fn describe_lists_expertise() {
        let catalog = PersonaCatalog::from_yaml_str(YAML).unwrap();
        let text = catalog.get("Mathematician").unwrap().describe();
        assert!(text.starts_with("Name: Ada\nRole: Mathematician"));
        assert!(text.contains("Core Expertise: algebra, computation"));
    }

    #[test]
    fn document_without_personas_is_empty() {
        let catalog = PersonaCatalog::from_yaml_str("other: 1\n").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PersonaCatalog::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }
}
