//! Labware definition catalog.
//!
//! # Responsibility
//! - Parse labware definition documents (name + column-major well ordering).
//! - Serve definitions by name to the labware registry.
//!
//! # Invariants
//! - A catalog is read-only once built; definitions are shared via `Arc`.
//! - Every definition has at least one column and no empty column.
//! - Well labels are unique within one definition.

mod builtin;

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

static WELL_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]+[0-9]+$").expect("valid well label regex"));

static BUILTIN_CATALOG: OnceCell<Arc<LabwareCatalog>> = OnceCell::new();

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised while building a labware catalog.
#[derive(Debug)]
pub enum CatalogError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        origin: String,
        source: serde_json::Error,
    },
    InvalidDefinition {
        name: String,
        reason: String,
    },
    DuplicateDefinition(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read labware definitions at `{}`: {source}", path.display())
            }
            Self::Parse { origin, source } => {
                write!(f, "invalid labware definition document `{origin}`: {source}")
            }
            Self::InvalidDefinition { name, reason } => {
                write!(f, "labware definition `{name}` is invalid: {reason}")
            }
            Self::DuplicateDefinition(name) => {
                write!(f, "labware definition already registered: {name}")
            }
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidDefinition { .. } | Self::DuplicateDefinition(_) => None,
        }
    }
}

/// Immutable labware definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabwareDefinition {
    /// Catalog lookup key, e.g. `96-flat`.
    pub name: String,
    /// Plate format hint (`96`, `trough`, `trash`), when declared.
    pub format: Option<String>,
    /// Whether the wells of this labware hold pipette tips.
    pub is_tiprack: bool,
    /// Columns in definition order, each an ordered list of well labels.
    pub ordering: Vec<Vec<String>>,
}

impl LabwareDefinition {
    /// Parses one definition document and validates its well grid.
    pub fn from_json(origin: &str, text: &str) -> CatalogResult<Self> {
        let document: DefinitionDocument =
            serde_json::from_str(text).map_err(|source| CatalogError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        let definition = Self {
            name: document.metadata.name.trim().to_string(),
            format: document.metadata.format,
            is_tiprack: document.metadata.is_tiprack,
            ordering: document.ordering,
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Checks grid invariants required by well addressing and tip scanning.
    pub fn validate(&self) -> CatalogResult<()> {
        let invalid = |reason: String| CatalogError::InvalidDefinition {
            name: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }
        if self.ordering.is_empty() {
            return Err(invalid("ordering must contain at least one column".to_string()));
        }

        let mut seen = BTreeSet::new();
        for (index, column) in self.ordering.iter().enumerate() {
            if column.is_empty() {
                return Err(invalid(format!("column {index} is empty")));
            }
            for label in column {
                if !WELL_LABEL_RE.is_match(label) {
                    return Err(invalid(format!("well label `{label}` is malformed")));
                }
                if !seen.insert(label.as_str()) {
                    return Err(invalid(format!("well label `{label}` is duplicated")));
                }
            }
        }
        Ok(())
    }

    /// Total number of wells across all columns.
    pub fn well_count(&self) -> usize {
        self.ordering.iter().map(Vec::len).sum()
    }
}

#[derive(Deserialize)]
struct DefinitionDocument {
    metadata: DefinitionMetadata,
    ordering: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct DefinitionMetadata {
    name: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default, rename = "isTiprack")]
    is_tiprack: bool,
}

/// Name-keyed collection of labware definitions.
#[derive(Debug, Default)]
pub struct LabwareCatalog {
    definitions: BTreeMap<String, Arc<LabwareDefinition>>,
}

impl LabwareCatalog {
    /// Returns the process-wide catalog of embedded definitions.
    ///
    /// Parsed on first use; later calls share the same instance.
    pub fn builtin() -> CatalogResult<Arc<LabwareCatalog>> {
        BUILTIN_CATALOG
            .get_or_try_init(|| {
                let mut definitions = Vec::with_capacity(builtin::DEFINITIONS.len());
                for (origin, text) in builtin::DEFINITIONS {
                    definitions.push(LabwareDefinition::from_json(origin, text)?);
                }
                Self::from_definitions(definitions).map(Arc::new)
            })
            .cloned()
    }

    /// Builds a catalog from already-parsed definitions.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = LabwareDefinition>,
    ) -> CatalogResult<Self> {
        let mut catalog = Self::default();
        for definition in definitions {
            catalog.insert(definition)?;
        }
        Ok(catalog)
    }

    /// Loads every `*.json` document in `dir`, in file-name order.
    pub fn load_dir(dir: impl AsRef<Path>) -> CatalogResult<Self> {
        let dir = dir.as_ref();
        let io_error = |path: &Path, source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|err| io_error(dir, err))? {
            let path = entry.map_err(|err| io_error(dir, err))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut catalog = Self::default();
        for path in paths {
            let text = std::fs::read_to_string(&path).map_err(|err| io_error(&path, err))?;
            let definition = LabwareDefinition::from_json(&path.display().to_string(), &text)?;
            catalog.insert(definition)?;
        }

        log::info!(
            "event=catalog_load module=catalog status=ok dir={} definitions={}",
            dir.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<Arc<LabwareDefinition>> {
        self.definitions.get(name).cloned()
    }

    /// Returns sorted definition names.
    pub fn names(&self) -> Vec<&str> {
        self.definitions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn insert(&mut self, definition: LabwareDefinition) -> CatalogResult<()> {
        definition.validate()?;
        if self.definitions.contains_key(definition.name.as_str()) {
            return Err(CatalogError::DuplicateDefinition(definition.name));
        }
        self.definitions
            .insert(definition.name.clone(), Arc::new(definition));
        Ok(())
    }
}
