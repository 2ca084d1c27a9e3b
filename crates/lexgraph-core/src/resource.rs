//! The lexical-resource port.
//!
//! A lexical-semantic resource exposes a hypernym/hyponym taxonomy through
//! [`LexicalResource`]. Adapters for concrete resources (WordNet, GermaNet,
//! Wiktionary, ...) implement this trait; the graph engine consumes it.
//!
//! [`TaxonomyResource`] is a small in-memory implementation that can be
//! populated programmatically or loaded from a JSON taxonomy file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Entity, Error, Result};

/// Lazy, non-restartable sequence of entities.
pub type EntityIter<'a> = Box<dyn Iterator<Item = Result<Entity>> + 'a>;

/// Trait implemented by every lexical-semantic resource adapter.
///
/// Parent/child relations need not be perfectly symmetric: the graph
/// builder queries both directions and merges them.
pub trait LexicalResource: Send + Sync {
    /// All entities of the resource, yielded lazily.
    ///
    /// Each call starts a fresh sequence.
    fn entities(&self) -> Result<EntityIter<'_>>;

    /// Direct hyponyms of `entity`.
    fn children(&self, entity: &Entity) -> Result<BTreeSet<Entity>>;

    /// Direct hypernyms of `entity`.
    fn parents(&self, entity: &Entity) -> Result<BTreeSet<Entity>>;

    /// The canonical root of the taxonomy, if the resource defines one.
    fn root(&self) -> Result<Option<Entity>>;

    /// Name of the resource, used as the first GraphId component.
    fn resource_name(&self) -> &str;

    /// Version of the resource, used as the second GraphId component.
    fn resource_version(&self) -> &str;
}

// ============================================================================
// TaxonomyResource
// ============================================================================

/// On-disk JSON form of a taxonomy.
///
/// ```json
/// {
///   "name": "ukp",
///   "version": "1.0",
///   "root": "UKP",
///   "entities": ["Orphan"],
///   "hyponyms": [["UKP", "People_of_UKP"]]
/// }
/// ```
///
/// `entities` only needs to list entities that take part in no hyponym pair.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TaxonomyFile {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub hyponyms: Vec<(String, String)>,
}

/// In-memory lexical resource.
#[derive(Clone, Debug, Default)]
pub struct TaxonomyResource {
    name: String,
    version: String,
    root: Option<String>,
    entities: BTreeMap<String, Entity>,
    children: BTreeMap<String, BTreeSet<String>>,
    parents: BTreeMap<String, BTreeSet<String>>,
}

impl TaxonomyResource {
    /// Create an empty resource.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Designate the canonical root.
    pub fn with_root(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.ensure_entity(&id);
        self.root = Some(id);
        self
    }

    /// Register an entity without relations.
    pub fn with_entity(mut self, id: impl Into<String>) -> Self {
        self.ensure_entity(&id.into());
        self
    }

    /// Register a symmetric hypernym → hyponym relation.
    pub fn with_hyponym(mut self, parent: impl Into<String>, child: impl Into<String>) -> Self {
        self.add_hyponym(parent, child);
        self
    }

    /// Register a symmetric hypernym → hyponym relation.
    pub fn add_hyponym(&mut self, parent: impl Into<String>, child: impl Into<String>) {
        let (parent, child) = (parent.into(), child.into());
        self.add_child_link(parent.clone(), child.clone());
        self.add_parent_link(child, parent);
    }

    /// Record `child` under `parent` without the inverse parent link.
    pub fn add_child_link(&mut self, parent: impl Into<String>, child: impl Into<String>) {
        let (parent, child) = (parent.into(), child.into());
        self.ensure_entity(&parent);
        self.ensure_entity(&child);
        self.children.entry(parent).or_default().insert(child);
    }

    /// Record `parent` above `child` without the inverse child link.
    pub fn add_parent_link(&mut self, child: impl Into<String>, parent: impl Into<String>) {
        let (child, parent) = (child.into(), parent.into());
        self.ensure_entity(&child);
        self.ensure_entity(&parent);
        self.parents.entry(child).or_default().insert(parent);
    }

    /// Number of registered entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Parse a taxonomy from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: TaxonomyFile = serde_json::from_str(json)
            .map_err(|e| Error::parse(format!("Failed to parse taxonomy JSON: {e}")))?;
        Ok(Self::from(file))
    }

    /// Load a taxonomy from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::io_with_path(e, path.as_ref()))?;
        let resource = Self::from_json_str(&json)?;
        log::debug!(
            "Loaded taxonomy {} {} ({} entities) from {}",
            resource.name,
            resource.version,
            resource.entity_count(),
            path.as_ref().display()
        );
        Ok(resource)
    }

    fn ensure_entity(&mut self, id: &str) {
        if !self.entities.contains_key(id) {
            self.entities.insert(id.to_string(), Entity::new(id));
        }
    }

    fn lookup(&self, ids: Option<&BTreeSet<String>>) -> BTreeSet<Entity> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.entities.get(id).cloned())
            .collect()
    }
}

impl From<TaxonomyFile> for TaxonomyResource {
    fn from(file: TaxonomyFile) -> Self {
        let mut resource = TaxonomyResource::new(file.name, file.version);
        for id in file.entities {
            resource.ensure_entity(&id);
        }
        for (parent, child) in file.hyponyms {
            resource.add_hyponym(parent, child);
        }
        if let Some(root) = file.root {
            resource.ensure_entity(&root);
            resource.root = Some(root);
        }
        resource
    }
}

impl LexicalResource for TaxonomyResource {
    fn entities(&self) -> Result<EntityIter<'_>> {
        Ok(Box::new(self.entities.values().cloned().map(Ok)))
    }

    fn children(&self, entity: &Entity) -> Result<BTreeSet<Entity>> {
        Ok(self.lookup(self.children.get(entity.id())))
    }

    fn parents(&self, entity: &Entity) -> Result<BTreeSet<Entity>> {
        Ok(self.lookup(self.parents.get(entity.id())))
    }

    fn root(&self) -> Result<Option<Entity>> {
        Ok(self.root.as_ref().and_then(|id| self.entities.get(id).cloned()))
    }

    fn resource_name(&self) -> &str {
        &self.name
    }

    fn resource_version(&self) -> &str {
        &self.version
    }
}
