//! The `Entity` vertex key.
//!
//! An entity is a node of a lexical-semantic resource (a WordNet synset, a
//! Wikipedia category, ...). The graph engine never mutates entities; it only
//! indexes them by their canonical string ID.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable node of a lexical-semantic resource.
///
/// Equality, ordering, and hashing are structural. The canonical `id` is
/// what the graph engine uses as its map key everywhere.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Entity {
    id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    lexemes: Vec<String>,
}

impl Entity {
    /// Create an entity from its canonical ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            lexemes: Vec::new(),
        }
    }

    /// Attach the lexemes (surface forms) of this entity.
    pub fn with_lexemes<I, S>(mut self, lexemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lexemes = lexemes.into_iter().map(Into::into).collect();
        self
    }

    /// The canonical string ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Surface forms, possibly empty.
    pub fn lexemes(&self) -> &[String] {
        &self.lexemes
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&str> for Entity {
    fn from(id: &str) -> Self {
        Entity::new(id)
    }
}
