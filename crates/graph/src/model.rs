//! Value types shared by every graph operation.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Stable identifier of a quest in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(String);

impl QuestId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for QuestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for QuestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for QuestId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A quest as seen by a chain: its id plus a label for messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestNodeRef {
    /// Catalog identifier.
    pub id: QuestId,
    /// Human-readable name.
    #[serde(default)]
    pub label: String,
}

impl QuestNodeRef {
    /// Create a node reference.
    #[must_use]
    pub fn new(id: impl Into<QuestId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// A node whose label is its id.
    #[must_use]
    pub fn unlabeled(id: impl Into<QuestId>) -> Self {
        let id = id.into();
        let label = id.as_str().to_string();
        Self { id, label }
    }
}

impl fmt::Display for QuestNodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}", self.id)
        } else {
            f.write_str(&self.label)
        }
    }
}

/// `from` must be completed before `to` becomes eligible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrerequisiteEdge {
    /// The prerequisite.
    pub from: QuestId,
    /// The quest it unlocks.
    pub to: QuestId,
}

impl PrerequisiteEdge {
    /// Create an edge.
    #[must_use]
    pub fn new(from: impl Into<QuestId>, to: impl Into<QuestId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Whether either endpoint is `id`.
    #[must_use]
    pub fn touches(&self, id: &QuestId) -> bool {
        &self.from == id || &self.to == id
    }
}

impl fmt::Display for PrerequisiteEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
