//! Catalog entity and detail types.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of catalog entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A job position.
    Role,
    /// A discrete skill or technology.
    Knowledge,
    /// A soft skill or personal trait.
    Quality,
    /// A named learning track.
    Pathway,
    /// A grouping of knowledge items.
    Category,
}

impl EntityKind {
    /// Returns the string representation used in messages and error bodies.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Role => "role",
            Self::Knowledge => "knowledge",
            Self::Quality => "quality",
            Self::Pathway => "pathway",
            Self::Category => "category",
        }
    }

    /// Table holding rows of this kind.
    pub(crate) fn table(self) -> &'static str {
        match self {
            Self::Role => "roles",
            Self::Knowledge => "knowledge",
            Self::Quality => "qualities",
            Self::Pathway => "pathways",
            Self::Category => "categories",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog row: role, knowledge item, quality or pathway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier.
    pub id: i64,
    /// Display name, never empty.
    pub name: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Entity {
    /// Create an entity without a description.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
        }
    }

    /// Attach a description (builder pattern).
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

pub type Role = Entity;
pub type Knowledge = Entity;
pub type Quality = Entity;
pub type Pathway = Entity;

/// A knowledge category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A knowledge item as required by a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleKnowledge {
    #[serde(flatten)]
    pub knowledge: Knowledge,
    /// Proficiency level expected for the role.
    pub level: i64,
    /// Whether the item is elective for the role.
    pub elective: bool,
}

/// A knowledge item as it appears inside a pathway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayItem {
    #[serde(flatten)]
    pub knowledge: Knowledge,
    /// Whether the item is a key milestone of the pathway.
    pub key: bool,
    /// Whether the item may be skipped.
    pub optional: bool,
}

/// All items of a pathway that share one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelGroup {
    pub level: i64,
    pub items: Vec<PathwayItem>,
}

/// A role with everything directly linked to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDetail {
    pub role: Role,
    pub qualities: Vec<Quality>,
    pub knowledge: Vec<RoleKnowledge>,
    pub pathways: Vec<Pathway>,
}

/// A quality with the roles that need it and the pathways those roles follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityDetail {
    pub quality: Quality,
    pub roles: Vec<Role>,
    pub pathways: Vec<Pathway>,
}

/// A knowledge item with its roles, pathways, categories and neighbours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeDetail {
    pub knowledge: Knowledge,
    pub roles: Vec<Role>,
    pub pathways: Vec<Pathway>,
    pub categories: Vec<Category>,
    /// Other items that share at least one pathway with this one.
    pub related: Vec<Knowledge>,
}

/// A pathway with its tiered curriculum and the roles that follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayDetail {
    pub pathway: Pathway,
    /// Level buckets in ascending level order.
    pub knowledge_by_level: Vec<LevelGroup>,
    pub roles: Vec<Role>,
}

/// Group `(level, item)` rows into ascending level buckets.
///
/// Items keep their input order within a bucket.
#[must_use]
pub fn group_by_level(rows: impl IntoIterator<Item = (i64, PathwayItem)>) -> Vec<LevelGroup> {
    let mut buckets: BTreeMap<i64, Vec<PathwayItem>> = BTreeMap::new();
    for (level, item) in rows {
        buckets.entry(level).or_default().push(item);
    }
    buckets
        .into_iter()
        .map(|(level, items)| LevelGroup { level, items })
        .collect()
}

/// Drop every item whose key was already seen, keeping first occurrences.
#[must_use]
pub fn dedup_by_id<T>(items: Vec<T>, id: impl Fn(&T) -> i64) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|item| seen.insert(id(item))).collect()
}
