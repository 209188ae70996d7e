//! Seed data and the one-shot bootstrap of an empty catalog.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::error::CatalogError;
use super::store::{count_roles, CatalogStore};
use super::types::{Category, Entity, EntityKind};

const BASELINE: &str = include_str!("baseline.toml");

/// Role ↔ Quality link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleQualityLink {
    pub role: i64,
    pub quality: i64,
}

/// Role ↔ Knowledge link with proficiency level and elective flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleKnowledgeLink {
    pub role: i64,
    pub knowledge: i64,
    /// Proficiency level; the store default of 1 applies when absent.
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub elective: bool,
}

/// Role ↔ Pathway link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePathwayLink {
    pub role: i64,
    pub pathway: i64,
}

/// Pathway ↔ Knowledge link placing the item on a level of the pathway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayKnowledgeLink {
    pub pathway: i64,
    pub knowledge: i64,
    #[serde(default)]
    pub level: i64,
    #[serde(default)]
    pub key: bool,
    #[serde(default)]
    pub optional: bool,
}

/// Category ↔ Knowledge link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryKnowledgeLink {
    pub category: i64,
    pub knowledge: i64,
}

/// Full contents of a catalog, as written once into an empty store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub roles: Vec<Entity>,
    pub qualities: Vec<Entity>,
    pub knowledge: Vec<Entity>,
    pub pathways: Vec<Entity>,
    pub categories: Vec<Category>,
    pub role_qualities: Vec<RoleQualityLink>,
    pub role_knowledge: Vec<RoleKnowledgeLink>,
    pub role_pathways: Vec<RolePathwayLink>,
    pub pathway_knowledge: Vec<PathwayKnowledgeLink>,
    pub category_knowledge: Vec<CategoryKnowledgeLink>,
}

impl SeedData {
    /// The built-in catalog used when no seed file is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded TOML does not parse.
    pub fn baseline() -> Result<Self, CatalogError> {
        Self::from_toml_str(BASELINE)
    }

    /// Parse seed data from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::SeedParse`] on malformed input.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        Ok(toml::from_str(content)?)
    }

    /// Read seed data from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CatalogError::SeedRead {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::from_toml_str(&content)
    }

    /// Check the data for problems the schema would reject or the readers
    /// could not make sense of.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] describing the first problem found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.roles.is_empty() {
            return Err(CatalogError::Validation(
                "seed data must contain at least one role".to_string(),
            ));
        }

        let roles = check_entities(EntityKind::Role, entity_keys(&self.roles))?;
        let qualities = check_entities(EntityKind::Quality, entity_keys(&self.qualities))?;
        let knowledge = check_entities(EntityKind::Knowledge, entity_keys(&self.knowledge))?;
        let pathways = check_entities(EntityKind::Pathway, entity_keys(&self.pathways))?;
        let categories = check_entities(
            EntityKind::Category,
            self.categories.iter().map(|c| (c.id, c.name.as_str())),
        )?;

        check_links(
            "role_qualities",
            self.role_qualities.iter().map(|l| (l.role, l.quality)),
            (EntityKind::Role, &roles),
            (EntityKind::Quality, &qualities),
        )?;
        check_links(
            "role_knowledge",
            self.role_knowledge.iter().map(|l| (l.role, l.knowledge)),
            (EntityKind::Role, &roles),
            (EntityKind::Knowledge, &knowledge),
        )?;
        check_links(
            "role_pathways",
            self.role_pathways.iter().map(|l| (l.role, l.pathway)),
            (EntityKind::Role, &roles),
            (EntityKind::Pathway, &pathways),
        )?;
        check_links(
            "pathway_knowledge",
            self.pathway_knowledge.iter().map(|l| (l.pathway, l.knowledge)),
            (EntityKind::Pathway, &pathways),
            (EntityKind::Knowledge, &knowledge),
        )?;
        check_links(
            "category_knowledge",
            self.category_knowledge.iter().map(|l| (l.category, l.knowledge)),
            (EntityKind::Category, &categories),
            (EntityKind::Knowledge, &knowledge),
        )?;

        Ok(())
    }

    fn insert(&self, conn: &Connection) -> Result<(), CatalogError> {
        for (kind, rows) in [
            (EntityKind::Role, &self.roles),
            (EntityKind::Quality, &self.qualities),
            (EntityKind::Knowledge, &self.knowledge),
            (EntityKind::Pathway, &self.pathways),
        ] {
            let mut stmt = conn.prepare(&format!(
                "INSERT INTO {} (id, name, description) VALUES (?1, ?2, ?3)",
                kind.table()
            ))?;
            for row in rows {
                stmt.execute(params![row.id, row.name, row.description])?;
            }
        }

        let mut stmt = conn.prepare("INSERT INTO categories (id, name) VALUES (?1, ?2)")?;
        for category in &self.categories {
            stmt.execute(params![category.id, category.name])?;
        }

        let mut stmt =
            conn.prepare("INSERT INTO role_qualities (role_id, quality_id) VALUES (?1, ?2)")?;
        for link in &self.role_qualities {
            stmt.execute(params![link.role, link.quality])?;
        }

        let mut stmt = conn.prepare(
            "INSERT INTO role_knowledge (role_id, knowledge_id, level, elective)
             VALUES (?1, ?2, COALESCE(?3, 1), ?4)",
        )?;
        for link in &self.role_knowledge {
            stmt.execute(params![link.role, link.knowledge, link.level, link.elective])?;
        }

        let mut stmt =
            conn.prepare("INSERT INTO role_pathways (role_id, pathway_id) VALUES (?1, ?2)")?;
        for link in &self.role_pathways {
            stmt.execute(params![link.role, link.pathway])?;
        }

        let mut stmt = conn.prepare(
            "INSERT INTO pathway_knowledge (pathway_id, knowledge_id, level, is_key, is_optional)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for link in &self.pathway_knowledge {
            stmt.execute(params![
                link.pathway,
                link.knowledge,
                link.level,
                link.key,
                link.optional
            ])?;
        }

        let mut stmt = conn
            .prepare("INSERT INTO category_knowledge (category_id, knowledge_id) VALUES (?1, ?2)")?;
        for link in &self.category_knowledge {
            stmt.execute(params![link.category, link.knowledge])?;
        }

        Ok(())
    }
}

fn entity_keys(rows: &[Entity]) -> impl Iterator<Item = (i64, &str)> {
    rows.iter().map(|e| (e.id, e.name.as_str()))
}

fn check_entities<'a>(
    kind: EntityKind,
    rows: impl Iterator<Item = (i64, &'a str)>,
) -> Result<HashSet<i64>, CatalogError> {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for (id, name) in rows {
        if name.trim().is_empty() {
            return Err(CatalogError::Validation(format!(
                "{kind} {id} has an empty name"
            )));
        }
        if !ids.insert(id) {
            return Err(CatalogError::Validation(format!("duplicate {kind} id {id}")));
        }
        if !names.insert(name) {
            return Err(CatalogError::Validation(format!(
                "duplicate {kind} name '{name}'"
            )));
        }
    }
    Ok(ids)
}

fn check_links(
    relation: &str,
    pairs: impl Iterator<Item = (i64, i64)>,
    (left_kind, left): (EntityKind, &HashSet<i64>),
    (right_kind, right): (EntityKind, &HashSet<i64>),
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for (a, b) in pairs {
        if !left.contains(&a) {
            return Err(CatalogError::Validation(format!(
                "{relation} references unknown {left_kind} {a}"
            )));
        }
        if !right.contains(&b) {
            return Err(CatalogError::Validation(format!(
                "{relation} references unknown {right_kind} {b}"
            )));
        }
        if !seen.insert((a, b)) {
            return Err(CatalogError::Validation(format!(
                "{relation} contains ({a}, {b}) more than once"
            )));
        }
    }
    Ok(())
}

impl CatalogStore {
    /// Write `data` if the role table is empty.
    ///
    /// Runs in a single transaction. Returns `true` if rows were written and
    /// `false` if the store already held a catalog, in which case `data` is
    /// not validated.
    ///
    /// # Errors
    ///
    /// Returns a validation error for inconsistent data, or a query error if
    /// the insertion fails (in which case nothing is written).
    pub async fn seed_if_empty(&self, data: SeedData) -> Result<bool, CatalogError> {
        self.with_writer(move |conn| {
            let tx = conn.unchecked_transaction()?;
            if count_roles(&tx)? > 0 {
                return Ok(false);
            }
            data.validate()?;
            data.insert(&tx)?;
            tx.commit()?;
            Ok(true)
        })
        .await
    }
}

/// Seed the store from `seed_file`, or the baseline catalog, unless it is
/// already populated.
///
/// A populated store is left alone without reading `seed_file`.
///
/// # Errors
///
/// Returns an error if the seed data cannot be loaded, is invalid, or cannot
/// be written.
pub async fn bootstrap(store: &CatalogStore, seed_file: Option<&Path>) -> Result<bool, CatalogError> {
    let roles = store.count_roles().await?;
    if roles > 0 {
        tracing::info!(roles, "Catalog already populated, skipping seed");
        return Ok(false);
    }

    let data = match seed_file {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading seed file");
            SeedData::read(path).await?
        }
        None => SeedData::baseline()?,
    };

    let seeded = store.seed_if_empty(data).await?;
    if seeded {
        tracing::info!(roles = store.count_roles().await?, "Seeded empty catalog");
    } else {
        tracing::info!("Catalog populated concurrently, skipping seed");
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
        roles = [{ id = 1, name = "Backend Developer" }]
        knowledge = [{ id = 2, name = "SQL" }]
        role_knowledge = [{ role = 1, knowledge = 2, level = 4 }]
    "#;

    #[test]
    fn test_baseline_parses_and_validates() {
        let data = SeedData::baseline().unwrap();
        assert_eq!(data.roles.len(), 4);
        assert_eq!(data.qualities.len(), 4);
        assert_eq!(data.pathways.len(), 3);
        assert!(!data.pathway_knowledge.is_empty());
        data.validate().unwrap();
    }

    #[test]
    fn test_parse_defaults() {
        let data = SeedData::from_toml_str(
            r#"
            roles = [{ id = 1, name = "Dev" }]
            knowledge = [{ id = 1, name = "SQL" }]
            pathways = [{ id = 1, name = "Web" }]
            role_knowledge = [{ role = 1, knowledge = 1 }]
            pathway_knowledge = [{ pathway = 1, knowledge = 1 }]
            "#,
        )
        .unwrap();

        assert!(data.qualities.is_empty());
        assert_eq!(data.role_knowledge[0].level, None);
        assert!(!data.role_knowledge[0].elective);
        assert_eq!(data.pathway_knowledge[0].level, 0);
        assert!(!data.pathway_knowledge[0].key);
    }

    #[test]
    fn test_parse_error() {
        let err = SeedData::from_toml_str("roles = 3").unwrap_err();
        assert!(matches!(err, CatalogError::SeedParse(_)));
    }

    #[test]
    fn test_validate_requires_a_role() {
        let err = SeedData::default().validate().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let mut data = SeedData::from_toml_str(SMALL).unwrap();
        data.knowledge.push(Entity::new(3, "SQL"));

        let err = data.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate knowledge name 'SQL'"));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut data = SeedData::from_toml_str(SMALL).unwrap();
        data.roles.push(Entity::new(1, "Frontend Developer"));

        let err = data.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate role id 1"));
    }

    #[test]
    fn test_validate_rejects_blank_names() {
        let mut data = SeedData::from_toml_str(SMALL).unwrap();
        data.qualities.push(Entity::new(1, "  "));

        assert!(data.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_validate_rejects_unknown_endpoints() {
        let mut data = SeedData::from_toml_str(SMALL).unwrap();
        data.role_pathways.push(RolePathwayLink {
            role: 1,
            pathway: 9,
        });

        let err = data.validate().unwrap_err();
        assert!(err
            .to_string()
            .contains("role_pathways references unknown pathway 9"));
    }

    #[test]
    fn test_validate_rejects_duplicate_pairs() {
        let mut data = SeedData::from_toml_str(SMALL).unwrap();
        data.role_knowledge.push(RoleKnowledgeLink {
            role: 1,
            knowledge: 2,
            level: None,
            elective: true,
        });

        let err = data.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[tokio::test]
    async fn test_seed_if_empty_runs_once() {
        let store = CatalogStore::open_in_memory().await.unwrap();
        let data = SeedData::from_toml_str(SMALL).unwrap();

        assert!(store.seed_if_empty(data.clone()).await.unwrap());
        assert!(!store.seed_if_empty(data).await.unwrap());
        assert_eq!(store.count_roles().await.unwrap(), 1);
        assert_eq!(store.list_knowledge().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_seed_writes_nothing() {
        let store = CatalogStore::open_in_memory().await.unwrap();
        let mut data = SeedData::from_toml_str(SMALL).unwrap();
        data.role_qualities.push(RoleQualityLink {
            role: 1,
            quality: 5,
        });

        assert!(store.seed_if_empty(data).await.is_err());
        assert_eq!(store.count_roles().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_populated_store_ignores_invalid_seed() {
        let store = CatalogStore::open_in_memory().await.unwrap();
        assert!(store
            .seed_if_empty(SeedData::from_toml_str(SMALL).unwrap())
            .await
            .unwrap());

        // Would fail validation on an empty store.
        let stale = SeedData::default();
        assert!(stale.validate().is_err());
        assert!(!store.seed_if_empty(stale).await.unwrap());
        assert_eq!(store.count_roles().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_populated_store_skips_seed_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let seed_path = temp_dir.path().join("seed.toml");
        std::fs::write(&seed_path, "roles = [{ id = 1, name = \"\" }]").unwrap();

        let store = CatalogStore::open_in_memory().await.unwrap();
        assert!(bootstrap(&store, None).await.unwrap());

        assert!(!bootstrap(&store, Some(&seed_path)).await.unwrap());
        assert!(!bootstrap(&store, Some(Path::new("/nonexistent/seed.toml")))
            .await
            .unwrap());
        assert_eq!(store.count_roles().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_bootstrap_uses_baseline() {
        let store = CatalogStore::open_in_memory().await.unwrap();

        assert!(bootstrap(&store, None).await.unwrap());
        assert_eq!(store.count_roles().await.unwrap(), 4);
        assert!(!bootstrap(&store, None).await.unwrap());
        assert_eq!(store.count_roles().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_bootstrap_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let seed_path = temp_dir.path().join("seed.toml");
        std::fs::write(&seed_path, SMALL).unwrap();

        let store = CatalogStore::open_in_memory().await.unwrap();
        assert!(bootstrap(&store, Some(&seed_path)).await.unwrap());

        let roles = store.list_roles().await.unwrap();
        assert_eq!(roles, vec![Entity::new(1, "Backend Developer")]);
    }

    #[tokio::test]
    async fn test_bootstrap_missing_file() {
        let store = CatalogStore::open_in_memory().await.unwrap();
        let err = bootstrap(&store, Some(Path::new("/nonexistent/seed.toml")))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::SeedRead { .. }));
    }
}
