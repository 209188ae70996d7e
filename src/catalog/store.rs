//! Entity store backed by `SQLite`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Params, Row};
use tokio::sync::Mutex;

use super::error::CatalogError;
use super::schema::{SCHEMA, SCHEMA_VERSION};
use super::types::{Category, Entity, EntityKind, Knowledge, PathwayItem, RoleKnowledge};

/// Read-only connections kept open for a file-backed store.
pub const READ_POOL_SIZE: u32 = 8;

/// Returns the default path for the catalog database.
///
/// This is `~/.local/share/role-catalog/catalog.db` on Unix systems.
#[must_use]
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("role-catalog")
        .join("catalog.db")
}

/// Read access to the catalog tables.
///
/// Every query runs on the blocking pool via `spawn_blocking`. A file-backed
/// store answers reads from a pool of read-only connections, so concurrent
/// queries never wait on each other; writes go through the single writer
/// connection. An in-memory store has only the writer connection.
#[derive(Clone)]
pub struct CatalogStore {
    writer: Arc<Mutex<Connection>>,
    readers: Option<Pool<SqliteConnectionManager>>,
    path: Option<PathBuf>,
}

impl fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogStore")
            .field("path", &self.path)
            .field("pooled_reads", &self.readers.is_some())
            .finish_non_exhaustive()
    }
}

impl CatalogStore {
    /// Open a catalog at the specified path.
    ///
    /// Creates parent directories if they don't exist and initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema cannot be applied.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent).await.map_err(|source| {
                    CatalogError::CreateDir {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        let path_clone = path.clone();
        let (writer, readers) = tokio::task::spawn_blocking(
            move || -> Result<(Connection, Pool<SqliteConnectionManager>), CatalogError> {
                let writer = Connection::open(&path_clone).map_err(|source| {
                    CatalogError::DatabaseOpen {
                        path: path_clone.clone(),
                        source,
                    }
                })?;
                // WAL lets the read-only connections run while the writer seeds.
                writer.pragma_update_and_check(None, "journal_mode", "wal", |row| {
                    row.get::<_, String>(0)
                })?;
                init_connection(&writer)?;

                let manager = SqliteConnectionManager::file(&path_clone).with_flags(
                    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                );
                let readers = Pool::builder().max_size(READ_POOL_SIZE).build(manager)?;
                Ok((writer, readers))
            },
        )
        .await
        .map_err(|_| CatalogError::TaskCancelled)??;

        tracing::debug!(
            path = %path.display(),
            readers = READ_POOL_SIZE,
            "Opened catalog database"
        );

        Ok(Self {
            writer: Arc::new(Mutex::new(writer)),
            readers: Some(readers),
            path: Some(path),
        })
    }

    /// Open an in-memory catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or the schema cannot be applied.
    pub async fn open_in_memory() -> Result<Self, CatalogError> {
        let conn = tokio::task::spawn_blocking(|| -> Result<Connection, CatalogError> {
            let conn = Connection::open_in_memory()?;
            init_connection(&conn)?;
            Ok(conn)
        })
        .await
        .map_err(|_| CatalogError::TaskCancelled)??;

        Ok(Self {
            writer: Arc::new(Mutex::new(conn)),
            readers: None,
            path: None,
        })
    }

    /// Returns the path to the database, if opened from a file.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run the read-only query `f` on the blocking pool.
    ///
    /// Uses a pooled read-only connection when the store is file-backed and
    /// the writer connection otherwise.
    pub(super) async fn with_conn<T, F>(&self, f: F) -> Result<T, CatalogError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, CatalogError> + Send + 'static,
    {
        let Some(readers) = self.readers.clone() else {
            return self.with_writer(f).await;
        };
        tokio::task::spawn_blocking(move || {
            let conn = readers.get()?;
            f(&conn)
        })
        .await
        .map_err(|_| CatalogError::TaskCancelled)?
    }

    /// Run `f` against the writer connection on the blocking pool.
    pub(super) async fn with_writer<T, F>(&self, f: F) -> Result<T, CatalogError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, CatalogError> + Send + 'static,
    {
        let conn = self.writer.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await
        .map_err(|_| CatalogError::TaskCancelled)?
    }

    /// List all roles, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_roles(&self) -> Result<Vec<Entity>, CatalogError> {
        self.list(EntityKind::Role).await
    }

    /// List all qualities, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_qualities(&self) -> Result<Vec<Entity>, CatalogError> {
        self.list(EntityKind::Quality).await
    }

    /// List all knowledge items, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_knowledge(&self) -> Result<Vec<Entity>, CatalogError> {
        self.list(EntityKind::Knowledge).await
    }

    /// List all pathways, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_pathways(&self) -> Result<Vec<Entity>, CatalogError> {
        self.list(EntityKind::Pathway).await
    }

    /// List all categories, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY id")?;
            let rows = stmt
                .query_map([], category_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<Entity>, CatalogError> {
        let sql = format!(
            "SELECT id, name, description FROM {} ORDER BY id",
            kind.table()
        );
        self.with_conn(move |conn| query_entities(conn, &sql, [])).await
    }

    /// Count the rows of the role table.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_roles(&self) -> Result<u64, CatalogError> {
        self.with_conn(count_roles).await
    }

    /// Look up a role by primary key.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no role has this id.
    pub async fn get_role_by_id(&self, id: i64) -> Result<Entity, CatalogError> {
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, name, description FROM roles WHERE id = ?1",
                params![id],
                entity_from_row,
            )
            .optional()?
            .ok_or_else(|| CatalogError::not_found(EntityKind::Role, id))
        })
        .await
    }

    /// Look up a knowledge item by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no item has this name.
    pub async fn get_knowledge_by_name(&self, name: &str) -> Result<Entity, CatalogError> {
        self.get_by_name(EntityKind::Knowledge, name).await
    }

    /// Look up a quality by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no quality has this name.
    pub async fn get_quality_by_name(&self, name: &str) -> Result<Entity, CatalogError> {
        self.get_by_name(EntityKind::Quality, name).await
    }

    /// Look up a pathway by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no pathway has this name.
    pub async fn get_pathway_by_name(&self, name: &str) -> Result<Entity, CatalogError> {
        self.get_by_name(EntityKind::Pathway, name).await
    }

    async fn get_by_name(&self, kind: EntityKind, name: &str) -> Result<Entity, CatalogError> {
        // Names are unique in the schema; the ORDER BY keeps the lookup
        // deterministic for databases created without the constraint.
        let sql = format!(
            "SELECT id, name, description FROM {} WHERE name = ?1 ORDER BY id LIMIT 1",
            kind.table()
        );
        let name = name.to_string();
        self.with_conn(move |conn| {
            conn.query_row(&sql, params![name], entity_from_row)
                .optional()?
                .ok_or_else(|| CatalogError::not_found(kind, &name))
        })
        .await
    }

    /// Qualities linked to a role, in relation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn role_qualities(&self, role_id: i64) -> Result<Vec<Entity>, CatalogError> {
        self.with_conn(move |conn| {
            query_entities(
                conn,
                "SELECT q.id, q.name, q.description
                 FROM role_qualities rq JOIN qualities q ON q.id = rq.quality_id
                 WHERE rq.role_id = ?1 ORDER BY rq.rowid",
                params![role_id],
            )
        })
        .await
    }

    /// Knowledge items required by a role, with proficiency level and elective flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn role_knowledge(&self, role_id: i64) -> Result<Vec<RoleKnowledge>, CatalogError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT k.id, k.name, k.description, rk.level, rk.elective
                 FROM role_knowledge rk JOIN knowledge k ON k.id = rk.knowledge_id
                 WHERE rk.role_id = ?1 ORDER BY rk.rowid",
            )?;
            let rows = stmt
                .query_map(params![role_id], |row| {
                    let level: Option<i64> = row.get(3)?;
                    let elective: Option<bool> = row.get(4)?;
                    Ok(RoleKnowledge {
                        knowledge: entity_from_row(row)?,
                        level: level.unwrap_or(1),
                        elective: elective.unwrap_or(false),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Pathways linked to a role, in relation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn role_pathways(&self, role_id: i64) -> Result<Vec<Entity>, CatalogError> {
        self.with_conn(move |conn| {
            query_entities(
                conn,
                "SELECT p.id, p.name, p.description
                 FROM role_pathways rp JOIN pathways p ON p.id = rp.pathway_id
                 WHERE rp.role_id = ?1 ORDER BY rp.rowid",
                params![role_id],
            )
        })
        .await
    }

    /// Roles that require a quality, ordered by role id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn quality_roles(&self, quality_id: i64) -> Result<Vec<Entity>, CatalogError> {
        self.with_conn(move |conn| {
            query_entities(
                conn,
                "SELECT r.id, r.name, r.description
                 FROM role_qualities rq JOIN roles r ON r.id = rq.role_id
                 WHERE rq.quality_id = ?1 ORDER BY r.id",
                params![quality_id],
            )
        })
        .await
    }

    /// Pathways followed by any role that requires a quality, ordered by pathway id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn quality_pathways(&self, quality_id: i64) -> Result<Vec<Entity>, CatalogError> {
        self.with_conn(move |conn| {
            query_entities(
                conn,
                "SELECT p.id, p.name, p.description
                 FROM role_qualities rq
                 JOIN roles r ON r.id = rq.role_id
                 JOIN role_pathways rp ON rp.role_id = r.id
                 JOIN pathways p ON p.id = rp.pathway_id
                 WHERE rq.quality_id = ?1 ORDER BY p.id",
                params![quality_id],
            )
        })
        .await
    }

    /// Roles that require a knowledge item, ordered by role id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn knowledge_roles(&self, knowledge_id: i64) -> Result<Vec<Entity>, CatalogError> {
        self.with_conn(move |conn| {
            query_entities(
                conn,
                "SELECT r.id, r.name, r.description
                 FROM role_knowledge rk JOIN roles r ON r.id = rk.role_id
                 WHERE rk.knowledge_id = ?1 ORDER BY r.id",
                params![knowledge_id],
            )
        })
        .await
    }

    /// Pathways that teach a knowledge item, ordered by pathway id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn knowledge_pathways(
        &self,
        knowledge_id: i64,
    ) -> Result<Vec<Entity>, CatalogError> {
        self.with_conn(move |conn| {
            query_entities(
                conn,
                "SELECT p.id, p.name, p.description
                 FROM pathway_knowledge pk JOIN pathways p ON p.id = pk.pathway_id
                 WHERE pk.knowledge_id = ?1 ORDER BY p.id",
                params![knowledge_id],
            )
        })
        .await
    }

    /// Categories a knowledge item belongs to, ordered by category id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn knowledge_categories(
        &self,
        knowledge_id: i64,
    ) -> Result<Vec<Category>, CatalogError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.name
                 FROM category_knowledge ck JOIN categories c ON c.id = ck.category_id
                 WHERE ck.knowledge_id = ?1 ORDER BY c.id",
            )?;
            let rows = stmt
                .query_map(params![knowledge_id], category_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Other knowledge items taught in any pathway that teaches this one.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn related_knowledge(
        &self,
        knowledge_id: i64,
    ) -> Result<Vec<Knowledge>, CatalogError> {
        self.with_conn(move |conn| {
            query_entities(
                conn,
                "SELECT k.id, k.name, k.description
                 FROM pathway_knowledge mine
                 JOIN pathways p ON p.id = mine.pathway_id
                 JOIN pathway_knowledge other ON other.pathway_id = mine.pathway_id
                 JOIN knowledge k ON k.id = other.knowledge_id
                 WHERE mine.knowledge_id = ?1 AND other.knowledge_id <> ?1
                 ORDER BY k.id",
                params![knowledge_id],
            )
        })
        .await
    }

    /// Knowledge items of a pathway as `(level, item)` pairs in relation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn pathway_items(
        &self,
        pathway_id: i64,
    ) -> Result<Vec<(i64, PathwayItem)>, CatalogError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT k.id, k.name, k.description, pk.level, pk.is_key, pk.is_optional
                 FROM pathway_knowledge pk JOIN knowledge k ON k.id = pk.knowledge_id
                 WHERE pk.pathway_id = ?1 ORDER BY pk.rowid",
            )?;
            let rows = stmt
                .query_map(params![pathway_id], |row| {
                    let level: i64 = row.get(3)?;
                    let key: Option<bool> = row.get(4)?;
                    let optional: Option<bool> = row.get(5)?;
                    Ok((
                        level,
                        PathwayItem {
                            knowledge: entity_from_row(row)?,
                            key: key.unwrap_or(false),
                            optional: optional.unwrap_or(false),
                        },
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }

    /// Roles directly linked to a pathway, ordered by role id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn pathway_roles(&self, pathway_id: i64) -> Result<Vec<Entity>, CatalogError> {
        self.with_conn(move |conn| {
            query_entities(
                conn,
                "SELECT r.id, r.name, r.description
                 FROM role_pathways rp JOIN roles r ON r.id = rp.role_id
                 WHERE rp.pathway_id = ?1 ORDER BY r.id",
                params![pathway_id],
            )
        })
        .await
    }
}

fn init_connection(conn: &Connection) -> Result<(), CatalogError> {
    conn.execute_batch(SCHEMA)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        params![SCHEMA_VERSION],
    )?;
    Ok(())
}

pub(super) fn count_roles(conn: &Connection) -> Result<u64, CatalogError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM roles", [], |row| row.get(0))?;
    Ok(count.unsigned_abs())
}

fn entity_from_row(row: &Row<'_>) -> rusqlite::Result<Entity> {
    Ok(Entity {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn query_entities<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Entity>, CatalogError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, entity_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
