//! SQLite Repository Implementation
//!
//! One connection behind a mutex, shared by clones of [`SqliteStore`].
//! The same store value implements all three repository traits.
//!
//! ## Schema
//! - `groups` / `traits`: display name plus `name_key` (normalized,
//!   `UNIQUE`). The constraint is what makes create-if-absent safe
//!   across processes sharing one file.
//! - `pets`: scalar columns plus `group_id`.
//! - `pet_traits`: the many-to-many join; rows cascade with their pet.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use kennel_domain::{
    normalize_name, Group, GroupId, GroupRepository, NewGroup, NewTrait, Pet, PetDraft, PetFilter,
    PetId, PetRepository, RepositoryError, Sex, Trait, TraitId, TraitRepository,
};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::debug;

// ── Schema ────────────────────────────────────────────────────────────────────

fn init_schema(conn: &Connection) -> Result<(), RepositoryError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            scientific_name TEXT NOT NULL,
            name_key TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS traits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            name_key TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS pets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            weight REAL NOT NULL,
            sex TEXT NOT NULL,
            group_id INTEGER NOT NULL REFERENCES groups(id)
        );

        CREATE TABLE IF NOT EXISTS pet_traits (
            pet_id INTEGER NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
            trait_id INTEGER NOT NULL REFERENCES traits(id),
            PRIMARY KEY (pet_id, trait_id)
        );
        ",
    )
    .map_err(|e| RepositoryError::persistence(format!("sqlite: initialize schema: {e}")))
}

// ── Error mapping ─────────────────────────────────────────────────────────────

fn storage_error(context: &str, err: rusqlite::Error) -> RepositoryError {
    RepositoryError::persistence(format!("sqlite: {context}: {err}"))
}

fn insert_error(entity: &'static str, key: String, err: rusqlite::Error) -> RepositoryError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            RepositoryError::Conflict { entity, key }
        }
        _ => storage_error(&format!("insert {entity}"), err),
    }
}

// ── Row mapping ───────────────────────────────────────────────────────────────

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group::new(GroupId::new(row.get::<_, i64>(0)? as u64), row.get::<_, String>(1)?))
}

fn trait_from_row(row: &Row<'_>) -> rusqlite::Result<Trait> {
    Ok(Trait::new(TraitId::new(row.get::<_, i64>(0)? as u64), row.get::<_, String>(1)?))
}

/// A `pets` row before its trait ids are attached
struct PetRow {
    id: PetId,
    name: String,
    age: u32,
    weight: f64,
    sex: String,
    group_id: GroupId,
}

const PET_COLUMNS: &str = "id, name, age, weight, sex, group_id";

fn pet_row(row: &Row<'_>) -> rusqlite::Result<PetRow> {
    Ok(PetRow {
        id: PetId::new(row.get::<_, i64>(0)? as u64),
        name: row.get(1)?,
        age: row.get::<_, i64>(2)? as u32,
        weight: row.get(3)?,
        sex: row.get(4)?,
        group_id: GroupId::new(row.get::<_, i64>(5)? as u64),
    })
}

fn load_trait_ids(conn: &Connection, pet: PetId) -> Result<BTreeSet<TraitId>, RepositoryError> {
    let mut stmt = conn
        .prepare_cached("SELECT trait_id FROM pet_traits WHERE pet_id = ?1")
        .map_err(|e| storage_error("prepare trait ids", e))?;
    let ids = stmt
        .query_map(params![pet.value() as i64], |row| row.get::<_, i64>(0))
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .map_err(|e| storage_error("load trait ids", e))?;
    Ok(ids.into_iter().map(|id| TraitId::new(id as u64)).collect())
}

fn hydrate(conn: &Connection, row: PetRow) -> Result<Pet, RepositoryError> {
    let sex = Sex::from_label(&row.sex).ok_or_else(|| {
        RepositoryError::persistence(format!("sqlite: pet {} has unknown sex '{}'", row.id, row.sex))
    })?;
    let trait_ids = load_trait_ids(conn, row.id)?;
    Ok(Pet::from_draft(
        row.id,
        PetDraft {
            name: row.name,
            age: row.age,
            weight: row.weight,
            sex,
            group_id: row.group_id,
            trait_ids,
        },
    ))
}

fn write_trait_ids(
    conn: &Connection,
    pet: PetId,
    trait_ids: &BTreeSet<TraitId>,
) -> Result<(), RepositoryError> {
    conn.execute("DELETE FROM pet_traits WHERE pet_id = ?1", params![pet.value() as i64])
        .map_err(|e| storage_error("clear pet traits", e))?;
    for id in trait_ids {
        conn.execute(
            "INSERT INTO pet_traits (pet_id, trait_id) VALUES (?1, ?2)",
            params![pet.value() as i64, id.value() as i64],
        )
        .map_err(|e| storage_error("attach pet trait", e))?;
    }
    Ok(())
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// SQLite-backed store for pets, groups and traits
#[derive(Debug, Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path)
            .map_err(|e| storage_error(&format!("open {}", path.display()), e))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| storage_error("set journal_mode WAL", e))?;
        conn.pragma_update(None, "busy_timeout", 5000)
            .map_err(|e| storage_error("set busy_timeout", e))?;
        debug!(path = %path.display(), "sqlite store opened");
        Self::from_connection(conn)
    }

    /// Private in-memory database, mostly for tests
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        let conn = Connection::open_in_memory().map_err(|e| storage_error("open in-memory", e))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, RepositoryError> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| storage_error("set foreign_keys ON", e))?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|_| RepositoryError::persistence("sqlite: connection lock poisoned"))
    }
}

impl PetRepository for SqliteStore {
    fn insert(&mut self, draft: PetDraft) -> Result<Pet, RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| storage_error("begin transaction", e))?;

        tx.execute(
            "INSERT INTO pets (name, age, weight, sex, group_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.name,
                draft.age as i64,
                draft.weight,
                draft.sex.label(),
                draft.group_id.value() as i64
            ],
        )
        .map_err(|e| storage_error("insert pet", e))?;
        let id = PetId::new(tx.last_insert_rowid() as u64);
        write_trait_ids(&tx, id, &draft.trait_ids)?;

        tx.commit().map_err(|e| storage_error("commit pet", e))?;
        Ok(Pet::from_draft(id, draft))
    }

    fn save(&mut self, pet: &Pet) -> Result<(), RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| storage_error("begin transaction", e))?;

        let updated = tx
            .execute(
                "UPDATE pets SET name = ?1, age = ?2, weight = ?3, sex = ?4, group_id = ?5
                 WHERE id = ?6",
                params![
                    pet.name(),
                    pet.age() as i64,
                    pet.weight(),
                    pet.sex().label(),
                    pet.group_id().value() as i64,
                    pet.id().value() as i64
                ],
            )
            .map_err(|e| storage_error("update pet", e))?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "pet",
                id: pet.id().to_string(),
            });
        }
        write_trait_ids(&tx, pet.id(), pet.trait_ids())?;

        tx.commit().map_err(|e| storage_error("commit pet", e))
    }

    fn find_by_id(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {PET_COLUMNS} FROM pets WHERE id = ?1"),
                params![id.value() as i64],
                pet_row,
            )
            .optional()
            .map_err(|e| storage_error("find pet", e))?;
        row.map(|row| hydrate(&conn, row)).transpose()
    }

    fn delete(&mut self, id: PetId) -> Result<bool, RepositoryError> {
        let conn = self.lock()?;
        let deleted = conn
            .execute("DELETE FROM pets WHERE id = ?1", params![id.value() as i64])
            .map_err(|e| storage_error("delete pet", e))?;
        Ok(deleted > 0)
    }

    fn list(
        &self,
        filter: PetFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Pet>, RepositoryError> {
        let conn = self.lock()?;
        let rows = match filter {
            PetFilter::All => conn
                .prepare_cached(&format!(
                    "SELECT {PET_COLUMNS} FROM pets ORDER BY id LIMIT ?1 OFFSET ?2"
                ))
                .and_then(|mut stmt| {
                    let rows = stmt
                        .query_map(params![limit as i64, offset as i64], pet_row)?
                        .collect::<rusqlite::Result<Vec<_>>>();
                    rows
                }),
            PetFilter::WithTrait(trait_id) => conn
                .prepare_cached(&format!(
                    "SELECT {PET_COLUMNS} FROM pets
                     WHERE id IN (SELECT pet_id FROM pet_traits WHERE trait_id = ?1)
                     ORDER BY id LIMIT ?2 OFFSET ?3"
                ))
                .and_then(|mut stmt| {
                    let rows = stmt
                        .query_map(
                            params![trait_id.value() as i64, limit as i64, offset as i64],
                            pet_row,
                        )?
                        .collect::<rusqlite::Result<Vec<_>>>();
                    rows
                }),
        }
        .map_err(|e| storage_error("list pets", e))?;

        rows.into_iter().map(|row| hydrate(&conn, row)).collect()
    }

    fn count(&self, filter: PetFilter) -> Result<usize, RepositoryError> {
        let conn = self.lock()?;
        let count: i64 = match filter {
            PetFilter::All => conn.query_row("SELECT COUNT(*) FROM pets", [], |row| row.get(0)),
            PetFilter::WithTrait(trait_id) => conn.query_row(
                "SELECT COUNT(*) FROM pet_traits WHERE trait_id = ?1",
                params![trait_id.value() as i64],
                |row| row.get(0),
            ),
        }
        .map_err(|e| storage_error("count pets", e))?;
        Ok(count as usize)
    }
}

impl GroupRepository for SqliteStore {
    fn create(&mut self, candidate: &NewGroup) -> Result<Group, RepositoryError> {
        let conn = self.lock()?;
        let key = candidate.normalized_name();
        conn.execute(
            "INSERT INTO groups (scientific_name, name_key) VALUES (?1, ?2)",
            params![candidate.scientific_name, key],
        )
        .map_err(|e| insert_error("group", key.clone(), e))?;
        Ok(Group::from_candidate(
            GroupId::new(conn.last_insert_rowid() as u64),
            candidate,
        ))
    }

    fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, RepositoryError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, scientific_name FROM groups WHERE id = ?1",
            params![id.value() as i64],
            group_from_row,
        )
        .optional()
        .map_err(|e| storage_error("find group", e))
    }

    fn find_by_scientific_name(
        &self,
        scientific_name: &str,
    ) -> Result<Option<Group>, RepositoryError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, scientific_name FROM groups WHERE name_key = ?1",
            params![normalize_name(scientific_name)],
            group_from_row,
        )
        .optional()
        .map_err(|e| storage_error("find group by name", e))
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM groups", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(|e| storage_error("count groups", e))
    }
}

impl TraitRepository for SqliteStore {
    fn create(&mut self, candidate: &NewTrait) -> Result<Trait, RepositoryError> {
        let conn = self.lock()?;
        let key = candidate.normalized_name();
        conn.execute(
            "INSERT INTO traits (name, name_key) VALUES (?1, ?2)",
            params![candidate.name, key],
        )
        .map_err(|e| insert_error("trait", key.clone(), e))?;
        Ok(Trait::from_candidate(
            TraitId::new(conn.last_insert_rowid() as u64),
            candidate,
        ))
    }

    fn find_by_id(&self, id: TraitId) -> Result<Option<Trait>, RepositoryError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, name FROM traits WHERE id = ?1",
            params![id.value() as i64],
            trait_from_row,
        )
        .optional()
        .map_err(|e| storage_error("find trait", e))
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Trait>, RepositoryError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, name FROM traits WHERE name_key = ?1",
            params![normalize_name(name)],
            trait_from_row,
        )
        .optional()
        .map_err(|e| storage_error("find trait by name", e))
    }

    fn find_by_exact_name(&self, name: &str) -> Result<Option<Trait>, RepositoryError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, name FROM traits WHERE name = ?1",
            params![name],
            trait_from_row,
        )
        .optional()
        .map_err(|e| storage_error("find trait by exact name", e))
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM traits", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(|e| storage_error("count traits", e))
    }
}
