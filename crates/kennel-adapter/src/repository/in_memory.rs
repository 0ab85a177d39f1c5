//! In-Memory Repository Implementations
//!
//! Simple in-memory implementations of the repository traits.
//! The default backend, and what the tests run against.
//!
//! Groups and traits keep a normalized-name index next to their rows;
//! `create` checks it under the same write lock that inserts, so two
//! creates of one name can never both succeed.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use kennel_domain::{
    normalize_name, Group, GroupId, GroupRepository, NewGroup, NewTrait, Pet, PetDraft, PetFilter,
    PetId, PetRepository, RepositoryError, Trait, TraitId, TraitRepository,
};

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, RepositoryError> {
    lock.read()
        .map_err(|_| RepositoryError::persistence("Failed to acquire read lock"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, RepositoryError> {
    lock.write()
        .map_err(|_| RepositoryError::persistence("Failed to acquire write lock"))
}

#[derive(Debug, Default)]
struct PetTable {
    rows: BTreeMap<PetId, Pet>,
    last_id: u64,
}

/// In-memory Pet Repository
///
/// Thread-safe implementation using RwLock. Ids are never reused.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPetRepository {
    table: Arc<RwLock<PetTable>>,
}

impl InMemoryPetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PetRepository for InMemoryPetRepository {
    fn insert(&mut self, draft: PetDraft) -> Result<Pet, RepositoryError> {
        let mut table = write(&self.table)?;
        table.last_id += 1;
        let pet = Pet::from_draft(PetId::new(table.last_id), draft);
        table.rows.insert(pet.id(), pet.clone());
        Ok(pet)
    }

    fn save(&mut self, pet: &Pet) -> Result<(), RepositoryError> {
        let mut table = write(&self.table)?;
        match table.rows.get_mut(&pet.id()) {
            Some(row) => {
                *row = pet.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                entity: "pet",
                id: pet.id().to_string(),
            }),
        }
    }

    fn find_by_id(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        Ok(read(&self.table)?.rows.get(&id).cloned())
    }

    fn delete(&mut self, id: PetId) -> Result<bool, RepositoryError> {
        Ok(write(&self.table)?.rows.remove(&id).is_some())
    }

    fn list(
        &self,
        filter: PetFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Pet>, RepositoryError> {
        let table = read(&self.table)?;
        Ok(table
            .rows
            .values()
            .filter(|p| filter.matches(p))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn count(&self, filter: PetFilter) -> Result<usize, RepositoryError> {
        let table = read(&self.table)?;
        Ok(table.rows.values().filter(|p| filter.matches(p)).count())
    }
}

#[derive(Debug, Default)]
struct GroupTable {
    rows: BTreeMap<GroupId, Group>,
    by_name: HashMap<String, GroupId>,
    last_id: u64,
}

/// In-memory Group Repository
#[derive(Debug, Clone, Default)]
pub struct InMemoryGroupRepository {
    table: Arc<RwLock<GroupTable>>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GroupRepository for InMemoryGroupRepository {
    fn create(&mut self, candidate: &NewGroup) -> Result<Group, RepositoryError> {
        let mut table = write(&self.table)?;
        let key = candidate.normalized_name();
        if table.by_name.contains_key(&key) {
            return Err(RepositoryError::Conflict { entity: "group", key });
        }

        table.last_id += 1;
        let group = Group::from_candidate(GroupId::new(table.last_id), candidate);
        table.by_name.insert(key, group.id());
        table.rows.insert(group.id(), group.clone());
        Ok(group)
    }

    fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, RepositoryError> {
        Ok(read(&self.table)?.rows.get(&id).cloned())
    }

    fn find_by_scientific_name(
        &self,
        scientific_name: &str,
    ) -> Result<Option<Group>, RepositoryError> {
        let table = read(&self.table)?;
        Ok(table
            .by_name
            .get(&normalize_name(scientific_name))
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(read(&self.table)?.rows.len())
    }
}

#[derive(Debug, Default)]
struct TraitTable {
    rows: BTreeMap<TraitId, Trait>,
    by_name: HashMap<String, TraitId>,
    last_id: u64,
}

/// In-memory Trait Repository
#[derive(Debug, Clone, Default)]
pub struct InMemoryTraitRepository {
    table: Arc<RwLock<TraitTable>>,
}

impl InMemoryTraitRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TraitRepository for InMemoryTraitRepository {
    fn create(&mut self, candidate: &NewTrait) -> Result<Trait, RepositoryError> {
        let mut table = write(&self.table)?;
        let key = candidate.normalized_name();
        if table.by_name.contains_key(&key) {
            return Err(RepositoryError::Conflict { entity: "trait", key });
        }

        table.last_id += 1;
        let t = Trait::from_candidate(TraitId::new(table.last_id), candidate);
        table.by_name.insert(key, t.id());
        table.rows.insert(t.id(), t.clone());
        Ok(t)
    }

    fn find_by_id(&self, id: TraitId) -> Result<Option<Trait>, RepositoryError> {
        Ok(read(&self.table)?.rows.get(&id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Trait>, RepositoryError> {
        let table = read(&self.table)?;
        Ok(table
            .by_name
            .get(&normalize_name(name))
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    fn find_by_exact_name(&self, name: &str) -> Result<Option<Trait>, RepositoryError> {
        let table = read(&self.table)?;
        Ok(table.rows.values().find(|t| t.name() == name).cloned())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(read(&self.table)?.rows.len())
    }

    fn find_many(&self, ids: &[TraitId]) -> Result<Vec<Trait>, RepositoryError> {
        let table = read(&self.table)?;
        Ok(ids.iter().filter_map(|id| table.rows.get(id)).cloned().collect())
    }
}
