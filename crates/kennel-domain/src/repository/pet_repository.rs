//! Pet Repository - Abstract persistence for Pets
//!
//! Trait associations are part of the pet record: saving a pet
//! persists its full trait set.

use crate::model::pet::{Pet, PetDraft, PetId};
use crate::model::pet_trait::TraitId;

/// Errors that can occur during repository operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Row not found where one was required (e.g. saving a deleted pet)
    NotFound { entity: &'static str, id: String },
    /// A uniqueness constraint rejected the write
    Conflict { entity: &'static str, key: String },
    /// Failed to persist
    PersistenceError { message: String },
}

impl RepositoryError {
    pub fn persistence(message: impl Into<String>) -> Self {
        RepositoryError::PersistenceError {
            message: message.into(),
        }
    }
}

impl core::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RepositoryError::NotFound { entity, id } => {
                write!(f, "{} not found: {}", entity, id)
            }
            RepositoryError::Conflict { entity, key } => {
                write!(f, "{} already exists: {}", entity, key)
            }
            RepositoryError::PersistenceError { message } => {
                write!(f, "Persistence error: {}", message)
            }
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Which pets a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PetFilter {
    #[default]
    All,
    /// Only pets associated with this trait
    WithTrait(TraitId),
}

impl PetFilter {
    pub fn matches(&self, pet: &Pet) -> bool {
        match self {
            PetFilter::All => true,
            PetFilter::WithTrait(id) => pet.has_trait(*id),
        }
    }
}

/// Pet Repository Trait
///
/// Listings are ordered by ascending pet id so pages are stable.
pub trait PetRepository {
    /// Persist a new pet, assigning its id
    fn insert(&mut self, draft: PetDraft) -> Result<Pet, RepositoryError>;

    /// Overwrite an existing pet, including its trait set
    fn save(&mut self, pet: &Pet) -> Result<(), RepositoryError>;

    fn find_by_id(&self, id: PetId) -> Result<Option<Pet>, RepositoryError>;

    /// Delete a pet. Returns false if there was nothing to delete.
    fn delete(&mut self, id: PetId) -> Result<bool, RepositoryError>;

    /// One window of the filtered listing
    fn list(
        &self,
        filter: PetFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Pet>, RepositoryError>;

    fn count(&self, filter: PetFilter) -> Result<usize, RepositoryError>;

    fn exists(&self, id: PetId) -> Result<bool, RepositoryError> {
        Ok(self.find_by_id(id)?.is_some())
    }
}

impl<R: PetRepository + ?Sized> PetRepository for Box<R> {
    fn insert(&mut self, draft: PetDraft) -> Result<Pet, RepositoryError> {
        (**self).insert(draft)
    }

    fn save(&mut self, pet: &Pet) -> Result<(), RepositoryError> {
        (**self).save(pet)
    }

    fn find_by_id(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn delete(&mut self, id: PetId) -> Result<bool, RepositoryError> {
        (**self).delete(id)
    }

    fn list(
        &self,
        filter: PetFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Pet>, RepositoryError> {
        (**self).list(filter, offset, limit)
    }

    fn count(&self, filter: PetFilter) -> Result<usize, RepositoryError> {
        (**self).count(filter)
    }

    fn exists(&self, id: PetId) -> Result<bool, RepositoryError> {
        (**self).exists(id)
    }
}
