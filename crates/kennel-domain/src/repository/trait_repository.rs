//! Trait Repository - Abstract persistence for Traits
//!
//! Two lookups by name exist on purpose: `find_by_name` ignores case and
//! backs reconciliation, `find_by_exact_name` is case-sensitive and backs
//! the pet list filter.

use crate::model::pet_trait::{NewTrait, Trait, TraitId};
use crate::repository::pet_repository::RepositoryError;

pub trait TraitRepository {
    /// Persist a new trait. Conflicts on an existing normalized name.
    fn create(&mut self, candidate: &NewTrait) -> Result<Trait, RepositoryError>;

    fn find_by_id(&self, id: TraitId) -> Result<Option<Trait>, RepositoryError>;

    /// Find a trait by name, ignoring case
    fn find_by_name(&self, name: &str) -> Result<Option<Trait>, RepositoryError>;

    /// Find a trait whose name is exactly `name`
    fn find_by_exact_name(&self, name: &str) -> Result<Option<Trait>, RepositoryError>;

    fn count(&self) -> Result<usize, RepositoryError>;

    /// Load several traits, skipping ids that no longer exist
    fn find_many(&self, ids: &[TraitId]) -> Result<Vec<Trait>, RepositoryError> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(t) = self.find_by_id(*id)? {
                found.push(t);
            }
        }
        Ok(found)
    }
}

impl<R: TraitRepository + ?Sized> TraitRepository for Box<R> {
    fn create(&mut self, candidate: &NewTrait) -> Result<Trait, RepositoryError> {
        (**self).create(candidate)
    }

    fn find_by_id(&self, id: TraitId) -> Result<Option<Trait>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Trait>, RepositoryError> {
        (**self).find_by_name(name)
    }

    fn find_by_exact_name(&self, name: &str) -> Result<Option<Trait>, RepositoryError> {
        (**self).find_by_exact_name(name)
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        (**self).count()
    }

    fn find_many(&self, ids: &[TraitId]) -> Result<Vec<Trait>, RepositoryError> {
        (**self).find_many(ids)
    }
}
