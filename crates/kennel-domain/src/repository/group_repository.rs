//! Group Repository - Abstract persistence for Groups
//!
//! Implementations MUST reject `create` when a group with the same
//! normalized scientific name exists, returning `RepositoryError::Conflict`.

use crate::model::group::{Group, GroupId, NewGroup};
use crate::repository::pet_repository::RepositoryError;

/// Group Repository Trait
pub trait GroupRepository {
    /// Persist a new group from a candidate
    fn create(&mut self, candidate: &NewGroup) -> Result<Group, RepositoryError>;

    fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, RepositoryError>;

    /// Find a group by scientific name, ignoring case
    fn find_by_scientific_name(
        &self,
        scientific_name: &str,
    ) -> Result<Option<Group>, RepositoryError>;

    fn count(&self) -> Result<usize, RepositoryError>;
}

impl<R: GroupRepository + ?Sized> GroupRepository for Box<R> {
    fn create(&mut self, candidate: &NewGroup) -> Result<Group, RepositoryError> {
        (**self).create(candidate)
    }

    fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn find_by_scientific_name(
        &self,
        scientific_name: &str,
    ) -> Result<Option<Group>, RepositoryError> {
        (**self).find_by_scientific_name(scientific_name)
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        (**self).count()
    }
}
