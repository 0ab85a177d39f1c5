//! Error types for pet operations

use kennel_domain::{GroupId, PetId, RepositoryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PetServiceError {
    #[error("Pet {0} not found")]
    PetNotFound(PetId),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    /// The store returned a pet whose group row is gone
    #[error("Pet {pet} references missing group {group}")]
    MissingGroup { pet: PetId, group: GroupId },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, PetServiceError>;
