//! Persistence Adapters - Repository implementations
//!
//! These implement the repository traits from kennel-domain.

pub mod in_memory;
pub mod sqlite;

use kennel_domain::{GroupRepository, PetRepository, TraitRepository};
use kennel_usecase::{DynPetService, PetService};
use shared::{KennelError, StorageConfig};

use in_memory::{InMemoryGroupRepository, InMemoryPetRepository, InMemoryTraitRepository};
use sqlite::SqliteStore;

/// Build a `PetService` on the backend named by `storage`
pub fn open_pet_service(storage: &StorageConfig, page_size: usize) -> shared::Result<DynPetService> {
    let service: DynPetService = match storage {
        StorageConfig::Memory => PetService::new(
            Box::new(InMemoryPetRepository::new()) as Box<dyn PetRepository + Send>,
            Box::new(InMemoryGroupRepository::new()) as Box<dyn GroupRepository + Send>,
            Box::new(InMemoryTraitRepository::new()) as Box<dyn TraitRepository + Send>,
            page_size,
        ),
        StorageConfig::Sqlite { path } => {
            let store =
                SqliteStore::open(path).map_err(|e| KennelError::Storage(e.to_string()))?;
            PetService::new(
                Box::new(store.clone()) as Box<dyn PetRepository + Send>,
                Box::new(store.clone()) as Box<dyn GroupRepository + Send>,
                Box::new(store) as Box<dyn TraitRepository + Send>,
                page_size,
            )
        }
    };
    Ok(service)
}
