//! # Kennel Domain Layer
//!
//! Pure business logic for the pets API, with zero external dependencies.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (This Crate)                     │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  model/     - Pet, Group, Trait and their candidates        ││
//! │  │  repository/- Trait definitions (not implementations)       ││
//! │  │  service/   - Domain services (Reconciler)                  ││
//! │  └─────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! HTTP, JSON and SQL never reach this crate. If we switch from SQLite to
//! PostgreSQL, nothing here changes.

pub mod model;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use model::{
    group::{Group, GroupId, NewGroup},
    name::normalize_name,
    pet::{NewPet, Pet, PetDraft, PetId, PetPatch, Sex},
    pet_trait::{NewTrait, Trait, TraitId},
};

pub use repository::{
    group_repository::GroupRepository,
    pet_repository::{PetFilter, PetRepository, RepositoryError},
    trait_repository::TraitRepository,
};

pub use service::reconciler::{Reconciler, Resolution};
