//! # Kennel Use Case Layer
//!
//! Application-specific business rules.
//! `PetService` orchestrates the repositories and the domain reconciler
//! behind the five pet operations the HTTP adapter exposes.

pub mod error;
pub mod pagination;
pub mod pet_service;

pub use kennel_domain;

pub use error::PetServiceError;
pub use pagination::{Page, PageSelector};
pub use pet_service::{DynPetService, PetDetails, PetService};
