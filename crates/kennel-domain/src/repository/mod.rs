//! Repository Traits - The "Ports" of Hexagonal Architecture
//!
//! These traits define HOW the domain wants to persist data,
//! but NOT how it's actually done. That's the adapter's job.
//!
//! ```text
//! Domain Layer          │  Adapter Layer
//! ──────────────────────┼────────────────────────
//! trait PetRepository   │  InMemoryPetRepository
//!   fn insert()         │  SqliteStore
//!   fn find_by_id()     │
//! ```
//!
//! Lookups return `Ok(None)` for a missing row. Turning that into a
//! 404 is the HTTP adapter's decision, not ours.

pub mod group_repository;
pub mod pet_repository;
pub mod trait_repository;
