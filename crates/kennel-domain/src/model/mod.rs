//! Domain Models - The vocabulary of Kennel
//!
//! A `New*` type is a candidate description coming from a client.
//! The plain type is the persisted entity with a store-assigned id.

pub mod group;
pub mod name;
pub mod pet;
pub mod pet_trait;
