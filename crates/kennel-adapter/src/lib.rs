//! # Kennel Adapter Layer
//!
//! External system integrations (Hexagonal Architecture adapters).
//!
//! ## Structure
//!
//! - `controller/` - Inbound HTTP adapter
//! - `repository/` - Persistence implementations (in-memory, SQLite)

pub mod controller;
pub mod repository;
