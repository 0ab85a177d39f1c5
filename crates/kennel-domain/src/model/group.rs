//! Group - The taxonomic grouping a pet belongs to
//!
//! Group is an Entity. Two groups whose scientific names differ only
//! in letter case are the same group.

use super::name::{names_match, normalize_name};

/// Unique identifier for a Group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u64);

impl GroupId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for GroupId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A client-supplied group description, not yet resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub scientific_name: String,
}

impl NewGroup {
    pub fn new(scientific_name: impl Into<String>) -> Self {
        Self {
            scientific_name: scientific_name.into(),
        }
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.scientific_name)
    }
}

/// Group - A persisted taxonomic group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    scientific_name: String,
}

impl Group {
    pub fn new(id: GroupId, scientific_name: impl Into<String>) -> Self {
        Self {
            id,
            scientific_name: scientific_name.into(),
        }
    }

    /// Materialize a candidate under a freshly assigned id
    pub fn from_candidate(id: GroupId, candidate: &NewGroup) -> Self {
        Self::new(id, candidate.scientific_name.clone())
    }

    // ========== Getters ==========

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn scientific_name(&self) -> &str {
        &self.scientific_name
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.scientific_name)
    }

    /// Case-insensitive match against a scientific name
    pub fn matches(&self, scientific_name: &str) -> bool {
        names_match(&self.scientific_name, scientific_name)
    }
}
