//! Trait - A descriptive tag attachable to many pets

use super::name::{names_match, normalize_name};

/// Unique identifier for a Trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraitId(u64);

impl TraitId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for TraitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A client-supplied trait description, not yet resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrait {
    pub name: String,
}

impl NewTrait {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trait {
    id: TraitId,
    name: String,
}

impl Trait {
    pub fn new(id: TraitId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn from_candidate(id: TraitId, candidate: &NewTrait) -> Self {
        Self::new(id, candidate.name.clone())
    }

    pub fn id(&self) -> TraitId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Case-insensitive match against a trait name
    pub fn matches(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }
}
