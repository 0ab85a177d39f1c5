//! Pet - The central entity of Kennel
//!
//! A Pet always references exactly one Group and carries a set of
//! Traits without duplicates. Groups and traits are shared between pets.

use std::collections::BTreeSet;

use super::group::{GroupId, NewGroup};
use super::pet_trait::{NewTrait, TraitId};

/// Unique identifier for a Pet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PetId(u64);

impl PetId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for PetId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sex of a pet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sex {
    Male,
    Female,
    #[default]
    NotInformed,
}

impl Sex {
    pub const ALL: [Sex; 3] = [Sex::Male, Sex::Female, Sex::NotInformed];

    /// The label clients send and receive
    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::NotInformed => "Not Informed",
        }
    }

    /// Parse an exact label; labels are case-sensitive
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sex| sex.label() == label)
    }
}

impl core::fmt::Display for Sex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated creation request: pet fields plus unresolved relations
#[derive(Debug, Clone, PartialEq)]
pub struct NewPet {
    pub name: String,
    pub age: u32,
    pub weight: f64,
    pub sex: Sex,
    pub group: NewGroup,
    pub traits: Vec<NewTrait>,
}

/// A partial update
///
/// `None` means the field was absent from the request and stays unchanged.
/// `Some(vec![])` for `traits` is an explicit request to clear them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PetPatch {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub weight: Option<f64>,
    pub sex: Option<Sex>,
    pub group: Option<NewGroup>,
    pub traits: Option<Vec<NewTrait>>,
}

impl PetPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.weight.is_none()
            && self.sex.is_none()
            && self.group.is_none()
            && self.traits.is_none()
    }
}

/// A pet whose relations are resolved but which has no id yet
#[derive(Debug, Clone, PartialEq)]
pub struct PetDraft {
    pub name: String,
    pub age: u32,
    pub weight: f64,
    pub sex: Sex,
    pub group_id: GroupId,
    pub trait_ids: BTreeSet<TraitId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pet {
    id: PetId,
    name: String,
    age: u32,
    weight: f64,
    sex: Sex,
    group_id: GroupId,
    trait_ids: BTreeSet<TraitId>,
}

impl Pet {
    pub fn from_draft(id: PetId, draft: PetDraft) -> Self {
        Self {
            id,
            name: draft.name,
            age: draft.age,
            weight: draft.weight,
            sex: draft.sex,
            group_id: draft.group_id,
            trait_ids: draft.trait_ids,
        }
    }

    // ========== Getters ==========

    pub fn id(&self) -> PetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn trait_ids(&self) -> &BTreeSet<TraitId> {
        &self.trait_ids
    }

    pub fn has_trait(&self, id: TraitId) -> bool {
        self.trait_ids.contains(&id)
    }

    // ========== Mutations ==========

    /// Overwrite the scalar fields present in `patch`
    ///
    /// Relations are left alone; they go through the reconciler.
    pub fn apply_fields(&mut self, patch: &PetPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(weight) = patch.weight {
            self.weight = weight;
        }
        if let Some(sex) = patch.sex {
            self.sex = sex;
        }
    }

    pub fn set_group(&mut self, group_id: GroupId) {
        self.group_id = group_id;
    }

    /// Drop every trait association, then attach `trait_ids`
    pub fn replace_traits(&mut self, trait_ids: impl IntoIterator<Item = TraitId>) {
        self.trait_ids.clear();
        self.trait_ids.extend(trait_ids);
    }
}
