//! Reconciler - Maps candidate descriptions onto canonical entities
//!
//! Every group or trait a client mentions is either an existing row
//! (matched by case-insensitive name) or a brand-new one:
//!
//! 1. Look up by normalized name
//! 2. Return the match untouched, or create from the candidate
//! 3. Attach the results to the pet and persist it
//!
//! Lookup-then-create is two repository calls. Callers must serialize
//! reconciliation for a given store; repositories reject a duplicate
//! normalized name with `RepositoryError::Conflict` if they don't.

use crate::model::group::{Group, NewGroup};
use crate::model::pet::{Pet, PetDraft};
use crate::model::pet_trait::{NewTrait, Trait};
use crate::repository::group_repository::GroupRepository;
use crate::repository::pet_repository::{PetRepository, RepositoryError};
use crate::repository::trait_repository::TraitRepository;

/// Outcome of resolving one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// A row with the same normalized name already existed
    Existing(T),
    /// No match; the candidate was persisted
    Created(T),
}

impl<T> Resolution<T> {
    pub fn was_created(&self) -> bool {
        matches!(self, Resolution::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Resolution::Existing(v) | Resolution::Created(v) => v,
        }
    }
}

/// The entity reconciler
///
/// Stateless; all state lives in the repositories passed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a group candidate to an existing or new Group
    pub fn resolve_group<G>(
        &self,
        groups: &mut G,
        candidate: &NewGroup,
    ) -> Result<Resolution<Group>, RepositoryError>
    where
        G: GroupRepository + ?Sized,
    {
        match groups.find_by_scientific_name(&candidate.scientific_name)? {
            Some(existing) => Ok(Resolution::Existing(existing)),
            None => groups.create(candidate).map(Resolution::Created),
        }
    }

    /// Resolve a trait candidate to an existing or new Trait
    pub fn resolve_trait<T>(
        &self,
        traits: &mut T,
        candidate: &NewTrait,
    ) -> Result<Resolution<Trait>, RepositoryError>
    where
        T: TraitRepository + ?Sized,
    {
        match traits.find_by_name(&candidate.name)? {
            Some(existing) => Ok(Resolution::Existing(existing)),
            None => traits.create(candidate).map(Resolution::Created),
        }
    }

    /// Resolve every candidate into an association set
    ///
    /// Candidates naming the same trait (in any case) yield one entry.
    /// First-seen order is kept.
    pub fn reconcile_traits<T>(
        &self,
        traits: &mut T,
        candidates: &[NewTrait],
    ) -> Result<Vec<Trait>, RepositoryError>
    where
        T: TraitRepository + ?Sized,
    {
        let mut resolved: Vec<Trait> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let t = self.resolve_trait(traits, candidate)?.into_inner();
            if !resolved.iter().any(|r| r.id() == t.id()) {
                resolved.push(t);
            }
        }
        Ok(resolved)
    }

    /// Point an existing pet at `group` and `traits`, then persist it
    ///
    /// The trait set is replaced, never merged.
    pub fn attach<P>(
        &self,
        pets: &mut P,
        pet: &mut Pet,
        group: &Group,
        traits: &[Trait],
    ) -> Result<(), RepositoryError>
    where
        P: PetRepository + ?Sized,
    {
        pet.set_group(group.id());
        pet.replace_traits(traits.iter().map(Trait::id));
        pets.save(pet)
    }

    /// Like [`Reconciler::attach`], for a pet that doesn't exist yet
    pub fn attach_new<P>(
        &self,
        pets: &mut P,
        mut draft: PetDraft,
        group: &Group,
        traits: &[Trait],
    ) -> Result<Pet, RepositoryError>
    where
        P: PetRepository + ?Sized,
    {
        draft.group_id = group.id();
        draft.trait_ids = traits.iter().map(Trait::id).collect();
        pets.insert(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::group::GroupId;
    use crate::model::name::normalize_name;
    use crate::model::pet_trait::TraitId;
    use std::collections::HashMap;

    /// Enforces normalized-name uniqueness like a real store would
    #[derive(Default)]
    struct NameIndexRepo {
        groups: Vec<Group>,
        traits: Vec<Trait>,
        index: HashMap<String, u64>,
    }

    impl GroupRepository for NameIndexRepo {
        fn create(&mut self, candidate: &NewGroup) -> Result<Group, RepositoryError> {
            let key = candidate.normalized_name();
            if self.index.contains_key(&key) {
                return Err(RepositoryError::Conflict {
                    entity: "group",
                    key,
                });
            }
            let group = Group::from_candidate(GroupId::new(self.groups.len() as u64 + 1), candidate);
            self.index.insert(key, group.id().value());
            self.groups.push(group.clone());
            Ok(group)
        }

        fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, RepositoryError> {
            Ok(self.groups.iter().find(|g| g.id() == id).cloned())
        }

        fn find_by_scientific_name(
            &self,
            scientific_name: &str,
        ) -> Result<Option<Group>, RepositoryError> {
            Ok(self.groups.iter().find(|g| g.matches(scientific_name)).cloned())
        }

        fn count(&self) -> Result<usize, RepositoryError> {
            Ok(self.groups.len())
        }
    }

    impl TraitRepository for NameIndexRepo {
        fn create(&mut self, candidate: &NewTrait) -> Result<Trait, RepositoryError> {
            let key = format!("trait:{}", normalize_name(&candidate.name));
            if self.index.contains_key(&key) {
                return Err(RepositoryError::Conflict {
                    entity: "trait",
                    key,
                });
            }
            let t = Trait::from_candidate(TraitId::new(self.traits.len() as u64 + 1), candidate);
            self.index.insert(key, t.id().value());
            self.traits.push(t.clone());
            Ok(t)
        }

        fn find_by_id(&self, id: TraitId) -> Result<Option<Trait>, RepositoryError> {
            Ok(self.traits.iter().find(|t| t.id() == id).cloned())
        }

        fn find_by_name(&self, name: &str) -> Result<Option<Trait>, RepositoryError> {
            Ok(self.traits.iter().find(|t| t.matches(name)).cloned())
        }

        fn find_by_exact_name(&self, name: &str) -> Result<Option<Trait>, RepositoryError> {
            Ok(self.traits.iter().find(|t| t.name() == name).cloned())
        }

        fn count(&self) -> Result<usize, RepositoryError> {
            Ok(self.traits.len())
        }
    }

    #[test]
    fn test_resolve_group_reuses_case_variant() {
        let reconciler = Reconciler::new();
        let mut repo = NameIndexRepo::default();

        let first = reconciler
            .resolve_group(&mut repo, &NewGroup::new("Canis lupus"))
            .unwrap();
        let second = reconciler
            .resolve_group(&mut repo, &NewGroup::new("CANIS LUPUS"))
            .unwrap();

        assert!(first.was_created());
        assert!(!second.was_created());
        let (first, second) = (first.into_inner(), second.into_inner());
        assert_eq!(first.id(), second.id());
        // the stored spelling is the first one seen
        assert_eq!(second.scientific_name(), "Canis lupus");
        assert_eq!(GroupRepository::count(&repo).unwrap(), 1);
    }

    #[test]
    fn test_resolve_trait_reuses_case_variant() {
        let reconciler = Reconciler::new();
        let mut repo = NameIndexRepo::default();

        let a = reconciler
            .resolve_trait(&mut repo, &NewTrait::new("friendly"))
            .unwrap()
            .into_inner();
        let b = reconciler
            .resolve_trait(&mut repo, &NewTrait::new("Friendly"))
            .unwrap()
            .into_inner();

        assert_eq!(a, b);
        assert_eq!(TraitRepository::count(&repo).unwrap(), 1);
    }

    #[test]
    fn test_reconcile_traits_collapses_duplicates() {
        let reconciler = Reconciler::new();
        let mut repo = NameIndexRepo::default();

        let resolved = reconciler
            .reconcile_traits(
                &mut repo,
                &[
                    NewTrait::new("Loyal"),
                    NewTrait::new("Calm"),
                    NewTrait::new("LOYAL"),
                ],
            )
            .unwrap();

        let names: Vec<_> = resolved.iter().map(|t| t.name()).collect();
        assert_eq!(names, ["Loyal", "Calm"]);
        assert_eq!(TraitRepository::count(&repo).unwrap(), 2);
    }

    #[test]
    fn test_store_conflict_propagates() {
        let mut repo = NameIndexRepo::default();
        GroupRepository::create(&mut repo, &NewGroup::new("Felis catus")).unwrap();

        let err = GroupRepository::create(&mut repo, &NewGroup::new("felis CATUS")).unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict { entity: "group", .. }));
    }
}
