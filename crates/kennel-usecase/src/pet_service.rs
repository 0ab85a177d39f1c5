//! PetService - The five pet operations
//!
//! ```text
//! create ─┐                        ┌─ GroupRepository
//! patch  ─┼─ Reconciler ───────────┼─ TraitRepository
//! get    ─┤                        └─ PetRepository
//! list   ─┤
//! delete ─┘
//! ```
//!
//! Methods take `&mut self` for writes. The service is not internally
//! synchronized; the caller owns it behind a single lock, which makes
//! the reconciler's lookup-then-create sequence atomic per process.

use kennel_domain::{
    Group, GroupRepository, NewPet, Pet, PetDraft, PetFilter, PetId, PetPatch, PetRepository,
    Reconciler, Trait, TraitRepository,
};
use tracing::{debug, info};

use crate::error::{PetServiceError, Result};
use crate::pagination::{locate, Page, PageSelector};

/// Read model: a pet with its relations resolved
#[derive(Debug, Clone, PartialEq)]
pub struct PetDetails {
    pub pet: Pet,
    pub group: Group,
    /// Sorted by trait id
    pub traits: Vec<Trait>,
}

/// PetService over boxed repositories, so the backend is picked at runtime
pub type DynPetService = PetService<
    Box<dyn PetRepository + Send>,
    Box<dyn GroupRepository + Send>,
    Box<dyn TraitRepository + Send>,
>;

pub struct PetService<P, G, T> {
    pets: P,
    groups: G,
    traits: T,
    reconciler: Reconciler,
    page_size: usize,
}

impl<P, G, T> PetService<P, G, T>
where
    P: PetRepository,
    G: GroupRepository,
    T: TraitRepository,
{
    pub fn new(pets: P, groups: G, traits: T, page_size: usize) -> Self {
        Self {
            pets,
            groups,
            traits,
            reconciler: Reconciler::new(),
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Create a pet, resolving its group and traits
    pub fn create_pet(&mut self, new_pet: NewPet) -> Result<PetDetails> {
        let group = self.resolve_group(&new_pet.group)?;
        let traits = self
            .reconciler
            .reconcile_traits(&mut self.traits, &new_pet.traits)?;

        let draft = PetDraft {
            name: new_pet.name,
            age: new_pet.age,
            weight: new_pet.weight,
            sex: new_pet.sex,
            group_id: group.id(),
            trait_ids: Default::default(),
        };
        let pet = self
            .reconciler
            .attach_new(&mut self.pets, draft, &group, &traits)?;

        info!(
            pet_id = %pet.id(),
            group_id = %group.id(),
            traits = traits.len(),
            "pet created"
        );
        Ok(Self::details(pet, group, traits))
    }

    /// List pets, optionally only those with a trait named exactly `trait_name`
    ///
    /// An empty name is no filter at all.
    pub fn list_pets(
        &self,
        trait_name: Option<&str>,
        selector: PageSelector,
    ) -> Result<Page<PetDetails>> {
        let filter = match trait_name.filter(|name| !name.is_empty()) {
            None => PetFilter::All,
            Some(name) => match self.traits.find_by_exact_name(name)? {
                Some(t) => PetFilter::WithTrait(t.id()),
                None => {
                    // unknown trait: only page 1 exists, and it is empty
                    let window = locate(0, self.page_size, selector)?;
                    return Ok(Page {
                        items: Vec::new(),
                        count: 0,
                        number: window.number,
                        num_pages: window.num_pages,
                    });
                }
            },
        };

        let count = self.pets.count(filter)?;
        let window = locate(count, self.page_size, selector)?;
        let pets = self.pets.list(filter, window.offset, window.limit)?;

        let items = pets
            .into_iter()
            .map(|pet| self.load_details(pet))
            .collect::<Result<Vec<_>>>()?;

        debug!(count, page = window.number, ?filter, "pets listed");
        Ok(Page {
            items,
            count,
            number: window.number,
            num_pages: window.num_pages,
        })
    }

    /// `PetNotFound` unless `id` names a stored pet
    pub fn ensure_exists(&self, id: PetId) -> Result<()> {
        if self.pets.exists(id)? {
            Ok(())
        } else {
            Err(PetServiceError::PetNotFound(id))
        }
    }

    pub fn get_pet(&self, id: PetId) -> Result<PetDetails> {
        let pet = self.find_pet(id)?;
        self.load_details(pet)
    }

    pub fn delete_pet(&mut self, id: PetId) -> Result<()> {
        if !self.pets.delete(id)? {
            return Err(PetServiceError::PetNotFound(id));
        }
        info!(pet_id = %id, "pet deleted");
        Ok(())
    }

    /// Apply a partial update
    ///
    /// A present `group` is re-resolved; a present `traits` replaces the
    /// whole association set, so `Some(vec![])` detaches every trait.
    pub fn patch_pet(&mut self, id: PetId, patch: PetPatch) -> Result<PetDetails> {
        let mut pet = self.find_pet(id)?;
        if patch.is_empty() {
            debug!(pet_id = %id, "empty patch, nothing to save");
            return self.load_details(pet);
        }
        pet.apply_fields(&patch);

        let group = match &patch.group {
            Some(candidate) => self.resolve_group(candidate)?,
            None => self.load_group(&pet)?,
        };
        let traits = match &patch.traits {
            Some(candidates) => self
                .reconciler
                .reconcile_traits(&mut self.traits, candidates)?,
            None => self.load_traits(&pet)?,
        };

        self.reconciler
            .attach(&mut self.pets, &mut pet, &group, &traits)?;

        info!(pet_id = %id, "pet updated");
        Ok(Self::details(pet, group, traits))
    }

    // ========== Helpers ==========

    fn find_pet(&self, id: PetId) -> Result<Pet> {
        self.pets
            .find_by_id(id)?
            .ok_or(PetServiceError::PetNotFound(id))
    }

    fn resolve_group(&mut self, candidate: &kennel_domain::NewGroup) -> Result<Group> {
        let resolution = self.reconciler.resolve_group(&mut self.groups, candidate)?;
        if resolution.was_created() {
            debug!(scientific_name = %candidate.scientific_name, "group created");
        } else {
            debug!(scientific_name = %candidate.scientific_name, "group reused");
        }
        Ok(resolution.into_inner())
    }

    fn load_group(&self, pet: &Pet) -> Result<Group> {
        self.groups
            .find_by_id(pet.group_id())?
            .ok_or(PetServiceError::MissingGroup {
                pet: pet.id(),
                group: pet.group_id(),
            })
    }

    fn load_traits(&self, pet: &Pet) -> Result<Vec<Trait>> {
        let ids: Vec<_> = pet.trait_ids().iter().copied().collect();
        Ok(self.traits.find_many(&ids)?)
    }

    fn load_details(&self, pet: Pet) -> Result<PetDetails> {
        let group = self.load_group(&pet)?;
        let traits = self.load_traits(&pet)?;
        Ok(Self::details(pet, group, traits))
    }

    fn details(pet: Pet, group: Group, mut traits: Vec<Trait>) -> PetDetails {
        traits.sort_by_key(|t| t.id());
        PetDetails { pet, group, traits }
    }
}
