//! Wire types for responses and query strings

use kennel_domain::{Group, Trait};
use kennel_usecase::{Page, PetDetails};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBody {
    pub id: u64,
    pub scientific_name: String,
}

impl From<&Group> for GroupBody {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id().value(),
            scientific_name: group.scientific_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitBody {
    pub id: u64,
    pub name: String,
}

impl From<&Trait> for TraitBody {
    fn from(t: &Trait) -> Self {
        Self {
            id: t.id().value(),
            name: t.name().to_string(),
        }
    }
}

/// A serialized pet with its group and traits inlined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetBody {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub weight: f64,
    pub sex: String,
    pub group: GroupBody,
    pub traits: Vec<TraitBody>,
}

impl From<PetDetails> for PetBody {
    fn from(details: PetDetails) -> Self {
        let PetDetails { pet, group, traits } = details;
        Self {
            id: pet.id().value(),
            name: pet.name().to_string(),
            age: pet.age(),
            weight: pet.weight(),
            sex: pet.sex().label().to_string(),
            group: GroupBody::from(&group),
            traits: traits.iter().map(TraitBody::from).collect(),
        }
    }
}

/// `GET /pets` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "trait")]
    pub trait_name: Option<String>,
    pub page: Option<String>,
}

/// Paginated envelope: `{count, next, previous, results}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Wrap `page`, linking neighbours under `collection_url`
    ///
    /// Query keys are emitted sorted; a link to page 1 carries no `page`.
    pub fn from_page(page: Page<T>, collection_url: &Url, trait_name: Option<&str>) -> Self {
        let link = |number: u64| {
            let mut url = collection_url.clone();
            {
                let mut query = url.query_pairs_mut();
                if number > 1 {
                    query.append_pair("page", &number.to_string());
                }
                if let Some(name) = trait_name {
                    query.append_pair("trait", name);
                }
            }
            if url.query() == Some("") {
                url.set_query(None);
            }
            url.to_string()
        };

        Self {
            count: page.count,
            next: page.next_number().map(link),
            previous: page.previous_number().map(link),
            results: page.items,
        }
    }
}
