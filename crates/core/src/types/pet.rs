//! Pet entity and its nested parts.

use serde::{Deserialize, Serialize};

use super::{PetId, PetStatus};

/// Category a pet belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Free-form label attached to a pet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A pet in the store (wire shape).
///
/// `category`, `photo_urls` and `tags` are nested on the wire and stored as
/// encoded text columns; see the server's persistence mapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    #[serde(default)]
    pub id: PetId,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub status: PetStatus,
}

impl Pet {
    /// Whether any of the pet's tag names equals one of `names` exactly.
    #[must_use]
    pub fn has_any_tag(&self, names: &[String]) -> bool {
        self.tags
            .iter()
            .any(|tag| names.iter().any(|name| *name == tag.name))
    }
}
