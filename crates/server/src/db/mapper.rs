//! Pet persistence mapper.
//!
//! A [`Pet`] is nested on the wire but flat in the `pets` table: `category`,
//! `photo_urls` and `tags` are each stored as an independent JSON text
//! column. [`encode`] and [`decode`] convert between the two shapes.
//!
//! Decoding is all-or-nothing. If any column fails to parse, the whole row is
//! rejected rather than returning a pet with a field silently emptied.

use petstore_core::{Category, InvalidPetStatus, Pet, PetId, PetStatus, Tag};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors converting between [`Pet`] and [`PetRow`].
#[derive(Debug, Error)]
pub enum MappingError {
    /// A nested field could not be serialized.
    #[error("failed to encode pet column `{column}`: {source}")]
    Encode {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A stored column is not valid JSON for its expected shape.
    #[error("failed to decode pet column `{column}`: {source}")]
    Decode {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The stored status is outside the accepted set.
    #[error("stored pet status is invalid: {0}")]
    Status(#[from] InvalidPetStatus),
}

/// Flat storage shape of a pet.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PetRow {
    pub id: PetId,
    pub name: String,
    pub status: String,
    pub category: String,
    pub photo_urls: String,
    pub tags: String,
}

/// Convert a pet into its storage row.
///
/// # Errors
///
/// Returns `MappingError::Encode` if a nested field cannot be serialized.
pub fn encode(pet: &Pet) -> Result<PetRow, MappingError> {
    Ok(PetRow {
        id: pet.id,
        name: pet.name.clone(),
        status: pet.status.as_str().to_owned(),
        category: encode_column("category", &pet.category)?,
        photo_urls: encode_column("photo_urls", &pet.photo_urls)?,
        tags: encode_column("tags", &pet.tags)?,
    })
}

/// Convert a storage row back into a pet.
///
/// # Errors
///
/// Returns `MappingError::Decode` naming the first column that does not parse,
/// or `MappingError::Status` if the stored status is unknown.
pub fn decode(row: PetRow) -> Result<Pet, MappingError> {
    let status: PetStatus = row.status.parse()?;
    let category: Category = decode_column("category", &row.category)?;
    let photo_urls: Vec<String> = decode_column("photo_urls", &row.photo_urls)?;
    let tags: Vec<Tag> = decode_column("tags", &row.tags)?;

    Ok(Pet {
        id: row.id,
        category,
        name: row.name,
        photo_urls,
        tags,
        status,
    })
}

fn encode_column<T: Serialize>(column: &'static str, value: &T) -> Result<String, MappingError> {
    serde_json::to_string(value).map_err(|source| MappingError::Encode { column, source })
}

fn decode_column<T: DeserializeOwned>(column: &'static str, raw: &str) -> Result<T, MappingError> {
    serde_json::from_str(raw).map_err(|source| MappingError::Decode { column, source })
}
