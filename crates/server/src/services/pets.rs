//! Pet service: validation, existence guards and queries.

use std::sync::Arc;

use petstore_core::{Pet, PetId, PetStatus};

use super::ServiceError;
use crate::db::PetRepository;

const ENTITY: &str = "pet";

/// Check the rules every created or updated pet must satisfy.
///
/// # Errors
///
/// Returns `ServiceError::Validation` if the id is not positive or the name
/// is empty. Status is already constrained by its type.
pub fn validate_pet(pet: &Pet) -> Result<(), ServiceError> {
    if !pet.id.is_positive() {
        return Err(ServiceError::Validation("invalid pet id".to_owned()));
    }
    if pet.name.is_empty() {
        return Err(ServiceError::Validation("pet name cannot be empty".to_owned()));
    }
    Ok(())
}

/// Parse a status token, case-sensitively.
///
/// # Errors
///
/// Returns `ServiceError::Validation` for anything but `available`,
/// `pending` or `sold`.
pub fn validate_pet_status(status: &str) -> Result<PetStatus, ServiceError> {
    status
        .parse()
        .map_err(|e: petstore_core::InvalidPetStatus| ServiceError::Validation(e.to_string()))
}

/// Validate the fields of a form update.
///
/// # Errors
///
/// Returns `ServiceError::Validation` for an empty name or unknown status.
pub fn validate_pet_form_data(name: &str, status: &str) -> Result<PetStatus, ServiceError> {
    if name.is_empty() {
        return Err(ServiceError::Validation("pet name cannot be empty".to_owned()));
    }
    validate_pet_status(status)
}

/// Reject an empty tag list or any empty tag.
///
/// # Errors
///
/// Returns `ServiceError::Validation` describing the first problem.
pub fn validate_tags(tags: &[String]) -> Result<(), ServiceError> {
    if tags.is_empty() {
        return Err(ServiceError::Validation("at least one tag is required".to_owned()));
    }
    if tags.iter().any(String::is_empty) {
        return Err(ServiceError::Validation("tags cannot be empty".to_owned()));
    }
    Ok(())
}

/// Pet use cases.
#[derive(Clone)]
pub struct PetService {
    repo: Arc<dyn PetRepository>,
}

impl PetService {
    #[must_use]
    pub fn new(repo: Arc<dyn PetRepository>) -> Self {
        Self { repo }
    }

    /// Validate and insert a pet. The returned pet carries the stored id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` before touching the store if the
    /// pet is invalid.
    pub async fn create_pet(&self, pet: &Pet) -> Result<Pet, ServiceError> {
        validate_pet(pet)?;
        let created = self
            .repo
            .create(pet)
            .await
            .map_err(ServiceError::for_entity(ENTITY))?;

        tracing::info!(pet_id = %created.id, "pet created");
        Ok(created)
    }

    /// Replace an existing pet.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an invalid pet and
    /// `ServiceError::NotFound` if no pet has its id.
    pub async fn update_pet(&self, pet: &Pet) -> Result<Pet, ServiceError> {
        validate_pet(pet)?;
        self.ensure_exists(pet.id).await?;
        self.repo
            .update(pet)
            .await
            .map_err(ServiceError::for_entity(ENTITY))
    }

    /// Update only `name` and `status` of an existing pet.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an empty name or unknown status
    /// and `ServiceError::NotFound` if the pet does not exist.
    pub async fn update_pet_form_data(
        &self,
        id: PetId,
        name: &str,
        status: &str,
    ) -> Result<Pet, ServiceError> {
        let status = validate_pet_form_data(name, status)?;
        self.ensure_exists(id).await?;
        self.repo
            .update_form_data(id, name, status)
            .await
            .map_err(ServiceError::for_entity(ENTITY))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the pet does not exist.
    pub async fn find_pet_by_id(&self, id: PetId) -> Result<Pet, ServiceError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(ServiceError::for_entity(ENTITY))
    }

    /// Pets in any of the given statuses. An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if any token is not a valid status.
    pub async fn find_pets_by_status(&self, statuses: &[String]) -> Result<Vec<Pet>, ServiceError> {
        if statuses.is_empty() {
            return Err(ServiceError::Validation("at least one status is required".to_owned()));
        }
        let statuses = statuses
            .iter()
            .map(|s| validate_pet_status(s))
            .collect::<Result<Vec<_>, _>>()?;

        self.repo
            .find_by_status(&statuses)
            .await
            .map_err(ServiceError::for_entity(ENTITY))
    }

    /// Pets carrying at least one of the given tag names.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for an empty list or empty tag.
    pub async fn find_pets_by_tags(&self, tags: &[String]) -> Result<Vec<Pet>, ServiceError> {
        validate_tags(tags)?;
        self.repo
            .find_by_tags(tags)
            .await
            .map_err(ServiceError::for_entity(ENTITY))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the pet does not exist.
    pub async fn delete_pet(&self, id: PetId) -> Result<(), ServiceError> {
        self.repo
            .delete(id)
            .await
            .map_err(ServiceError::for_entity(ENTITY))?;

        tracing::info!(pet_id = %id, "pet deleted");
        Ok(())
    }

    async fn ensure_exists(&self, id: PetId) -> Result<(), ServiceError> {
        let exists = self
            .repo
            .exists_by_id(id)
            .await
            .map_err(ServiceError::for_entity(ENTITY))?;
        if exists {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("{ENTITY} not found")))
        }
    }
}
