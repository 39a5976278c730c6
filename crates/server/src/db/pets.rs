//! Pet repository for database operations.

use async_trait::async_trait;
use sqlx::PgPool;

use petstore_core::{Pet, PetId, PetStatus};

use super::RepositoryError;
use super::mapper::{self, PetRow};

/// Storage capability for pets.
#[async_trait]
pub trait PetRepository: Send + Sync {
    /// Insert a pet. The store assigns the id; the returned pet carries it.
    async fn create(&self, pet: &Pet) -> Result<Pet, RepositoryError>;

    /// Overwrite every field of the pet with `pet.id`.
    ///
    /// Returns `RepositoryError::NotFound` if no row has that id.
    async fn update(&self, pet: &Pet) -> Result<Pet, RepositoryError>;

    /// Set only `name` and `status`, returning the updated pet.
    async fn update_form_data(
        &self,
        id: PetId,
        name: &str,
        status: PetStatus,
    ) -> Result<Pet, RepositoryError>;

    async fn find_by_id(&self, id: PetId) -> Result<Pet, RepositoryError>;

    /// Pets whose status is any of `statuses`.
    async fn find_by_status(&self, statuses: &[PetStatus]) -> Result<Vec<Pet>, RepositoryError>;

    /// Pets carrying at least one tag whose name is in `tags` (exact match).
    async fn find_by_tags(&self, tags: &[String]) -> Result<Vec<Pet>, RepositoryError>;

    async fn delete(&self, id: PetId) -> Result<(), RepositoryError>;

    async fn exists_by_id(&self, id: PetId) -> Result<bool, RepositoryError>;
}

/// `PostgreSQL` pet repository.
#[derive(Clone)]
pub struct PgPetRepository {
    pool: PgPool,
}

impl PgPetRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_all(rows: Vec<PetRow>) -> Result<Vec<Pet>, RepositoryError> {
    rows.into_iter()
        .map(|row| mapper::decode(row).map_err(RepositoryError::from))
        .collect()
}

#[async_trait]
impl PetRepository for PgPetRepository {
    async fn create(&self, pet: &Pet) -> Result<Pet, RepositoryError> {
        let row = mapper::encode(pet)?;

        let id: PetId = sqlx::query_scalar(
            r"
            INSERT INTO pets (name, status, category, photo_urls, tags)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&row.name)
        .bind(&row.status)
        .bind(&row.category)
        .bind(&row.photo_urls)
        .bind(&row.tags)
        .fetch_one(&self.pool)
        .await?;

        Ok(Pet { id, ..pet.clone() })
    }

    async fn update(&self, pet: &Pet) -> Result<Pet, RepositoryError> {
        let row = mapper::encode(pet)?;

        let result = sqlx::query(
            r"
            UPDATE pets
            SET name = $1, status = $2, category = $3, photo_urls = $4, tags = $5
            WHERE id = $6
            ",
        )
        .bind(&row.name)
        .bind(&row.status)
        .bind(&row.category)
        .bind(&row.photo_urls)
        .bind(&row.tags)
        .bind(row.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(pet.clone())
    }

    async fn update_form_data(
        &self,
        id: PetId,
        name: &str,
        status: PetStatus,
    ) -> Result<Pet, RepositoryError> {
        let row = sqlx::query_as::<_, PetRow>(
            r"
            UPDATE pets
            SET name = $1, status = $2
            WHERE id = $3
            RETURNING id, name, status, category, photo_urls, tags
            ",
        )
        .bind(name)
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(mapper::decode(row)?)
    }

    async fn find_by_id(&self, id: PetId) -> Result<Pet, RepositoryError> {
        let row = sqlx::query_as::<_, PetRow>(
            r"
            SELECT id, name, status, category, photo_urls, tags
            FROM pets
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(mapper::decode(row)?)
    }

    async fn find_by_status(&self, statuses: &[PetStatus]) -> Result<Vec<Pet>, RepositoryError> {
        let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();

        let rows = sqlx::query_as::<_, PetRow>(
            r"
            SELECT id, name, status, category, photo_urls, tags
            FROM pets
            WHERE status = ANY($1)
            ORDER BY id
            ",
        )
        .bind(&statuses)
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    async fn find_by_tags(&self, tags: &[String]) -> Result<Vec<Pet>, RepositoryError> {
        // Tags live in a JSON text column, so matching happens after decoding.
        let rows = sqlx::query_as::<_, PetRow>(
            r"
            SELECT id, name, status, category, photo_urls, tags
            FROM pets
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(decode_all(rows)?
            .into_iter()
            .filter(|pet| pet.has_any_tag(tags))
            .collect())
    }

    async fn delete(&self, id: PetId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn exists_by_id(&self, id: PetId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pets WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use petstore_core::{Category, Tag};

    use super::*;

    fn pet(name: &str, status: PetStatus, tags: &[&str]) -> Pet {
        Pet {
            id: PetId::new(1),
            category: Category {
                id: 1,
                name: "Dog".to_owned(),
            },
            name: name.to_owned(),
            photo_urls: vec!["http://x".to_owned()],
            tags: tags
                .iter()
                .zip(1..)
                .map(|(name, id)| Tag {
                    id,
                    name: (*name).to_owned(),
                })
                .collect(),
            status,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_assigns_id_and_round_trips(pool: PgPool) {
        let repo = PgPetRepository::new(pool);
        let created = repo
            .create(&pet("Rex", PetStatus::Available, &["cute", "loud"]))
            .await
            .unwrap();

        assert!(created.id.is_positive());
        assert_eq!(repo.find_by_id(created.id).await.unwrap(), created);
        assert!(repo.exists_by_id(created.id).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_find_by_status_is_set_membership(pool: PgPool) {
        let repo = PgPetRepository::new(pool);
        for (name, status) in [
            ("a", PetStatus::Available),
            ("b", PetStatus::Pending),
            ("c", PetStatus::Sold),
        ] {
            repo.create(&pet(name, status, &[])).await.unwrap();
        }

        let found = repo
            .find_by_status(&[PetStatus::Available, PetStatus::Sold])
            .await
            .unwrap();
        let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);

        let pending = repo.find_by_status(&[PetStatus::Pending]).await.unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_find_by_tags_exact_match(pool: PgPool) {
        let repo = PgPetRepository::new(pool);
        let tagged = repo
            .create(&pet("a", PetStatus::Available, &["tag1", "tag2"]))
            .await
            .unwrap();
        repo.create(&pet("b", PetStatus::Available, &["Tag1"]))
            .await
            .unwrap();

        let found = repo.find_by_tags(&["tag1".to_owned()]).await.unwrap();
        assert_eq!(found, [tagged]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_missing_rows_are_not_found(pool: PgPool) {
        let repo = PgPetRepository::new(pool);
        let ghost = Pet {
            id: PetId::new(999),
            ..pet("Ghost", PetStatus::Sold, &[])
        };

        assert!(matches!(repo.update(&ghost).await, Err(RepositoryError::NotFound)));
        assert!(matches!(
            repo.update_form_data(ghost.id, "Ghost", PetStatus::Sold).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(repo.delete(ghost.id).await, Err(RepositoryError::NotFound)));
        assert!(matches!(repo.find_by_id(ghost.id).await, Err(RepositoryError::NotFound)));
        assert!(!repo.exists_by_id(ghost.id).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_update_and_form_update(pool: PgPool) {
        let repo = PgPetRepository::new(pool);
        let created = repo
            .create(&pet("Rex", PetStatus::Available, &["cute"]))
            .await
            .unwrap();

        let renamed = Pet {
            name: "Max".to_owned(),
            ..created.clone()
        };
        repo.update(&renamed).await.unwrap();
        assert_eq!(repo.find_by_id(created.id).await.unwrap().name, "Max");

        let sold = repo
            .update_form_data(created.id, "Maxi", PetStatus::Sold)
            .await
            .unwrap();
        assert_eq!(sold.name, "Maxi");
        assert_eq!(sold.status, PetStatus::Sold);
        assert_eq!(sold.tags, created.tags);

        repo.delete(created.id).await.unwrap();
        assert!(!repo.exists_by_id(created.id).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_corrupt_row_is_data_corruption(pool: PgPool) {
        let id: PetId = sqlx::query_scalar(
            r"
            INSERT INTO pets (name, status, category, photo_urls, tags)
            VALUES ('Rex', 'available', '{}', '[]', '[{broken')
            RETURNING id
            ",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        let repo = PgPetRepository::new(pool);
        assert!(matches!(
            repo.find_by_id(id).await,
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
