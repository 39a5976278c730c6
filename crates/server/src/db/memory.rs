//! In-memory repositories for tests.
//!
//! Behaviour mirrors the `PostgreSQL` repositories: sequential ids starting at
//! 1, pets stored as encoded [`PetRow`]s, unique usernames, and the
//! delivered-order delete guard.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use petstore_core::{ORDER_STATUS_DELIVERED, Order, OrderId, Pet, PetId, PetStatus, User, UserId};

use super::mapper::{self, PetRow};
use super::orders::DELIVERED_ORDER_CONFLICT;
use super::{OrderRepository, PetRepository, Repositories, RepositoryError, UserRepository};

/// Rows of one table plus its id sequence.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    const fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock only happens in a failing test.
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// In-memory pet table.
#[derive(Debug, Default, Clone)]
pub struct MemoryPetRepository {
    table: Arc<Mutex<Table<PetRow>>>,
}

impl MemoryPetRepository {
    /// Store a raw row as-is, bypassing the mapper.
    pub fn insert_row(&self, row: PetRow) {
        let mut table = lock(&self.table);
        table.next_id = table.next_id.max(row.id.as_i64() + 1);
        table.rows.insert(row.id.as_i64(), row);
    }

    fn decoded(&self) -> Result<Vec<Pet>, RepositoryError> {
        let rows: Vec<PetRow> = lock(&self.table).rows.values().cloned().collect();
        rows.into_iter()
            .map(|row| mapper::decode(row).map_err(RepositoryError::from))
            .collect()
    }
}

#[async_trait]
impl PetRepository for MemoryPetRepository {
    async fn create(&self, pet: &Pet) -> Result<Pet, RepositoryError> {
        let mut row = mapper::encode(pet)?;
        let mut table = lock(&self.table);
        let id = PetId::new(table.allocate_id());
        row.id = id;
        table.rows.insert(id.as_i64(), row);
        Ok(Pet { id, ..pet.clone() })
    }

    async fn update(&self, pet: &Pet) -> Result<Pet, RepositoryError> {
        let row = mapper::encode(pet)?;
        let mut table = lock(&self.table);
        let slot = table
            .rows
            .get_mut(&pet.id.as_i64())
            .ok_or(RepositoryError::NotFound)?;
        *slot = row;
        Ok(pet.clone())
    }

    async fn update_form_data(
        &self,
        id: PetId,
        name: &str,
        status: PetStatus,
    ) -> Result<Pet, RepositoryError> {
        let row = {
            let mut table = lock(&self.table);
            let row = table
                .rows
                .get_mut(&id.as_i64())
                .ok_or(RepositoryError::NotFound)?;
            name.clone_into(&mut row.name);
            status.as_str().clone_into(&mut row.status);
            row.clone()
        };
        Ok(mapper::decode(row)?)
    }

    async fn find_by_id(&self, id: PetId) -> Result<Pet, RepositoryError> {
        let row = lock(&self.table)
            .rows
            .get(&id.as_i64())
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        Ok(mapper::decode(row)?)
    }

    async fn find_by_status(&self, statuses: &[PetStatus]) -> Result<Vec<Pet>, RepositoryError> {
        Ok(self
            .decoded()?
            .into_iter()
            .filter(|pet| statuses.contains(&pet.status))
            .collect())
    }

    async fn find_by_tags(&self, tags: &[String]) -> Result<Vec<Pet>, RepositoryError> {
        Ok(self
            .decoded()?
            .into_iter()
            .filter(|pet| pet.has_any_tag(tags))
            .collect())
    }

    async fn delete(&self, id: PetId) -> Result<(), RepositoryError> {
        lock(&self.table)
            .rows
            .remove(&id.as_i64())
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn exists_by_id(&self, id: PetId) -> Result<bool, RepositoryError> {
        Ok(lock(&self.table).rows.contains_key(&id.as_i64()))
    }
}

/// In-memory order table.
#[derive(Debug, Default, Clone)]
pub struct MemoryOrderRepository {
    table: Arc<Mutex<Table<Order>>>,
}

#[async_trait]
impl OrderRepository for MemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<Order, RepositoryError> {
        let mut table = lock(&self.table);
        let id = OrderId::new(table.allocate_id());
        let stored = Order {
            id,
            ..order.clone()
        };
        table.rows.insert(id.as_i64(), stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Order, RepositoryError> {
        lock(&self.table)
            .rows
            .get(&id.as_i64())
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let mut table = lock(&self.table);
        let order = table.rows.get(&id.as_i64()).ok_or(RepositoryError::NotFound)?;
        if order.status == ORDER_STATUS_DELIVERED {
            return Err(RepositoryError::Conflict(DELIVERED_ORDER_CONFLICT.to_owned()));
        }
        table.rows.remove(&id.as_i64());
        Ok(())
    }

    async fn inventory(&self) -> Result<BTreeMap<String, i64>, RepositoryError> {
        let table = lock(&self.table);
        let mut counts = BTreeMap::new();
        for order in table.rows.values() {
            *counts.entry(order.status.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

/// In-memory user table with a unique index on `username`.
#[derive(Debug, Default, Clone)]
pub struct MemoryUserRepository {
    table: Arc<Mutex<UserTable>>,
}

#[derive(Debug, Default)]
struct UserTable {
    users: Table<User>,
    by_username: HashMap<String, i64>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let mut table = lock(&self.table);
        if table.by_username.contains_key(&user.username) {
            return Err(RepositoryError::Conflict("username already exists".to_owned()));
        }
        let id = table.users.allocate_id();
        let stored = User {
            id: UserId::new(id),
            ..user.clone()
        };
        table.by_username.insert(user.username.clone(), id);
        table.users.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_username(&self, username: &str) -> Result<User, RepositoryError> {
        let table = lock(&self.table);
        table
            .by_username
            .get(username)
            .and_then(|id| table.users.rows.get(id))
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, username: &str, user: &User) -> Result<User, RepositoryError> {
        let mut table = lock(&self.table);
        let id = *table
            .by_username
            .get(username)
            .ok_or(RepositoryError::NotFound)?;
        let stored = table
            .users
            .rows
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;

        user.first_name.clone_into(&mut stored.first_name);
        user.last_name.clone_into(&mut stored.last_name);
        user.email.clone_into(&mut stored.email);
        if !user.password.is_empty() {
            user.password.clone_into(&mut stored.password);
        }
        user.phone.clone_into(&mut stored.phone);
        stored.user_status = user.user_status;

        Ok(stored.clone())
    }

    async fn delete(&self, username: &str) -> Result<(), RepositoryError> {
        let mut table = lock(&self.table);
        let id = table
            .by_username
            .remove(username)
            .ok_or(RepositoryError::NotFound)?;
        table.users.rows.remove(&id);
        Ok(())
    }
}

/// One set of in-memory tables, shared by every clone.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub pets: MemoryPetRepository,
    pub orders: MemoryOrderRepository,
    pub users: MemoryUserRepository,
}

impl MemoryStore {
    /// Repositories backed by these tables.
    #[must_use]
    pub fn repositories(&self) -> Repositories {
        Repositories {
            pets: Arc::new(self.pets.clone()),
            orders: Arc::new(self.orders.clone()),
            users: Arc::new(self.users.clone()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn order(status: &str) -> Order {
        Order {
            pet_id: PetId::new(1),
            quantity: 1,
            ship_date: Utc::now(),
            status: status.to_owned(),
            ..Order::default()
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential_from_one() {
        let repo = MemoryOrderRepository::default();
        let first = repo.create(&order("placed")).await.unwrap();
        let second = repo.create(&order("placed")).await.unwrap();
        assert_eq!(first.id, OrderId::new(1));
        assert_eq!(second.id, OrderId::new(2));
    }

    #[tokio::test]
    async fn test_delivered_order_survives_delete() {
        let repo = MemoryOrderRepository::default();
        let created = repo.create(&order("delivered")).await.unwrap();

        let err = repo.delete(created.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert!(repo.find_by_id(created.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_inventory_counts_by_status() {
        let repo = MemoryOrderRepository::default();
        for status in ["placed", "placed", "approved"] {
            repo.create(&order(status)).await.unwrap();
        }

        let inventory = repo.inventory().await.unwrap();
        assert_eq!(inventory.get("placed"), Some(&2));
        assert_eq!(inventory.get("approved"), Some(&1));
        assert_eq!(inventory.get("delivered"), None);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let repo = MemoryUserRepository::default();
        let user = User {
            username: "alice".to_owned(),
            ..User::default()
        };
        repo.create(&user).await.unwrap();

        let err = repo.create(&user).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_batch_keeps_rows_before_failure() {
        let repo = MemoryUserRepository::default();
        let users: Vec<User> = ["a", "b", "a", "c"]
            .into_iter()
            .map(|name| User {
                username: name.to_owned(),
                ..User::default()
            })
            .collect();

        let err = repo.create_batch(&users).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert!(repo.find_by_username("a").await.is_ok());
        assert!(repo.find_by_username("b").await.is_ok());
        assert!(matches!(
            repo.find_by_username("c").await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_user_update_keeps_password_when_empty() {
        let repo = MemoryUserRepository::default();
        repo.create(&User {
            username: "bob".to_owned(),
            password: "hash-1".to_owned(),
            ..User::default()
        })
        .await
        .unwrap();

        let updated = repo
            .update(
                "bob",
                &User {
                    email: "bob@example.com".to_owned(),
                    ..User::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.username, "bob");
        assert_eq!(updated.email, "bob@example.com");
        assert_eq!(updated.password, "hash-1");
    }
}
