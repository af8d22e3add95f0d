//! In-memory product repository.
//!
//! Keeps products in a sorted map and hands out sequential IDs for new
//! products. Useful for tests and for running without a database.

use crate::error::StorageError;
use crate::replication::ProductRepository;
use crate::{Product, ProductId};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct State {
    products: BTreeMap<ProductId, Product>,
    /// Next ID to assign, `None` once `ProductId::MAX` is taken
    next_id: Option<ProductId>,
}

/// Thread-safe in-memory implementation of [`ProductRepository`].
#[derive(Debug)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                products: BTreeMap::new(),
                next_id: Some(1),
            }),
        }
    }

    /// Create a repository pre-populated with persisted products.
    ///
    /// Products without an ID are assigned one, as if saved. A batch that
    /// would exhaust the ID space is not stored at all.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let repo = Self::new();
        let products: Vec<_> = products.into_iter().collect();
        // Same all-or-nothing rule as save
        let _ = repo.lock().save(&products);
        repo
    }

    /// Get a stored product by ID.
    pub fn get(&self, id: ProductId) -> Option<Product> {
        self.lock().products.get(&id).cloned()
    }

    /// All stored products, ordered by ID.
    pub fn all(&self) -> Vec<Product> {
        self.lock().products.values().cloned().collect()
    }

    /// Number of stored products.
    pub fn len(&self) -> usize {
        self.lock().products.len()
    }

    /// Check if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.lock().products.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl State {
    /// Next ID to assign after `id` has been stored explicitly.
    fn after_explicit(next_id: Option<ProductId>, id: ProductId) -> Option<ProductId> {
        // Explicit IDs must not collide with future assignments
        next_id.and_then(|next| id.checked_add(1).map(|after| next.max(after)))
    }

    /// Store a batch, or nothing if it needs more IDs than are left.
    fn save(&mut self, products: &[Product]) -> Result<(), StorageError> {
        let mut next_id = self.next_id;
        for product in products {
            next_id = match product.id {
                Some(id) => Self::after_explicit(next_id, id),
                None => next_id
                    .ok_or(StorageError::IdSpaceExhausted)?
                    .checked_add(1),
            };
        }

        for product in products {
            let mut product = product.clone();
            let id = match product.id {
                Some(id) => {
                    self.next_id = Self::after_explicit(self.next_id, id);
                    id
                }
                None => {
                    let id = self.next_id.ok_or(StorageError::IdSpaceExhausted)?;
                    self.next_id = id.checked_add(1);
                    product.id = Some(id);
                    id
                }
            };
            self.products.insert(id, product);
        }
        Ok(())
    }
}

impl ProductRepository for MemoryRepository {
    async fn find_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Product>, StorageError> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).map(|p| (*id, p.clone())))
            .collect())
    }

    async fn save(&self, products: &[Product]) -> Result<(), StorageError> {
        self.lock().save(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_assigns_sequential_ids() {
        let repo = MemoryRepository::new();

        repo.save(&[Product::unsaved("a"), Product::unsaved("b")])
            .await
            .unwrap();

        assert_eq!(repo.all(), vec![Product::new(1, "a"), Product::new(2, "b")]);
    }

    #[tokio::test]
    async fn save_upserts_by_id() {
        let repo = MemoryRepository::with_products(vec![Product::new(4, "old")]);

        repo.save(&[Product::new(4, "new")]).await.unwrap();

        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get(4), Some(Product::new(4, "new")));
    }

    #[tokio::test]
    async fn assigned_ids_skip_explicit_ones() {
        let repo = MemoryRepository::with_products(vec![Product::new(10, "x")]);

        repo.save(&[Product::unsaved("y")]).await.unwrap();

        assert_eq!(repo.get(11), Some(Product::new(11, "y")));
    }

    #[tokio::test]
    async fn find_by_ids_returns_only_found() {
        let repo =
            MemoryRepository::with_products(vec![Product::new(1, "a"), Product::new(2, "b")]);

        let found = repo.find_by_ids(&[2, 3, 2]).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found.get(&2), Some(&Product::new(2, "b")));
        assert!(!found.contains_key(&3));
    }

    #[tokio::test]
    async fn max_id_does_not_get_reassigned() {
        let repo = MemoryRepository::with_products(vec![Product::new(ProductId::MAX, "max")]);

        let err = repo.save(&[Product::unsaved("new")]).await.unwrap_err();

        assert_eq!(err, StorageError::IdSpaceExhausted);
        assert_eq!(repo.all(), vec![Product::new(ProductId::MAX, "max")]);
    }

    #[tokio::test]
    async fn exhausting_batch_is_not_applied() {
        let repo = MemoryRepository::with_products(vec![Product::new(ProductId::MAX - 1, "a")]);

        // MAX is still free, but the second new product needs one more
        let err = repo
            .save(&[
                Product::new(ProductId::MAX - 1, "renamed"),
                Product::unsaved("b"),
                Product::unsaved("c"),
            ])
            .await
            .unwrap_err();

        assert_eq!(err, StorageError::IdSpaceExhausted);
        assert_eq!(repo.all(), vec![Product::new(ProductId::MAX - 1, "a")]);

        repo.save(&[Product::unsaved("b")]).await.unwrap();
        assert_eq!(repo.get(ProductId::MAX), Some(Product::new(ProductId::MAX, "b")));
    }

    #[test]
    fn new_repository_is_empty() {
        let repo = MemoryRepository::default();
        assert!(repo.is_empty());
        assert_eq!(repo.get(1), None);
    }
}
