//! Replication of the remote product snapshot into storage.
//!
//! This is the core of the engine. Given the freshly fetched batch and the
//! stored products that share its IDs, it decides per product whether to
//! create or update, then persists the merged batch.
//!
//! # Algorithm
//!
//! 1. Fetch the remote batch (an empty batch is an error)
//! 2. Look up the stored products by the fetched IDs
//! 3. Merge in fetch order: stored products get the fetched name, the rest
//!    become new products without an ID
//! 4. Save the merged batch
//! 5. Report exactly one success or failure to the metrics sink

use crate::error::{ClientError, Error, Result, StorageError};
use crate::{Product, ProductId};
use std::collections::HashMap;
use std::future::Future;

/// Source of the remote product snapshot.
pub trait ProductClient {
    /// Fetch the full remote batch. May be empty.
    fn fetch(
        &self,
    ) -> impl Future<Output = std::result::Result<Vec<Product>, ClientError>> + Send;
}

/// Storage backend for products.
pub trait ProductRepository {
    /// Look up stored products by ID.
    ///
    /// IDs that are not stored are missing from the returned map.
    fn find_by_ids(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = std::result::Result<HashMap<ProductId, Product>, StorageError>>
           + Send;

    /// Persist a batch. Products with an ID are upserted, products without
    /// one are created and get an ID assigned.
    fn save(
        &self,
        products: &[Product],
    ) -> impl Future<Output = std::result::Result<(), StorageError>> + Send;
}

/// Receiver of replication outcomes.
pub trait MetricsSender {
    /// Called once per successful cycle with the number of products saved.
    fn report_success(&self, count: usize);

    /// Called once per failed cycle with the error that stopped it.
    fn report_failure(&self, err: &Error);
}

/// Extract the IDs of a batch in order.
///
/// Duplicates are kept. Products without an ID contribute nothing.
pub fn collect_ids(products: &[Product]) -> Vec<ProductId> {
    products.iter().filter_map(|p| p.id).collect()
}

/// Merge a fetched batch with the stored products that match it.
///
/// The result has one entry per fetched product, in fetch order.
pub fn merge(fetched: Vec<Product>, existing: &HashMap<ProductId, Product>) -> Vec<Product> {
    fetched
        .into_iter()
        .map(|incoming| match incoming.id.and_then(|id| existing.get(&id)) {
            Some(stored) => {
                let mut changed = stored.clone();
                changed.apply_changes(&incoming);
                changed
            }
            None => Product::unsaved(incoming.name),
        })
        .collect()
}

/// Drives replication cycles against its collaborators.
///
/// Holds no state between cycles; concurrent calls to [`Service::replicate`]
/// are not serialized.
pub struct Service<C, R, M> {
    client: C,
    repository: R,
    metrics: M,
}

impl<C, R, M> Service<C, R, M>
where
    C: ProductClient + Sync,
    R: ProductRepository + Sync,
    M: MetricsSender + Sync,
{
    /// Create a new service.
    pub fn new(client: C, repository: R, metrics: M) -> Self {
        Self {
            client,
            repository,
            metrics,
        }
    }

    /// Run one replication cycle.
    ///
    /// Returns the number of products saved. Either way the outcome has been
    /// reported to the metrics sink exactly once when this returns.
    pub async fn replicate(&self) -> Result<usize> {
        match self.run_cycle().await {
            Ok(count) => {
                self.metrics.report_success(count);
                Ok(count)
            }
            Err(err) => {
                self.metrics.report_failure(&err);
                Err(err)
            }
        }
    }

    async fn run_cycle(&self) -> Result<usize> {
        let fetched = self
            .client
            .fetch()
            .await
            .map_err(Error::ClientRequestFailed)?;

        if fetched.is_empty() {
            return Err(Error::NoProducts);
        }

        let existing = self.find_existing(&fetched).await?;
        let merged = merge(fetched, &existing);

        self.repository.save(&merged).await.map_err(Error::Save)?;

        Ok(merged.len())
    }

    async fn find_existing(&self, fetched: &[Product]) -> Result<HashMap<ProductId, Product>> {
        let ids = collect_ids(fetched);
        self.repository
            .find_by_ids(&ids)
            .await
            .map_err(Error::Lookup)
    }

    /// Access the client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Access the repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Access the metrics sink.
    pub fn metrics(&self) -> &M {
        &self.metrics
    }
}
