//! # Replication Engine
//!
//! Reconciles a locally persisted product catalog with a remote snapshot.
//!
//! One replication cycle fetches the full remote batch, looks up which of the
//! fetched products are already stored, merges the two and saves the result.
//! The outcome of every cycle is reported exactly once through a metrics
//! sink.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine only talks to its collaborators through traits
//! - **Stateless**: nothing survives between two cycles
//! - **Testable**: the merge step is a pure function
//!
//! ## Core Concepts
//!
//! ### Products
//!
//! A [`Product`] has an optional [`ProductId`] and a mutable `name`. Products
//! that storage has never seen carry no ID; storage assigns one on save.
//!
//! ### Collaborators
//!
//! - [`ProductClient`] - fetches the remote snapshot
//! - [`ProductRepository`] - looks up stored products by ID and saves batches
//! - [`MetricsSender`] - receives the success or failure of each cycle
//!
//! ### Reconciliation
//!
//! [`merge`] walks the fetched batch in order. Products whose ID is already
//! stored keep every stored field except `name`, which is overwritten with
//! the fetched value. Everything else becomes a new, ID-less product.
//!
//! ## Quick Start
//!
//! ```rust
//! use replication_engine::{
//!     ClientError, Error, MemoryRepository, MetricsSender, Product, ProductClient, Service,
//! };
//!
//! struct StaticClient(Vec<Product>);
//!
//! impl ProductClient for StaticClient {
//!     async fn fetch(&self) -> Result<Vec<Product>, ClientError> {
//!         Ok(self.0.clone())
//!     }
//! }
//!
//! struct Quiet;
//!
//! impl MetricsSender for Quiet {
//!     fn report_success(&self, _count: usize) {}
//!     fn report_failure(&self, _err: &Error) {}
//! }
//!
//! # tokio_test_block_on(async {
//! let client = StaticClient(vec![Product::new(7, "Lamp")]);
//! let repo = MemoryRepository::new();
//! let service = Service::new(client, repo, Quiet);
//!
//! let count = service.replicate().await.unwrap();
//! assert_eq!(count, 1);
//! assert_eq!(service.repository().len(), 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod error;
pub mod memory;
pub mod product;
pub mod replication;

// Re-export main types at crate root
pub use error::{ClientError, Error, StorageError};
pub use memory::MemoryRepository;
pub use product::Product;
pub use replication::{
    collect_ids, merge, MetricsSender, ProductClient, ProductRepository, Service,
};

/// Identity key of a stored product.
pub type ProductId = i64;
