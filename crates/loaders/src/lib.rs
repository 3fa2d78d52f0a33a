//! Per-operation batched loading.
//!
//! Lookups issued while resolving one operation are coalesced into a
//! single store round-trip per scheduling tick. See [`BatchLoader`].

pub mod batch;
pub mod character;
pub mod error;

pub use batch::{BatchFn, BatchLoader, LoaderConfig, TickScheduler, TokioTickScheduler};
pub use character::{CharacterByName, CharacterByNameLoader, CharacterLoadError, Loaders};
pub use error::{LoadError, NotFoundError};
