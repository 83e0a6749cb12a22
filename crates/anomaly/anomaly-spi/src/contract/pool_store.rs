//! Persistence of the detector pool.

use crate::error::PoolError;
use crate::model::PoolDocument;

/// Keyed document store for pool entries.
///
/// `load` on a store that holds nothing yet yields an empty document.
pub trait PoolStore: Send + Sync {
    fn load(&self) -> Result<PoolDocument, PoolError>;

    fn save(&self, document: &PoolDocument) -> Result<(), PoolError>;
}
