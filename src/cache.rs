use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::errors::Result;

/// Loads a model at most once and hands out the same instance afterwards.
///
/// A failed load leaves the cache empty, so the next request tries again.
/// There is no invalidation: the model file is treated as static for the
/// lifetime of the process.
pub struct ModelCache<M> {
    cell: OnceCell<Arc<M>>,
}

impl<M> ModelCache<M> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Cache that already holds `model`.
    pub fn with_model(model: M) -> Self {
        Self {
            cell: OnceCell::with_value(Arc::new(model)),
        }
    }

    pub fn get_or_load<F>(&self, load: F) -> Result<Arc<M>>
    where
        F: FnOnce() -> Result<M>,
    {
        self.cell
            .get_or_try_init(|| load().map(Arc::new))
            .map(Arc::clone)
    }

    pub fn get(&self) -> Option<Arc<M>> {
        self.cell.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<M> Default for ModelCache<M> {
    fn default() -> Self {
        Self::new()
    }
}
