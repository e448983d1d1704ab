//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::SharedStore;
use crate::services::{ImageResolver, OrderNotifier};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// data store, the order notifier, and image URL binding.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: SharedStore,
    notifier: Arc<dyn OrderNotifier>,
    images: ImageResolver,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: SharedStore, notifier: Arc<dyn OrderNotifier>, images: ImageResolver) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                notifier,
                images,
            }),
        }
    }

    /// Get a reference to the data store.
    #[must_use]
    pub fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    /// Get a reference to the order notifier.
    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn OrderNotifier> {
        &self.inner.notifier
    }

    /// Get a reference to the image URL resolver.
    #[must_use]
    pub fn images(&self) -> &ImageResolver {
        &self.inner.images
    }
}
