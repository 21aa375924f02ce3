//! Best-effort search index synchronization
//!
//! Index and remove calls are handed to the background task queue; their
//! failures are logged by the queue and never reach the caller. Encrypted
//! paths are stripped before a document is handed to the index.

use docvault_domain::ports::{SearchProvider, TaskQueue};
use docvault_domain::value_objects::{Document, FieldPath};
use std::fmt;
use std::sync::Arc;

/// Task name for index submissions
pub const TASK_SEARCH_INDEX: &str = "search.index";
/// Task name for removals
pub const TASK_SEARCH_REMOVE: &str = "search.remove";

/// Background bridge to a search provider
#[derive(Clone)]
pub struct SearchSync {
    provider: Arc<dyn SearchProvider>,
    tasks: Arc<dyn TaskQueue>,
}

impl SearchSync {
    /// Bridge `provider` through `tasks`
    pub fn new(provider: Arc<dyn SearchProvider>, tasks: Arc<dyn TaskQueue>) -> Self {
        Self { provider, tasks }
    }

    /// Underlying provider
    pub fn provider(&self) -> &Arc<dyn SearchProvider> {
        &self.provider
    }

    /// Schedule (re-)indexing of a plaintext document
    pub fn index(&self, collection: &str, id: &str, mut doc: Document, sensitive: &[FieldPath]) {
        for path in sensitive {
            path.remove(&mut doc);
        }
        let provider = Arc::clone(&self.provider);
        let collection = collection.to_string();
        let id = id.to_string();
        self.tasks.submit(
            TASK_SEARCH_INDEX,
            Box::pin(async move { provider.index(&collection, &id, &doc).await }),
        );
    }

    /// Schedule removal of a document from the index
    pub fn remove(&self, collection: &str, id: &str) {
        let provider = Arc::clone(&self.provider);
        let collection = collection.to_string();
        let id = id.to_string();
        self.tasks.submit(
            TASK_SEARCH_REMOVE,
            Box::pin(async move { provider.remove(&collection, &id).await }),
        );
    }
}

impl fmt::Debug for SearchSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchSync")
            .field("provider", &self.provider.provider_name())
            .finish()
    }
}
