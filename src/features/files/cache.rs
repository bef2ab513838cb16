//! Cache for paginated file listings
//!
//! Entries are keyed by (user, page, page size) and are only ever dropped all
//! at once. A generation counter stops a listing computed before an
//! invalidation from being stored after it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::features::files::dtos::FileRecordSummaryDto;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub user_id: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    pub items: Vec<FileRecordSummaryDto>,
    pub total: i64,
}

#[derive(Default)]
pub struct ListingCache {
    entries: RwLock<HashMap<ListingKey, Arc<ListingPage>>>,
    generation: AtomicU64,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &ListingKey) -> Option<Arc<ListingPage>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Current generation; pass it back to [`ListingCache::insert`]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store a computed page and return it.
    ///
    /// Empty pages are never stored, and neither is anything computed under an
    /// older generation than the current one.
    pub async fn insert(
        &self,
        key: ListingKey,
        page: ListingPage,
        generation: u64,
    ) -> Arc<ListingPage> {
        let page = Arc::new(page);
        if page.items.is_empty() {
            return page;
        }

        let mut entries = self.entries.write().await;
        if self.generation.load(Ordering::Acquire) == generation {
            entries.insert(key, Arc::clone(&page));
        }
        page
    }

    /// Drop every cached page for every user
    pub async fn invalidate_all(&self) {
        let mut entries = self.entries.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        let evicted = entries.len();
        entries.clear();
        tracing::debug!("Listing cache cleared ({} entries)", evicted);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
