use std::sync::Arc;

use arc_swap::ArcSwapOption;

use repoqa_core::config::RetrievalConfig;
use repoqa_core::error::Result;
use repoqa_core::traits::SearchEngine;
use repoqa_core::types::{Document, SearchHit};

use crate::HybridSearchEngine;

/// Shared slot holding the currently published engine.
///
/// Rebuilds construct a complete engine first and then swap it in; readers
/// holding a snapshot keep querying the old engine until they drop it.
/// Nothing in a published engine is ever mutated.
pub struct IndexHandle<E = HybridSearchEngine> {
    current: ArcSwapOption<E>,
}

impl<E> Default for IndexHandle<E> {
    fn default() -> Self {
        Self { current: ArcSwapOption::empty() }
    }
}

impl<E> IndexHandle<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The engine queries should run against, if any corpus is loaded.
    pub fn snapshot(&self) -> Option<Arc<E>> {
        self.current.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }

    /// Replace the published engine, returning the previous one.
    pub fn publish(&self, engine: Option<E>) -> Option<Arc<E>> {
        self.current.swap(engine.map(Arc::new))
    }
}

impl<E: SearchEngine> IndexHandle<E> {
    /// Query the current snapshot. No loaded corpus means no results.
    pub fn query(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        match self.snapshot() {
            Some(engine) => engine.query(query, k),
            None => Ok(Vec::new()),
        }
    }
}

impl IndexHandle<HybridSearchEngine> {
    /// Build an engine for `documents` and publish it.
    ///
    /// On error the previously published engine stays in place.
    pub fn rebuild(&self, documents: &[Document], config: &RetrievalConfig) -> Result<bool> {
        let engine = HybridSearchEngine::build(documents, config)?;
        let loaded = engine.is_some();
        self.publish(engine);
        tracing::info!(documents = documents.len(), loaded, "published new index");
        Ok(loaded)
    }
}
