use crate::audit::{AuditEvent, AuditSink};
use crate::enrichment::WebEnricher;
use crate::errors::AppError;
use crate::matcher::{self, MatchQuery};
use crate::models::{InternalMatch, SearchQuery, SearchResponse};
use crate::normalizer::load_store;
use crate::store::StoreHandle;
use crate::table::TableSource;
use std::sync::Arc;

/// Entry point for searches: combines internal matches with web enrichment.
pub struct LookupService {
    store: StoreHandle,
    source: Arc<dyn TableSource>,
    enricher: WebEnricher,
    audit: Arc<dyn AuditSink>,
}

impl LookupService {
    /// Loads the initial store from `source`. An unavailable source yields an empty store.
    pub fn new(
        source: Arc<dyn TableSource>,
        enricher: WebEnricher,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let store = StoreHandle::new(load_store(source.as_ref()));
        Self {
            store,
            source,
            enricher,
            audit,
        }
    }

    /// Runs the matcher and the enricher for one query.
    ///
    /// Only an empty query fails; enrichment problems are reported inside
    /// `SearchResponse::external`.
    pub async fn search(
        &self,
        query: &SearchQuery,
        caller: &str,
    ) -> Result<SearchResponse, AppError> {
        let match_query = MatchQuery::from_search(query)?;

        let internal: Vec<InternalMatch> = {
            let snapshot = self.store.snapshot();
            matcher::find(&snapshot, &match_query)
                .map(InternalMatch::from)
                .collect()
        };

        tracing::info!(
            mode = ?match_query.mode(),
            matches = internal.len(),
            "Internal search finished"
        );

        let external = self.enricher.enrich(&match_query.effective_text()).await;

        self.audit
            .record(AuditEvent::new(query, caller, !internal.is_empty()));

        Ok(SearchResponse { internal, external })
    }

    /// Rebuilds the store from the source and publishes it in one swap.
    pub fn reload(&self) -> usize {
        let fresh = load_store(self.source.as_ref());
        let rows = fresh.len();
        let version = self.store.publish(fresh);
        tracing::info!("Customer table reloaded: {} rows (version {})", rows, version);
        rows
    }

    pub fn rows_loaded(&self) -> usize {
        self.store.rows_loaded()
    }
}
