use axum::extract::FromRef;
use storage::Database;

use crate::cache::ReportCache;

/// Shared application state. Handlers extract the piece they need
/// through the `FromRef` impls below.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub report_cache: ReportCache,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            report_cache: ReportCache::default(),
        }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for ReportCache {
    fn from_ref(state: &AppState) -> Self {
        state.report_cache.clone()
    }
}
