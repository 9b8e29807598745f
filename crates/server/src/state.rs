use std::sync::Arc;

use service::{articles::ArticleService, catalog::ServiceCatalog, store::RecordStore};

/// Shared handler state, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub articles: ArticleService,
    pub catalog: ServiceCatalog,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            articles: ArticleService::new(Arc::clone(&store)),
            catalog: ServiceCatalog::new(store),
        }
    }
}
