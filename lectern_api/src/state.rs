use std::sync::Arc;

use lectern_core::prelude::*;
use sea_orm::DatabaseConnection;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone; the services only hold the connection pool.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<LecternConfig>,
    pub catalog: CatalogService,
    pub progress: ProgressService,
    pub comments: CommentsService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: LecternConfig) -> Self {
        Self {
            catalog: CatalogService::new(db.clone()),
            progress: ProgressService::new(db.clone()),
            comments: CommentsService::new(db.clone()),
            config: Arc::new(config),
            db,
        }
    }
}
