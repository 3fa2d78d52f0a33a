use std::sync::Arc;

use teyvat_db::repositories::{CharacterRepo, CharacterRepoConfig};
use teyvat_loaders::Loaders;
use tokio_util::sync::CancellationToken;
use tracing::Span;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: teyvat_db::DbPool,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn character_repo(&self) -> CharacterRepo {
        CharacterRepo::new(
            self.pool.clone(),
            CharacterRepoConfig {
                span: Span::current(),
                query_timeout: self.config.query_timeout,
            },
        )
    }

    /// Fresh loaders for one operation. Drop them when the operation ends.
    pub fn loaders(&self, cancel: CancellationToken) -> Loaders {
        Loaders::new(self.character_repo(), cancel, Span::current())
    }
}
