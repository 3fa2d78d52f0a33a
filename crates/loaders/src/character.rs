//! Character loaders and the per-operation registry.

use std::collections::HashMap;
use std::future::Future;

use teyvat_db::error::CharacterRepoError;
use teyvat_db::models::character::Character;
use teyvat_db::repositories::CharacterRepo;
use tokio_util::sync::CancellationToken;
use tracing::Span;

use crate::batch::{BatchFn, BatchLoader, LoaderConfig};
use crate::error::LoadError;

/// Type name carried by character not-found errors.
pub const CHARACTER_TYPE: &str = "Character";

/// Batch lookup of characters by name.
#[derive(Debug, Clone)]
pub struct CharacterByName {
    repo: CharacterRepo,
}

impl CharacterByName {
    pub fn new(repo: CharacterRepo) -> Self {
        Self { repo }
    }
}

impl BatchFn for CharacterByName {
    type Key = String;
    type Value = Character;
    type Error = CharacterRepoError;

    fn load(
        &self,
        keys: &[String],
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<HashMap<String, Character>, CharacterRepoError>> + Send {
        self.repo.find_by_names(keys, cancel)
    }
}

pub type CharacterByNameLoader = BatchLoader<CharacterByName>;

pub type CharacterLoadError = LoadError<String, CharacterRepoError>;

/// Every loader one operation needs.
///
/// Build a fresh registry per operation and drop it when the operation ends;
/// loaders cache nothing between batches but do share the operation's
/// cancellation token.
#[derive(Clone)]
pub struct Loaders {
    character_by_name: CharacterByNameLoader,
}

impl Loaders {
    pub fn new(repo: CharacterRepo, cancel: CancellationToken, span: Span) -> Self {
        let config = LoaderConfig::new(CHARACTER_TYPE).with_span(span);
        Self {
            character_by_name: BatchLoader::new(CharacterByName::new(repo), config, cancel),
        }
    }

    pub fn character_by_name(&self) -> &CharacterByNameLoader {
        &self.character_by_name
    }

    /// Resolve one character, batched with every other lookup in the same
    /// tick.
    pub async fn get_character_by_name(
        &self,
        name: impl Into<String>,
    ) -> Result<Character, CharacterLoadError> {
        self.character_by_name.get(name.into()).await
    }
}
