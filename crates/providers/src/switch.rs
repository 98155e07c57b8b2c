//! Nintendo Switch album exports.
//!
//! The console names captures `YYYYMMDDHHMMSSxx-<ENCRYPTED GAME ID>.<ext>`,
//! where the id is stable per title but opaque. A community-maintained catalog
//! maps those ids to titles.

use crate::catalog::{self, Source};
use crate::fs::{file_stem, walk_files};
use crate::timestamp;
use async_trait::async_trait;
use gsm_cache::CacheHandle;
use gsm_fetch::HttpClient;
use gsm_games::error::Result;
use gsm_games::{Game, GameSet, Provider, ProviderOptions, Screenshot, extension_of};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::instrument;

pub const NAME: &str = "nintendo-switch";
const PLATFORM: &str = "Nintendo Switch";
const GAME_LIST: Source = Source {
    cache_key: "switch-games",
    url: "https://fmartingr.github.io/switch-games-json/switch_id_names.json",
};

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(rename = "title_normalized", default)]
    title: String,
    encrypted_game_id: String,
}

/// Catalog entries keyed by upper-cased encrypted id.
#[derive(Debug, Default)]
struct Titles(HashMap<String, CatalogEntry>);
impl Titles {
    fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self(entries.into_iter().map(|entry| (entry.encrypted_game_id.to_uppercase(), entry)).collect())
    }

    fn find(&self, encrypted_id: &str) -> Option<&CatalogEntry> {
        self.0.get(&encrypted_id.to_uppercase())
    }
}

/// A capture file name split into its parts.
#[derive(Debug, PartialEq)]
struct Capture<'a> {
    encrypted_id: &'a str,
    destination_name: String,
}
impl<'a> Capture<'a> {
    fn parse(path: &'a Path) -> Option<Self> {
        let stem = file_stem(path)?;
        let (stamp, encrypted_id) = stem.split_once('-')?;
        if encrypted_id.is_empty() {
            return None;
        }
        let datetime = timestamp::parse_compact(stamp.get(..14)?)?;
        let destination_name = timestamp::destination_name(datetime, &extension_of(path))?;
        Some(Self { encrypted_id, destination_name })
    }
}

pub struct SwitchProvider {
    cache: CacheHandle,
    http: HttpClient,
}
impl SwitchProvider {
    pub fn new(cache: CacheHandle, http: HttpClient) -> Self {
        Self { cache, http }
    }
}

#[async_trait]
impl Provider for SwitchProvider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip_all, fields(provider = NAME))]
    async fn find_games(&self, options: &ProviderOptions) -> Result<Vec<Game>> {
        let root = options.require_input_path()?;
        let game_list = catalog::spawn::<Vec<CatalogEntry>>(self.cache.clone(), self.http.clone(), GAME_LIST);
        let files = walk_files(root).await?;
        let titles = Titles::from_entries(catalog::receive(game_list, GAME_LIST).await);

        let mut games = GameSet::new();
        for path in &files {
            let Some(capture) = Capture::parse(path) else {
                tracing::warn!(path = %path.display(), "Skipping file with unrecognized name");
                continue;
            };
            let (id, title) = match titles.find(capture.encrypted_id) {
                Some(entry) => (entry.encrypted_game_id.as_str(), entry.title.as_str()),
                None => (capture.encrypted_id, ""),
            };
            let screenshot = Screenshot::with_destination(path, capture.destination_name);
            games.push(id, || Game::new(id, title, PLATFORM, NAME), screenshot);
        }
        Ok(games.into_games())
    }
}
