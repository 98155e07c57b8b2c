//! Steam stores screenshots per local user and per app id:
//! `<steam>/userdata/<user>/760/remote/<appid>/screenshots/*.jpg`.

use crate::catalog::{self, Source};
use crate::fs::{file_name, list_dirs, list_files};
use async_trait::async_trait;
use exn::ResultExt;
use gsm_cache::CacheHandle;
use gsm_fetch::HttpClient;
use gsm_games::error::{ErrorKind, Result};
use gsm_games::{Game, Provider, ProviderOptions, Screenshot};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::instrument;

pub const NAME: &str = "steam";
const PLATFORM: &str = "PC";
const APP_LIST: Source = Source {
    cache_key: "steam-applist",
    url: "https://api.steampowered.com/ISteamApps/GetAppList/v2/",
};

#[derive(Debug, Default, Deserialize)]
struct AppListResponse {
    applist: AppList,
}

#[derive(Debug, Default, Deserialize)]
struct AppList {
    #[serde(default)]
    apps: Vec<App>,
}

#[derive(Debug, Deserialize)]
struct App {
    appid: u64,
    #[serde(default)]
    name: String,
}

impl AppListResponse {
    fn into_names(self) -> HashMap<u64, String> {
        self.applist.apps.into_iter().map(|app| (app.appid, app.name)).collect()
    }
}

fn cover_url(app_id: &str) -> String {
    format!("https://cdn.cloudflare.steamstatic.com/steam/apps/{app_id}/header.jpg")
}

pub struct SteamProvider {
    cache: CacheHandle,
    http: HttpClient,
}
impl SteamProvider {
    pub fn new(cache: CacheHandle, http: HttpClient) -> Self {
        Self { cache, http }
    }

    fn default_root() -> Result<PathBuf> {
        if cfg!(target_os = "windows") {
            return Ok(PathBuf::from(r"C:\Program Files (x86)\Steam"));
        }
        let home = crate::home_dir()?;
        match std::env::consts::OS {
            "linux" => Ok(home.join(".local/share/Steam")),
            "macos" => Ok(home.join("Library/Application Support/Steam")),
            os => exn::bail!(ErrorKind::UnsupportedPlatform(os)),
        }
    }

    /// Numeric directories under `userdata` are local Steam accounts.
    async fn users(root: &Path) -> Result<Vec<PathBuf>> {
        let userdata = root.join("userdata");
        if !tokio::fs::try_exists(&userdata).await.unwrap_or(false) {
            tracing::warn!(path = %userdata.display(), "No Steam user data found");
            return Ok(Vec::new());
        }
        let dirs = list_dirs(&userdata).await.or_raise(|| ErrorKind::InputPath(userdata.clone()))?;
        Ok(dirs.into_iter().filter(|dir| file_name(dir).is_some_and(|n| n.parse::<u64>().is_ok())).collect())
    }

    async fn user_games(user: &Path, names: &HashMap<u64, String>) -> Vec<Game> {
        let remote = user.join("760").join("remote");
        let app_dirs = match list_dirs(&remote).await {
            Ok(dirs) => dirs,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %remote.display(), error = %e, "Could not list Steam games");
                return Vec::new();
            },
        };
        let mut games = Vec::new();
        for app_dir in app_dirs {
            let Some(app_id) = file_name(&app_dir) else { continue };
            let name = app_id.parse::<u64>().ok().and_then(|id| names.get(&id)).cloned().unwrap_or_default();
            if name.is_empty() {
                tracing::warn!(app_id, "Steam game id not found in app list");
            }
            let screenshots_dir = app_dir.join("screenshots");
            let files = match list_files(&screenshots_dir).await {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!(path = %screenshots_dir.display(), error = %e, "Could not read screenshots");
                    continue;
                },
            };
            let mut game = Game::new(app_id, name, PLATFORM, NAME).with_cover_url(cover_url(app_id));
            game.screenshots =
                files.into_iter().filter(|f| f.extension().is_some_and(|e| e == "jpg")).map(Screenshot::new).collect();
            tracing::debug!(app_id, name = %game.name, screenshots = game.screenshots.len(), "Found Steam game");
            games.push(game);
        }
        games
    }
}

#[async_trait]
impl Provider for SteamProvider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip_all, fields(provider = NAME))]
    async fn find_games(&self, options: &ProviderOptions) -> Result<Vec<Game>> {
        let root = match &options.input_path {
            Some(path) => path.clone(),
            None => Self::default_root()?,
        };
        let app_list = catalog::spawn::<AppListResponse>(self.cache.clone(), self.http.clone(), APP_LIST);
        let users = Self::users(&root).await?;
        let names = catalog::receive(app_list, APP_LIST).await.into_names();

        let mut games = Vec::new();
        for user in users {
            tracing::info!(user = file_name(&user).unwrap_or_default(), "Found Steam user");
            games.extend(Self::user_games(&user, &names).await);
        }
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsm_cache::{Cache, MemoryCache};
    use std::sync::Arc;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"jpg").unwrap();
    }

    #[tokio::test]
    async fn test_find_games() {
        let root = tempfile::tempdir().unwrap();
        let remote = root.path().join("userdata/12345/760/remote");
        touch(&remote.join("440/screenshots/20240101120000_1.jpg"));
        touch(&remote.join("440/screenshots/thumbnails.txt"));
        touch(&remote.join("999/screenshots/20240101120000_1.jpg"));
        touch(&root.path().join("userdata/anonymous/760/remote/1/screenshots/x.jpg"));

        let cache: CacheHandle = Arc::new(MemoryCache::new());
        cache
            .put("steam-applist", r#"{"applist":{"apps":[{"appid":440,"name":"Team Fortress 2"}]}}"#)
            .await
            .unwrap();
        let provider = SteamProvider::new(cache, HttpClient::new().unwrap());
        let options = ProviderOptions::new(Some(root.path().to_path_buf()));
        let games = provider.find_games(&options).await.unwrap();

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].id, "440");
        assert_eq!(games[0].name, "Team Fortress 2");
        assert_eq!(games[0].platform, "PC");
        assert_eq!(games[0].screenshots, vec![Screenshot::new(remote.join("440/screenshots/20240101120000_1.jpg"))]);
        assert_eq!(
            games[0].cover_url.as_deref(),
            Some("https://cdn.cloudflare.steamstatic.com/steam/apps/440/header.jpg")
        );
        assert_eq!(games[1].id, "999");
        assert_eq!(games[1].name, "");
        assert_eq!(games[1].directory_name(), "999");
    }

    #[tokio::test]
    async fn test_no_userdata_is_empty() {
        let root = tempfile::tempdir().unwrap();
        let cache: CacheHandle = Arc::new(MemoryCache::new());
        cache.put("steam-applist", r#"{"applist":{"apps":[]}}"#).await.unwrap();
        let provider = SteamProvider::new(cache, HttpClient::new().unwrap());
        let games = provider.find_games(&ProviderOptions::new(Some(root.path().to_path_buf()))).await.unwrap();
        assert!(games.is_empty());
    }
}
