//! RetroArch, driven by its playlists.
//!
//! Requires RetroArch to be configured with `screenshots_in_content_dir` and
//! `auto_screenshot_filename`, so screenshots sit next to the content they
//! were taken from and carry a `YYMMDD-HHMMSS` suffix. Each `*.lpl` playlist
//! in the input path names a platform; each item in it is a game.

use crate::fs::{file_name, file_stem, list_files};
use crate::timestamp;
use async_trait::async_trait;
use exn::ResultExt;
use gsm_fetch::Url;
use gsm_games::error::{ErrorKind, Result};
use gsm_games::{Game, Provider, ProviderOptions, Screenshot, extension_of, format_modified};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use time::UtcOffset;
use tracing::instrument;

pub const NAME: &str = "retroarch";
const THUMBNAILS_URL: &str = "http://thumbnails.libretro.com/";
const ACHIEVEMENT_MARKER: &str = "-cheevo-";

#[derive(Debug, Default, Deserialize)]
struct Playlist {
    #[serde(default)]
    items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    path: PathBuf,
    #[serde(default)]
    label: String,
}

/// `Nintendo - Super Nintendo Entertainment System` -> `Super Nintendo Entertainment System`
fn clean_platform(playlist: &str) -> &str {
    playlist.strip_prefix("Nintendo - ").unwrap_or(playlist)
}

/// `Chrono Trigger (USA)` -> `Chrono Trigger`
fn clean_label(label: &str) -> &str {
    label.split('(').next().unwrap_or(label).trim()
}

fn cover_url(playlist: &str, label: &str) -> Option<String> {
    let mut url = Url::parse(THUMBNAILS_URL).ok()?;
    let file = format!("{label}.png");
    url.path_segments_mut().ok()?.pop_if_empty().extend([playlist, "Named_Boxarts", file.as_str()]);
    Some(url.to_string())
}

/// Destination for a screenshot of the content `stem`, or `None` when the
/// file isn't one.
fn destination_name(path: &Path, modified: Option<time::OffsetDateTime>, offset: UtcOffset) -> Option<String> {
    let name = file_name(path)?;
    let extension = extension_of(path);
    let stem = name.strip_suffix(extension.as_str())?;
    if let Some((_, achievement)) = stem.rsplit_once(ACHIEVEMENT_MARKER) {
        // Achievement shots carry an id instead of a timestamp.
        let stamp = format_modified(modified?, offset).ok()?;
        return Some(format!("{stamp}_retroachievement-{achievement}{extension}"));
    }
    let (date, clock) = stem.get(stem.len().checked_sub(13)?..)?.split_once('-')?;
    timestamp::destination_name(timestamp::parse_short_year(date, clock)?, &extension)
}

#[derive(Default)]
pub struct RetroArchProvider;
impl RetroArchProvider {
    pub fn new() -> Self {
        Self
    }

    async fn read_playlist(path: &Path) -> Option<Playlist> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Could not read playlist");
                return None;
            },
        };
        match serde_json::from_str(&text) {
            Ok(playlist) => Some(playlist),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Could not parse playlist");
                None
            },
        }
    }

    async fn screenshots(item: &PlaylistItem, offset: UtcOffset) -> std::io::Result<Vec<Screenshot>> {
        let (Some(dir), Some(content)) = (item.path.parent(), file_stem(&item.path)) else {
            return Ok(Vec::new());
        };
        let mut screenshots = Vec::new();
        for path in list_files(dir).await? {
            let Some(name) = file_name(&path) else { continue };
            if !name.contains(content) || extension_of(&path) != ".png" || name.contains(".state.") {
                continue;
            }
            let modified = tokio::fs::metadata(&path).await.and_then(|m| m.modified()).ok().map(Into::into);
            match destination_name(&path, modified, offset) {
                Some(destination) => screenshots.push(Screenshot::with_destination(&path, destination)),
                None => tracing::warn!(path = %path.display(), "Skipping file with unrecognized name"),
            }
        }
        Ok(screenshots)
    }
}

#[async_trait]
impl Provider for RetroArchProvider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip_all, fields(provider = NAME))]
    async fn find_games(&self, options: &ProviderOptions) -> Result<Vec<Game>> {
        let root = options.require_input_path()?;
        let files = list_files(root).await.or_raise(|| ErrorKind::InputPath(root.to_path_buf()))?;

        let mut games = Vec::new();
        for path in files.iter().filter(|p| extension_of(p) == ".lpl") {
            let (Some(playlist_name), Some(playlist)) = (file_stem(path), Self::read_playlist(path).await) else {
                continue;
            };
            for item in &playlist.items {
                let screenshots = match Self::screenshots(item, options.utc_offset).await {
                    Ok(screenshots) => screenshots,
                    Err(e) => {
                        tracing::error!(content = %item.path.display(), error = %e, "Could not read game screenshots");
                        continue;
                    },
                };
                let mut game = Game::new(&item.label, clean_label(&item.label), clean_platform(playlist_name), NAME);
                game.screenshots = screenshots;
                if let Some(url) = cover_url(playlist_name, &item.label) {
                    game = game.with_cover_url(url);
                }
                games.push(game);
            }
        }
        Ok(games)
    }
}
