//! PlayStation 5 captures copied off the console, one directory per game:
//! `<input>/<Game Title>/<prefix>_<YYYYMMDDHHMMSS>.(jpg|webm)`.

use crate::fs::{file_name, file_stem, walk_files};
use crate::timestamp;
use async_trait::async_trait;
use gsm_games::error::Result;
use gsm_games::{Game, GameSet, Provider, ProviderOptions, Screenshot, extension_of};
use std::path::Path;
use tracing::instrument;

pub const NAME: &str = "playstation-5";
const PLATFORM: &str = "PlayStation 5";
const EXTENSIONS: [&str; 2] = [".jpg", ".webm"];

/// Why a file under the input path isn't a capture.
#[derive(Debug, PartialEq)]
enum Skip {
    Hidden,
    Unsupported,
    Malformed,
}

fn destination_name(path: &Path) -> std::result::Result<String, Skip> {
    let name = file_name(path).ok_or(Skip::Malformed)?;
    if name.starts_with('.') {
        return Err(Skip::Hidden);
    }
    let extension = extension_of(path);
    if !EXTENSIONS.contains(&extension.as_str()) {
        return Err(Skip::Unsupported);
    }
    // Titles may contain underscores themselves; the stamp is always last.
    let (_, stamp) = file_stem(path).and_then(|stem| stem.rsplit_once('_')).ok_or(Skip::Malformed)?;
    let datetime = timestamp::parse_compact(stamp).ok_or(Skip::Malformed)?;
    timestamp::destination_name(datetime, &extension).ok_or(Skip::Malformed)
}

#[derive(Default)]
pub struct PlayStation5Provider;
impl PlayStation5Provider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Provider for PlayStation5Provider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip_all, fields(provider = NAME))]
    async fn find_games(&self, options: &ProviderOptions) -> Result<Vec<Game>> {
        let root = options.require_input_path()?;
        let mut games = GameSet::new();
        for path in walk_files(root).await? {
            let destination = match destination_name(&path) {
                Ok(destination) => destination,
                Err(Skip::Hidden) => continue,
                Err(Skip::Unsupported) => {
                    tracing::debug!(path = %path.display(), "Skipping unsupported file type");
                    continue;
                },
                Err(Skip::Malformed) => {
                    tracing::warn!(path = %path.display(), "Skipping file with unrecognized name");
                    continue;
                },
            };
            let Some(title) = path.parent().and_then(file_name).map(str::to_string) else { continue };
            games.push(&title, || Game::new(&title, &title, PLATFORM, NAME), Screenshot::with_destination(&path, destination));
        }
        Ok(games.into_games())
    }
}
