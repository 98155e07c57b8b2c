//! World of Warcraft writes `WoWScrnShot_MMDDYY_HHMMSS.jpg` into the
//! `Screenshots` directory of the install.

use crate::fs::{file_name, list_files};
use crate::timestamp;
use async_trait::async_trait;
use exn::ResultExt;
use gsm_games::error::{ErrorKind, Result};
use gsm_games::{Game, Provider, ProviderOptions, Screenshot};
use std::path::PathBuf;
use tracing::instrument;

pub const NAME: &str = "worldofwarcraft";
const PLATFORM: &str = "PC";
const PREFIX: &str = "WoWScrnShot_";
const EXTENSION: &str = ".jpg";

/// `WoWScrnShot_031521_204512.jpg` -> `2021-03-15_20-45-12.jpg`
fn destination_name(name: &str) -> Option<String> {
    let stamp = name.strip_prefix(PREFIX)?.strip_suffix(EXTENSION)?;
    let (date, clock) = stamp.split_once('_')?;
    // MMDDYY -> YYMMDD
    let (month_day, year) = (date.get(..4)?, date.get(4..)?);
    let datetime = timestamp::parse_short_year(&format!("{year}{month_day}"), clock)?;
    timestamp::destination_name(datetime, EXTENSION)
}

#[derive(Default)]
pub struct WorldOfWarcraftProvider;
impl WorldOfWarcraftProvider {
    pub fn new() -> Self {
        Self
    }

    fn default_root() -> Result<PathBuf> {
        match std::env::consts::OS {
            "windows" => Ok(PathBuf::from("C:/Program Files (x86)/World of Warcraft/_retail_/Screenshots")),
            "macos" => Ok(PathBuf::from("/Applications/World of Warcraft/_retail_/Screenshots")),
            os => exn::bail!(ErrorKind::UnsupportedPlatform(os)),
        }
    }
}

#[async_trait]
impl Provider for WorldOfWarcraftProvider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip_all, fields(provider = NAME))]
    async fn find_games(&self, options: &ProviderOptions) -> Result<Vec<Game>> {
        let root = match &options.input_path {
            Some(path) => path.clone(),
            None => Self::default_root()?,
        };
        let files = list_files(&root).await.or_raise(|| ErrorKind::InputPath(root.clone()))?;

        let mut game = Game::new("wow", "World of Warcraft", PLATFORM, NAME);
        for path in files {
            let Some(name) = file_name(&path).filter(|n| n.ends_with(EXTENSION)) else { continue };
            match destination_name(name) {
                Some(destination) => game.screenshots.push(Screenshot::with_destination(&path, destination)),
                None => tracing::warn!(path = %path.display(), "Skipping file with unrecognized name"),
            }
        }
        Ok(vec![game])
    }
}
