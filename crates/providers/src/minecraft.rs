//! Minecraft keeps screenshots in `<game dir>/screenshots`, already named
//! by capture time, so file names are kept as they are.

use crate::fs::{file_name, list_files};
use async_trait::async_trait;
use exn::OptionExt;
use gsm_games::error::{ErrorKind, Result};
use gsm_games::{Game, Provider, ProviderOptions, Screenshot};
use std::path::{Path, PathBuf};
use tracing::instrument;

pub const NAME: &str = "minecraft";
const PLATFORM: &str = "PC";

/// One install variant and where it keeps its screenshots.
struct Install {
    notes: &'static str,
    paths: Vec<PathBuf>,
}

#[derive(Default)]
pub struct MinecraftProvider;
impl MinecraftProvider {
    pub fn new() -> Self {
        Self
    }

    fn installs(options: &ProviderOptions) -> Result<Vec<Install>> {
        if let Some(path) = &options.input_path {
            return Ok(vec![Install { notes: "Custom", paths: vec![path.clone()] }]);
        }
        let dirs = directories::BaseDirs::new().ok_or_raise(|| ErrorKind::NoHomeDirectory)?;
        let home = dirs.home_dir();
        match std::env::consts::OS {
            "linux" => Ok(vec![
                Install { notes: "Standalone", paths: vec![home.join(".minecraft/screenshots")] },
                Install {
                    notes: "Flatpak",
                    paths: vec![
                        home.join(".var/app/com.mojang.Minecraft/.minecraft/screenshots"),
                        home.join(".var/app/com.mojang.Minecraft/data/minecraft/screenshots"),
                    ],
                },
            ]),
            // `config_dir` is %APPDATA% on Windows.
            "windows" => Ok(vec![Install {
                notes: "Standalone",
                paths: vec![dirs.config_dir().join(".minecraft/screenshots")],
            }]),
            "macos" => Ok(vec![Install {
                notes: "Standalone",
                paths: vec![home.join("Library/Application Support/minecraft/screenshots")],
            }]),
            os => exn::bail!(ErrorKind::UnsupportedPlatform(os)),
        }
    }

    async fn screenshots(dir: &Path) -> Vec<Screenshot> {
        let files = match list_files(dir).await {
            Ok(files) => files,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::error!(path = %dir.display(), error = %e, "Could not read screenshots");
                return Vec::new();
            },
        };
        files
            .into_iter()
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .filter_map(|path| {
                let name = file_name(&path)?.to_string();
                Some(Screenshot::with_destination(path, name))
            })
            .collect()
    }
}

#[async_trait]
impl Provider for MinecraftProvider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip_all, fields(provider = NAME))]
    async fn find_games(&self, options: &ProviderOptions) -> Result<Vec<Game>> {
        let mut games = Vec::new();
        for install in Self::installs(options)? {
            let mut game = Game::new(NAME, "Minecraft", PLATFORM, NAME).with_notes(install.notes);
            for path in &install.paths {
                game.screenshots.extend(Self::screenshots(path).await);
            }
            games.push(game);
        }
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_input_path_override() {
        let root = tempfile::tempdir().unwrap();
        for name in ["2024-01-01_10.00.00.png", "options.txt"] {
            std::fs::write(root.path().join(name), b"data").unwrap();
        }
        let games = MinecraftProvider::new()
            .find_games(&ProviderOptions::new(Some(root.path().to_path_buf())))
            .await
            .unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "Minecraft");
        assert_eq!(games[0].notes, "Custom");
        assert_eq!(
            games[0].screenshots,
            vec![Screenshot::with_destination(root.path().join("2024-01-01_10.00.00.png"), "2024-01-01_10.00.00.png")]
        );
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let root = tempfile::tempdir().unwrap();
        let games = MinecraftProvider::new()
            .find_games(&ProviderOptions::new(Some(root.path().join("nope"))))
            .await
            .unwrap();
        assert!(games[0].screenshots.is_empty());
    }
}
