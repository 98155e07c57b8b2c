use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::organize::cover::{CoverAction, fetch_cover};
use crate::organize::directory::prepare;
use crate::organize::error::Result as OrganizeResult;
use crate::organize::screenshot::{Action, place};
use exn::ResultExt;
use gsm_games::Game;
use std::path::PathBuf;

/// What happened to one game.
#[derive(Debug, Default)]
pub struct Report {
    /// Game directory relative to the library root; `None` when the game had
    /// no screenshots and was skipped.
    pub directory: Option<PathBuf>,
    /// Outcome of the cover download, if one was attempted.
    pub cover: Option<OrganizeResult<CoverAction>>,
    /// Outcome per screenshot, in provider order, keyed by source path.
    pub screenshots: Vec<(PathBuf, OrganizeResult<Action>)>,
}
impl Report {
    pub fn is_skipped(&self) -> bool {
        self.directory.is_none()
    }

    /// Number of screenshots whose outcome matches `predicate`.
    pub fn count(&self, predicate: impl Fn(&Action) -> bool) -> usize {
        self.screenshots.iter().filter(|(_, result)| result.as_ref().is_ok_and(&predicate)).count()
    }

    pub fn failures(&self) -> usize {
        self.screenshots.iter().filter(|(_, result)| result.is_err()).count()
    }
}

/// Places every screenshot of `game` into the library according to `ctx`.
///
/// - A game without screenshots is skipped: no directory, no cover.
/// - The directory is `<platform>/<name>`, falling back to the id when the
///   name is empty and to a slug when the filesystem rejects the name.
/// - The cover is fetched only when enabled, outside of dry runs, and when
///   the game has a cover URL.
///
/// # Errors
/// Only a directory that can't be created fails the game; returned as
/// [`Exn<LibraryErrorKind::Organize>`](LibraryErrorKind::Organize). Cover and
/// screenshot failures are logged and recorded in the [`Report`].
pub async fn organize_game(ctx: &Context, game: &Game) -> LibraryResult<Report> {
    if game.screenshots.is_empty() {
        tracing::debug!(id = %game.id, "Skipping game without screenshots");
        return Ok(Report::default());
    }
    let directory = prepare(ctx, game).await.or_raise(|| LibraryErrorKind::Organize)?;
    let mut report = Report { directory: Some(directory.clone()), ..Report::default() };

    if let Some(url) = game.cover_url.as_deref().filter(|_| ctx.download_covers && !ctx.dry_run) {
        let result = fetch_cover(ctx, &directory, url).await;
        match &result {
            Ok(CoverAction::Downloaded(path)) => tracing::info!(path = %path.display(), "Downloaded cover"),
            Ok(CoverAction::AlreadyPresent(_)) => tracing::debug!("Cover already present"),
            Err(e) => tracing::warn!(url, error = ?e, "Could not fetch cover"),
        }
        report.cover = Some(result);
    }

    for screenshot in &game.screenshots {
        let result = place(ctx, &directory, screenshot).await;
        let source = screenshot.path.display();
        match &result {
            Ok(Action::Copied(path)) => tracing::debug!(%source, destination = %path.display(), "Copied"),
            Ok(Action::Planned(path)) => tracing::info!(%source, destination = %path.display(), "Would copy"),
            Ok(Action::AlreadyPresent(path)) => tracing::debug!(destination = %path.display(), "Already present"),
            Ok(Action::Conflict(path)) => tracing::warn!(
                %source,
                destination = %path.display(),
                "Destination exists with different content, keeping existing file"
            ),
            Err(e) => tracing::warn!(%source, error = ?e, "Could not place screenshot"),
        }
        report.screenshots.push((screenshot.path.clone(), result));
    }
    Ok(report)
}
