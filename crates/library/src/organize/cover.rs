use crate::Context;
use crate::organize::error::{ErrorKind as OrganizeErrorKind, Result as OrganizeResult};
use exn::ResultExt;
use gsm_storage::error::ErrorKind as StorageErrorKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// File name covers are stored under, inside the game directory.
pub const COVER_NAME: &str = ".cover";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverAction {
    Downloaded(PathBuf),
    /// A cover was already there and was left alone.
    AlreadyPresent(PathBuf),
}

/// Downloads the cover at `url` into `directory`, unless one exists already.
///
/// Existing covers are never overwritten, and are checked for before
/// downloading so repeat runs don't hit the network.
pub(crate) async fn fetch_cover(ctx: &Context, directory: &Path, url: &str) -> OrganizeResult<CoverAction> {
    let destination = directory.join(COVER_NAME);
    if ctx.backend.exists(&destination).await.or_raise(|| OrganizeErrorKind::Storage)? {
        return Ok(CoverAction::AlreadyPresent(destination));
    }
    // Deleted when dropped at the end of this function.
    let download = ctx.fetcher.download(url).await.or_raise(|| OrganizeErrorKind::Cover(url.to_string()))?;
    match ctx.backend.import(download.path(), &destination).await {
        Ok(_) => Ok(CoverAction::Downloaded(destination)),
        Err(e) if matches!(e.deref(), StorageErrorKind::AlreadyExists(_)) => Ok(CoverAction::AlreadyPresent(destination)),
        Err(e) => Err(e).or_raise(|| OrganizeErrorKind::Storage),
    }
}
