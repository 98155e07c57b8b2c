use crate::Context;
use crate::organize::error::{ErrorKind as OrganizeErrorKind, Result as OrganizeResult};
use exn::ResultExt;
use gsm_games::Screenshot;
use gsm_storage::error::ErrorKind as StorageErrorKind;
use gsm_storage::{hash_file, validate_segment};
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// The outcome of (successfully) placing a single screenshot.
///
/// Each variant carries the destination path relative to the library root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The screenshot was copied into the library.
    Copied(PathBuf),
    /// Dry run: the screenshot would have been copied.
    Planned(PathBuf),
    /// An identical file is already at the destination.
    AlreadyPresent(PathBuf),
    /// A different file is already at the destination. It was kept and the
    /// screenshot was not copied.
    Conflict(PathBuf),
}

/// Places `screenshot` into `directory`.
///
/// A destination that doesn't exist yet is copied to (or planned, in a dry
/// run). One that does exist is compared by content hash: identical files
/// are left alone, different ones are reported as a [`Action::Conflict`] and
/// the existing file wins. The copy never overwrites; if the destination
/// shows up between the check and the copy, that is reported as
/// [`Race`](OrganizeErrorKind::Race) and not retried.
pub(crate) async fn place(ctx: &Context, directory: &Path, screenshot: &Screenshot) -> OrganizeResult<Action> {
    let name = screenshot
        .resolve_destination_name(ctx.utc_offset)
        .await
        .or_raise(|| OrganizeErrorKind::DestinationName(screenshot.path.clone()))?;
    validate_segment(&name).or_raise(|| OrganizeErrorKind::DestinationName(screenshot.path.clone()))?;
    let destination = directory.join(&name);

    if !ctx.backend.exists(&destination).await.or_raise(|| OrganizeErrorKind::Storage)? {
        if ctx.dry_run {
            return Ok(Action::Planned(destination));
        }
        return match ctx.backend.import(&screenshot.path, &destination).await {
            Ok(_) => Ok(Action::Copied(destination)),
            Err(e) if matches!(e.deref(), StorageErrorKind::AlreadyExists(_)) => {
                Err(e).or_raise(|| OrganizeErrorKind::Race(destination))
            },
            Err(e) => Err(e).or_raise(|| OrganizeErrorKind::Storage),
        };
    }

    let source_hash = hash_file(&screenshot.path).await.or_raise(|| OrganizeErrorKind::Storage)?;
    let existing_hash = ctx.backend.hash(&destination).await.or_raise(|| OrganizeErrorKind::Storage)?;
    match source_hash == existing_hash {
        true => Ok(Action::AlreadyPresent(destination)),
        false => Ok(Action::Conflict(destination)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFetch, Fixture};
    use async_trait::async_trait;
    use gsm_storage::error::Result as StorageResult;
    use gsm_storage::{BackendHandle, ContentHash, StorageBackend};
    use std::sync::Arc;
    use time::UtcOffset;

    /// Reports every destination as missing, like a check that lost the race
    /// against another writer.
    struct Stale(BackendHandle);

    #[async_trait]
    impl StorageBackend for Stale {
        fn name(&self) -> &str {
            self.0.name()
        }

        async fn exists(&self, _path: &Path) -> StorageResult<bool> {
            Ok(false)
        }

        async fn create_dir(&self, path: &Path) -> StorageResult<()> {
            self.0.create_dir(path).await
        }

        async fn import(&self, source: &Path, destination: &Path) -> StorageResult<u64> {
            self.0.import(source, destination).await
        }

        async fn hash(&self, path: &Path) -> StorageResult<ContentHash> {
            self.0.hash(path).await
        }
    }

    #[tokio::test]
    async fn test_destination_created_after_check_is_a_race() {
        let fixture = Fixture::new();
        std::fs::create_dir_all(fixture.output("PC/Foo")).unwrap();
        std::fs::write(fixture.output("PC/Foo/shot.png"), b"existing").unwrap();
        let source = fixture.source("shot.png", b"new", None);
        let ctx = Context {
            backend: Arc::new(Stale(fixture.backend())),
            fetcher: FakeFetch::new(b""),
            dry_run: false,
            download_covers: false,
            utc_offset: UtcOffset::UTC,
        };

        let err = place(&ctx, Path::new("PC/Foo"), &Screenshot::with_destination(source, "shot.png")).await.unwrap_err();
        assert!(matches!(&*err, OrganizeErrorKind::Race(path) if path == Path::new("PC/Foo/shot.png")));
        assert_eq!(std::fs::read(fixture.output("PC/Foo/shot.png")).unwrap(), b"existing");
    }

    #[tokio::test]
    async fn test_identical_destination_is_already_present() {
        let fixture = Fixture::new();
        std::fs::create_dir_all(fixture.output("PC/Foo")).unwrap();
        std::fs::write(fixture.output("PC/Foo/shot.png"), b"same").unwrap();
        let source = fixture.source("shot.png", b"same", None);
        let ctx = fixture.context(false, false, FakeFetch::new(b""));

        let action = place(&ctx, Path::new("PC/Foo"), &Screenshot::with_destination(source, "shot.png")).await.unwrap();
        assert_eq!(action, Action::AlreadyPresent(PathBuf::from("PC/Foo/shot.png")));
    }
}
