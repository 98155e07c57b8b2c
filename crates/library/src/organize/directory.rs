use crate::Context;
use crate::organize::error::{ErrorKind as OrganizeErrorKind, Result as OrganizeResult};
use exn::ResultExt;
use gsm_games::Game;
use gsm_storage::validate_segment;
use rslug::slugify;
use std::path::{Path, PathBuf};

/// Slug of a label, or `None` if nothing usable is left of it.
fn slug(label: &str) -> Option<String> {
    let slug = slugify!(label);
    (!slug.is_empty()).then_some(slug)
}

/// A label usable as a single directory segment: as-is when valid, slugged
/// otherwise.
fn segment(label: &str) -> Option<String> {
    match validate_segment(label) {
        Ok(label) => Some(label.to_string()),
        Err(_) => slug(label),
    }
}

async fn create(ctx: &Context, path: &Path, name: &str) -> OrganizeResult<()> {
    validate_segment(name).or_raise(|| OrganizeErrorKind::Directory(name.to_string()))?;
    ctx.backend.create_dir(path).await.or_raise(|| OrganizeErrorKind::Storage)
}

/// Creates (or, in a dry run, plans) `<platform>/<name or id>` and returns it
/// relative to the library root.
///
/// When the name is rejected, either because it isn't a valid single path
/// segment or because the filesystem refuses it, creation is retried exactly
/// once under the slug of the name. There is no further fallback.
pub(crate) async fn prepare(ctx: &Context, game: &Game) -> OrganizeResult<PathBuf> {
    let Some(platform) = segment(&game.platform) else {
        exn::bail!(OrganizeErrorKind::Directory(game.platform.clone()));
    };
    if game.name.is_empty() {
        tracing::warn!(id = %game.id, "Game has no name, using its id as directory");
    }
    let name = game.directory_name();
    let primary = Path::new(&platform).join(name);
    let error = match create(ctx, &primary, name).await {
        Ok(()) => return Ok(primary),
        Err(e) => e,
    };
    let Some(slug) = slug(name).filter(|slug| slug != name) else {
        return Err(error);
    };
    tracing::warn!(name, slug = %slug, error = ?error, "Directory rejected, retrying with slug");
    let fallback = Path::new(&platform).join(&slug);
    create(ctx, &fallback, &slug).await.or_raise(|| OrganizeErrorKind::Directory(name.to_string()))?;
    Ok(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("PC", Some("PC"))]
    #[case("Nintendo Switch", Some("Nintendo Switch"))]
    #[case("Sega/Genesis", Some("sega-genesis"))]
    #[case("..", None)]
    #[case("", None)]
    fn test_segment(#[case] label: &str, #[case] expected: Option<&str>) {
        assert_eq!(segment(label).as_deref(), expected);
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("../Escape").as_deref(), Some("escape"));
        assert_eq!(slug("AC/DC Live").as_deref(), Some("ac-dc-live"));
        assert_eq!(slug("///"), None);
    }
}
