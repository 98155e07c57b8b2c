use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Layout of every timestamp-derived destination file name.
pub const DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");

/// Formats a capture time the way destination files are named, without an
/// extension: `2024-02-29_13-45-00`.
pub fn format_datetime(datetime: PrimitiveDateTime) -> Result<String> {
    datetime.format(DATETIME_FORMAT).or_raise(|| ErrorKind::Format)
}

/// One discovered title and the screenshots waiting to be placed for it.
///
/// Built once by a provider during discovery, then handed to the processor
/// and never modified again.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Game {
    /// Provider-assigned identifier, unique within one provider's results.
    pub id: String,
    /// Display name. May be empty when the provider couldn't resolve a
    /// title, in which case [`id`](Self::id) is used for the directory.
    pub name: String,
    /// Platform label used as the first directory segment (`PC`,
    /// `Nintendo Switch`).
    pub platform: String,
    /// Name of the provider that found this game.
    pub provider: String,
    pub screenshots: Vec<Screenshot>,
    /// Free-form annotation, only ever logged.
    pub notes: String,
    pub cover_url: Option<String>,
}
impl Game {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        platform: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            platform: platform.into(),
            provider: provider.into(),
            ..Self::default()
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_cover_url(mut self, url: impl Into<String>) -> Self {
        self.cover_url = Some(url.into());
        self
    }

    /// Name of the game's directory: its name, or its id when the name is
    /// unknown.
    pub fn directory_name(&self) -> &str {
        match self.name.is_empty() {
            true => &self.id,
            false => &self.name,
        }
    }
}

/// One source media file bound for the library.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screenshot {
    /// Absolute location of the source file. The file itself is never moved
    /// or modified, only copied.
    pub path: PathBuf,
    /// Target file name, extension included. When absent the name is derived
    /// from the source's modification time.
    pub destination_name: Option<String>,
}
impl Screenshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), destination_name: None }
    }

    pub fn with_destination(path: impl Into<PathBuf>, destination_name: impl Into<String>) -> Self {
        Self { path: path.into(), destination_name: Some(destination_name.into()) }
    }

    /// Extension of the source file including the leading dot, or an empty
    /// string.
    pub fn extension(&self) -> String {
        extension_of(&self.path)
    }

    /// Resolves the destination file name.
    ///
    /// Uses the explicit name when the provider set one, otherwise formats
    /// the source file's modification time in `offset` and appends the
    /// original extension.
    pub async fn resolve_destination_name(&self, offset: UtcOffset) -> Result<String> {
        if let Some(name) = self.destination_name.as_deref().filter(|n| !n.is_empty()) {
            return Ok(name.to_string());
        }
        let metadata = tokio::fs::metadata(&self.path).await.or_raise(|| ErrorKind::Metadata(self.path.clone()))?;
        let modified = metadata.modified().or_raise(|| ErrorKind::Metadata(self.path.clone()))?;
        Ok(format!("{}{}", format_modified(modified.into(), offset)?, self.extension()))
    }
}

/// Formats a modification time as a destination name stem.
pub fn format_modified(modified: OffsetDateTime, offset: UtcOffset) -> Result<String> {
    let local = modified.to_offset(offset);
    format_datetime(PrimitiveDateTime::new(local.date(), local.time()))
}

/// `.png` for `a/b.png`, empty for files without an extension.
pub fn extension_of(path: &Path) -> String {
    path.extension().map(|ext| format!(".{}", ext.to_string_lossy())).unwrap_or_default()
}
