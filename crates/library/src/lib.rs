//! Places discovered screenshots into the normalized library tree:
//!
//! ```text
//! <output>/<platform>/<game>/<YYYY-MM-DD_HH-MM-SS>.<ext>
//! <output>/<platform>/<game>/.cover
//! ```
//!
//! [`organize::organize_game`] does the work for one game; [`Processor`] runs
//! it on a fixed pool of workers fed through a bounded queue.

pub mod error;
pub mod organize;
mod processor;
#[cfg(test)]
mod testing;

pub use crate::processor::{Options, Processor, Totals};
use gsm_fetch::FetchHandle;
use gsm_storage::BackendHandle;
use time::UtcOffset;

/// Everything a worker needs to organize a game.
#[derive(Clone)]
pub struct Context {
    /// Output tree. Already read-only when `dry_run` is set.
    pub backend: BackendHandle,
    pub fetcher: FetchHandle,
    pub dry_run: bool,
    pub download_covers: bool,
    /// Offset for names derived from file modification times.
    pub utc_offset: UtcOffset,
}
