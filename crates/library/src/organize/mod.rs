//! Placement of one game's screenshots and cover.
//!
//! The primary entry point is [`organize_game`], which resolves the game's
//! directory, fetches its cover when asked to, then places every screenshot
//! in provider order. Problems with one screenshot never stop the others; they
//! are collected in the returned [`Report`].

mod cover;
mod directory;
pub mod error;
mod game;
mod screenshot;

pub use self::cover::{COVER_NAME, CoverAction};
pub use self::game::{Report, organize_game};
pub use self::screenshot::Action;
