use crate::models::{Game, Screenshot};
use std::collections::HashMap;

/// Accumulates screenshots into games while a provider walks a directory
/// tree, grouping by game id and keeping first-seen order.
#[derive(Debug, Default)]
pub struct GameSet {
    games: Vec<Game>,
    index: HashMap<String, usize>,
}
impl GameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `screenshot` to the game with `id`, creating the game with
    /// `make` the first time the id is seen.
    pub fn push(&mut self, id: &str, make: impl FnOnce() -> Game, screenshot: Screenshot) {
        let position = match self.index.get(id) {
            Some(position) => *position,
            None => {
                self.games.push(make());
                self.index.insert(id.to_string(), self.games.len() - 1);
                self.games.len() - 1
            },
        };
        self.games[position].screenshots.push(screenshot);
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn into_games(self) -> Vec<Game> {
        self.games
    }
}
