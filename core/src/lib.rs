use julkvall_protocol::{Order, Table};
use serde::{Deserialize, Serialize};

pub use content::*;
pub use deck::*;
pub use error::*;
pub use leaderboard::*;
pub use progress::*;
pub use remote::*;
pub use session::*;
pub use unlock::*;

mod content;
mod deck;
mod error;
mod leaderboard;
mod progress;
mod remote;
mod session;
mod unlock;

#[cfg(test)]
mod fakes;

/// Integer ID of a level in a progression sequence, 1-based.
pub type LevelId = u32;

/// Game families that keep a solved set and a leaderboard.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    Puzzles,
    Emojis,
}

impl GameType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Puzzles => "puzzles",
            Self::Emojis => "emojis",
        }
    }

    /// Local storage key holding the solved set.
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Puzzles => "christmas_games_puzzles",
            Self::Emojis => "christmas_games_emojis",
        }
    }

    pub const fn table(self) -> Table {
        match self {
            Self::Puzzles => Table::PuzzleCompletions,
            Self::Emojis => Table::EmojiCompletions,
        }
    }

    /// Remote ordering matching [`LeaderboardView`]'s comparator.
    pub const fn order(self) -> Order {
        match self {
            Self::Puzzles => Order::asc("completed_at"),
            Self::Emojis => Order::asc("duration_seconds"),
        }
    }
}

impl core::fmt::Display for GameType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}
