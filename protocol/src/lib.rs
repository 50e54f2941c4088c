//! Wire shapes shared between the game core and the browser's remote store client.
//!
//! The remote store speaks PostgREST for table access and Phoenix channel frames for realtime inserts.

pub use query::*;
pub use realtime::*;
pub use rows::*;

mod query;
mod realtime;
mod rows;

/// Schema all game tables live in.
pub const SCHEMA: &str = "public";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    PuzzleCompletions,
    EmojiCompletions,
    ForeheadWords,
}

impl Table {
    pub const fn name(self) -> &'static str {
        use Table::*;
        match self {
            PuzzleCompletions => "puzzle_completions",
            EmojiCompletions => "emoji_completions",
            ForeheadWords => "forehead_words",
        }
    }

    /// Channel the host view listens on for inserts into this table.
    pub const fn channel(self) -> &'static str {
        use Table::*;
        match self {
            PuzzleCompletions => "puzzle_completions_changes",
            EmojiCompletions => "emoji_completions_changes",
            ForeheadWords => "forehead_words_changes",
        }
    }
}

impl core::fmt::Display for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
