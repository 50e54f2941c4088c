use julkvall_core::{LevelId, LevelRoute, SolvedSet, resolve_level};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Route {
    Home,
    Puzzle(LevelId),
    Emojis,
    EmojiSolutions,
    Forehead,
    Leaderboard,
    NotFound,
}

impl Route {
    pub(crate) fn parse(path: &str) -> Self {
        use Route::*;
        let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();
        match segments.as_slice() {
            [] => Home,
            ["puzzles"] => Puzzle(1),
            // unparsable IDs are out of range and get redirected like any other
            ["puzzles", id] => id.parse().map_or(Puzzle(0), Puzzle),
            ["emojis"] => Emojis,
            ["emojis", "solutions"] => EmojiSolutions,
            ["forehead"] => Forehead,
            ["leaderboard"] => Leaderboard,
            _ => NotFound,
        }
    }

    pub(crate) fn path(self) -> String {
        use Route::*;
        match self {
            Home | NotFound => "/".to_string(),
            Puzzle(id) => format!("/puzzles/{}", id),
            Emojis => "/emojis".to_string(),
            EmojiSolutions => "/emojis/solutions".to_string(),
            Forehead => "/forehead".to_string(),
            Leaderboard => "/leaderboard".to_string(),
        }
    }

    /// Replaces locked or unknown puzzle IDs with the furthest puzzle the team may open.
    pub(crate) fn resolve(self, solved: &SolvedSet, puzzle_count: LevelId) -> Self {
        match self {
            Route::Puzzle(id) => match resolve_level(id, solved, puzzle_count) {
                LevelRoute::Show(id) => Route::Puzzle(id),
                LevelRoute::Redirect(target) => {
                    log::debug!("puzzle {} is not open, redirecting to {}", id, target);
                    Route::Puzzle(target)
                }
            },
            route => route,
        }
    }
}
