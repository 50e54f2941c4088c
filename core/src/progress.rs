use std::cell::{Ref, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::*;

/// Synchronous string store that survives reloads, such as the browser's local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> core::result::Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> core::result::Result<(), StorageError> {
        (**self).set(key, value)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> core::result::Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Solved levels of one game type, written through to local storage on every change.
///
/// Storage is best effort: a corrupt or unreadable entry loads as nothing solved, and a failed write leaves the
/// in-memory set authoritative for the rest of the session.
#[derive(Debug)]
pub struct ProgressStore<S> {
    store: S,
    game_type: GameType,
    solved: SolvedSet,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn load(store: S, game_type: GameType) -> Self {
        let key = game_type.storage_key();
        let solved = match store.get(key) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<LevelId>>(&raw)
                .map(|levels| levels.into_iter().collect())
                .unwrap_or_else(|err| {
                    log::warn!("Discarding unreadable progress under {}: {}", key, err);
                    SolvedSet::new()
                }),
            Ok(None) => SolvedSet::new(),
            Err(err) => {
                log::warn!("Could not read progress under {}: {}", key, err);
                SolvedSet::new()
            }
        };
        log::debug!("loaded {} progress: {:?}", game_type, solved);

        Self {
            store,
            game_type,
            solved,
        }
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn solved(&self) -> &SolvedSet {
        &self.solved
    }

    pub fn is_solved(&self, level: LevelId) -> bool {
        self.solved.contains(&level)
    }

    pub fn is_unlocked(&self, level: LevelId) -> bool {
        is_unlocked(level, &self.solved)
    }

    pub fn next_unlocked_level(&self) -> LevelId {
        next_unlocked_level(&self.solved)
    }

    pub fn mark_solved(&mut self, level: LevelId) -> MarkOutcome {
        if !self.solved.insert(level) {
            return MarkOutcome::NoChange;
        }

        self.persist();
        MarkOutcome::Changed
    }

    fn persist(&self) {
        let key = self.game_type.storage_key();
        let levels: Vec<LevelId> = self.solved.iter().copied().collect();
        let raw = match serde_json::to_string(&levels) {
            Ok(raw) => raw,
            Err(err) => {
                log::error!("Could not encode progress for {}: {}", key, err);
                return;
            }
        };
        if let Err(err) = self.store.set(key, &raw) {
            log::error!("Could not save progress to local storage: {}", err);
        }
    }
}

/// The solved sets of every game type, loaded once and shared by all views of a session.
///
/// Views borrow from here instead of reloading storage, so a level marked solved is unlocked everywhere at once,
/// even when it could not be written back.
#[derive(Debug)]
pub struct ProgressBook<S> {
    puzzles: RefCell<ProgressStore<S>>,
    emojis: RefCell<ProgressStore<S>>,
}

impl<S: KeyValueStore + Clone> ProgressBook<S> {
    pub fn load(store: S) -> Self {
        Self {
            puzzles: RefCell::new(ProgressStore::load(store.clone(), GameType::Puzzles)),
            emojis: RefCell::new(ProgressStore::load(store, GameType::Emojis)),
        }
    }
}

impl<S: KeyValueStore> ProgressBook<S> {
    fn slot(&self, game_type: GameType) -> &RefCell<ProgressStore<S>> {
        match game_type {
            GameType::Puzzles => &self.puzzles,
            GameType::Emojis => &self.emojis,
        }
    }

    pub fn get(&self, game_type: GameType) -> Ref<'_, ProgressStore<S>> {
        self.slot(game_type).borrow()
    }

    pub fn mark_solved(&self, game_type: GameType, level: LevelId) -> MarkOutcome {
        self.slot(game_type).borrow_mut().mark_solved(level)
    }
}

/// Non-empty, trimmed team name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamName(String);

impl TeamName {
    pub const KEY: &'static str = "team_name";

    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(SessionError::EmptyTeamName)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The team name remembered from an earlier session, if any.
    pub fn load(store: &impl KeyValueStore) -> Option<Self> {
        match store.get(Self::KEY) {
            Ok(raw) => raw.and_then(|raw| Self::parse(&raw).ok()),
            Err(err) => {
                log::warn!("Could not read team name: {}", err);
                None
            }
        }
    }

    pub fn save(&self, store: &impl KeyValueStore) {
        if let Err(err) = store.set(Self::KEY, &self.0) {
            log::error!("Could not save team name to local storage: {}", err);
        }
    }
}

impl core::fmt::Display for TeamName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::MemoryStore;

    #[test]
    fn missing_key_loads_empty() {
        let store = MemoryStore::default();
        let progress = ProgressStore::load(&store, GameType::Puzzles);

        assert!(progress.solved().is_empty());
        assert_eq!(progress.next_unlocked_level(), 1);
    }

    #[test]
    fn corrupt_entry_degrades_to_nothing_solved() {
        let store = MemoryStore::with_entry("christmas_games_puzzles", "{not json");
        let progress = ProgressStore::load(&store, GameType::Puzzles);

        assert!(progress.solved().is_empty());
        assert!(progress.is_unlocked(1));
        assert!(!progress.is_unlocked(2));
    }

    #[test]
    fn unreadable_storage_degrades_to_nothing_solved() {
        let store = MemoryStore::default();
        store.fail_reads(true);
        let progress = ProgressStore::load(&store, GameType::Emojis);

        assert!(progress.solved().is_empty());
    }

    #[test]
    fn mark_solved_persists_immediately() {
        let store = MemoryStore::default();
        let mut progress = ProgressStore::load(&store, GameType::Puzzles);

        assert_eq!(progress.mark_solved(2), MarkOutcome::Changed);
        assert_eq!(progress.mark_solved(1), MarkOutcome::Changed);

        assert_eq!(
            store.entry("christmas_games_puzzles").as_deref(),
            Some("[1,2]")
        );
        let reloaded = ProgressStore::load(&store, GameType::Puzzles);
        assert_eq!(reloaded.solved(), progress.solved());
    }

    #[test]
    fn mark_solved_is_idempotent() {
        let store = MemoryStore::default();
        let mut progress = ProgressStore::load(&store, GameType::Puzzles);

        progress.mark_solved(3);
        let once = progress.solved().clone();
        let writes = store.write_count();

        assert_eq!(progress.mark_solved(3), MarkOutcome::NoChange);
        assert_eq!(progress.solved(), &once);
        assert_eq!(store.write_count(), writes);
    }

    #[test]
    fn next_level_tracks_any_mark_sequence() {
        let store = MemoryStore::default();
        let mut progress = ProgressStore::load(&store, GameType::Puzzles);

        for level in [4, 1, 2, 4, 3, 1] {
            progress.mark_solved(level);
            let max = *progress.solved().iter().max().unwrap();
            assert_eq!(progress.next_unlocked_level(), max + 1);
        }
    }

    #[test]
    fn solved_level_is_reachable() {
        let store = MemoryStore::default();
        let mut progress = ProgressStore::load(&store, GameType::Puzzles);

        progress.mark_solved(1);
        progress.mark_solved(2);

        assert!(progress.is_unlocked(2));
        assert!(progress.is_unlocked(3));
        assert!(!progress.is_unlocked(4));
    }

    #[test]
    fn failed_write_keeps_memory_authoritative() {
        let store = MemoryStore::default();
        store.fail_writes(true);
        let mut progress = ProgressStore::load(&store, GameType::Emojis);

        assert_eq!(progress.mark_solved(1), MarkOutcome::Changed);

        assert!(progress.is_solved(1));
        assert!(progress.is_unlocked(2));
        assert_eq!(store.entry("christmas_games_emojis"), None);
    }

    #[test]
    fn reads_legacy_unsorted_arrays() {
        let store = MemoryStore::with_entry("christmas_games_puzzles", "[3,1,2,1]");
        let progress = ProgressStore::load(&store, GameType::Puzzles);

        assert_eq!(progress.solved().len(), 3);
        assert_eq!(progress.next_unlocked_level(), 4);
    }

    #[test]
    fn shared_book_unlocks_despite_failed_writes() {
        let store = MemoryStore::default();
        store.fail_writes(true);
        let book = ProgressBook::load(&store);

        assert_eq!(book.mark_solved(GameType::Puzzles, 1), MarkOutcome::Changed);

        // a second reader of the same book sees the level, storage never did
        let puzzles = book.get(GameType::Puzzles);
        assert!(puzzles.is_unlocked(2));
        assert_eq!(
            resolve_level(2, puzzles.solved(), 5),
            LevelRoute::Show(2)
        );
        assert_eq!(store.entry("christmas_games_puzzles"), None);
    }

    #[test]
    fn shared_book_keeps_game_types_apart() {
        let store = MemoryStore::with_entry("christmas_games_emojis", "[1]");
        let book = ProgressBook::load(&store);

        book.mark_solved(GameType::Puzzles, 1);

        assert!(book.get(GameType::Emojis).is_solved(1));
        assert!(!book.get(GameType::Emojis).is_unlocked(3));
        assert_eq!(book.get(GameType::Puzzles).next_unlocked_level(), 2);
        assert_eq!(store.entry("christmas_games_emojis").as_deref(), Some("[1]"));
    }

    #[test]
    fn team_name_is_trimmed_and_required() {
        assert_eq!(TeamName::parse("   "), Err(SessionError::EmptyTeamName));
        assert_eq!(TeamName::parse("  Lag Rudolf ").unwrap().as_str(), "Lag Rudolf");
    }

    #[test]
    fn team_name_round_trips_through_storage() {
        let store = MemoryStore::default();
        assert_eq!(TeamName::load(&store), None);

        TeamName::parse("Tomtenissarna").unwrap().save(&store);

        assert_eq!(store.entry("team_name").as_deref(), Some("Tomtenissarna"));
        assert_eq!(
            TeamName::load(&store).map(|team| team.to_string()),
            Some("Tomtenissarna".to_string())
        );
    }
}
