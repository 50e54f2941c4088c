use chrono::{DateTime, Utc};
use futures_util::task::{LocalSpawn, LocalSpawnExt};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Words requested for one forehead round.
pub const DEFAULT_DECK_SIZE: usize = 50;

/// A word served to the forehead game.
///
/// Fallback words have no `id`, so there is nothing to bump when they are shown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDeckEntry {
    pub id: Option<String>,
    pub word: String,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl WordDeckEntry {
    pub fn local(word: &str) -> Self {
        Self {
            id: None,
            word: word.to_string(),
            last_seen_at: None,
        }
    }
}

impl From<julkvall_protocol::WordRow> for WordDeckEntry {
    fn from(row: julkvall_protocol::WordRow) -> Self {
        Self {
            id: Some(row.id),
            word: row.word,
            last_seen_at: row.last_seen_at,
        }
    }
}

/// Fisher-Yates: walks from the last index down to 1, swapping each slot with a uniformly chosen one at or before it.
pub fn shuffle<T, G: Rng + ?Sized>(items: &mut [T], rng: &mut G) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Serves recency-biased, shuffled word decks, falling back to the built-in list when the store has nothing.
#[derive(Debug)]
pub struct WordDeckProvider<R, S> {
    store: R,
    spawner: S,
}

impl<R: RemoteStore, S> WordDeckProvider<R, S> {
    pub fn new(store: R, spawner: S) -> Self {
        Self { store, spawner }
    }

    pub async fn fetch_deck<G: Rng + ?Sized>(&self, limit: usize, rng: &mut G) -> Vec<WordDeckEntry> {
        match self.store.select_words(limit).await {
            Ok(mut deck) if !deck.is_empty() => {
                deck.truncate(limit);
                shuffle(&mut deck, rng);
                log::debug!("serving {} remote words", deck.len());
                return deck;
            }
            Ok(_) => log::warn!("Remote word list is empty, using fallback words"),
            Err(err) => log::error!("Could not fetch words, using fallback words: {}", err),
        }

        let mut deck: Vec<_> = FALLBACK_WORDS.iter().map(|word| WordDeckEntry::local(word)).collect();
        shuffle(&mut deck, rng);
        deck.truncate(limit);
        deck
    }
}

impl<R, S> WordDeckProvider<R, S>
where
    R: RemoteStore + Clone + 'static,
    S: LocalSpawn,
{
    /// Bumps the word's recency in the background; entries without an `id` are skipped.
    pub fn mark_shown(&self, entry: &WordDeckEntry, now: DateTime<Utc>) {
        let Some(id) = entry.id.clone() else {
            return;
        };

        let store = self.store.clone();
        let spawned = self.spawner.spawn_local(async move {
            if let Err(err) = store.touch_word(&id, now).await {
                log::error!("Could not update last seen for word {}: {}", id, err);
            }
        });
        if let Err(err) = spawned {
            log::error!("Could not dispatch word recency update: {}", err);
        }
    }
}
