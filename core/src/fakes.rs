//! In-memory stand-ins for the local and remote stores.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures_channel::mpsc::{self, UnboundedSender};

use crate::*;

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub(crate) fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub(crate) fn entry(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub(crate) fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> core::result::Result<Option<String>, StorageError> {
        if self.fail_reads.get() {
            return Err(StorageError::Unavailable("storage disabled".into()));
        }
        Ok(self.entry(key))
    }

    fn set(&self, key: &str, value: &str) -> core::result::Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Write("quota exceeded".into()));
        }
        self.writes.set(self.writes.get() + 1);
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeRemote {
    completions: RefCell<HashMap<GameType, Vec<CompletionRecord>>>,
    live: RefCell<HashMap<GameType, UnboundedSender<CompletionRecord>>>,
    open_subscriptions: Rc<Cell<usize>>,
    words: RefCell<Vec<WordDeckEntry>>,
    touched: RefCell<Vec<(String, DateTime<Utc>)>>,
    insert_calls: Cell<usize>,
    fail_inserts: Cell<bool>,
    fail_selects: Cell<bool>,
}

impl FakeRemote {
    pub(crate) fn seed_completions(
        &self,
        game: GameType,
        records: impl IntoIterator<Item = CompletionRecord>,
    ) {
        self.completions
            .borrow_mut()
            .entry(game)
            .or_default()
            .extend(records);
    }

    pub(crate) fn seed_words(&self, words: impl IntoIterator<Item = WordDeckEntry>) {
        self.words.borrow_mut().extend(words);
    }

    /// Delivers `record` on the open subscription of `game`, as a realtime insert would.
    pub(crate) fn push_live(&self, game: GameType, record: CompletionRecord) {
        if let Some(sender) = self.live.borrow().get(&game) {
            let _ = sender.unbounded_send(record);
        }
    }

    pub(crate) fn completions(&self, game: GameType) -> Vec<CompletionRecord> {
        self.completions
            .borrow()
            .get(&game)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn touched(&self) -> Vec<(String, DateTime<Utc>)> {
        self.touched.borrow().clone()
    }

    pub(crate) fn open_subscriptions(&self) -> usize {
        self.open_subscriptions.get()
    }

    pub(crate) fn insert_calls(&self) -> usize {
        self.insert_calls.get()
    }

    pub(crate) fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.set(fail);
    }

    pub(crate) fn fail_selects(&self, fail: bool) {
        self.fail_selects.set(fail);
    }
}

impl RemoteStore for FakeRemote {
    async fn insert_completion(&self, game: GameType, record: &CompletionRecord) -> StoreResult<()> {
        self.insert_calls.set(self.insert_calls.get() + 1);
        if self.fail_inserts.get() {
            return Err(StoreError::Transport("connection refused".into()));
        }
        self.seed_completions(game, [record.clone()]);
        Ok(())
    }

    async fn select_completions(&self, game: GameType) -> StoreResult<Vec<CompletionRecord>> {
        if self.fail_selects.get() {
            return Err(StoreError::Status(503));
        }
        Ok(self.completions(game))
    }

    async fn subscribe_completions(&self, game: GameType) -> StoreResult<Subscription<CompletionRecord>> {
        let (sender, events) = mpsc::unbounded();
        self.live.borrow_mut().insert(game, sender);
        let open = self.open_subscriptions.clone();
        open.set(open.get() + 1);
        Ok(Subscription {
            events,
            handle: SubscriptionHandle::new(move || open.set(open.get() - 1)),
        })
    }

    async fn select_words(&self, limit: usize) -> StoreResult<Vec<WordDeckEntry>> {
        if self.fail_selects.get() {
            return Err(StoreError::Transport("offline".into()));
        }
        let mut words = self.words.borrow().clone();
        words.sort_by_key(|entry| entry.last_seen_at);
        words.truncate(limit);
        Ok(words)
    }

    async fn touch_word(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        if self.fail_inserts.get() {
            return Err(StoreError::Status(500));
        }
        self.touched.borrow_mut().push((id.to_string(), at));
        Ok(())
    }
}
