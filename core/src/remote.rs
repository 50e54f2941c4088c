use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures_channel::mpsc::UnboundedReceiver;

use crate::*;

pub type StoreResult<T> = core::result::Result<T, StoreError>;

/// The realtime database behind leaderboards and the word deck.
///
/// Calls run on a single-threaded executor and are attempted exactly once.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    async fn insert_completion(&self, game: GameType, record: &CompletionRecord) -> StoreResult<()>;

    /// All completions of `game`, ordered like [`LeaderboardView`] orders them.
    async fn select_completions(&self, game: GameType) -> StoreResult<Vec<CompletionRecord>>;

    /// Standing feed of completions inserted from now on.
    async fn subscribe_completions(&self, game: GameType) -> StoreResult<Subscription<CompletionRecord>>;

    /// Up to `limit` words, least recently shown first and never-shown words before all others.
    async fn select_words(&self, limit: usize) -> StoreResult<Vec<WordDeckEntry>>;

    async fn touch_word(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()>;
}

/// A missing store answers everything with [`StoreError::Unconfigured`].
impl<S: RemoteStore> RemoteStore for Option<S> {
    async fn insert_completion(&self, game: GameType, record: &CompletionRecord) -> StoreResult<()> {
        match self {
            Some(store) => store.insert_completion(game, record).await,
            None => Err(StoreError::Unconfigured),
        }
    }

    async fn select_completions(&self, game: GameType) -> StoreResult<Vec<CompletionRecord>> {
        match self {
            Some(store) => store.select_completions(game).await,
            None => Err(StoreError::Unconfigured),
        }
    }

    async fn subscribe_completions(&self, game: GameType) -> StoreResult<Subscription<CompletionRecord>> {
        match self {
            Some(store) => store.subscribe_completions(game).await,
            None => Err(StoreError::Unconfigured),
        }
    }

    async fn select_words(&self, limit: usize) -> StoreResult<Vec<WordDeckEntry>> {
        match self {
            Some(store) => store.select_words(limit).await,
            None => Err(StoreError::Unconfigured),
        }
    }

    async fn touch_word(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        match self {
            Some(store) => store.touch_word(id, at).await,
            None => Err(StoreError::Unconfigured),
        }
    }
}

impl<S: RemoteStore + ?Sized> RemoteStore for Rc<S> {
    async fn insert_completion(&self, game: GameType, record: &CompletionRecord) -> StoreResult<()> {
        (**self).insert_completion(game, record).await
    }

    async fn select_completions(&self, game: GameType) -> StoreResult<Vec<CompletionRecord>> {
        (**self).select_completions(game).await
    }

    async fn subscribe_completions(&self, game: GameType) -> StoreResult<Subscription<CompletionRecord>> {
        (**self).subscribe_completions(game).await
    }

    async fn select_words(&self, limit: usize) -> StoreResult<Vec<WordDeckEntry>> {
        (**self).select_words(limit).await
    }

    async fn touch_word(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        (**self).touch_word(id, at).await
    }
}

/// Releases the server side of a subscription, at the latest when dropped.
pub struct SubscriptionHandle {
    release: Option<Box<dyn FnOnce()>>,
}

impl SubscriptionHandle {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A handle with nothing to release.
    pub fn released() -> Self {
        Self { release: None }
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }

    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl core::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("released", &self.is_released())
            .finish()
    }
}

/// Push feed of remote events plus the handle that tears it down.
#[derive(Debug)]
pub struct Subscription<T> {
    pub events: UnboundedReceiver<T>,
    pub handle: SubscriptionHandle,
}
