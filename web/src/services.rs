use futures_channel::mpsc::UnboundedReceiver;
use julkvall_core::{LeaderboardSync, ProgressBook, SyncError, TeamName, WordDeckProvider};

use crate::remote::{RemoteConfig, SupabaseStore};
use crate::storage::BrowserStorage;
use crate::utils::BrowserSpawner;

pub(crate) type Remote = Option<SupabaseStore>;

/// Everything the views talk to, built once at startup and handed down as props.
#[derive(Debug)]
pub(crate) struct Services {
    pub(crate) storage: BrowserStorage,
    pub(crate) progress: ProgressBook<BrowserStorage>,
    pub(crate) leaderboards: LeaderboardSync<Remote, BrowserSpawner>,
    pub(crate) words: WordDeckProvider<Remote, BrowserSpawner>,
}

impl Services {
    pub(crate) fn new(config: Option<RemoteConfig>) -> (Self, UnboundedReceiver<SyncError>) {
        let remote: Remote = config.map(SupabaseStore::new);
        let (leaderboards, errors) = LeaderboardSync::new(remote.clone(), BrowserSpawner);
        let services = Self {
            storage: BrowserStorage,
            progress: ProgressBook::load(BrowserStorage),
            leaderboards,
            words: WordDeckProvider::new(remote, BrowserSpawner),
        };
        (services, errors)
    }

    pub(crate) fn is_remote_configured(&self) -> bool {
        self.leaderboards.store().is_some()
    }

    pub(crate) fn team_name(&self) -> Option<TeamName> {
        TeamName::load(&self.storage)
    }
}

/// Services are shared, never copied; two handles are equal when they point at the same instance.
impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}
