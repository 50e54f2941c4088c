use thiserror::Error;

use crate::GameType;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Team name must not be empty")]
    EmptyTeamName,
    #[error("Session is already running")]
    AlreadyActive,
    #[error("Session is not running, no moves are accepted")]
    NotActive,
}

pub type Result<T> = core::result::Result<T, SessionError>;

/// Failures of the local durable key-value store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Local storage is unavailable: {0}")]
    Unavailable(String),
    #[error("Could not write local storage: {0}")]
    Write(String),
}

/// Failures of the remote store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Remote store is not configured")]
    Unconfigured,
    #[error("Remote store unreachable: {0}")]
    Transport(String),
    #[error("Remote store answered with status {0}")]
    Status(u16),
    #[error("Could not decode remote store response: {0}")]
    Decode(String),
}

/// Degraded remote operations, reported on the sync's local error channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Could not submit {game} completion for {team}: {source}")]
    Submit {
        game: GameType,
        team: String,
        #[source]
        source: StoreError,
    },
    #[error("Could not load {game} leaderboard: {source}")]
    Load {
        game: GameType,
        #[source]
        source: StoreError,
    },
    #[error("Could not subscribe to {game} leaderboard: {source}")]
    Subscribe {
        game: GameType,
        #[source]
        source: StoreError,
    },
}

impl SyncError {
    pub fn store_error(&self) -> &StoreError {
        match self {
            Self::Submit { source, .. } | Self::Load { source, .. } | Self::Subscribe { source, .. } => {
                source
            }
        }
    }
}
