use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::*;

/// Seconds on the clock when a forehead round starts.
pub const FOREHEAD_BUDGET_SECS: u32 = 45;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    Lobby,
    Active,
    Finished,
}

impl SessionStatus {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameKind {
    /// A single timed matchstick puzzle.
    Puzzle { puzzle_id: LevelId },
    EmojiQuiz,
    /// Countdown round over a revolving word deck.
    Forehead,
}

impl GameKind {
    /// Leaderboard the finished session is reported to, if any.
    pub const fn game_type(self) -> Option<GameType> {
        match self {
            Self::Puzzle { .. } => Some(GameType::Puzzles),
            Self::EmojiQuiz => Some(GameType::Emojis),
            Self::Forehead => None,
        }
    }

    pub const fn tick_interval_ms(self) -> u32 {
        match self {
            Self::Puzzle { .. } => 100,
            Self::EmojiQuiz | Self::Forehead => 1000,
        }
    }

    pub const fn countdown_budget(self) -> Option<u32> {
        match self {
            Self::Forehead => Some(FOREHEAD_BUDGET_SECS),
            _ => None,
        }
    }

    const fn wraps(self) -> bool {
        matches!(self, Self::Forehead)
    }

    const fn puzzle_id(self) -> Option<LevelId> {
        match self {
            Self::Puzzle { puzzle_id } => Some(puzzle_id),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    NoChange,
    Moved,
    Wrapped,
}

impl AdvanceOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, nothing to redraw.
    Idle,
    Running,
    /// The countdown ran out and the session finished on this tick.
    Expired,
}

/// Immutable fact that a team finished a game in a given time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub team_name: String,
    pub puzzle_id: Option<LevelId>,
    pub duration_seconds: u32,
    pub completed_at: DateTime<Utc>,
}

impl CompletionRecord {
    /// Identity used to tell a bulk-read row from the same row arriving live.
    pub fn identity(&self) -> (&str, Option<LevelId>, DateTime<Utc>) {
        (&self.team_name, self.puzzle_id, self.completed_at)
    }
}

impl From<&CompletionRecord> for julkvall_protocol::CompletionRow {
    fn from(record: &CompletionRecord) -> Self {
        Self {
            team_name: record.team_name.clone(),
            puzzle_id: record.puzzle_id,
            completed_at: record.completed_at,
            duration_seconds: Some(record.duration_seconds),
        }
    }
}

impl From<julkvall_protocol::CompletionRow> for CompletionRecord {
    fn from(row: julkvall_protocol::CompletionRow) -> Self {
        Self {
            team_name: row.team_name,
            puzzle_id: row.puzzle_id,
            duration_seconds: row.duration_seconds.unwrap_or(0),
            completed_at: row.completed_at,
        }
    }
}

/// One playthrough of a game by one team: lobby, running, finished.
///
/// Time is always derived from the wall-clock `now` handed in by the caller, so missed or late ticks never drift.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    kind: GameKind,
    item_count: usize,
    status: SessionStatus,
    team: Option<TeamName>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    current_index: usize,
    time_left: Option<u32>,
}

impl GameSession {
    pub fn new(kind: GameKind, item_count: usize) -> Self {
        Self {
            kind,
            item_count,
            status: Default::default(),
            team: None,
            started_at: None,
            ended_at: None,
            current_index: 0,
            time_left: kind.countdown_budget(),
        }
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn team(&self) -> Option<&TeamName> {
        self.team.as_ref()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Replaces the item count, used once the forehead deck has arrived.
    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
        self.current_index = self.current_index.min(item_count.saturating_sub(1));
    }

    pub fn is_last_item(&self) -> bool {
        self.current_index + 1 >= self.item_count
    }

    pub fn start(&mut self, team_name: &str, now: DateTime<Utc>) -> Result<()> {
        let team = TeamName::parse(team_name)?;
        if self.status.is_active() {
            return Err(SessionError::AlreadyActive);
        }

        log::debug!("{:?} started by {}", self.kind, team);
        self.team = Some(team);
        self.started_at = Some(now);
        self.ended_at = None;
        self.current_index = 0;
        self.time_left = self.kind.countdown_budget();
        self.status = SessionStatus::Active;
        Ok(())
    }

    /// Back to the lobby, keeping the team for the next round.
    pub fn reset(&mut self) {
        self.status = SessionStatus::Lobby;
        self.started_at = None;
        self.ended_at = None;
        self.current_index = 0;
        self.time_left = self.kind.countdown_budget();
    }

    pub fn advance(&mut self, direction: Direction) -> Result<AdvanceOutcome> {
        use AdvanceOutcome::*;

        self.check_active()?;
        if self.item_count == 0 {
            return Ok(NoChange);
        }

        let last = self.item_count - 1;
        let (index, outcome) = match direction {
            Direction::Forward if self.current_index < last => (self.current_index + 1, Moved),
            Direction::Forward if self.kind.wraps() && last > 0 => (0, Wrapped),
            Direction::Back if self.current_index > 0 => (self.current_index - 1, Moved),
            Direction::Back if self.kind.wraps() && last > 0 => (last, Wrapped),
            _ => (self.current_index, NoChange),
        };
        self.current_index = index;
        Ok(outcome)
    }

    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<CompletionRecord> {
        self.check_active()?;
        Ok(self.end(now))
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if !self.status.is_active() {
            return TickOutcome::Idle;
        }

        let Some(budget) = self.kind.countdown_budget() else {
            return TickOutcome::Running;
        };

        let elapsed = u32::try_from(self.elapsed(now).num_seconds()).unwrap_or(u32::MAX);
        let time_left = budget.saturating_sub(elapsed);
        self.time_left = Some(time_left);
        if time_left == 0 {
            log::debug!("countdown expired at index {}", self.current_index);
            self.end(now);
            TickOutcome::Expired
        } else {
            TickOutcome::Running
        }
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> TimeDelta {
        match self.started_at {
            Some(started_at) => (self.ended_at.unwrap_or(now) - started_at).max(TimeDelta::zero()),
            None => TimeDelta::zero(),
        }
    }

    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
        u32::try_from(self.elapsed(now).num_seconds()).unwrap_or(u32::MAX)
    }

    /// Elapsed time in tenths of a second, for the precision puzzle timer.
    pub fn elapsed_tenths(&self, now: DateTime<Utc>) -> u32 {
        u32::try_from(self.elapsed(now).num_milliseconds() / 100).unwrap_or(u32::MAX)
    }

    /// Remaining countdown seconds as of the last tick, `None` for games without a countdown.
    pub fn time_left(&self) -> Option<u32> {
        self.time_left
    }

    /// Final duration, once finished.
    pub fn duration_secs(&self) -> Option<u32> {
        let ended_at = self.ended_at?;
        Some(rounded_secs(self.elapsed(ended_at)))
    }

    fn end(&mut self, now: DateTime<Utc>) -> CompletionRecord {
        self.ended_at = Some(now);
        self.status = SessionStatus::Finished;

        let record = CompletionRecord {
            team_name: self
                .team
                .as_ref()
                .map(|team| team.to_string())
                .unwrap_or_default(),
            puzzle_id: self.kind.puzzle_id(),
            duration_seconds: rounded_secs(self.elapsed(now)),
            completed_at: now,
        };
        log::debug!("{:?} finished: {:?}", self.kind, record);
        record
    }

    fn check_active(&self) -> Result<()> {
        if self.status.is_active() {
            Ok(())
        } else {
            Err(SessionError::NotActive)
        }
    }
}

fn rounded_secs(delta: TimeDelta) -> u32 {
    let millis = delta.num_milliseconds().max(0);
    u32::try_from((millis + 500) / 1000).unwrap_or(u32::MAX)
}
