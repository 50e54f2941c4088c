use chrono::{DateTime, Utc};
use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures_util::StreamExt;
use futures_util::task::{LocalSpawn, LocalSpawnExt};
use serde::{Deserialize, Serialize};

use crate::*;

/// Ordered, de-duplicated projection of one game's completions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardView {
    game: GameType,
    records: Vec<CompletionRecord>,
}

impl LeaderboardView {
    pub fn new(game: GameType) -> Self {
        Self {
            game,
            records: Vec::new(),
        }
    }

    pub fn game(&self) -> GameType {
        self.game
    }

    pub fn records(&self) -> &[CompletionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, record: &CompletionRecord) -> bool {
        self.records
            .iter()
            .any(|known| known.identity() == record.identity())
    }

    /// Adds `record` unless an identical one is already shown, keeping the view sorted.
    pub fn merge(&mut self, record: CompletionRecord) -> bool {
        if self.contains(&record) {
            log::trace!("skipping duplicate completion {:?}", record.identity());
            return false;
        }
        self.records.push(record);
        self.sort();
        true
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = CompletionRecord>) -> bool {
        let mut changed = false;
        for record in records {
            if !self.contains(&record) {
                self.records.push(record);
                changed = true;
            }
        }
        if changed {
            self.sort();
        }
        changed
    }

    /// Completions of one puzzle, fastest solvers of the puzzle board in arrival order.
    pub fn for_puzzle(&self, puzzle_id: LevelId) -> impl Iterator<Item = &CompletionRecord> {
        self.records
            .iter()
            .filter(move |record| record.puzzle_id == Some(puzzle_id))
    }

    fn sort(&mut self) {
        match self.game {
            GameType::Puzzles => self.records.sort_by_key(|record| record.completed_at),
            GameType::Emojis => self.records.sort_by(|a, b| {
                a.duration_seconds
                    .cmp(&b.duration_seconds)
                    .then(a.completed_at.cmp(&b.completed_at))
            }),
        }
    }
}

/// A leaderboard view that keeps merging records pushed by the store.
#[derive(Debug)]
pub struct LiveLeaderboard {
    view: LeaderboardView,
    events: Option<UnboundedReceiver<CompletionRecord>>,
    handle: SubscriptionHandle,
}

impl LiveLeaderboard {
    pub fn view(&self) -> &LeaderboardView {
        &self.view
    }

    pub fn is_live(&self) -> bool {
        self.events.is_some() && !self.handle.is_released()
    }

    /// Waits for the next pushed record and merges it, `Some(false)` for a duplicate and `None` once the feed ended.
    pub async fn next_update(&mut self) -> Option<bool> {
        let next = self.events.as_mut()?.next().await;
        match next {
            Some(record) => Some(self.view.merge(record)),
            None => {
                log::debug!("{} leaderboard feed closed", self.view.game);
                self.events = None;
                None
            }
        }
    }

    pub fn close(mut self) {
        self.handle.release();
    }
}

/// Pushes completions to the remote store and keeps live leaderboard views fed.
///
/// Remote trouble never reaches the player: it is logged and forwarded to the local error channel returned by
/// [`LeaderboardSync::new`].
#[derive(Debug)]
pub struct LeaderboardSync<R, S> {
    store: R,
    spawner: S,
    errors: UnboundedSender<SyncError>,
}

impl<R: RemoteStore, S> LeaderboardSync<R, S> {
    pub fn new(store: R, spawner: S) -> (Self, UnboundedReceiver<SyncError>) {
        let (errors, errors_rx) = mpsc::unbounded();
        (
            Self {
                store,
                spawner,
                errors,
            },
            errors_rx,
        )
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Inserts `record` once, returning whether it was stored.
    pub async fn submit(&self, game: GameType, record: &CompletionRecord) -> bool {
        submit_record(&self.store, &self.errors, game, record).await
    }

    /// Subscribes to `game` and seeds the view with one bulk read.
    ///
    /// The subscription is opened first and its events are only merged after the bulk read, so a record inserted
    /// in between shows up once instead of being missed.
    pub async fn open(&self, game: GameType) -> LiveLeaderboard {
        let mut view = LeaderboardView::new(game);

        let (events, handle) = match self.store.subscribe_completions(game).await {
            Ok(Subscription { events, handle }) => (Some(events), handle),
            Err(StoreError::Unconfigured) => {
                log::warn!("Remote store not configured, {} leaderboard stays empty", game);
                report(
                    &self.errors,
                    SyncError::Subscribe {
                        game,
                        source: StoreError::Unconfigured,
                    },
                );
                return LiveLeaderboard {
                    view,
                    events: None,
                    handle: SubscriptionHandle::released(),
                };
            }
            Err(source) => {
                report(&self.errors, SyncError::Subscribe { game, source });
                (None, SubscriptionHandle::released())
            }
        };

        match self.store.select_completions(game).await {
            Ok(records) => {
                view.extend(records);
                log::debug!("loaded {} {} completions", view.len(), game);
            }
            Err(source) => report(&self.errors, SyncError::Load { game, source }),
        }

        LiveLeaderboard {
            view,
            events,
            handle,
        }
    }
}

impl<R, S> LeaderboardSync<R, S>
where
    R: RemoteStore + Clone + 'static,
    S: LocalSpawn,
{
    /// Dispatches `record` without waiting for it; the outcome is only logged and reported.
    pub fn submit_detached(&self, game: GameType, record: CompletionRecord) {
        let store = self.store.clone();
        let errors = self.errors.clone();
        let spawned = self.spawner.spawn_local(async move {
            submit_record(&store, &errors, game, &record).await;
        });
        if let Err(err) = spawned {
            log::error!("Could not dispatch {} completion: {}", game, err);
        }
    }

    /// Finishes `session` and reports the completion to its leaderboard, if the game has one.
    pub fn finish_session(
        &self,
        session: &mut GameSession,
        now: DateTime<Utc>,
    ) -> Result<CompletionRecord> {
        let record = session.finish(now)?;
        if let Some(game) = session.kind().game_type() {
            self.submit_detached(game, record.clone());
        }
        Ok(record)
    }
}

async fn submit_record<R: RemoteStore>(
    store: &R,
    errors: &UnboundedSender<SyncError>,
    game: GameType,
    record: &CompletionRecord,
) -> bool {
    match store.insert_completion(game, record).await {
        Ok(()) => {
            log::debug!("submitted {} completion for {}", game, record.team_name);
            true
        }
        Err(source) => {
            report(
                errors,
                SyncError::Submit {
                    game,
                    team: record.team_name.clone(),
                    source,
                },
            );
            false
        }
    }
}

fn report(errors: &UnboundedSender<SyncError>, error: SyncError) {
    log::error!("{}", error);
    // nobody listening is fine, the log line is the record
    let _ = errors.unbounded_send(error);
}

/// `m:ss`, or `--:--` for a missing duration.
pub fn format_duration(seconds: u32) -> String {
    if seconds == 0 {
        return "--:--".to_string();
    }
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn rank_label(index: usize) -> String {
    match index {
        0 => "🥇".to_string(),
        1 => "🥈".to_string(),
        2 => "🥉".to_string(),
        _ => format!("#{}", index + 1),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use chrono::TimeDelta;
    use futures_executor::{LocalPool, block_on};

    use super::*;
    use crate::fakes::FakeRemote;

    fn t0() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    fn record(team: &str, puzzle_id: Option<LevelId>, secs: u32, at: i64) -> CompletionRecord {
        CompletionRecord {
            team_name: team.to_string(),
            puzzle_id,
            duration_seconds: secs,
            completed_at: t0() + TimeDelta::seconds(at),
        }
    }

    #[test]
    fn puzzle_board_orders_by_completion_time() {
        let mut view = LeaderboardView::new(GameType::Puzzles);

        view.merge(record("B", Some(1), 10, 20));
        view.merge(record("A", Some(1), 90, 5));

        let teams: Vec<_> = view.records().iter().map(|r| r.team_name.as_str()).collect();
        assert_eq!(teams, ["A", "B"]);
    }

    #[test]
    fn emoji_board_orders_by_duration() {
        let mut view = LeaderboardView::new(GameType::Emojis);

        view.extend([
            record("Slow", None, 300, 1),
            record("Fast", None, 120, 9),
            record("Tied", None, 120, 3),
        ]);

        let teams: Vec<_> = view.records().iter().map(|r| r.team_name.as_str()).collect();
        assert_eq!(teams, ["Tied", "Fast", "Slow"]);
    }

    #[test]
    fn merge_skips_known_records() {
        let mut view = LeaderboardView::new(GameType::Emojis);

        assert!(view.merge(record("A", None, 60, 1)));
        assert!(!view.merge(record("A", None, 60, 1)));
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn for_puzzle_filters_board() {
        let mut view = LeaderboardView::new(GameType::Puzzles);
        view.extend([
            record("A", Some(1), 10, 1),
            record("B", Some(2), 10, 2),
            record("C", Some(1), 10, 3),
        ]);

        let teams: Vec<_> = view.for_puzzle(1).map(|r| r.team_name.as_str()).collect();
        assert_eq!(teams, ["A", "C"]);
    }

    #[test]
    fn bulk_and_live_copies_of_a_record_show_once() {
        let remote = Rc::new(FakeRemote::default());
        let racing = record("Racer", None, 70, 4);
        remote.seed_completions(GameType::Emojis, [record("Early", None, 90, 1), racing.clone()]);
        let (sync, _errors) = LeaderboardSync::new(remote.clone(), ());

        block_on(async {
            let mut live = sync.open(GameType::Emojis).await;
            remote.push_live(GameType::Emojis, racing.clone());
            remote.push_live(GameType::Emojis, record("Late", None, 30, 9));

            assert_eq!(live.next_update().await, Some(false));
            assert_eq!(live.next_update().await, Some(true));

            let view = live.view();
            assert_eq!(view.len(), 3);
            assert_eq!(view.records().iter().filter(|r| **r == racing).count(), 1);
            assert_eq!(view.records()[0].team_name, "Late");
        });
    }

    #[test]
    fn closing_releases_the_subscription() {
        let remote = Rc::new(FakeRemote::default());
        let (sync, _errors) = LeaderboardSync::new(remote.clone(), ());

        let live = block_on(sync.open(GameType::Puzzles));
        assert!(live.is_live());
        assert_eq!(remote.open_subscriptions(), 1);

        live.close();
        assert_eq!(remote.open_subscriptions(), 0);
    }

    #[test]
    fn dropping_a_live_view_releases_the_subscription() {
        let remote = Rc::new(FakeRemote::default());
        let (sync, _errors) = LeaderboardSync::new(remote.clone(), ());

        drop(block_on(sync.open(GameType::Puzzles)));

        assert_eq!(remote.open_subscriptions(), 0);
    }

    #[test]
    fn unconfigured_store_yields_empty_idle_view() {
        let (sync, mut errors) = LeaderboardSync::new(None::<Rc<FakeRemote>>, ());

        block_on(async {
            let mut live = sync.open(GameType::Emojis).await;

            assert!(live.view().is_empty());
            assert!(!live.is_live());
            assert_eq!(live.next_update().await, None);
            assert_eq!(
                errors.next().await.map(|err| err.store_error().clone()),
                Some(StoreError::Unconfigured)
            );
        });
    }

    #[test]
    fn failed_bulk_read_still_follows_live_inserts() {
        let remote = Rc::new(FakeRemote::default());
        remote.fail_selects(true);
        let (sync, mut errors) = LeaderboardSync::new(remote.clone(), ());

        block_on(async {
            let mut live = sync.open(GameType::Puzzles).await;
            remote.push_live(GameType::Puzzles, record("A", Some(1), 10, 1));

            assert_eq!(live.next_update().await, Some(true));
            assert!(matches!(errors.next().await, Some(SyncError::Load { .. })));
        });
    }

    #[test]
    fn submit_reports_whether_the_record_was_stored() {
        let remote = Rc::new(FakeRemote::default());
        let pool = LocalPool::new();
        let (sync, mut errors) = LeaderboardSync::new(remote.clone(), pool.spawner());
        let stored = record("Pepparkakorna", None, 95, 0);

        assert!(block_on(sync.submit(GameType::Emojis, &stored)));
        assert_eq!(remote.completions(GameType::Emojis), vec![stored.clone()]);

        remote.fail_inserts(true);
        assert!(!block_on(sync.submit(GameType::Emojis, &stored)));
        match block_on(errors.next()) {
            Some(SyncError::Submit { game, team, .. }) => {
                assert_eq!(game, GameType::Emojis);
                assert_eq!(team, "Pepparkakorna");
            }
            other => panic!("expected a submit error, got {:?}", other),
        }
        assert_eq!(remote.completions(GameType::Emojis).len(), 1);
    }

    #[test]
    fn finish_survives_a_failing_submit() {
        let remote = Rc::new(FakeRemote::default());
        remote.fail_inserts(true);
        let mut pool = LocalPool::new();
        let (sync, mut errors) = LeaderboardSync::new(remote.clone(), pool.spawner());
        let mut session = GameSession::new(GameKind::EmojiQuiz, 10);
        session.start("Lag Rudolf", t0()).unwrap();

        let end = t0() + TimeDelta::milliseconds(83_600);
        let record = sync.finish_session(&mut session, end).unwrap();
        pool.run_until_stalled();

        assert_eq!(session.status(), SessionStatus::Finished);
        assert_eq!(record.duration_seconds, 84);
        assert!(remote.completions(GameType::Emojis).is_empty());
        let error = pool.run_until(errors.next()).unwrap();
        assert!(matches!(error, SyncError::Submit { game: GameType::Emojis, .. }));
    }

    #[test]
    fn finish_submits_to_the_game_board() {
        let remote = Rc::new(FakeRemote::default());
        let mut pool = LocalPool::new();
        let (sync, _errors) = LeaderboardSync::new(remote.clone(), pool.spawner());
        let mut session = GameSession::new(GameKind::Puzzle { puzzle_id: 2 }, 1);
        session.start("Nissarna", t0()).unwrap();

        let record = sync
            .finish_session(&mut session, t0() + TimeDelta::seconds(41))
            .unwrap();
        pool.run_until_stalled();

        assert_eq!(remote.completions(GameType::Puzzles), vec![record]);
        assert!(remote.completions(GameType::Emojis).is_empty());
    }

    #[test]
    fn forehead_rounds_are_not_submitted() {
        let remote = Rc::new(FakeRemote::default());
        let mut pool = LocalPool::new();
        let (sync, _errors) = LeaderboardSync::new(remote.clone(), pool.spawner());
        let mut session = GameSession::new(GameKind::Forehead, 5);
        session.start("Nissarna", t0()).unwrap();

        sync.finish_session(&mut session, t0() + TimeDelta::seconds(10))
            .unwrap();
        pool.run_until_stalled();

        assert_eq!(remote.insert_calls(), 0);
    }

    #[test]
    fn finish_from_lobby_submits_nothing() {
        let remote = Rc::new(FakeRemote::default());
        let mut pool = LocalPool::new();
        let (sync, _errors) = LeaderboardSync::new(remote.clone(), pool.spawner());
        let mut session = GameSession::new(GameKind::EmojiQuiz, 10);

        assert_eq!(
            sync.finish_session(&mut session, t0()),
            Err(SessionError::NotActive)
        );
        pool.run_until_stalled();
        assert_eq!(remote.insert_calls(), 0);
    }

    #[test]
    fn durations_format_as_minutes_and_seconds() {
        assert_eq!(format_duration(0), "--:--");
        assert_eq!(format_duration(7), "0:07");
        assert_eq!(format_duration(125), "2:05");
    }

    #[test]
    fn top_three_get_medals() {
        assert_eq!(rank_label(0), "🥇");
        assert_eq!(rank_label(2), "🥉");
        assert_eq!(rank_label(3), "#4");
    }
}
