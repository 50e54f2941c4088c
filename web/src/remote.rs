//! Supabase-compatible remote store: PostgREST for reads and writes, a Phoenix channel per live subscription.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use futures_channel::mpsc::{self, UnboundedSender};
use futures_channel::oneshot;
use futures_util::stream::{self, SplitSink};
use futures_util::{FutureExt, SinkExt, StreamExt, future};
use gloo::net::http::{Request, RequestBuilder, Response};
use gloo::net::websocket::futures::WebSocket;
use gloo::net::websocket::{Message, WebSocketError};
use gloo::timers::callback::Interval;
use julkvall_core::{
    CompletionRecord, GameType, RemoteStore, StoreError, StoreResult, Subscription, SubscriptionHandle,
    WordDeckEntry,
};
use julkvall_protocol::{
    CompletionRow, Frame, HEARTBEAT_INTERVAL_MS, Order, Select, Table, WordRow, WordTouch, eq_filter,
    realtime_socket_url, table_path,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Where the remote store lives and the public key it is reached with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RemoteConfig {
    pub(crate) url: String,
    pub(crate) key: String,
}

impl RemoteConfig {
    const BUILD_URL: Option<&'static str> = option_env!("JULKVALL_REMOTE_URL");
    const BUILD_KEY: Option<&'static str> = option_env!("JULKVALL_REMOTE_KEY");

    /// Runtime values win over the build-time defaults; without both a URL and a key there is no remote store.
    pub(crate) fn resolve(url: Option<String>, key: Option<String>) -> Option<Self> {
        Self::from_parts(
            non_blank(url).or_else(|| non_blank(Self::BUILD_URL.map(str::to_string))),
            non_blank(key).or_else(|| non_blank(Self::BUILD_KEY.map(str::to_string))),
        )
    }

    fn from_parts(url: Option<String>, key: Option<String>) -> Option<Self> {
        Some(Self {
            url: url?.trim_end_matches('/').to_string(),
            key: key?,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn transport(err: impl core::fmt::Display) -> StoreError {
    StoreError::Transport(err.to_string())
}

fn check_status(response: Response) -> StoreResult<Response> {
    if response.ok() {
        Ok(response)
    } else {
        Err(StoreError::Status(response.status()))
    }
}

#[derive(Clone, Debug)]
pub(crate) struct SupabaseStore {
    config: Rc<RemoteConfig>,
    next_ref: Rc<Cell<u64>>,
}

impl SupabaseStore {
    pub(crate) fn new(config: RemoteConfig) -> Self {
        Self {
            config: Rc::new(config),
            next_ref: Rc::default(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.key)
            .header("Authorization", &format!("Bearer {}", self.config.key))
    }

    async fn select<T: DeserializeOwned>(&self, select: Select) -> StoreResult<Vec<T>> {
        let response = self
            .authorized(Request::get(&self.url(&select.path())))
            .query(select.params())
            .send()
            .await
            .map_err(transport)?;
        check_status(response)?
            .json()
            .await
            .map_err(|err| StoreError::Decode(err.to_string()))
    }

    async fn write<B: Serialize>(&self, builder: RequestBuilder, body: &B) -> StoreResult<()> {
        let request = self
            .authorized(builder)
            .header("Prefer", "return=minimal")
            .json(body)
            .map_err(transport)?;
        let response = request.send().await.map_err(transport)?;
        check_status(response).map(drop)
    }
}

impl RemoteStore for SupabaseStore {
    async fn insert_completion(&self, game: GameType, record: &CompletionRecord) -> StoreResult<()> {
        let path = table_path(game.table());
        self.write(Request::post(&self.url(&path)), &CompletionRow::from(record))
            .await
    }

    async fn select_completions(&self, game: GameType) -> StoreResult<Vec<CompletionRecord>> {
        let rows: Vec<CompletionRow> = self
            .select(Select::new(game.table()).order(game.order()))
            .await?;
        Ok(rows.into_iter().map(CompletionRecord::from).collect())
    }

    async fn subscribe_completions(&self, game: GameType) -> StoreResult<Subscription<CompletionRecord>> {
        let socket_url = realtime_socket_url(&self.config.url, &self.config.key);
        let socket = WebSocket::open(&socket_url).map_err(transport)?;
        let table = game.table();
        let join = Frame::join(table, &self.config.key, next_ref(&self.next_ref));

        let (events_tx, events) = mpsc::unbounded();
        let (leave_tx, leave_rx) = oneshot::channel();
        wasm_bindgen_futures::spawn_local(run_channel(
            socket,
            table,
            join,
            self.next_ref.clone(),
            events_tx,
            leave_rx,
        ));

        Ok(Subscription {
            events,
            handle: SubscriptionHandle::new(move || {
                // the channel task may already be gone
                let _ = leave_tx.send(());
            }),
        })
    }

    async fn select_words(&self, limit: usize) -> StoreResult<Vec<WordDeckEntry>> {
        let select = Select::new(Table::ForeheadWords)
            .columns("id,word,last_seen_at")
            .order(Order::asc("last_seen_at").nulls_first())
            .limit(limit);
        let rows: Vec<WordRow> = self.select(select).await?;
        Ok(rows.into_iter().map(WordDeckEntry::from).collect())
    }

    async fn touch_word(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        let builder =
            Request::patch(&self.url(&table_path(Table::ForeheadWords))).query([eq_filter("id", id)]);
        self.write(builder, &WordTouch { last_seen_at: at }).await
    }
}

fn next_ref(refs: &Cell<u64>) -> u64 {
    let next = refs.get() + 1;
    refs.set(next);
    next
}

enum ChannelEvent {
    Incoming(Result<Message, WebSocketError>),
    Closed,
    Heartbeat,
    Leave,
}

#[derive(Debug, PartialEq)]
enum FrameAction {
    Insert(CompletionRecord),
    Rejected(String),
    Ignore,
}

fn classify_frame(text: &str) -> FrameAction {
    let frame = match serde_json::from_str::<Frame>(text) {
        Ok(frame) => frame,
        Err(err) => {
            log::warn!("Dropping unreadable realtime frame: {}", err);
            return FrameAction::Ignore;
        }
    };
    if frame.is_error_reply() {
        return FrameAction::Rejected(frame.payload.to_string());
    }
    match frame.inserted_record::<CompletionRow>() {
        Some(Ok(row)) => FrameAction::Insert(row.into()),
        Some(Err(err)) => {
            log::warn!("Dropping undecodable insert on {}: {}", frame.topic, err);
            FrameAction::Ignore
        }
        None => {
            log::trace!("realtime frame: {} {}", frame.topic, frame.event);
            FrameAction::Ignore
        }
    }
}

async fn send_frame(sink: &mut SplitSink<WebSocket, Message>, frame: &Frame) -> Result<(), String> {
    let text = serde_json::to_string(frame).map_err(|err| err.to_string())?;
    sink.send(Message::Text(text)).await.map_err(|err| err.to_string())
}

/// Drives one realtime channel until it is left, the socket closes or nobody listens anymore.
async fn run_channel(
    socket: WebSocket,
    table: Table,
    join: Frame,
    refs: Rc<Cell<u64>>,
    events: UnboundedSender<CompletionRecord>,
    leave: oneshot::Receiver<()>,
) {
    use ChannelEvent::*;

    let (mut sink, incoming) = socket.split();
    if let Err(err) = send_frame(&mut sink, &join).await {
        log::error!("Could not join realtime channel for {}: {}", table, err);
        return;
    }
    log::debug!("joined realtime channel for {}", table);

    let (beat_tx, beats) = mpsc::unbounded();
    let _heartbeat = Interval::new(HEARTBEAT_INTERVAL_MS, move || {
        let _ = beat_tx.unbounded_send(());
    });

    let mut channel = stream::select(
        stream::select(
            incoming
                .map(Incoming)
                .chain(stream::once(future::ready(Closed))),
            beats.map(|()| Heartbeat),
        ),
        leave.into_stream().map(|_| Leave),
    )
    .boxed_local();

    while let Some(event) = channel.next().await {
        match event {
            Incoming(Ok(Message::Text(text))) => match classify_frame(&text) {
                FrameAction::Insert(record) => {
                    if events.unbounded_send(record).is_err() {
                        log::debug!("nobody listens to {} inserts anymore", table);
                        break;
                    }
                }
                FrameAction::Rejected(reason) => {
                    log::error!("Realtime channel for {} rejected: {}", table, reason);
                    break;
                }
                FrameAction::Ignore => {}
            },
            Incoming(Ok(Message::Bytes(_))) => log::trace!("ignoring binary realtime frame"),
            Incoming(Err(err)) => {
                log::error!("Realtime connection for {} failed: {}", table, err);
                break;
            }
            Closed => {
                log::warn!("Realtime connection for {} closed by the server", table);
                break;
            }
            Heartbeat => {
                if let Err(err) = send_frame(&mut sink, &Frame::heartbeat(next_ref(&refs))).await {
                    log::error!("Realtime heartbeat for {} failed: {}", table, err);
                    break;
                }
            }
            Leave => {
                if let Err(err) = send_frame(&mut sink, &Frame::leave(table, next_ref(&refs))).await {
                    log::warn!("Could not leave realtime channel for {}: {}", table, err);
                }
                break;
            }
        }
    }
    log::debug!("realtime channel for {} closed", table);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_needs_url_and_key() {
        assert_eq!(RemoteConfig::from_parts(Some("https://x.test".into()), None), None);
        assert_eq!(RemoteConfig::from_parts(None, Some("key".into())), None);
    }

    #[test]
    fn config_trims_trailing_slash() {
        let config = RemoteConfig::from_parts(Some("https://x.test/".into()), Some("key".into())).unwrap();
        assert_eq!(config.url, "https://x.test");
        assert_eq!(config.key, "key");
    }

    #[test]
    fn runtime_values_override_build_defaults() {
        let config = RemoteConfig::resolve(Some(" https://hash.test ".into()), Some("hash-key".into())).unwrap();
        assert_eq!(config.url, "https://hash.test");
        assert_eq!(config.key, "hash-key");
    }

    #[test]
    fn insert_frame_becomes_record() {
        let action = classify_frame(
            r#"{"topic":"realtime:emoji_completions_changes","event":"postgres_changes","ref":null,
                "payload":{"data":{"type":"INSERT","record":{
                    "team_name":"Pepparkakorna","completed_at":"2024-12-24T19:30:00Z","duration_seconds":95}}}}"#,
        );

        match action {
            FrameAction::Insert(record) => {
                assert_eq!(record.team_name, "Pepparkakorna");
                assert_eq!(record.puzzle_id, None);
                assert_eq!(record.duration_seconds, 95);
            }
            other => panic!("expected an insert, got {:?}", other),
        }
    }

    #[test]
    fn rejected_join_is_reported() {
        let action = classify_frame(
            r#"{"topic":"realtime:x","event":"phx_reply","ref":"1","payload":{"status":"error"}}"#,
        );
        assert!(matches!(action, FrameAction::Rejected(_)));
    }

    #[test]
    fn other_frames_are_ignored() {
        assert_eq!(
            classify_frame(r#"{"topic":"phoenix","event":"phx_reply","ref":"2","payload":{"status":"ok"}}"#),
            FrameAction::Ignore
        );
        assert_eq!(classify_frame("not json"), FrameAction::Ignore);
    }

    #[test]
    fn refs_increase() {
        let refs = Cell::new(0);
        assert_eq!(next_ref(&refs), 1);
        assert_eq!(next_ref(&refs), 2);
    }
}
