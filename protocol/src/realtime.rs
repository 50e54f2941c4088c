use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{SCHEMA, Table};

pub const PHOENIX_TOPIC: &str = "phoenix";
pub const HEARTBEAT_INTERVAL_MS: u32 = 30_000;

const EVENT_JOIN: &str = "phx_join";
const EVENT_LEAVE: &str = "phx_leave";
const EVENT_REPLY: &str = "phx_reply";
const EVENT_HEARTBEAT: &str = "heartbeat";
const EVENT_CHANGES: &str = "postgres_changes";

/// Builds the websocket URL of the realtime endpoint from the store's HTTP base URL.
pub fn realtime_socket_url(base_url: &str, api_key: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base_url.to_string()
    };
    format!("{ws_base}/realtime/v1/websocket?apikey={api_key}&vsn=1.0.0")
}

/// One Phoenix channel message, in either direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl Frame {
    pub fn topic_for(table: Table) -> String {
        format!("realtime:{}", table.channel())
    }

    /// Subscribes to inserts into `table`.
    pub fn join(table: Table, access_token: &str, reference: u64) -> Self {
        Self {
            topic: Self::topic_for(table),
            event: EVENT_JOIN.into(),
            payload: json!({
                "config": {
                    "broadcast": { "ack": false, "self": false },
                    "presence": { "key": "" },
                    "postgres_changes": [
                        { "event": "INSERT", "schema": SCHEMA, "table": table.name() }
                    ],
                    "private": false
                },
                "access_token": access_token
            }),
            reference: Some(reference.to_string()),
        }
    }

    pub fn leave(table: Table, reference: u64) -> Self {
        Self {
            topic: Self::topic_for(table),
            event: EVENT_LEAVE.into(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }

    pub fn heartbeat(reference: u64) -> Self {
        Self {
            topic: PHOENIX_TOPIC.into(),
            event: EVENT_HEARTBEAT.into(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }

    /// Error replies carry `status: "error"`, usually to a rejected join.
    pub fn is_error_reply(&self) -> bool {
        self.event == EVENT_REPLY && self.payload.get("status") == Some(&json!("error"))
    }

    /// Decodes the inserted row if this frame announces an insert, `None` for any other frame.
    pub fn inserted_record<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        if self.event != EVENT_CHANGES {
            return None;
        }
        let data = self.payload.get("data")?;
        if data.get("type").and_then(Value::as_str) != Some("INSERT") {
            return None;
        }
        let record = data.get("record")?;
        Some(T::deserialize(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompletionRow;

    #[test]
    fn socket_url_switches_scheme() {
        assert_eq!(
            realtime_socket_url("https://abc.supabase.co/", "k"),
            "wss://abc.supabase.co/realtime/v1/websocket?apikey=k&vsn=1.0.0"
        );
        assert_eq!(
            realtime_socket_url("http://localhost:54321", "k"),
            "ws://localhost:54321/realtime/v1/websocket?apikey=k&vsn=1.0.0"
        );
    }

    #[test]
    fn join_frame_targets_insert_events_of_table() {
        let frame = Frame::join(Table::EmojiCompletions, "token", 3);
        let json = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["topic"], "realtime:emoji_completions_changes");
        assert_eq!(json["event"], "phx_join");
        assert_eq!(json["ref"], "3");
        assert_eq!(
            json["payload"]["config"]["postgres_changes"][0]["table"],
            "emoji_completions"
        );
    }

    #[test]
    fn insert_frame_yields_record() {
        let frame: Frame = serde_json::from_str(
            r#"{
                "topic": "realtime:puzzle_completions_changes",
                "event": "postgres_changes",
                "ref": null,
                "payload": {
                    "ids": [1],
                    "data": {
                        "schema": "public",
                        "table": "puzzle_completions",
                        "type": "INSERT",
                        "record": {
                            "team_name": "Tomtarna",
                            "puzzle_id": 1,
                            "completed_at": "2024-12-24T18:00:00+00:00",
                            "duration_seconds": 12
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        let row: CompletionRow = frame.inserted_record().unwrap().unwrap();
        assert_eq!(row.team_name, "Tomtarna");
        assert_eq!(row.duration_seconds, Some(12));
    }

    #[test]
    fn replies_are_not_inserts() {
        let frame: Frame = serde_json::from_str(
            r#"{"topic":"phoenix","event":"phx_reply","ref":"1","payload":{"status":"ok","response":{}}}"#,
        )
        .unwrap();

        assert!(frame.inserted_record::<CompletionRow>().is_none());
        assert!(!frame.is_error_reply());
    }

    #[test]
    fn error_reply_is_detected() {
        let frame: Frame = serde_json::from_str(
            r#"{"topic":"realtime:x","event":"phx_reply","ref":"1","payload":{"status":"error","response":{"reason":"denied"}}}"#,
        )
        .unwrap();

        assert!(frame.is_error_reply());
    }
}
