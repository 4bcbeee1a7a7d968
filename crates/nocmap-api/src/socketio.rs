//! Minimal Engine.IO v4 / Socket.IO v5 text-frame codec.
//!
//! Only what a WebSocket-transport client needs to follow the server's
//! `update_data` events: the open handshake, heartbeats, namespace
//! connect/disconnect and event packets. Binary attachments are not
//! supported.

use serde::Deserialize;

use crate::error::Error;

/// Query string appended to the server URL for a WebSocket-only session.
pub const HANDSHAKE_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

/// Engine.IO pong, sent in reply to a server ping.
pub const PONG: &str = "3";

/// Socket.IO connect request for the default namespace.
pub const CONNECT: &str = "40";

/// Engine.IO open-packet payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

/// A decoded text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// `0{...}`: transport open.
    Open(OpenInfo),
    /// `1`: transport close.
    Close,
    /// `2`: server heartbeat, answer with [`PONG`].
    Ping,
    /// `3`
    Pong,
    /// `40`: namespace connected.
    Connect,
    /// `41`: namespace disconnected.
    Disconnect,
    /// `42[name, ...args]`
    Event {
        name: String,
        args: Vec<serde_json::Value>,
    },
    /// `44{...}`: namespace connection refused.
    ConnectError(String),
    /// `5`/`6` upgrade and noop, and Socket.IO packet types we ignore.
    Noop,
}

impl Packet {
    /// Decode one WebSocket text frame.
    pub fn decode(frame: &str) -> Result<Self, Error> {
        let mut chars = frame.chars();
        let Some(engine) = chars.next() else {
            return Err(Error::PushFrame("empty frame".into()));
        };
        let rest = chars.as_str();

        match engine {
            '0' => serde_json::from_str(rest)
                .map(Packet::Open)
                .map_err(|e| Error::PushFrame(format!("bad open payload: {e}"))),
            '1' => Ok(Packet::Close),
            '2' => Ok(Packet::Ping),
            '3' => Ok(Packet::Pong),
            '4' => decode_socket(rest),
            '5' | '6' => Ok(Packet::Noop),
            other => Err(Error::PushFrame(format!(
                "unknown engine packet type {other:?}"
            ))),
        }
    }

    /// Returns the arguments when this is the named event.
    pub fn event_args(&self, event: &str) -> Option<&[serde_json::Value]> {
        match self {
            Packet::Event { name, args } if name == event => Some(args),
            _ => None,
        }
    }
}

/// Decode the Socket.IO packet inside an Engine.IO message.
fn decode_socket(payload: &str) -> Result<Packet, Error> {
    let mut chars = payload.chars();
    let Some(kind) = chars.next() else {
        return Err(Error::PushFrame("empty socket packet".into()));
    };
    let body = strip_namespace_and_ack(chars.as_str());

    match kind {
        '0' => Ok(Packet::Connect),
        '1' => Ok(Packet::Disconnect),
        '2' => decode_event(body),
        '4' => {
            let message = serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| body.to_owned());
            Ok(Packet::ConnectError(message))
        }
        _ => Ok(Packet::Noop),
    }
}

/// Skip an optional `/namespace,` prefix and a numeric ack id.
fn strip_namespace_and_ack(body: &str) -> &str {
    let body = if body.starts_with('/') {
        body.split_once(',').map_or("", |(_, rest)| rest)
    } else {
        body
    };
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn decode_event(body: &str) -> Result<Packet, Error> {
    let mut items: Vec<serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| Error::PushFrame(format!("bad event payload: {e}")))?;
    if items.is_empty() {
        return Err(Error::PushFrame("event without name".into()));
    }
    let name = match items.remove(0) {
        serde_json::Value::String(s) => s,
        other => {
            return Err(Error::PushFrame(format!("event name is not a string: {other}")));
        }
    };
    Ok(Packet::Event { name, args: items })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_open_handshake() {
        let packet = Packet::decode(
            r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();
        assert_eq!(
            packet,
            Packet::Open(OpenInfo {
                sid: "abc".into(),
                ping_interval: 25000,
                ping_timeout: 20000,
            })
        );
    }

    #[test]
    fn heartbeat_and_namespace_frames() {
        assert_eq!(Packet::decode("2").unwrap(), Packet::Ping);
        assert_eq!(Packet::decode("3").unwrap(), Packet::Pong);
        assert_eq!(Packet::decode(r#"40{"sid":"x"}"#).unwrap(), Packet::Connect);
        assert_eq!(Packet::decode("41").unwrap(), Packet::Disconnect);
        assert_eq!(Packet::decode("6").unwrap(), Packet::Noop);
    }

    #[test]
    fn decodes_update_data_event() {
        let frame = r#"42["update_data",{"devices":[],"global":{"total":0,"online":0,"offline":0}}]"#;
        let packet = Packet::decode(frame).unwrap();
        let args = packet.event_args("update_data").unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0]["global"]["total"], 0);
        assert!(packet.event_args("other").is_none());
    }

    #[test]
    fn strips_namespace_and_ack_id() {
        let packet = Packet::decode(r#"42/noc,17["ping_test",1]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event {
                name: "ping_test".into(),
                args: vec![serde_json::json!(1)],
            }
        );
    }

    #[test]
    fn connect_error_extracts_message() {
        let packet = Packet::decode(r#"44{"message":"Not authorized"}"#).unwrap();
        assert_eq!(packet, Packet::ConnectError("Not authorized".into()));
    }

    #[test]
    fn rejects_malformed_frames() {
        assert!(Packet::decode("").is_err());
        assert!(Packet::decode("9").is_err());
        assert!(Packet::decode("42[]").is_err());
        assert!(Packet::decode("42not-json").is_err());
        assert!(Packet::decode("42[5]").is_err());
    }
}
