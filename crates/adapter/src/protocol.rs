//! Protocol module - JSON message types for the pose feed
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (client sequence
//! number) and `ts` (sender timestamp in ms). Inbound: `hello`, `pose`,
//! `control`. Outbound: `welcome`, `state`, `error`. Unknown message types
//! and junk landmark entries are tolerated; only unparseable JSON is
//! reported back as an error.

use serde::{Deserialize, Serialize};

use pose_tetris_gesture::PoseFrame;

pub const PROTOCOL_VERSION: &str = "1.0";

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// First message on a connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
}

/// One landmark as it appears on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub index: usize,
    pub x: f32,
    pub y: f32,
}

/// A pose estimation frame: sparse landmark list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseMessage {
    pub seq: u64,
    pub ts: u64,
    pub landmarks: Vec<LandmarkPoint>,
}

impl PoseMessage {
    /// Build a frame, silently skipping landmarks with unknown indices or
    /// coordinates outside the normalized image.
    pub fn to_frame(&self) -> PoseFrame {
        let mut frame = PoseFrame::new();
        for lm in &self.landmarks {
            if (0.0..=1.0).contains(&lm.x) && (0.0..=1.0).contains(&lm.y) {
                frame.set(lm.index, lm.x, lm.y);
            }
        }
        frame
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlAction {
    #[serde(rename = "restart")]
    Restart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMessage {
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

/// Parsed incoming message.
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Pose(PoseMessage),
    Control(ControlMessage),
    /// Recognized JSON with an unrecognized `type`; ignored but acked by seq.
    Unknown { seq: u64 },
}

/// Parse one line of the feed.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum Inbound {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "pose")]
        Pose(PoseMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<Inbound>(json) {
        Ok(Inbound::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(Inbound::Pose(m)) => Ok(ParsedMessage::Pose(m)),
        Ok(Inbound::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            // An unknown type tag is not a protocol violation.
            #[derive(Debug, Deserialize)]
            struct Envelope<'a> {
                #[serde(rename = "type")]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let envelope = serde_json::from_str::<Envelope>(json)?;
            match envelope.msg_type {
                Some("hello") | Some("pose") | Some("control") | None => Err(e),
                Some(_) => Ok(ParsedMessage::Unknown {
                    seq: envelope.seq.unwrap_or(0),
                }),
            }
        }
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub seq: u64,
    pub ts: u64,
    pub game: String,
    pub protocol_version: String,
}

/// Periodic game state broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub seq: u64,
    pub ts: u64,
    pub score: u32,
    pub lines: u32,
    #[serde(rename = "game_over")]
    pub game_over: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "bad_message")]
    BadMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

pub fn create_welcome(seq: u64) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: "welcome".to_string(),
        seq,
        ts: current_timestamp_ms(),
        game: "pose-tetris".to_string(),
        protocol_version: PROTOCOL_VERSION.to_string(),
    }
}

pub fn create_state(seq: u64, score: u32, lines: u32, game_over: bool) -> StateMessage {
    StateMessage {
        msg_type: "state".to_string(),
        seq,
        ts: current_timestamp_ms(),
        score,
        lines,
        game_over,
    }
}

pub fn create_error(seq: u64, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: "error".to_string(),
        seq,
        ts: current_timestamp_ms(),
        code: ErrorCode::BadMessage,
        message: message.to_string(),
    }
}

fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
