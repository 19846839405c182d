//! TCP pose-feed server.
//!
//! Accepts line-delimited JSON connections from pose estimation clients,
//! pushes decoded frames into a bounded channel for the game loop, and
//! streams game state back whenever the loop publishes a new snapshot.
//! A malformed line earns the client an `error` reply; it never takes the
//! server down.

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};

use pose_tetris_gesture::PoseFrame;

use crate::protocol::{create_error, create_state, create_welcome, parse_message, ParsedMessage};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7878;

/// Queue depth for frames waiting on the game loop. The feed is lossy by
/// design: when the loop falls behind, stale frames are the right thing to
/// drop.
const FRAME_QUEUE: usize = 64;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Read the listen address from `POSE_TETRIS_HOST` / `POSE_TETRIS_PORT`.
    pub fn from_env() -> Self {
        let host = std::env::var("POSE_TETRIS_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = std::env::var("POSE_TETRIS_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        Self { host, port }
    }

    /// The feed can be switched off entirely for keyboard-free debugging.
    pub fn is_disabled() -> bool {
        std::env::var("POSE_TETRIS_DISABLED").is_ok()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// What the feed delivers to the game loop.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    Frame(PoseFrame),
    Restart,
}

/// Snapshot broadcast to every connected client when it changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateSnapshot {
    pub score: u32,
    pub lines: u32,
    pub game_over: bool,
}

pub fn frame_channel() -> (mpsc::Sender<FeedEvent>, mpsc::Receiver<FeedEvent>) {
    mpsc::channel(FRAME_QUEUE)
}

pub async fn bind(config: &ServerConfig) -> Result<TcpListener> {
    let addr = format!("{}:{}", config.host, config.port);
    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind pose feed on {}", addr))
}

/// Accept loop. Runs until the listener errors or the task is dropped.
pub async fn run_server(
    listener: TcpListener,
    events: mpsc::Sender<FeedEvent>,
    state: watch::Receiver<StateSnapshot>,
) -> Result<()> {
    loop {
        let (stream, _) = listener.accept().await?;
        let events = events.clone();
        let state = state.clone();
        tokio::spawn(async move {
            let _ = handle_client(stream, events, state).await;
        });
    }
}

async fn handle_client(
    stream: TcpStream,
    events: mpsc::Sender<FeedEvent>,
    mut state: watch::Receiver<StateSnapshot>,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();
    let mut out_seq: u64 = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_message(&line) {
                    Ok(ParsedMessage::Hello(_)) => {
                        send_line(&mut write_half, &create_welcome(next(&mut out_seq))).await?;
                    }
                    Ok(ParsedMessage::Pose(msg)) => {
                        // try_send: drop the frame rather than stall the client.
                        let _ = events.try_send(FeedEvent::Frame(msg.to_frame()));
                    }
                    Ok(ParsedMessage::Control(_)) => {
                        let _ = events.try_send(FeedEvent::Restart);
                    }
                    Ok(ParsedMessage::Unknown { .. }) => {}
                    Err(e) => {
                        let reply = create_error(next(&mut out_seq), &e.to_string());
                        send_line(&mut write_half, &reply).await?;
                    }
                }
            }
            changed = state.changed() => {
                if changed.is_err() {
                    // Game loop is gone; nothing left to report.
                    return Ok(());
                }
                let snapshot = *state.borrow_and_update();
                let msg = create_state(
                    next(&mut out_seq),
                    snapshot.score,
                    snapshot.lines,
                    snapshot.game_over,
                );
                send_line(&mut write_half, &msg).await?;
            }
        }
    }
}

fn next(seq: &mut u64) -> u64 {
    *seq += 1;
    *seq
}

async fn send_line<T: Serialize>(write_half: &mut OwnedWriteHalf, msg: &T) -> Result<()> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    write_half.write_all(line.as_bytes()).await?;
    Ok(())
}
