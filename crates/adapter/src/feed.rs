//! Pose feed runtime integration.
//!
//! Owns a background tokio runtime running the TCP server and bridges it to
//! the synchronous game loop: frames come out of `try_recv`, game state goes
//! back in through `publish_state`.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, watch};

use crate::server::{bind, frame_channel, run_server, FeedEvent, ServerConfig, StateSnapshot};

pub struct PoseFeed {
    _rt: Runtime,
    events: mpsc::Receiver<FeedEvent>,
    state_tx: watch::Sender<StateSnapshot>,
    local_addr: SocketAddr,
}

impl PoseFeed {
    /// Bind and start serving. Returns `Ok(None)` when the feed is disabled
    /// through the environment.
    pub fn start(config: ServerConfig) -> Result<Option<Self>> {
        if ServerConfig::is_disabled() {
            return Ok(None);
        }

        let (tx, rx) = frame_channel();
        let (state_tx, state_rx) = watch::channel(StateSnapshot::default());

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let listener = rt.block_on(bind(&config))?;
        let local_addr = listener.local_addr()?;
        rt.spawn(async move {
            let _ = run_server(listener, tx, state_rx).await;
        });

        Ok(Some(Self {
            _rt: rt,
            events: rx,
            state_tx,
            local_addr,
        }))
    }

    /// Non-blocking poll for the next event; the game loop calls this every
    /// tick and drains until empty.
    pub fn try_recv(&mut self) -> Option<FeedEvent> {
        self.events.try_recv().ok()
    }

    /// Publish a snapshot to connected clients. Duplicate snapshots are not
    /// re-broadcast.
    pub fn publish_state(&self, snapshot: StateSnapshot) {
        self.state_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
