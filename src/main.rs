//! Pose-controlled Tetris runner (default binary).
//!
//! Wires the pose feed into the gesture interpreter, router and engine, and
//! renders through the framebuffer renderer. The keyboard only quits and
//! restarts; play happens through the pose feed.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

use pose_tetris::adapter::{FeedEvent, PoseFeed, ServerConfig, StateSnapshot};
use pose_tetris::core::{Engine, EngineConfig, GhostTarget};
use pose_tetris::gesture::GestureInterpreter;
use pose_tetris::router::CommandRouter;
use pose_tetris::term::{GameView, TerminalRenderer};
use pose_tetris::types::{GameAction, GestureState};

const TICK: Duration = Duration::from_millis(33);

fn main() -> Result<()> {
    let config = config_from_args()?;

    let mut term = TerminalRenderer::new();
    term.enter()?;
    let result = run(&mut term, config);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn config_from_args() -> Result<ServerConfig> {
    let mut config = ServerConfig::from_env();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--host" => config.host = args.next().context("--host needs a value")?,
            "--port" => {
                config.port = args
                    .next()
                    .context("--port needs a value")?
                    .parse()
                    .context("--port must be a number")?;
            }
            "--help" | "-h" => {
                println!("usage: pose-tetris [--host HOST] [--port PORT]");
                println!("pose feed listens on HOST:PORT (env: POSE_TETRIS_HOST/_PORT)");
                std::process::exit(0);
            }
            other => bail!("unknown argument: {}", other),
        }
    }
    Ok(config)
}

fn run(term: &mut TerminalRenderer, config: ServerConfig) -> Result<()> {
    let mut feed = PoseFeed::start(config)?;

    let now = Instant::now();
    let mut engine = Engine::new(EngineConfig::default(), clock_seed(), now);
    engine.start(now);
    let mut interpreter = GestureInterpreter::default();
    let mut router = CommandRouter::default();

    let mut last_gesture: Option<GestureState> = None;
    let mut last_action = GameAction::None;
    let mut move_target: Option<usize> = None;
    let mut last_tick = Instant::now();

    loop {
        let now = Instant::now();

        // Drain the pose feed through interpreter and router.
        if let Some(feed) = feed.as_mut() {
            while let Some(feed_event) = feed.try_recv() {
                match feed_event {
                    FeedEvent::Frame(frame) => {
                        let Some(state) = interpreter.process(Some(&frame), now) else {
                            continue;
                        };
                        let action = router.route(&state, now);
                        match action {
                            GameAction::Move { column } => move_target = Some(column),
                            GameAction::None if state.idle => move_target = None,
                            _ => {}
                        }
                        engine.apply(action, now);
                        if action != GameAction::None {
                            last_action = action;
                        }
                        last_gesture = Some(state);
                    }
                    FeedEvent::Restart => {
                        engine.restart(now);
                        move_target = None;
                    }
                }
            }
        }

        // Keep steering toward the tracked column between snapshots.
        match (move_target, engine.active_piece()) {
            (Some(column), Some(piece)) => {
                engine.move_toward_column(column);
                engine.set_ghost_target(Some(GhostTarget {
                    kind: piece.kind,
                    rotation: piece.rotation,
                    column,
                }));
            }
            _ => engine.set_ghost_target(None),
        }

        engine.update(now);

        if let Some(feed) = feed.as_ref() {
            feed.publish_state(StateSnapshot {
                score: engine.score(),
                lines: engine.lines(),
                game_over: engine.is_game_over(),
            });
        }

        term.draw(GameView::render(&engine, last_gesture.as_ref(), last_action))?;

        // Keyboard handling with a timeout until the next tick.
        let timeout = TICK
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Char('r') => {
                            engine.restart(Instant::now());
                            move_target = None;
                            last_action = GameAction::None;
                        }
                        _ => {}
                    }
                }
            }
        }
        if last_tick.elapsed() >= TICK {
            last_tick = Instant::now();
        }
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos()
}
