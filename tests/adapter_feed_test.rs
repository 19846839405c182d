//! Exercises the pose feed end to end from a plain blocking TCP client,
//! the way an external pose estimation process would connect.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use pose_tetris::adapter::{FeedEvent, PoseFeed, ServerConfig, StateSnapshot};
use pose_tetris::gesture::LandmarkIndex;

const DEADLINE: Duration = Duration::from_secs(2);

fn start_feed() -> PoseFeed {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    PoseFeed::start(config)
        .expect("feed starts")
        .expect("feed enabled")
}

fn connect(feed: &PoseFeed) -> (BufReader<TcpStream>, TcpStream) {
    let stream = TcpStream::connect(feed.local_addr()).expect("connect");
    stream
        .set_read_timeout(Some(DEADLINE))
        .expect("read timeout");
    let reader = BufReader::new(stream.try_clone().expect("clone stream"));
    (reader, stream)
}

fn read_line(reader: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).expect("server line");
    line
}

/// Poll the lossy feed channel until an event arrives or the deadline hits.
fn wait_for_event(feed: &mut PoseFeed) -> FeedEvent {
    let start = Instant::now();
    loop {
        if let Some(event) = feed.try_recv() {
            return event;
        }
        assert!(start.elapsed() < DEADLINE, "no event before the deadline");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn hello_pose_and_control_round_trip() {
    let mut feed = start_feed();
    let (mut reader, mut stream) = connect(&feed);

    stream
        .write_all(
            b"{\"type\":\"hello\",\"seq\":1,\"ts\":0,\"client\":{\"name\":\"cam\",\"version\":\"1\"}}\n",
        )
        .expect("send hello");
    let welcome = read_line(&mut reader);
    assert!(welcome.contains(r#""type":"welcome""#), "got {}", welcome);

    stream
        .write_all(
            b"{\"type\":\"pose\",\"seq\":2,\"ts\":0,\"landmarks\":[{\"index\":23,\"x\":0.45,\"y\":0.55},{\"index\":24,\"x\":0.55,\"y\":0.55}]}\n",
        )
        .expect("send pose");
    match wait_for_event(&mut feed) {
        FeedEvent::Frame(frame) => {
            let hip = frame.get(LandmarkIndex::LeftHip).expect("left hip decoded");
            assert!((hip.x - 0.45).abs() < 1e-6);
        }
        FeedEvent::Restart => panic!("expected a pose frame"),
    }

    stream
        .write_all(b"{\"type\":\"control\",\"seq\":3,\"ts\":0,\"action\":\"restart\"}\n")
        .expect("send control");
    assert!(matches!(wait_for_event(&mut feed), FeedEvent::Restart));
}

#[test]
fn published_state_reaches_the_client() {
    let feed = start_feed();
    let (mut reader, mut stream) = connect(&feed);

    // The handshake guarantees the connection task is in its read loop
    // before the snapshot goes out.
    stream
        .write_all(
            b"{\"type\":\"hello\",\"seq\":1,\"ts\":0,\"client\":{\"name\":\"cam\",\"version\":\"1\"}}\n",
        )
        .expect("send hello");
    let _ = read_line(&mut reader);

    feed.publish_state(StateSnapshot {
        score: 140,
        lines: 2,
        game_over: false,
    });
    let state: serde_json::Value = serde_json::from_str(&read_line(&mut reader)).expect("state json");
    assert_eq!(state["type"], "state");
    assert_eq!(state["score"], 140);
    assert_eq!(state["lines"], 2);
    assert_eq!(state["game_over"], false);

    // Re-publishing the same snapshot is not re-broadcast; the next change is.
    feed.publish_state(StateSnapshot {
        score: 140,
        lines: 2,
        game_over: false,
    });
    feed.publish_state(StateSnapshot {
        score: 140,
        lines: 2,
        game_over: true,
    });
    let state: serde_json::Value = serde_json::from_str(&read_line(&mut reader)).expect("state json");
    assert_eq!(state["game_over"], true);
}

#[test]
fn malformed_line_earns_an_error_reply() {
    let feed = start_feed();
    let (mut reader, mut stream) = connect(&feed);

    stream.write_all(b"not json at all\n").expect("send junk");
    let reply = read_line(&mut reader);
    assert!(reply.contains(r#""type":"error""#), "got {}", reply);
}
