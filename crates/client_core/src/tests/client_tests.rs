use super::*;
use crate::transport::MoveOutcome;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{Board, Move, Piece, Side};
use std::{
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use tokio::sync::oneshot;

#[derive(Default)]
struct ScriptedTransport {
    new_games: Mutex<VecDeque<Result<Session>>>,
    moves: Mutex<VecDeque<Result<MoveOutcome>>>,
    tallies: Mutex<VecDeque<Result<Tally>>>,
    submitted: Mutex<Vec<Move>>,
    tally_calls: AtomicUsize,
    move_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl ScriptedTransport {
    fn with_new_game(mut self, result: Result<Session>) -> Self {
        self.new_games.get_mut().push_back(result);
        self
    }

    fn with_move(mut self, result: Result<MoveOutcome>) -> Self {
        self.moves.get_mut().push_back(result);
        self
    }

    fn with_tally(mut self, result: Result<Tally>) -> Self {
        self.tallies.get_mut().push_back(result);
        self
    }

    fn with_move_gate(mut self, gate: oneshot::Receiver<()>) -> Self {
        *self.move_gate.get_mut() = Some(gate);
        self
    }

    async fn submitted(&self) -> Vec<Move> {
        self.submitted.lock().await.clone()
    }
}

#[async_trait]
impl GameTransport for ScriptedTransport {
    async fn create_game(&self) -> Result<Session> {
        self.new_games
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted new game")))
    }

    async fn make_move(&self, mv: Move) -> Result<MoveOutcome> {
        self.submitted.lock().await.push(mv);
        let gate = self.move_gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.moves
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted move response")))
    }

    async fn win_record(&self) -> Result<Tally> {
        self.tally_calls.fetch_add(1, Ordering::SeqCst);
        self.tallies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted tally")))
    }
}

fn coord(row: u8, col: u8) -> Coordinate {
    Coordinate::new(row, col).expect("coordinate")
}

fn human_turn() -> Session {
    Session {
        board: Board::empty().with_piece(coord(5, 0), Piece::regular(Side::Human)),
        current_turn: Side::Human,
        game_over: false,
        winner: None,
    }
}

fn after_move(current_turn: Side, game_over: bool, winner: Option<Side>) -> MoveOutcome {
    MoveOutcome {
        session: Session {
            board: Board::empty().with_piece(coord(4, 1), Piece::regular(Side::Human)),
            current_turn,
            game_over,
            winner,
        },
        opponent_move: None,
    }
}

fn initial_tally() -> Tally {
    Tally {
        wins: 1,
        losses: 2,
        draws: 0,
    }
}

fn drain(rx: &mut broadcast::Receiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn start_loads_game_and_tally() {
    let transport = Arc::new(
        ScriptedTransport::default()
            .with_new_game(Ok(human_turn()))
            .with_tally(Ok(initial_tally())),
    );
    let client = GameClient::with_transport(transport.clone());
    let mut rx = client.subscribe_events();

    client.start().await;

    let snapshot = client.snapshot().await;
    assert_eq!(snapshot.session(), Some(&human_turn()));
    assert_eq!(snapshot.tally(), initial_tally());
    assert!(!snapshot.is_in_flight());
    assert_eq!(transport.tally_calls.load(Ordering::SeqCst), 1);

    let events = drain(&mut rx);
    assert!(matches!(events.first(), Some(ClientEvent::BusyChanged(true))));
    assert!(events
        .iter()
        .any(|e| matches!(e, ClientEvent::SessionReplaced(s) if s == &human_turn())));
    assert!(events
        .iter()
        .any(|e| matches!(e, ClientEvent::TallyUpdated(t) if *t == initial_tally())));
    assert!(matches!(
        events.iter().rev().find(|e| matches!(e, ClientEvent::BusyChanged(_))),
        Some(ClientEvent::BusyChanged(false))
    ));
}

#[tokio::test]
async fn move_replaces_session_without_touching_tally() {
    let transport = Arc::new(
        ScriptedTransport::default()
            .with_new_game(Ok(human_turn()))
            .with_tally(Ok(initial_tally()))
            .with_move(Ok(after_move(Side::Opponent, false, None))),
    );
    let client = GameClient::with_transport(transport.clone());
    client.start().await;

    client.click(coord(5, 0)).await;
    assert_eq!(client.snapshot().await.selection(), Some(coord(5, 0)));
    client.click(coord(4, 1)).await;

    assert_eq!(
        transport.submitted().await,
        vec![Move {
            from: coord(5, 0),
            to: coord(4, 1),
        }]
    );
    let snapshot = client.snapshot().await;
    assert_eq!(
        snapshot.session(),
        Some(&after_move(Side::Opponent, false, None).session)
    );
    assert_eq!(snapshot.selection(), None);
    assert!(!snapshot.is_in_flight());
    assert_eq!(snapshot.tally(), initial_tally());
    assert_eq!(transport.tally_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn game_over_move_refreshes_tally_once_and_freezes_board() {
    let final_tally = Tally {
        wins: 2,
        losses: 2,
        draws: 0,
    };
    let transport = Arc::new(
        ScriptedTransport::default()
            .with_new_game(Ok(human_turn()))
            .with_tally(Ok(initial_tally()))
            .with_move(Ok(after_move(Side::Human, true, Some(Side::Human))))
            .with_tally(Ok(final_tally)),
    );
    let client = GameClient::with_transport(transport.clone());
    client.start().await;

    client.click(coord(5, 0)).await;
    client.click(coord(4, 1)).await;

    assert_eq!(transport.tally_calls.load(Ordering::SeqCst), 2);
    let snapshot = client.snapshot().await;
    assert_eq!(snapshot.tally(), final_tally);
    assert_eq!(snapshot.status_line(), "Game Over! You Win!");

    client.click(coord(4, 1)).await;
    client.click(coord(3, 2)).await;
    assert_eq!(transport.submitted().await.len(), 1);
    assert_eq!(client.snapshot().await.selection(), None);
}

#[tokio::test]
async fn transport_error_on_move_settles_back_to_no_selection() {
    let transport = Arc::new(
        ScriptedTransport::default()
            .with_new_game(Ok(human_turn()))
            .with_tally(Ok(initial_tally()))
            .with_move(Err(anyhow!("connection reset by peer"))),
    );
    let client = GameClient::with_transport(transport.clone());
    client.start().await;
    let mut rx = client.subscribe_events();

    client.click(coord(5, 0)).await;
    client.click(coord(4, 1)).await;

    let snapshot = client.snapshot().await;
    assert_eq!(snapshot.session(), Some(&human_turn()));
    assert_eq!(snapshot.selection(), None);
    assert!(!snapshot.is_in_flight());
    assert_eq!(transport.tally_calls.load(Ordering::SeqCst), 1);

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, ClientEvent::Error(msg) if msg.contains("connection reset"))));
    assert!(!events
        .iter()
        .any(|e| matches!(e, ClientEvent::SessionReplaced(_))));
}

#[tokio::test]
async fn input_during_outstanding_move_is_inert() {
    let (release, gate) = oneshot::channel();
    let transport = Arc::new(
        ScriptedTransport::default()
            .with_new_game(Ok(human_turn()))
            .with_tally(Ok(initial_tally()))
            .with_move(Ok(after_move(Side::Human, false, None)))
            .with_move_gate(gate),
    );
    let client = GameClient::with_transport(transport.clone());
    client.start().await;
    client.click(coord(5, 0)).await;

    let submitting = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.click(coord(4, 1)).await })
    };

    for _ in 0..200 {
        if !transport.submitted().await.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(transport.submitted().await.len(), 1);
    assert!(client.snapshot().await.is_in_flight());

    client.click(coord(5, 0)).await;
    client.click(coord(4, 1)).await;
    assert!(!client.new_game().await);
    assert_eq!(transport.submitted().await.len(), 1);

    release.send(()).expect("release move");
    submitting.await.expect("move task");

    let snapshot = client.snapshot().await;
    assert!(!snapshot.is_in_flight());
    assert_eq!(snapshot.session(), Some(&after_move(Side::Human, false, None).session));
    assert_eq!(transport.submitted().await.len(), 1);
}

#[tokio::test]
async fn failed_startup_game_can_be_retried_manually() {
    let transport = Arc::new(
        ScriptedTransport::default()
            .with_new_game(Err(anyhow!("connection refused")))
            .with_new_game(Ok(human_turn()))
            .with_tally(Err(anyhow!("connection refused"))),
    );
    let client = GameClient::with_transport(transport.clone());
    client.start().await;

    let snapshot = client.snapshot().await;
    assert!(snapshot.session().is_none());
    assert!(!snapshot.is_in_flight());
    assert!(!snapshot.tally_loaded());
    assert_eq!(snapshot.tally(), Tally::default());

    assert!(client.new_game().await);
    assert_eq!(client.snapshot().await.session(), Some(&human_turn()));
}

#[tokio::test]
async fn tally_is_only_fetched_at_start_and_after_game_over() {
    let transport = Arc::new(
        ScriptedTransport::default()
            .with_new_game(Ok(human_turn()))
            .with_tally(Ok(initial_tally()))
            .with_move(Ok(after_move(Side::Human, false, None)))
            .with_new_game(Ok(human_turn()))
            .with_new_game(Ok(human_turn())),
    );
    let client = GameClient::with_transport(transport.clone());
    client.start().await;

    client.click(coord(5, 0)).await;
    client.click(coord(4, 1)).await;
    assert!(client.new_game().await);
    assert!(client.new_game().await);

    assert_eq!(transport.tally_calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.snapshot().await.tally(), initial_tally());
}
