//! Timer behaviour of the local match driver, on a paused clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use xoxo_arena::{
    DocumentStore, ErrorReporter, HistoryRecorder, Identity, LOCAL_OPPONENT_ID, LocalCommand,
    LocalMatch, LocalMatchDriver, LocalMatchHandle, MatchMode, MatchSettings, MatchSnapshot,
    MemoryStore, Outcome, Phase, Player, StaticIdentity, seeded_rng,
};

fn spawn(mode: MatchMode) -> LocalMatchHandle {
    let state = LocalMatch::new(mode, MatchSettings::default());
    LocalMatchDriver::spawn(state, seeded_rng(Some(7)), None)
}

fn marks(snapshot: &MatchSnapshot) -> usize {
    9 - snapshot.board().empty_positions().len()
}

#[tokio::test(start_paused = true)]
async fn test_computer_moves_after_thinking_delay() {
    let handle = spawn(MatchMode::PvC);
    let mut snapshots = handle.subscribe();
    let start = Instant::now();

    assert!(handle.send(LocalCommand::CellClicked(0)));
    let thinking = snapshots
        .wait_for(|s| marks(s) == 1)
        .await
        .expect("Driver alive")
        .clone();
    assert_eq!(thinking.status(), "Computer is thinking...");

    let answered = snapshots
        .wait_for(|s| marks(s) == 2)
        .await
        .expect("Driver alive")
        .clone();
    assert!(start.elapsed() >= Duration::from_millis(500));
    assert_eq!(answered.phase(), &Phase::AwaitingMove(Player::X));
}

#[tokio::test(start_paused = true)]
async fn test_clicks_during_computer_turn_are_ignored() {
    let handle = spawn(MatchMode::PvC);
    let mut snapshots = handle.subscribe();

    handle.send(LocalCommand::CellClicked(0));
    handle.send(LocalCommand::CellClicked(1));
    let answered = snapshots
        .wait_for(|s| marks(s) == 2)
        .await
        .expect("Driver alive")
        .clone();
    // The second click arrived on the computer's turn, so only O moved.
    assert!(answered.board().is_empty(xoxo_arena::Position::TopCenter));
}

#[tokio::test(start_paused = true)]
async fn test_mode_change_cancels_computer_move() {
    let handle = spawn(MatchMode::PvC);
    let mut snapshots = handle.subscribe();

    handle.send(LocalCommand::CellClicked(0));
    snapshots
        .wait_for(|s| marks(s) == 1)
        .await
        .expect("Driver alive");
    handle.send(LocalCommand::ChangeMode(MatchMode::PvC));
    snapshots
        .wait_for(|s| marks(s) == 0)
        .await
        .expect("Driver alive");

    tokio::time::sleep(Duration::from_secs(2)).await;
    let snapshot = handle.snapshot();
    assert_eq!(marks(&snapshot), 0, "stale computer move never lands");
    assert_eq!(snapshot.phase(), &Phase::AwaitingMove(Player::X));
}

#[tokio::test(start_paused = true)]
async fn test_round_restarts_after_delay() {
    let handle = spawn(MatchMode::PvP);
    let mut snapshots = handle.subscribe();

    for index in [0, 3, 1, 4, 2] {
        handle.send(LocalCommand::CellClicked(index));
    }
    let over = snapshots
        .wait_for(|s| s.round_outcome().is_some())
        .await
        .expect("Driver alive")
        .clone();
    assert_eq!(over.round_outcome(), &Some(Outcome::Winner(Player::X)));
    assert_eq!(over.scores().get(Player::X), 1);
    let ended = Instant::now();

    let next = snapshots
        .wait_for(|s| s.round_outcome().is_none())
        .await
        .expect("Driver alive")
        .clone();
    assert!(ended.elapsed() >= Duration::from_secs(2));
    assert_eq!(marks(&next), 0);
    assert_eq!(next.scores().get(Player::X), 1, "scores carry over");
    assert_eq!(next.next_player(), &Player::X, "winner leads");
}

#[tokio::test(start_paused = true)]
async fn test_manual_restart_supersedes_timer() {
    let handle = spawn(MatchMode::PvP);
    let mut snapshots = handle.subscribe();

    for index in [0, 3, 1, 4, 2] {
        handle.send(LocalCommand::CellClicked(index));
    }
    snapshots
        .wait_for(|s| s.round_outcome().is_some())
        .await
        .expect("Driver alive");

    handle.send(LocalCommand::PlayAgain);
    handle.send(LocalCommand::CellClicked(4));
    snapshots
        .wait_for(|s| marks(s) == 1)
        .await
        .expect("Driver alive");

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(marks(&handle.snapshot()), 1, "old restart timer is ignored");
}

#[tokio::test(start_paused = true)]
async fn test_series_pauses_until_acknowledged() {
    let state = LocalMatch::new(
        MatchMode::PvP,
        MatchSettings::new(1, Duration::from_secs(2), Duration::from_millis(500)),
    );
    let handle = LocalMatchDriver::spawn(state, seeded_rng(Some(7)), None);
    let mut snapshots = handle.subscribe();

    for index in [0, 3, 1, 4, 2] {
        handle.send(LocalCommand::CellClicked(index));
    }
    snapshots
        .wait_for(|s| s.series_winner().is_some())
        .await
        .expect("Driver alive");

    tokio::time::sleep(Duration::from_secs(5)).await;
    let paused = handle.snapshot();
    assert_eq!(paused.phase(), &Phase::SeriesOver(Player::X));
    assert_eq!(marks(&paused), 5, "no auto-restart after a series");

    handle.send(LocalCommand::AcknowledgeSeries);
    let fresh = snapshots
        .wait_for(|s| s.series_winner().is_none())
        .await
        .expect("Driver alive")
        .clone();
    assert_eq!(fresh.scores().get(Player::X), 0);
    assert_eq!(marks(&fresh), 0);
}

#[tokio::test(start_paused = true)]
async fn test_pvp_rounds_are_recorded() {
    let store = MemoryStore::new();
    let identity = StaticIdentity::signed_in(Identity::new("alice".to_string(), true, None));
    let recorder = HistoryRecorder::new(
        Arc::new(store.clone()),
        Arc::new(identity),
        ErrorReporter::detached(),
    );
    let state = LocalMatch::new(MatchMode::PvP, MatchSettings::default());
    let handle = LocalMatchDriver::spawn(state, seeded_rng(Some(7)), Some(recorder));
    let mut snapshots = handle.subscribe();

    for index in [0, 3, 1, 4, 2] {
        handle.send(LocalCommand::CellClicked(index));
    }
    snapshots
        .wait_for(|s| s.round_outcome().is_some())
        .await
        .expect("Driver alive");
    tokio::time::sleep(Duration::from_millis(10)).await;

    let records = store
        .list_records(&"alice".to_string())
        .await
        .expect("List failed");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].winner_id().as_deref(), Some("alice"));
    assert_eq!(records[0].player2_id(), LOCAL_OPPONENT_ID);
    assert_eq!(records[0].moves(), "XXXOO----");
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_driver() {
    let handle = spawn(MatchMode::PvC);
    let snapshots = handle.subscribe();
    handle.send(LocalCommand::CellClicked(0));
    handle.shutdown().await;

    let mut snapshots = snapshots;
    assert_eq!(marks(&snapshots.borrow_and_update()), 1, "queued click was handled");
    assert!(snapshots.changed().await.is_err(), "sender dropped with the driver");
}
