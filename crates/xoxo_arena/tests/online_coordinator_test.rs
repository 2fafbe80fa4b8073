//! Two clients playing through one shared in-memory store.

use std::sync::Arc;

use xoxo_arena::{
    DocumentStore, ErrorReporter, GameId, GameOutcome, GameStatus, Identity, MemoryStore,
    MoveError, OnlineCoordinator, OnlineError, OnlineGame, Player, Position, StaticIdentity, Winner,
};

fn client(store: &MemoryStore, uid: &str) -> OnlineCoordinator {
    let identity = StaticIdentity::signed_in(Identity::new(uid.to_string(), true, None));
    OnlineCoordinator::new(
        Arc::new(store.clone()),
        Arc::new(identity),
        ErrorReporter::detached(),
        10,
    )
}

async fn stored(store: &MemoryStore, id: &GameId) -> OnlineGame {
    store
        .get_game(id)
        .await
        .expect("Get failed")
        .expect("Game exists")
}

/// Alice creates a game and Bob joins it.
async fn start_game(alice: &mut OnlineCoordinator, bob: &mut OnlineCoordinator) -> GameId {
    let (id, pending) = alice.create_game().await.expect("Create failed");
    pending.settled().await;
    bob.join_game(&id)
        .await
        .expect("Join failed")
        .expect("Join writes")
        .settled()
        .await;
    id
}

/// Plays `moves` alternately, Alice first.
async fn play(alice: &mut OnlineCoordinator, bob: &mut OnlineCoordinator, id: &GameId, moves: &[usize]) {
    for (turn, &index) in moves.iter().enumerate() {
        let client = if turn % 2 == 0 { &mut *alice } else { &mut *bob };
        client
            .submit_move(id, index)
            .await
            .expect("Move accepted")
            .settled()
            .await;
    }
}

#[tokio::test]
async fn test_create_lists_in_lobby() {
    let store = MemoryStore::new();
    let mut alice = client(&store, "alice");
    let bob = client(&store, "bob");

    let (id, pending) = alice.create_game().await.expect("Create failed");
    pending.settled().await;

    let game = stored(&store, &id).await;
    assert_eq!(game.player1_id(), "alice");
    assert_eq!(game.next_player_id(), "alice");
    assert_eq!(*game.status(), GameStatus::Waiting);
    assert!(game.player2_id().is_none());

    let lobby = bob.list_open_games().fetch().await.expect("Lobby failed");
    assert_eq!(lobby.len(), 1);
    assert_eq!(lobby[0].id(), &id);
    assert_eq!(alice.active_game_id(), Some(&id));
}

#[tokio::test]
async fn test_join_activates_for_both_clients() {
    let store = MemoryStore::new();
    let mut alice = client(&store, "alice");
    let mut bob = client(&store, "bob");
    let id = start_game(&mut alice, &mut bob).await;

    let game = stored(&store, &id).await;
    assert_eq!(game.player2_id().as_deref(), Some("bob"));
    assert_eq!(*game.status(), GameStatus::Active);

    let alice_view = alice.view().expect("Alice has a view");
    assert_eq!(alice_view.my_mark(), &Some(Player::X));
    assert!(*alice_view.my_turn());
    let bob_view = bob.view().expect("Bob has a view");
    assert_eq!(bob_view.my_mark(), &Some(Player::O));
    assert!(!*bob_view.my_turn());

    let lobby = alice.list_open_games().fetch().await.expect("Lobby failed");
    assert!(lobby.is_empty());
}

#[tokio::test]
async fn test_top_row_win() {
    let store = MemoryStore::new();
    let mut alice = client(&store, "alice");
    let mut bob = client(&store, "bob");
    let id = start_game(&mut alice, &mut bob).await;

    play(&mut alice, &mut bob, &id, &[0, 4, 1, 8, 2]).await;

    let game = stored(&store, &id).await;
    assert_eq!(*game.status(), GameStatus::Finished);
    assert_eq!(game.winner(), &Some(Winner::User("alice".to_string())));
    assert_eq!(
        game.win_result().line,
        Some([Position::TopLeft, Position::TopCenter, Position::TopRight])
    );
    assert_eq!(alice.view().and_then(|v| *v.result()), Some(GameOutcome::Win));
    assert_eq!(bob.view().and_then(|v| *v.result()), Some(GameOutcome::Loss));

    let late = bob.submit_move(&id, 5).await;
    assert!(matches!(late, Err(OnlineError::Move(MoveError::GameFinished))));
}

#[tokio::test]
async fn test_full_board_draw() {
    let store = MemoryStore::new();
    let mut alice = client(&store, "alice");
    let mut bob = client(&store, "bob");
    let id = start_game(&mut alice, &mut bob).await;

    play(&mut alice, &mut bob, &id, &[0, 1, 2, 4, 3, 5, 7, 6, 8]).await;

    let game = stored(&store, &id).await;
    assert_eq!(*game.status(), GameStatus::Finished);
    assert_eq!(game.winner(), &Some(Winner::Draw));
    assert_eq!(game.board().encode(), "XOXXOOOXX");
    assert_eq!(alice.view().and_then(|v| *v.result()), Some(GameOutcome::Draw));
}

#[tokio::test]
async fn test_move_rejections() {
    let store = MemoryStore::new();
    let mut alice = client(&store, "alice");
    let mut bob = client(&store, "bob");
    let mut carol = client(&store, "carol");

    let (id, pending) = alice.create_game().await.expect("Create failed");
    pending.settled().await;
    let early = alice.submit_move(&id, 0).await;
    assert!(matches!(early, Err(OnlineError::Move(MoveError::GameNotStarted))));

    bob.join_game(&id)
        .await
        .expect("Join failed")
        .expect("Join writes")
        .settled()
        .await;

    let out_of_turn = bob.submit_move(&id, 0).await;
    assert!(matches!(
        out_of_turn,
        Err(OnlineError::Move(MoveError::NotYourTurn(Player::O)))
    ));

    let out_of_bounds = alice.submit_move(&id, 9).await;
    assert!(matches!(
        out_of_bounds,
        Err(OnlineError::Move(MoveError::OutOfBounds(9)))
    ));

    alice
        .submit_move(&id, 4)
        .await
        .expect("Move accepted")
        .settled()
        .await;
    let occupied = bob.submit_move(&id, 4).await;
    assert!(matches!(
        occupied,
        Err(OnlineError::Move(MoveError::CellOccupied(Position::Center)))
    ));

    let outsider = carol.submit_move(&id, 0).await;
    assert!(matches!(
        outsider,
        Err(OnlineError::Move(MoveError::NotAParticipant))
    ));
    let taken = carol.join_game(&id).await;
    assert!(matches!(taken, Err(OnlineError::GameTaken(_))));
}

#[tokio::test]
async fn test_forfeit_by_player_to_move() {
    let store = MemoryStore::new();
    let mut alice = client(&store, "alice");
    let mut bob = client(&store, "bob");
    let id = start_game(&mut alice, &mut bob).await;
    play(&mut alice, &mut bob, &id, &[0]).await;

    bob.leave_game()
        .await
        .expect("Leave failed")
        .expect("Forfeit writes")
        .settled()
        .await;

    let game = stored(&store, &id).await;
    assert_eq!(*game.status(), GameStatus::Finished);
    assert_eq!(game.winner(), &Some(Winner::User("alice".to_string())));
    assert!(bob.active_game_id().is_none());
    assert_eq!(alice.view().and_then(|v| *v.result()), Some(GameOutcome::Win));
}

#[tokio::test]
async fn test_leaving_finished_game_writes_nothing() {
    let store = MemoryStore::new();
    let mut alice = client(&store, "alice");
    let mut bob = client(&store, "bob");
    let id = start_game(&mut alice, &mut bob).await;
    play(&mut alice, &mut bob, &id, &[0, 4, 1, 8, 2]).await;

    let left = alice.leave_game().await.expect("Leave failed");
    assert!(left.is_none());
    assert!(alice.active_game_id().is_none());
    assert_eq!(
        stored(&store, &id).await.winner(),
        &Some(Winner::User("alice".to_string()))
    );
}

#[tokio::test]
async fn test_creator_cancels_waiting_game() {
    let store = MemoryStore::new();
    let mut alice = client(&store, "alice");
    let (id, pending) = alice.create_game().await.expect("Create failed");
    pending.settled().await;

    alice
        .leave_game()
        .await
        .expect("Leave failed")
        .expect("Cancel writes")
        .settled()
        .await;

    let game = stored(&store, &id).await;
    assert_eq!(*game.status(), GameStatus::Finished);
    assert!(game.winner().is_none());
    let lobby = alice.list_open_games().fetch().await.expect("Lobby failed");
    assert!(lobby.is_empty());
}

#[tokio::test]
async fn test_signed_out_cannot_create() {
    let store = MemoryStore::new();
    let mut ghost = OnlineCoordinator::new(
        Arc::new(store),
        Arc::new(StaticIdentity::loading()),
        ErrorReporter::detached(),
        10,
    );
    assert!(matches!(ghost.create_game().await, Err(OnlineError::SignedOut)));
    assert!(ghost.view().is_none());
}

#[tokio::test]
async fn test_lobby_respects_limit() {
    let store = MemoryStore::new();
    for i in 0..12 {
        let mut host = client(&store, &format!("host{i}"));
        let (_, pending) = host.create_game().await.expect("Create failed");
        pending.settled().await;
    }
    let viewer = client(&store, "viewer");
    let lobby = viewer.list_open_games();
    assert_eq!(lobby.limit(), 10);
    assert_eq!(lobby.fetch().await.expect("Lobby failed").len(), 10);
    assert_eq!(lobby.fetch().await.expect("Lobby failed").len(), 10);
}

#[tokio::test]
async fn test_second_tap_before_write_lands_is_rejected() {
    let store = MemoryStore::new();
    let mut alice = client(&store, "alice");
    let mut bob = client(&store, "bob");
    let id = start_game(&mut alice, &mut bob).await;

    let first = alice.submit_move(&id, 0).await.expect("Move accepted");
    let view = alice.view().expect("Alice has a view");
    assert!(!*view.my_turn(), "own move shows before the write lands");
    assert_eq!(view.game().board().encode(), "X--------");

    let second = alice.submit_move(&id, 1).await;
    assert!(matches!(
        second,
        Err(OnlineError::Move(MoveError::NotYourTurn(Player::X)))
    ));
    first.settled().await;

    let game = stored(&store, &id).await;
    assert_eq!(game.board().encode(), "X--------");
    assert_eq!(game.next_player_id(), "bob");
}

#[tokio::test]
async fn test_leave_before_create_lands() {
    let store = MemoryStore::new();
    let mut alice = client(&store, "alice");

    let (id, created) = alice.create_game().await.expect("Create failed");
    let left = alice
        .leave_game()
        .await
        .expect("Leave failed")
        .expect("Cancel writes");
    created.settled().await;
    left.settled().await;

    let game = stored(&store, &id).await;
    assert_eq!(*game.status(), GameStatus::Finished);
    assert!(game.winner().is_none());
    let lobby = alice.list_open_games().fetch().await.expect("Lobby failed");
    assert!(lobby.is_empty());
}

#[tokio::test]
async fn test_concurrent_joins_last_write_wins() {
    let store = MemoryStore::new();
    let mut alice = client(&store, "alice");
    let mut bob = client(&store, "bob");
    let mut carol = client(&store, "carol");
    let (id, pending) = alice.create_game().await.expect("Create failed");
    pending.settled().await;

    let bob_join = bob
        .join_game(&id)
        .await
        .expect("Bob's join accepted")
        .expect("Join writes");
    let carol_join = carol
        .join_game(&id)
        .await
        .expect("Carol's join accepted")
        .expect("Join writes");
    bob_join.settled().await;
    carol_join.settled().await;

    let game = stored(&store, &id).await;
    assert_eq!(*game.status(), GameStatus::Active);
    assert_eq!(game.player2_id().as_deref(), Some("carol"));
    assert_eq!(bob.view().and_then(|v| *v.my_mark()), None, "bob lost the seat");
}

#[tokio::test]
async fn test_move_and_forfeit_race_last_write_wins() {
    let store = MemoryStore::new();
    let mut alice = client(&store, "alice");
    let mut bob = client(&store, "bob");
    let id = start_game(&mut alice, &mut bob).await;
    play(&mut alice, &mut bob, &id, &[0]).await;

    // Bob moves while Alice, still seeing Bob on turn, walks away.
    let moved = bob.submit_move(&id, 4).await.expect("Move accepted");
    let left = alice
        .leave_game()
        .await
        .expect("Leave failed")
        .expect("Forfeit writes");
    moved.settled().await;
    left.settled().await;

    let game = stored(&store, &id).await;
    assert_eq!(game.board().encode(), "X---O----", "the move is kept");
    assert_eq!(game.next_player_id(), "alice");
    assert_eq!(*game.status(), GameStatus::Finished);
    assert_eq!(game.winner(), &Some(Winner::User("alice".to_string())));
}
