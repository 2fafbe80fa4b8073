//! XOXO Arena - command-line front end
//!
//! Plays local and online matches on stdin/stdout and inspects the SQLite
//! store.

#![warn(missing_docs)]

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;
use xoxo_arena::{
    AnonymousSignIn, Arena, ArenaConfig, DocumentStore, ErrorReporter, HistoryRecorder, Identity,
    IdentityProvider, LobbyQuery, LocalMatchDriver, MatchMode, MatchSnapshot, OnlineCoordinator,
    OnlineView, PlayMode, Player, SqliteStore, StaticIdentity, UiEvent,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,xoxo_arena=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ArenaConfig::load_or_default(&cli.config)?;
    if let Some(path) = cli.db_path {
        config = config.with_database_path(path);
    }
    if let Some(user) = cli.user {
        config = config.with_user_id(user);
    }

    match cli.command {
        Command::Play { mode } => run_play(config, mode).await,
        Command::History => run_history(config).await,
        Command::Lobby => run_lobby(config).await,
    }
}

/// A line typed at the prompt.
enum Input {
    Event(UiEvent),
    Lobby,
    Show,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let input = match words.next()? {
        "q" | "quit" => Input::Quit,
        "h" | "help" => Input::Help,
        "s" | "show" => Input::Show,
        "lobby" => Input::Lobby,
        "n" | "new" => Input::Event(UiEvent::NewGame),
        "a" | "again" => Input::Event(UiEvent::PlayAgain),
        "pvp" => Input::Event(UiEvent::ModeSelected(PlayMode::Local(MatchMode::PvP))),
        "pvc" => Input::Event(UiEvent::ModeSelected(PlayMode::Local(MatchMode::PvC))),
        "online" => Input::Event(UiEvent::ModeSelected(PlayMode::Online)),
        "create" => Input::Event(UiEvent::CreateGame),
        "join" => Input::Event(UiEvent::JoinGame(words.next()?.to_string())),
        "leave" => Input::Event(UiEvent::LeaveGame),
        "name" => {
            let seat = match words.next()? {
                "x" | "X" => Player::X,
                "o" | "O" => Player::O,
                _ => return None,
            };
            let name = words.collect::<Vec<_>>().join(" ");
            Input::Event(UiEvent::NameEdited(seat, name))
        }
        cell => Input::Event(UiEvent::CellClicked(cell.parse().ok()?)),
    };
    Some(input)
}

fn print_help() {
    println!("Commands:");
    println!("  0-8            play a cell");
    println!("  pvp | pvc      local mode (resets the series)");
    println!("  name x|o NAME  rename a seat (pvp only)");
    println!("  new | again    new series | next round / acknowledge series");
    println!("  online         switch to online play");
    println!("  lobby | create | join ID | leave | show");
    println!("  quit");
}

fn print_local(snapshot: &MatchSnapshot) {
    println!();
    println!("[{}]", snapshot.mode().label());
    println!("{}", snapshot.board().render());
    println!(
        "{} (X): {}   {} (O): {}",
        snapshot.names().get(Player::X),
        snapshot.scores().get(Player::X),
        snapshot.names().get(Player::O),
        snapshot.scores().get(Player::O),
    );
    println!("{}", snapshot.status());
}

fn print_online(view: Option<OnlineView>) {
    match view {
        Some(view) => {
            println!();
            println!("[Online game {}]", view.game().id());
            println!("{}", view.game().board().render());
            println!("{}", view.status());
        }
        None => println!("No active online game"),
    }
}

async fn print_lobby(query: &LobbyQuery) -> Result<()> {
    let games = query.fetch().await?;
    if games.is_empty() {
        println!("No open games");
    }
    for game in games {
        println!(
            "{}  created by {} at {}",
            game.id(),
            game.player1_id(),
            game.created_at().to_rfc3339()
        );
    }
    Ok(())
}

fn sign_in(config: &ArenaConfig) -> AnonymousSignIn {
    match config.user_id() {
        Some(uid) => AnonymousSignIn::with_uid(uid.clone()),
        None => AnonymousSignIn::new(),
    }
}

/// Interactive play on stdin/stdout.
#[instrument(skip(config))]
async fn run_play(config: ArenaConfig, mode: MatchMode) -> Result<()> {
    let store: Arc<dyn DocumentStore> = Arc::new(SqliteStore::open(config.database_path().clone())?);
    let identity: Arc<dyn IdentityProvider> = Arc::new(sign_in(&config));
    if let Some(user) = identity.current_user() {
        println!("Signed in as {}", user.uid());
    }

    let (reporter, mut reports) = ErrorReporter::channel();
    tokio::spawn(async move {
        while let Some(report) = reports.recv().await {
            eprintln!("warning: {}", report);
        }
    });

    let recorder = HistoryRecorder::new(Arc::clone(&store), Arc::clone(&identity), reporter.clone());
    let local = LocalMatchDriver::spawn_with_config(mode, &config, Some(recorder));
    let mut snapshots = local.subscribe();
    let printer = tokio::spawn(async move {
        print_local(&snapshots.borrow_and_update().clone());
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            print_local(&snapshot);
        }
    });

    let online = OnlineCoordinator::new(store, identity, reporter, *config.lobby_limit());
    let mut arena = Arena::new(local, online);
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            None => println!("Unrecognized input, type 'help'"),
            Some(Input::Quit) => break,
            Some(Input::Help) => print_help(),
            Some(Input::Lobby) => print_lobby(&arena.online().list_open_games()).await?,
            Some(Input::Show) => match arena.mode() {
                PlayMode::Online => print_online(arena.online_view()),
                PlayMode::Local(_) => print_local(&arena.local_snapshot()),
            },
            Some(Input::Event(event)) => {
                let online = matches!(
                    (arena.mode(), &event),
                    (PlayMode::Online, _) | (_, UiEvent::ModeSelected(PlayMode::Online))
                );
                if let Some(pending) = arena.dispatch(event).await {
                    pending.settled().await;
                }
                if online {
                    print_online(arena.online_view());
                }
            }
        }
    }

    info!("Leaving play");
    drop(arena);
    printer.abort();
    Ok(())
}

/// Prints the configured user's records and summary.
#[instrument(skip(config))]
async fn run_history(config: ArenaConfig) -> Result<()> {
    let Some(uid) = config.user_id().clone() else {
        anyhow::bail!("No user id: pass --user or set user_id in the config");
    };
    let store = Arc::new(SqliteStore::open(config.database_path().clone())?);
    let identity = Arc::new(StaticIdentity::signed_in(Identity::new(uid.clone(), true, None)));
    let recorder = HistoryRecorder::new(store, identity, ErrorReporter::detached());

    let records = recorder.history().await?;
    println!("History for {}", uid);
    for record in &records {
        println!(
            "{}  {:<5}  {}",
            record.timestamp().to_rfc3339(),
            format!("{:?}", record.outcome_for(&uid)),
            record.moves()
        );
    }

    let summary = recorder.summary().await?;
    println!(
        "Games: {}  Wins: {}  Losses: {}  Draws: {}  Win rate: {:.1}%",
        summary.total_games(),
        summary.wins(),
        summary.losses(),
        summary.draws(),
        summary.win_rate()
    );
    Ok(())
}

/// Prints the open online games.
#[instrument(skip(config))]
async fn run_lobby(config: ArenaConfig) -> Result<()> {
    let store = Arc::new(SqliteStore::open(config.database_path().clone())?);
    let online = OnlineCoordinator::new(
        store,
        Arc::new(sign_in(&config)),
        ErrorReporter::detached(),
        *config.lobby_limit(),
    );
    print_lobby(&online.list_open_games()).await
}
