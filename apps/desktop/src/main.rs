use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, ClientEvent, GameClient, GameTransport, HttpGameTransport,
    InteractionController,
};
use shared::{
    domain::{Coordinate, Side, BOARD_SIZE},
    protocol::{GameStateWire, PieceMarker},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "checkers", about = "Terminal client for the checkers game service")]
struct Args {
    /// Base address of the game service, e.g. http://localhost:8080/api
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum CliCommand {
    /// Start a fresh game and print the opening position.
    NewGame {
        /// Print the raw game state as JSON instead of a board.
        #[arg(long)]
        json: bool,
    },
    /// Print the win record.
    Tally,
    /// Play interactively (default).
    Play,
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Click(Coordinate),
    NewGame,
    Help,
    Quit,
}

const HELP: &str = "commands: <row> <col> to click a square, new, help, quit";

fn parse_input(line: &str) -> Result<Input, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["new"] | ["n"] => Ok(Input::NewGame),
        ["help"] | ["h"] | ["?"] => Ok(Input::Help),
        ["quit"] | ["q"] | ["exit"] => Ok(Input::Quit),
        [row, col] => {
            let row: i64 = row.parse().map_err(|_| format!("not a row number: {row}"))?;
            let col: i64 = col.parse().map_err(|_| format!("not a column number: {col}"))?;
            Coordinate::from_signed(row, col)
                .map(Input::Click)
                .map_err(|err| err.to_string())
        }
        _ => Err(format!("unrecognized input {line:?}; {HELP}")),
    }
}

fn render_board(controller: &InteractionController) -> String {
    let mut out = String::new();
    let Some(session) = controller.session() else {
        return "no game loaded\n".to_string();
    };

    out.push_str("   ");
    for col in 0..BOARD_SIZE {
        let _ = write!(out, " {col} ");
    }
    out.push('\n');
    for row in 0..BOARD_SIZE {
        let _ = write!(out, "{row}  ");
        for col in 0..BOARD_SIZE {
            let Ok(coord) = Coordinate::from_signed(row as i64, col as i64) else {
                continue;
            };
            let glyph = match PieceMarker::from(session.board.piece_at(coord)) {
                PieceMarker::Empty if coord.is_dark_square() => ".",
                PieceMarker::Empty => " ",
                PieceMarker::HumanRegular => "r",
                PieceMarker::HumanKing => "R",
                PieceMarker::OpponentRegular => "b",
                PieceMarker::OpponentKing => "B",
            };
            let cell = if controller.selection() == Some(coord) {
                format!("[{glyph}]")
            } else if controller.is_plausible_destination(coord) {
                " * ".to_string()
            } else {
                format!(" {glyph} ")
            };
            out.push_str(&cell);
        }
        out.push('\n');
    }
    out
}

fn render_summary(controller: &InteractionController) -> String {
    let mut out = render_board(controller);
    let _ = writeln!(out, "{}", controller.status_line());
    if let Some(reply) = controller.last_opponent_move() {
        let _ = writeln!(out, "bot played {reply}");
    }
    if let Some(err) = controller.last_error() {
        let _ = writeln!(out, "error: {err}");
    }
    let tally = controller.tally();
    let _ = writeln!(
        out,
        "record: {} wins, {} losses, {} draws",
        tally.wins, tally.losses, tally.draws
    );
    out
}

async fn play(transport: HttpGameTransport) -> Result<()> {
    let client = GameClient::new(transport);
    let mut events = client.subscribe_events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ClientEvent::Error(message)) => tracing::warn!(%message, "request failed"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "client event listener lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    client.start().await;
    print!("{}", render_summary(&client.snapshot().await));
    println!("{HELP}");
    println!("you play {}", side_label(Side::Human));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_input(&line) {
            Ok(Input::Quit) => break,
            Ok(Input::Help) => {
                println!("{HELP}");
                continue;
            }
            Ok(Input::Click(coord)) => client.click(coord).await,
            Ok(Input::NewGame) => {
                if !client.new_game().await {
                    println!("a request is still in flight");
                }
            }
            Err(message) => {
                println!("{message}");
                continue;
            }
        }
        print!("{}", render_summary(&client.snapshot().await));
    }
    Ok(())
}

fn side_label(side: Side) -> &'static str {
    match side {
        Side::Human => "red (r/R)",
        Side::Opponent => "black (b/B)",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings()
        .and_then(|settings| settings.with_server_url(args.server_url))
        .context("failed to load client settings")?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let transport = HttpGameTransport::from_settings(&settings)?;
    match args.command.unwrap_or(CliCommand::Play) {
        CliCommand::NewGame { json } => {
            let session = transport.create_game().await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&GameStateWire::from(session))?
                );
            } else {
                let mut controller = InteractionController::new();
                let _ = controller.request_new_game();
                controller.complete_new_game(Ok(session));
                print!("{}", render_board(&controller));
                println!("{}", controller.status_line());
            }
        }
        CliCommand::Tally => {
            let tally = transport.win_record().await?;
            println!(
                "wins: {}  losses: {}  draws: {}  (games: {})",
                tally.wins,
                tally.losses,
                tally.draws,
                tally.total()
            );
        }
        CliCommand::Play => play(transport).await?,
    }
    Ok(())
}
