//! Backend commands queued from UI to backend worker.

use client_core::Command;
use shared::domain::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCommand {
    NewGame,
    MakeMove(Move),
    RefreshTally,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::NewGame => "new_game",
            BackendCommand::MakeMove(_) => "make_move",
            BackendCommand::RefreshTally => "refresh_tally",
        }
    }
}

impl From<Command> for BackendCommand {
    fn from(command: Command) -> Self {
        match command {
            Command::CreateGame => BackendCommand::NewGame,
            Command::SubmitMove(mv) => BackendCommand::MakeMove(mv),
            Command::RefreshTally => BackendCommand::RefreshTally,
        }
    }
}
