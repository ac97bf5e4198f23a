//! Game interaction controller: the selection / move-submission state machine
//! and the bookkeeping for the three pieces of remote state (session, move
//! result, tally).
//!
//! The controller performs no I/O. Operations hand back [`Command`]s that a
//! driver executes against a [`GameTransport`](crate::transport::GameTransport),
//! and the driver feeds each result back through the matching `complete_*`
//! method. All mutation happens through `&mut self`, so a single owner (the UI
//! thread, or the async client's mutex) serializes every transition and the
//! in-flight flag is a plain check.

use anyhow::Result;
use shared::domain::{Board, Coordinate, Move, Outcome, Session, Side, Tally};
use tracing::{debug, error, info, warn};

use crate::transport::MoveOutcome;

/// Remote work requested by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CreateGame,
    SubmitMove(Move),
    RefreshTally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    NoSelection,
    Armed(Coordinate),
    Submitting(Move),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingRequest {
    NewGame,
    Move(Move),
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    session: Option<Session>,
    session_generation: u64,
    state: InteractionState,
    pending: Option<PendingRequest>,
    tally: Tally,
    tally_loaded: bool,
    last_opponent_move: Option<Move>,
    last_error: Option<String>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            session: None,
            session_generation: 0,
            state: InteractionState::NoSelection,
            pending: None,
            tally: Tally::default(),
            tally_loaded: false,
            last_opponent_move: None,
            last_error: None,
        }
    }

    /// Commands to issue once at startup: a new game and a tally read, in no
    /// particular order.
    pub fn startup(&mut self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(2);
        commands.extend(self.request_new_game());
        commands.push(self.refresh_tally());
        commands
    }

    /// Gated by the in-flight flag; `None` means the request was ignored.
    pub fn request_new_game(&mut self) -> Option<Command> {
        if let Some(pending) = self.pending {
            debug!(?pending, "new game ignored while a request is in flight");
            return None;
        }
        self.pending = Some(PendingRequest::NewGame);
        info!("requesting new game");
        Some(Command::CreateGame)
    }

    /// Tally reads are side queries and never take the in-flight gate. Only
    /// `startup` and a game-ending `complete_move` issue them.
    pub(crate) fn refresh_tally(&mut self) -> Command {
        debug!("requesting tally refresh");
        Command::RefreshTally
    }

    pub fn click(&mut self, coord: Coordinate) -> Option<Command> {
        if let Some(pending) = self.pending {
            debug!(%coord, ?pending, "click ignored while a request is in flight");
            return None;
        }
        let Some(session) = self.session.as_ref() else {
            debug!(%coord, "click ignored before the first game has loaded");
            return None;
        };
        if !session.accepts_human_input() {
            debug!(
                %coord,
                game_over = session.game_over,
                turn = ?session.current_turn,
                "click ignored outside the human turn"
            );
            return None;
        }

        let command = match self.state {
            InteractionState::NoSelection => {
                if session.board.is_owned_by(coord, Side::Human) {
                    debug!(%coord, "piece armed");
                    self.state = InteractionState::Armed(coord);
                }
                None
            }
            InteractionState::Armed(selected) if selected == coord => {
                debug!(%coord, "piece deselected");
                self.state = InteractionState::NoSelection;
                None
            }
            InteractionState::Armed(selected) => {
                let mv = Move {
                    from: selected,
                    to: coord,
                };
                info!(%mv, "submitting move");
                self.state = InteractionState::Submitting(mv);
                self.pending = Some(PendingRequest::Move(mv));
                Some(Command::SubmitMove(mv))
            }
            // Submitting always holds the gate, so the early return covers it.
            InteractionState::Submitting(_) => None,
        };

        debug_assert!(self.selection_is_consistent());
        command
    }

    pub fn complete_new_game(&mut self, result: Result<Session>) {
        if self.pending != Some(PendingRequest::NewGame) {
            warn!(pending = ?self.pending, "dropping new game response with no matching request");
            return;
        }
        self.pending = None;

        match result {
            Ok(session) => {
                info!(turn = ?session.current_turn, game_over = session.game_over, "new game loaded");
                self.replace_session(session, None);
            }
            Err(err) => {
                error!("failed to start new game: {err:#}");
                self.last_error = Some(format!("failed to start new game: {err:#}"));
            }
        }
        debug_assert!(self.selection_is_consistent());
    }

    /// Returns [`Command::RefreshTally`] exactly when the returned session has
    /// ended.
    pub fn complete_move(&mut self, result: Result<MoveOutcome>) -> Option<Command> {
        let Some(PendingRequest::Move(mv)) = self.pending else {
            warn!(pending = ?self.pending, "dropping move response with no matching request");
            return None;
        };
        self.pending = None;
        self.state = InteractionState::NoSelection;

        let follow_up = match result {
            Ok(outcome) => {
                let game_over = outcome.session.game_over;
                info!(
                    %mv,
                    turn = ?outcome.session.current_turn,
                    game_over,
                    winner = ?outcome.session.winner,
                    "move response applied"
                );
                if let Some(reply) = outcome.opponent_move {
                    debug!(%reply, "opponent replied");
                }
                self.replace_session(outcome.session, outcome.opponent_move);
                game_over.then(|| self.refresh_tally())
            }
            Err(err) => {
                error!(%mv, "failed to submit move: {err:#}");
                self.last_error = Some(format!("failed to submit move {mv}: {err:#}"));
                None
            }
        };
        debug_assert!(self.selection_is_consistent());
        follow_up
    }

    pub fn complete_tally(&mut self, result: Result<Tally>) {
        match result {
            Ok(tally) => {
                if self.tally_loaded && !tally.dominates(&self.tally) {
                    warn!(previous = ?self.tally, reported = ?tally, "service reported a lower tally");
                }
                info!(wins = tally.wins, losses = tally.losses, draws = tally.draws, "tally updated");
                self.tally = tally;
                self.tally_loaded = true;
            }
            Err(err) => {
                warn!("failed to refresh tally: {err:#}");
                self.last_error = Some(format!("failed to refresh tally: {err:#}"));
            }
        }
    }

    fn replace_session(&mut self, session: Session, opponent_move: Option<Move>) {
        self.session = Some(session);
        self.session_generation += 1;
        self.state = InteractionState::NoSelection;
        self.last_opponent_move = opponent_move;
        self.last_error = None;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Bumped on every session replacement, including ones that leave the
    /// board unchanged.
    pub fn session_generation(&self) -> u64 {
        self.session_generation
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// The armed piece, kept while its move is being submitted.
    pub fn selection(&self) -> Option<Coordinate> {
        match self.state {
            InteractionState::NoSelection => None,
            InteractionState::Armed(coord) => Some(coord),
            InteractionState::Submitting(mv) => Some(mv.from),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn tally_loaded(&self) -> bool {
        self.tally_loaded
    }

    pub fn last_opponent_move(&self) -> Option<Move> {
        self.last_opponent_move
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_plausible_destination(&self, target: Coordinate) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| is_plausible_destination(target, self.selection(), &session.board))
    }

    /// A selection may only exist on a human piece of a live session during
    /// the human's turn.
    pub fn selection_is_consistent(&self) -> bool {
        match self.selection() {
            None => true,
            Some(coord) => self.session.as_ref().is_some_and(|session| {
                session.accepts_human_input() && session.board.is_owned_by(coord, Side::Human)
            }),
        }
    }

    pub fn status_line(&self) -> String {
        let Some(session) = self.session.as_ref() else {
            return "Loading...".to_string();
        };
        match session.outcome() {
            Outcome::Won(Side::Human) => "Game Over! You Win!".to_string(),
            Outcome::Won(Side::Opponent) => "Game Over! Bot Wins!".to_string(),
            Outcome::Draw => "Game Over! Draw!".to_string(),
            Outcome::InProgress { turn } => {
                let turn_text = match turn {
                    Side::Human => "Your Turn",
                    Side::Opponent => "Bot's Turn...",
                };
                if self.is_in_flight() {
                    format!("{turn_text} (Processing...)")
                } else {
                    turn_text.to_string()
                }
            }
        }
    }
}

/// Display hint only: an empty square one diagonal step from the selection.
/// The service remains the sole judge of legality.
pub fn is_plausible_destination(
    target: Coordinate,
    selection: Option<Coordinate>,
    board: &Board,
) -> bool {
    let Some(selected) = selection else {
        return false;
    };
    !board.is_occupied(target)
        && target.row_distance(selected) == 1
        && target.col_distance(selected) == 1
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
