//! Backend results delivered to the UI thread, plus UI-facing error modeling.

use client_core::MoveOutcome;
use shared::domain::{Session, Tally};

use crate::backend_bridge::commands::BackendCommand;

pub enum UiEvent {
    NewGameLoaded(anyhow::Result<Session>),
    MoveApplied(anyhow::Result<MoveOutcome>),
    TallyLoaded(anyhow::Result<Tally>),
    BackendUnavailable(UiError),
}

impl UiEvent {
    /// The failed result a command would have produced had it reached the
    /// service.
    pub fn failed(cmd: BackendCommand, err: anyhow::Error) -> Self {
        match cmd {
            BackendCommand::NewGame => UiEvent::NewGameLoaded(Err(err)),
            BackendCommand::MakeMove(_) => UiEvent::MoveApplied(Err(err)),
            BackendCommand::RefreshTally => UiEvent::TallyLoaded(Err(err)),
        }
    }

    pub fn context(&self) -> UiErrorContext {
        match self {
            UiEvent::NewGameLoaded(_) => UiErrorContext::NewGame,
            UiEvent::MoveApplied(_) => UiErrorContext::Move,
            UiEvent::TallyLoaded(_) => UiErrorContext::Tally,
            UiEvent::BackendUnavailable(err) => err.context(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Rejected,
    Protocol,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    NewGame,
    Move,
    Tally,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("response payload")
            || lower.contains("decode")
            || lower.contains("board must have")
            || lower.contains("board row")
            || lower.contains("unknown")
        {
            UiErrorCategory::Protocol
        } else if lower.contains("status client error") {
            UiErrorCategory::Rejected
        } else if lower.contains("failed to reach")
            || lower.contains("returned error")
            || lower.contains("connection")
            || lower.contains("timed out")
            || lower.contains("dns")
            || lower.contains("disconnected")
            || lower.contains("queue is full")
            || lower.contains("startup failure")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn headline(&self) -> String {
        let action = match self.context {
            UiErrorContext::BackendStartup => "Backend worker failed to start",
            UiErrorContext::NewGame => "Could not start a new game",
            UiErrorContext::Move => "Move was not applied",
            UiErrorContext::Tally => "Could not refresh the win record",
        };
        let cause = match self.category {
            UiErrorCategory::Transport => "game service unreachable",
            UiErrorCategory::Rejected => "request rejected by the game service",
            UiErrorCategory::Protocol => "unexpected response from the game service",
            UiErrorCategory::Unknown => "unexpected error",
        };
        format!("{action}: {cause}")
    }
}
