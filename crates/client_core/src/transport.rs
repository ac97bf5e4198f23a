use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Move, Session, Tally},
    protocol::{
        GameStateWire, MakeMoveRequest, MakeMoveResponse, WinRecord, MAKE_MOVE_ROUTE,
        NEW_GAME_ROUTE, WIN_RECORD_ROUTE,
    },
};
use tracing::debug;

use crate::settings::{normalize_server_url, ClientSettings};

/// Result of a submitted move: the service's new authoritative session plus
/// the opponent's reply, when the service reports one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub session: Session,
    pub opponent_move: Option<Move>,
}

impl From<MakeMoveResponse> for MoveOutcome {
    fn from(response: MakeMoveResponse) -> Self {
        Self {
            session: response.game_state.into(),
            opponent_move: response.bot_move,
        }
    }
}

#[async_trait]
pub trait GameTransport: Send + Sync {
    async fn create_game(&self) -> Result<Session>;
    async fn make_move(&self, mv: Move) -> Result<MoveOutcome>;
    async fn win_record(&self) -> Result<Tally>;
}

/// JSON-over-HTTP transport. No request timeout is configured: a request that
/// never resolves keeps the controller gated until it does.
pub struct HttpGameTransport {
    http: Client,
    server_url: String,
}

impl HttpGameTransport {
    pub fn new(server_url: &str) -> Result<Self> {
        let server_url = normalize_server_url(server_url)?;
        Ok(Self {
            http: Client::new(),
            server_url,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Self::new(&settings.server_url)
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}{route}", self.server_url)
    }
}

#[async_trait]
impl GameTransport for HttpGameTransport {
    async fn create_game(&self) -> Result<Session> {
        let url = self.endpoint(NEW_GAME_ROUTE);
        debug!(%url, "POST new game");
        let state: GameStateWire = self
            .http
            .post(&url)
            .send()
            .await
            .context("failed to reach new-game endpoint")?
            .error_for_status()
            .context("new-game endpoint returned error")?
            .json()
            .await
            .context("invalid new-game response payload")?;
        Ok(state.into())
    }

    async fn make_move(&self, mv: Move) -> Result<MoveOutcome> {
        let url = self.endpoint(MAKE_MOVE_ROUTE);
        debug!(%url, %mv, "POST make move");
        let response: MakeMoveResponse = self
            .http
            .post(&url)
            .json(&MakeMoveRequest { mv })
            .send()
            .await
            .context("failed to reach make-move endpoint")?
            .error_for_status()
            .context("make-move endpoint returned error")?
            .json()
            .await
            .context("invalid make-move response payload")?;
        Ok(response.into())
    }

    async fn win_record(&self) -> Result<Tally> {
        let url = self.endpoint(WIN_RECORD_ROUTE);
        debug!(%url, "GET win record");
        let record: WinRecord = self
            .http
            .get(&url)
            .send()
            .await
            .context("failed to reach win-record endpoint")?
            .error_for_status()
            .context("win-record endpoint returned error")?
            .json()
            .await
            .context("invalid win-record response payload")?;
        Ok(record.into())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
