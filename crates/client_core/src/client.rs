use std::sync::Arc;

use futures::future::join_all;
use shared::domain::{Coordinate, Session, Tally};
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use crate::{
    controller::{Command, InteractionController},
    transport::GameTransport,
};

#[derive(Debug, Clone)]
pub enum ClientEvent {
    SessionReplaced(Session),
    SelectionChanged(Option<Coordinate>),
    TallyUpdated(Tally),
    BusyChanged(bool),
    Error(String),
}

/// Async driver around [`InteractionController`]. The controller lock is
/// released before every transport call, so input arriving while a request is
/// outstanding reaches the controller, sees the in-flight flag, and is dropped.
pub struct GameClient<T: GameTransport + 'static> {
    transport: Arc<T>,
    controller: Mutex<InteractionController>,
    events: broadcast::Sender<ClientEvent>,
}

struct Observed {
    generation: u64,
    selection: Option<Coordinate>,
    tally: Tally,
    busy: bool,
}

impl Observed {
    fn of(controller: &InteractionController) -> Self {
        Self {
            generation: controller.session_generation(),
            selection: controller.selection(),
            tally: controller.tally(),
            busy: controller.is_in_flight(),
        }
    }
}

impl<T: GameTransport + 'static> GameClient<T> {
    pub fn new(transport: T) -> Arc<Self> {
        Self::with_transport(Arc::new(transport))
    }

    pub fn with_transport(transport: Arc<T>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            transport,
            controller: Mutex::new(InteractionController::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> InteractionController {
        self.controller.lock().await.clone()
    }

    /// Loads the first game and the tally concurrently.
    pub async fn start(&self) {
        let commands = self.update(|controller| controller.startup()).await;
        join_all(commands.into_iter().map(|command| self.run(command))).await;
    }

    /// Returns false when the request was ignored because another one is
    /// still in flight.
    pub async fn new_game(&self) -> bool {
        match self
            .update(|controller| controller.request_new_game())
            .await
        {
            Some(command) => {
                self.run(command).await;
                true
            }
            None => false,
        }
    }

    pub async fn click(&self, coord: Coordinate) {
        if let Some(command) = self.update(|controller| controller.click(coord)).await {
            self.run(command).await;
        }
    }

    async fn run(&self, command: Command) {
        let mut next = Some(command);
        while let Some(command) = next.take() {
            next = self.execute(command).await;
        }
    }

    async fn execute(&self, command: Command) -> Option<Command> {
        debug!(?command, "executing remote command");
        match command {
            Command::CreateGame => {
                let result = self.transport.create_game().await;
                self.report_failure(&result);
                self.update(|controller| controller.complete_new_game(result))
                    .await;
                None
            }
            Command::SubmitMove(mv) => {
                let result = self.transport.make_move(mv).await;
                self.report_failure(&result);
                self.update(|controller| controller.complete_move(result))
                    .await
            }
            Command::RefreshTally => {
                let result = self.transport.win_record().await;
                self.report_failure(&result);
                self.update(|controller| controller.complete_tally(result))
                    .await;
                None
            }
        }
    }

    fn report_failure<R>(&self, result: &anyhow::Result<R>) {
        if let Err(err) = result {
            let _ = self.events.send(ClientEvent::Error(format!("{err:#}")));
        }
    }

    async fn update<R>(&self, apply: impl FnOnce(&mut InteractionController) -> R) -> R {
        let mut controller = self.controller.lock().await;
        let before = Observed::of(&controller);
        let output = apply(&mut controller);
        let after = Observed::of(&controller);
        let replaced = if after.generation != before.generation {
            controller.session().cloned()
        } else {
            None
        };
        drop(controller);

        if after.busy != before.busy {
            let _ = self.events.send(ClientEvent::BusyChanged(after.busy));
        }
        if let Some(session) = replaced {
            let _ = self.events.send(ClientEvent::SessionReplaced(session));
        }
        if after.selection != before.selection {
            let _ = self
                .events
                .send(ClientEvent::SelectionChanged(after.selection));
        }
        if after.tally != before.tally {
            let _ = self.events.send(ClientEvent::TallyUpdated(after.tally));
        }
        output
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
