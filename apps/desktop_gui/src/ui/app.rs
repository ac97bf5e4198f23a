//! App shell: owns the interaction controller on the UI thread, drains backend
//! results each frame, and renders status, win record, board and controls.

use client_core::{Command, InteractionController};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::Coordinate;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::board;

const WINS_COLOR: egui::Color32 = egui::Color32::from_rgb(74, 222, 128);
const LOSSES_COLOR: egui::Color32 = egui::Color32::from_rgb(248, 113, 113);
const DRAWS_COLOR: egui::Color32 = egui::Color32::from_rgb(250, 204, 21);

pub struct CheckersApp {
    controller: InteractionController,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    server_url: String,
    status_banner: Option<UiError>,
}

impl CheckersApp {
    /// Queues the startup game and tally requests immediately.
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        server_url: String,
    ) -> Self {
        let mut app = Self {
            controller: InteractionController::new(),
            cmd_tx,
            ui_rx,
            server_url,
            status_banner: None,
        };
        for command in app.controller.startup() {
            app.dispatch(command);
        }
        app
    }

    pub fn click(&mut self, coord: Coordinate) {
        if let Some(command) = self.controller.click(coord) {
            self.dispatch(command);
        }
    }

    pub fn new_game(&mut self) {
        if let Some(command) = self.controller.request_new_game() {
            self.dispatch(command);
        }
    }

    pub fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn dispatch(&mut self, command: Command) {
        if let Err(event) = dispatch_backend_command(&self.cmd_tx, command) {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: UiEvent) {
        let context = event.context();
        match event {
            UiEvent::NewGameLoaded(result) => {
                let succeeded = self.note_outcome(context, &result);
                self.controller.complete_new_game(result);
                if succeeded {
                    self.status_banner = None;
                }
            }
            UiEvent::MoveApplied(result) => {
                let succeeded = self.note_outcome(context, &result);
                let follow_up = self.controller.complete_move(result);
                if succeeded {
                    self.status_banner = None;
                }
                if let Some(command) = follow_up {
                    self.dispatch(command);
                }
            }
            UiEvent::TallyLoaded(result) => {
                self.note_outcome(context, &result);
                self.controller.complete_tally(result);
            }
            UiEvent::BackendUnavailable(err) => {
                tracing::error!(message = err.message(), "backend unavailable");
                self.status_banner = Some(err);
            }
        }
    }

    fn note_outcome<T>(&mut self, context: UiErrorContext, result: &anyhow::Result<T>) -> bool {
        match result {
            Ok(_) => true,
            Err(err) => {
                let err = UiError::from_message(context, format!("{err:#}"));
                tracing::warn!(
                    category = ?err.category(),
                    context = ?err.context(),
                    "{}",
                    err.message()
                );
                self.status_banner = Some(err);
                false
            }
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.status_banner.clone() else {
            return;
        };
        egui::Frame::NONE
            .fill(egui::Color32::from_rgb(111, 53, 53))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.vertical(|ui| {
                        ui.label(
                            egui::RichText::new(banner.headline())
                                .strong()
                                .color(egui::Color32::WHITE),
                        );
                        ui.label(
                            egui::RichText::new(banner.message())
                                .small()
                                .color(egui::Color32::from_rgb(230, 200, 200)),
                        );
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.status_banner = None;
                        }
                    });
                });
            });
        ui.add_space(8.0);
    }

    fn show_win_record(&self, ui: &mut egui::Ui) {
        let tally = self.controller.tally();
        ui.columns(3, |columns| {
            for (column, (count, label, color)) in columns.iter_mut().zip([
                (tally.wins, "Wins", WINS_COLOR),
                (tally.losses, "Losses", LOSSES_COLOR),
                (tally.draws, "Draws", DRAWS_COLOR),
            ]) {
                column.vertical_centered(|ui| {
                    let value = if self.controller.tally_loaded() {
                        count.to_string()
                    } else {
                        "-".to_string()
                    };
                    ui.label(egui::RichText::new(value).size(24.0).strong().color(color));
                    ui.label(egui::RichText::new(label).small().weak());
                });
            }
        });
    }

    fn show_turn_status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(self.controller.status_line()).size(20.0).strong());
            if self.controller.is_in_flight() {
                ui.add(egui::Spinner::new());
            }
        });
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let busy = self.controller.is_in_flight();
            if ui
                .add_enabled(!busy, egui::Button::new(egui::RichText::new("New Game").strong()))
                .clicked()
            {
                self.new_game();
            }
        });
        ui.small(egui::RichText::new(format!("Game service: {}", self.server_url)).weak());
    }
}

impl eframe::App for CheckersApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::top("win_record")
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                self.show_win_record(ui);
                ui.add_space(6.0);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            ui.vertical_centered(|ui| {
                self.show_turn_status(ui);
                ui.add_space(8.0);
                if let Some(coord) = board::show_board(ui, &self.controller) {
                    self.click(coord);
                }
                ui.add_space(12.0);
                self.show_controls(ui);
            });
        });

        if self.controller.is_in_flight() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CheckersApp;
    use crate::backend_bridge::commands::BackendCommand;
    use crate::controller::events::{UiErrorCategory, UiErrorContext, UiEvent};
    use anyhow::anyhow;
    use client_core::MoveOutcome;
    use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
    use shared::domain::{Board, Coordinate, Move, Piece, Session, Side, Tally};

    fn coord(row: u8, col: u8) -> Coordinate {
        Coordinate::new(row, col).expect("coordinate")
    }

    fn session(current_turn: Side, game_over: bool, winner: Option<Side>) -> Session {
        Session {
            board: Board::empty().with_piece(coord(2, 1), Piece::regular(Side::Human)),
            current_turn,
            game_over,
            winner,
        }
    }

    fn app() -> (CheckersApp, Receiver<BackendCommand>, Sender<UiEvent>) {
        let (cmd_tx, cmd_rx) = bounded(16);
        let (ui_tx, ui_rx) = unbounded();
        let app = CheckersApp::new(cmd_tx, ui_rx, "http://localhost:8080/api".to_string());
        (app, cmd_rx, ui_tx)
    }

    fn loaded_app() -> (CheckersApp, Receiver<BackendCommand>, Sender<UiEvent>) {
        let (mut app, cmd_rx, ui_tx) = app();
        let _: Vec<BackendCommand> = cmd_rx.try_iter().collect();
        ui_tx
            .send(UiEvent::NewGameLoaded(Ok(session(Side::Human, false, None))))
            .expect("event");
        ui_tx
            .send(UiEvent::TallyLoaded(Ok(Tally::default())))
            .expect("event");
        app.process_ui_events();
        (app, cmd_rx, ui_tx)
    }

    #[test]
    fn startup_queues_new_game_and_tally() {
        let (app, cmd_rx, _ui_tx) = app();
        let queued: Vec<BackendCommand> = cmd_rx.try_iter().collect();
        assert_eq!(
            queued,
            vec![BackendCommand::NewGame, BackendCommand::RefreshTally]
        );
        assert!(app.controller.is_in_flight());
        assert_eq!(app.controller.status_line(), "Loading...");
    }

    #[test]
    fn two_clicks_queue_a_move_and_block_further_input() {
        let (mut app, cmd_rx, _ui_tx) = loaded_app();
        app.click(coord(2, 1));
        app.click(coord(3, 2));

        let mv = Move {
            from: coord(2, 1),
            to: coord(3, 2),
        };
        assert_eq!(cmd_rx.try_recv().ok(), Some(BackendCommand::MakeMove(mv)));

        app.click(coord(2, 1));
        app.new_game();
        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(app.controller.status_line(), "Your Turn (Processing...)");
    }

    #[test]
    fn game_over_move_queues_tally_refresh() {
        let (mut app, cmd_rx, ui_tx) = loaded_app();
        app.click(coord(2, 1));
        app.click(coord(3, 2));
        let _ = cmd_rx.try_recv();

        ui_tx
            .send(UiEvent::MoveApplied(Ok(MoveOutcome {
                session: session(Side::Human, true, Some(Side::Opponent)),
                opponent_move: None,
            })))
            .expect("event");
        app.process_ui_events();

        assert_eq!(cmd_rx.try_recv().ok(), Some(BackendCommand::RefreshTally));
        assert_eq!(app.controller.status_line(), "Game Over! Bot Wins!");
    }

    #[test]
    fn new_game_after_game_over_does_not_refetch_tally() {
        let (mut app, cmd_rx, ui_tx) = loaded_app();
        app.click(coord(2, 1));
        app.click(coord(3, 2));
        ui_tx
            .send(UiEvent::MoveApplied(Ok(MoveOutcome {
                session: session(Side::Human, true, None),
                opponent_move: None,
            })))
            .expect("event");
        app.process_ui_events();
        ui_tx
            .send(UiEvent::TallyLoaded(Ok(Tally::default())))
            .expect("event");
        app.process_ui_events();
        let _: Vec<BackendCommand> = cmd_rx.try_iter().collect();

        app.new_game();
        let queued: Vec<BackendCommand> = cmd_rx.try_iter().collect();
        assert_eq!(queued, vec![BackendCommand::NewGame]);
    }

    #[test]
    fn failed_move_shows_banner_and_releases_input() {
        let (mut app, cmd_rx, ui_tx) = loaded_app();
        app.click(coord(2, 1));
        app.click(coord(3, 2));
        let _ = cmd_rx.try_recv();

        ui_tx
            .send(UiEvent::MoveApplied(Err(anyhow!(
                "make-move endpoint returned error: HTTP status client error (400 Bad Request)"
            ))))
            .expect("event");
        app.process_ui_events();

        let banner = app.status_banner.as_ref().expect("banner");
        assert_eq!(banner.context(), UiErrorContext::Move);
        assert_eq!(banner.category(), UiErrorCategory::Rejected);
        assert!(!app.controller.is_in_flight());
        assert_eq!(app.controller.selection(), None);
        assert_eq!(app.controller.session(), Some(&session(Side::Human, false, None)));

        app.click(coord(2, 1));
        assert_eq!(app.controller.selection(), Some(coord(2, 1)));
    }

    #[test]
    fn disconnected_backend_does_not_wedge_the_controller() {
        let (cmd_tx, cmd_rx) = bounded(16);
        let (_ui_tx, ui_rx) = unbounded::<UiEvent>();
        drop(cmd_rx);

        let app = CheckersApp::new(cmd_tx, ui_rx, "http://localhost:8080/api".to_string());
        assert!(!app.controller.is_in_flight());
        assert_eq!(
            app.status_banner.as_ref().map(|banner| banner.category()),
            Some(UiErrorCategory::Transport)
        );
    }
}
