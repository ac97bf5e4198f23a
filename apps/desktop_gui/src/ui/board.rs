//! Board widget: paints the 8x8 grid from the controller's view and reports
//! which square was clicked.

use client_core::InteractionController;
use eframe::egui;
use shared::domain::{Coordinate, Piece, Side, BOARD_SIZE};

pub const SQUARE_SIZE: f32 = 64.0;

const DARK_SQUARE: egui::Color32 = egui::Color32::from_rgb(55, 65, 81);
const LIGHT_SQUARE: egui::Color32 = egui::Color32::from_rgb(209, 213, 219);
const BOARD_BORDER: egui::Color32 = egui::Color32::from_rgb(55, 65, 81);
const SELECTED: egui::Color32 = egui::Color32::from_rgb(250, 204, 21);
const DESTINATION: egui::Color32 = egui::Color32::from_rgb(74, 222, 128);
const OPPONENT_TRAIL: egui::Color32 = egui::Color32::from_rgb(96, 165, 250);
const HUMAN_PIECE: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
const OPPONENT_PIECE: egui::Color32 = egui::Color32::from_rgb(17, 24, 39);
const KING_CROWN: egui::Color32 = egui::Color32::from_rgb(250, 204, 21);

/// Highlight drawn over a square, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareMark {
    Selected,
    Destination,
    OpponentMove,
}

impl SquareMark {
    fn stroke(self) -> egui::Stroke {
        match self {
            SquareMark::Selected => egui::Stroke::new(4.0, SELECTED),
            SquareMark::Destination => egui::Stroke::new(2.0, DESTINATION),
            SquareMark::OpponentMove => egui::Stroke::new(2.0, OPPONENT_TRAIL),
        }
    }
}

pub fn square_mark(controller: &InteractionController, coord: Coordinate) -> Option<SquareMark> {
    if controller.selection() == Some(coord) {
        Some(SquareMark::Selected)
    } else if controller.is_plausible_destination(coord) {
        Some(SquareMark::Destination)
    } else if controller
        .last_opponent_move()
        .is_some_and(|mv| mv.from == coord || mv.to == coord)
    {
        Some(SquareMark::OpponentMove)
    } else {
        None
    }
}

pub fn square_rect(board: egui::Rect, coord: Coordinate) -> egui::Rect {
    let min = board.min
        + egui::vec2(
            f32::from(coord.col()) * SQUARE_SIZE,
            f32::from(coord.row()) * SQUARE_SIZE,
        );
    egui::Rect::from_min_size(min, egui::vec2(SQUARE_SIZE, SQUARE_SIZE))
}

pub fn coordinate_at(board: egui::Rect, pos: egui::Pos2) -> Option<Coordinate> {
    if !board.contains(pos) {
        return None;
    }
    let col = ((pos.x - board.left()) / SQUARE_SIZE).floor() as i64;
    let row = ((pos.y - board.top()) / SQUARE_SIZE).floor() as i64;
    Coordinate::from_signed(row, col).ok()
}

/// Paints the board and returns the square clicked this frame, if any.
pub fn show_board(ui: &mut egui::Ui, controller: &InteractionController) -> Option<Coordinate> {
    let side = SQUARE_SIZE * BOARD_SIZE as f32;
    let (rect, response) = ui.allocate_exact_size(egui::vec2(side, side), egui::Sense::click());
    let painter = ui.painter_at(rect.expand(4.0));

    for coord in Coordinate::all() {
        let cell = square_rect(rect, coord);
        let fill = if coord.is_dark_square() {
            DARK_SQUARE
        } else {
            LIGHT_SQUARE
        };
        painter.rect_filled(cell, 0.0, fill);

        if let Some(piece) = controller
            .session()
            .and_then(|session| session.board.piece_at(coord))
        {
            paint_piece(&painter, cell, piece);
        }
        if let Some(mark) = square_mark(controller, coord) {
            painter.rect_stroke(cell, 0.0, mark.stroke(), egui::StrokeKind::Inside);
        }
    }
    painter.rect_stroke(
        rect,
        0.0,
        egui::Stroke::new(4.0, BOARD_BORDER),
        egui::StrokeKind::Outside,
    );

    if response.hovered() && !controller.is_in_flight() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    if response.clicked() {
        response
            .interact_pointer_pos()
            .and_then(|pos| coordinate_at(rect, pos))
    } else {
        None
    }
}

fn paint_piece(painter: &egui::Painter, cell: egui::Rect, piece: Piece) {
    let center = cell.center();
    let radius = SQUARE_SIZE * 0.375;
    let fill = match piece.owner {
        Side::Human => HUMAN_PIECE,
        Side::Opponent => OPPONENT_PIECE,
    };
    painter.circle_filled(center, radius, fill);
    if piece.is_king() {
        painter.circle_stroke(center, radius - 2.0, egui::Stroke::new(4.0, KING_CROWN));
        painter.circle_filled(center, radius * 0.3, KING_CROWN);
    }
}
