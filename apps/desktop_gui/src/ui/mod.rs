//! UI layer for the desktop client: app shell and board widget.

pub mod app;
pub mod board;

pub use app::CheckersApp;
