//! Bridge between the egui thread and the tokio worker that talks to the game service.

pub mod commands;
pub mod runtime;
