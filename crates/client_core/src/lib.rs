//! Client side of the checkers game: the interaction controller, the remote
//! service transport, and an async driver tying the two together.

pub mod client;
pub mod controller;
pub mod error;
pub mod settings;
pub mod transport;

pub use client::{ClientEvent, GameClient};
pub use controller::{is_plausible_destination, Command, InteractionController, InteractionState};
pub use error::SettingsError;
pub use settings::{load_settings, ClientSettings};
pub use transport::{GameTransport, HttpGameTransport, MoveOutcome};
