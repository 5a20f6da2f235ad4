//! Client core for the YOLO stock trading game: HTTP gateway, session state, screen
//! transitions and the command dispatcher that ties them together. Front ends only submit
//! [`GameCommand`]s and render the [`ControllerEvent`]s they get back.

pub mod controller;
pub mod error;
pub mod gateway;
pub mod headline;
pub mod link;
pub mod screen;
pub mod session;
pub mod transition;
pub mod validation;

pub use controller::{
    spawn_controller, AmountTarget, ControllerEvent, ControllerHandle, GameCommand,
    GameController, Outcome, ViewState, DEFAULT_QUEUE_CAPACITY,
};
pub use error::ClientError;
pub use gateway::{GameApi, GatewaySetupError, HttpGameApi, Operation, DEFAULT_REQUEST_TIMEOUT};
pub use headline::{spawn_headline_refresh, DEFAULT_HEADLINE_PERIOD};
pub use screen::{GameOverSummary, MenuItem, Screen};
pub use session::Session;

#[cfg(test)]
#[path = "tests/fixtures.rs"]
mod fixtures;
