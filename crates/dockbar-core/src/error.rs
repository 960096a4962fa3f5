use crate::manager::Mode;
use dockbar_types::ButtonId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid state: {operation} not allowed while {mode}")]
    InvalidState {
        operation: &'static str,
        mode: Mode,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown button: {0}")]
    UnknownButton(ButtonId),

    #[error("Called from a thread without access to the bar")]
    WrongThread,
}

pub type Result<T> = std::result::Result<T, Error>;
