//! Board errors and the configurable way they are reported.

use chess::{FenError, PositionError};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("Invalid FEN: {0}")]
    InvalidFen(#[from] FenError),
    #[error("Invalid position: {0}")]
    InvalidPosition(#[from] PositionError),
    #[error("Invalid value passed to the {method} method: {value:?}")]
    InvalidMethodArgument { method: &'static str, value: String },
    #[error("Invalid value passed to config.position: {0}")]
    InvalidConfigPosition(#[source] Box<BoardError>),
}

impl BoardError {
    /// Numeric code shown in reported messages.
    pub fn code(&self) -> u16 {
        match self {
            Self::InvalidFen(_) | Self::InvalidPosition(_) => 6482,
            Self::InvalidMethodArgument { method, .. } => match *method {
                "move" => 2826,
                "orientation" => 5482,
                _ => 6482,
            },
            Self::InvalidConfigPosition(_) => 7263,
        }
    }

    pub(crate) fn argument(method: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidMethodArgument {
            method,
            value: value.into(),
        }
    }
}

pub type ErrorCallback = Arc<dyn Fn(u16, &BoardError) + Send + Sync>;

/// Where detected errors go. Invalid input is refused in every mode.
#[derive(Clone, Default)]
pub enum ErrorMode {
    /// `tracing::warn!`
    Console,
    /// `tracing::error!` plus a queued message for the host to display.
    Alert,
    Callback(ErrorCallback),
    #[default]
    Silent,
}

impl std::fmt::Debug for ErrorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Console => write!(f, "Console"),
            Self::Alert => write!(f, "Alert"),
            Self::Callback(_) => write!(f, "Callback(..)"),
            Self::Silent => write!(f, "Silent"),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ErrorReporter {
    mode: ErrorMode,
    alerts: Vec<String>,
}

impl ErrorReporter {
    pub(crate) fn new(mode: ErrorMode) -> Self {
        Self {
            mode,
            alerts: Vec::new(),
        }
    }

    pub(crate) fn report(&mut self, error: &BoardError) {
        let code = error.code();
        match &self.mode {
            ErrorMode::Console => {
                tracing::warn!(code, "Chessboard Error {}: {}", code, error);
            }
            ErrorMode::Alert => {
                tracing::error!(code, "Chessboard Error {}: {}", code, error);
                self.alerts
                    .push(format!("Chessboard Error {}: {}", code, error));
            }
            ErrorMode::Callback(callback) => callback(code, error),
            ErrorMode::Silent => {}
        }
    }

    pub(crate) fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }
}
