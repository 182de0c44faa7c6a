//! CLI error types.

use bb84_core::ControllerError;
use thiserror::Error;

/// Errors that end a CLI run or reject a command.
#[derive(Error, Debug)]
pub enum CliError {
    /// The engine failed.
    #[error("engine error: {0}")]
    Controller(#[from] ControllerError),

    /// Reading commands or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of input did not parse as a command.
    #[error("unknown command: {input:?} (try start, stop, reset, eve on, eve off, status, quit)")]
    UnknownCommand {
        /// The offending line, trimmed.
        input: String,
    },

    /// Every timer sender is gone while the session still needs ticks.
    #[error("timer channel closed")]
    TimerChannelClosed,
}

impl CliError {
    /// Whether the interactive loop must stop.
    ///
    /// A mistyped command is reported and the loop carries on.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Controller(e) => e.is_fatal(),
            Self::UnknownCommand { .. } => false,
            Self::Io(_) | Self::TimerChannelClosed => true,
        }
    }
}
