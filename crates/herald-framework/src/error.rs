//! Error types for registration and dispatch.
//!
//! Setup errors are fatal to registration: the builder latches the first
//! one and `Router::register` surfaces it without registering anything.
//! Dispatch errors are per-call and never touch the registered tables.

use herald_core::{SendError, TargetError};
use thiserror::Error;

/// Type-erased error carried out of handlers and middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Fatal registration-time errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// A second plumb command was registered on the same group.
    #[error("group '{group}' already has a plumb command")]
    DuplicatePlumb {
        /// The offending group's name.
        group: String,
    },
    /// Two commands were registered under the same name.
    #[error("duplicate command '{name}' in group '{group}'")]
    DuplicateCommand { group: String, name: String },
    /// Two subgroups were registered under the same name.
    #[error("duplicate subgroup '{name}' under group '{group}'")]
    DuplicateGroup { group: String, name: String },
    /// A custom, manual, raw or variadic argument was not the final one.
    #[error("command '{command}': trailing argument '{usage}' must be the last parameter")]
    TrailingArgument {
        /// The offending command's name.
        command: String,
        /// Usage string of the misplaced argument.
        usage: String,
    },
    /// A hidden command declared arguments; hidden entries run as event
    /// handlers and never see a command line.
    #[error("hidden command '{command}' must not declare arguments")]
    HiddenTakesArguments { command: String },
    /// A group was registered without a name.
    #[error("subgroup registered without a name")]
    UnnamedGroup,
}

/// Per-argument binding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    /// The command line ran out of tokens.
    #[error("missing argument: expected {usage}")]
    Missing {
        /// Usage string of the unbound argument.
        usage: String,
    },
    /// A token did not parse as the declared type.
    #[error("invalid {usage} {token:?}: {reason}")]
    Invalid {
        usage: String,
        token: String,
        reason: String,
    },
    /// A custom or manual parser rejected its input.
    #[error("{0}")]
    Parse(String),
}

/// Per-call dispatch failures, categorized.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No command under the attempted name.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    /// Argument-count shortfall or per-type parse failure.
    #[error(transparent)]
    Argument(#[from] ArgError),
    /// A middleware hook failed; nothing after it ran.
    #[error(transparent)]
    Middleware(BoxError),
    /// The handler itself returned an error.
    #[error(transparent)]
    Handler(BoxError),
    /// Reply-target resolution failed.
    #[error(transparent)]
    Target(#[from] TargetError),
    /// The reply collaborator failed to deliver.
    #[error(transparent)]
    Send(#[from] SendError),
}

impl DispatchError {
    /// True when this is the unknown-command case, which groups may be
    /// configured to suppress.
    pub fn is_unknown_command(&self) -> bool {
        matches!(self, DispatchError::UnknownCommand(_))
    }
}
