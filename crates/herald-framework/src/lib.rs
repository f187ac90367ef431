//! Declarative command registration and dispatch.
//!
//! Commands are plain async functions registered on a [`GroupBuilder`];
//! the [`Router`] matches incoming events against the resulting group
//! tree, binds typed arguments from the command line and interprets the
//! handler's return value as a reply.

pub mod args;
pub mod context;
pub mod error;
pub mod group;
pub mod handler;
mod help;
pub mod prefix;
pub mod router;

pub use args::{
    ArgKind, ArgSpec, CommandArg, CustomParse, ManualParse, ParseToken, RawArguments, Remaining,
    TokenCursor, Tokens,
};
pub use context::{BindContext, BotContext, ContextCell, Sanitizer};
pub use error::{ArgError, BoxError, DispatchError, SetupError};
pub use group::{CommandGroup, CommandSpec, GroupBuilder, GroupMeta};
pub use handler::{CommandHandler, CommandOutput, IntoResult, Outcome};
pub use prefix::{Prefix, StaticPrefix};
pub use router::{Router, RouterConfig, RouterService};
