//! A declarative command-dispatch engine for chat bots.
//!
//! Register plain async functions as named, type-checked commands on a
//! [`GroupBuilder`], hand the tree to a [`Router`], and feed it events:
//! the router matches message content against the command tree, binds
//! typed arguments, runs middleware and turns return values into replies.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use herald::{ContextCell, GroupBuilder, MessageCreated, Router, StaticPrefix};
//!
//! # fn replier() -> Arc<dyn herald::Replier> { unimplemented!() }
//! let commands = GroupBuilder::new("bot", ContextCell::new())
//!     .command("echo", |_msg: MessageCreated, words: Vec<String>| async move {
//!         words.join(" ")
//!     });
//! let router = Router::new(replier(), StaticPrefix::new("!"), commands).unwrap();
//! ```

pub use herald_core::{
    flags, BoxedEvent, CommandFlags, Event, MessageCreated, Reply, Replier, ReplySource, RichText,
    select_target, Segment, SendError, SendPayload, TargetError, TargetId, FLAG_SEPARATOR,
};
pub use herald_framework::{
    plain_arg, ArgError, ArgKind, ArgSpec, BindContext, BotContext, BoxError, CommandArg,
    CommandGroup, CommandHandler, CommandOutput, CommandSpec, ContextCell, CustomParse,
    DispatchError, GroupBuilder, GroupMeta, IntoResult, ManualParse, Outcome, ParseToken, Prefix,
    RawArguments, Remaining, Router, RouterConfig, RouterService, Sanitizer, SetupError,
    StaticPrefix, TokenCursor, Tokens,
};
