//! # herald-core
//!
//! Foundation types for the herald command-dispatch engine:
//!
//! - [`event`] — the [`Event`] trait, type-erased [`BoxedEvent`], and the
//!   canonical [`MessageCreated`] shape
//! - [`message`] — the outgoing [`Reply`] model and the [`Replier`] seam
//! - [`target`] — the [`ReplySource`] reply-target capability
//! - [`flags`] — [`CommandFlags`] and the pure name codec
//!
//! The dispatch engine itself lives in `herald-framework`.

pub mod event;
pub mod flags;
pub mod message;
pub mod target;

pub use event::{BoxedEvent, Event, MessageCreated};
pub use flags::{CommandFlags, FLAG_SEPARATOR};
pub use message::{Reply, Replier, RichText, Segment, SendError, SendPayload};
pub use target::{ReplySource, TargetError, TargetId, select_target};
