//! Reply-target resolution.
//!
//! Every event payload that can be replied to exposes its own conversation
//! identifier through [`ReplySource`]. Composite payloads delegate to their
//! components with [`select_target`], which combines candidates in
//! declaration order and treats two distinct identifiers as an explicit
//! resolution error rather than silently preferring the first.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric identifier of a conversation (channel, room, chat) a reply
/// should be delivered to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TargetId(pub i64);

impl TargetId {
    /// The absent identifier.
    pub const ZERO: Self = Self(0);

    /// Returns `Some(self)` unless this is the zero identifier.
    pub fn non_zero(self) -> Option<Self> {
        (self.0 != 0).then_some(self)
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for TargetId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Errors from reply-target resolution.
///
/// Absence of a target is not an error; only genuine ambiguity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TargetError {
    /// Two components of a payload yielded distinct identifiers.
    #[error("ambiguous reply target: {first} and {second}")]
    Ambiguous {
        /// The identifier found first, in declaration order.
        first: TargetId,
        /// The conflicting identifier found later.
        second: TargetId,
    },
}

/// Capability of yielding a reply-target identifier.
///
/// Leaf payloads return their own identifier (or `Ok(None)` when they have
/// none). Composites delegate to each embedded payload in declaration
/// order via [`select_target`]; the result is the same no matter how deep
/// the identifier sits.
pub trait ReplySource: Send + Sync {
    /// The identifier of the conversation this payload belongs to.
    fn reply_target(&self) -> Result<Option<TargetId>, TargetError>;
}

/// Combines the reply targets of a payload's components.
///
/// Candidates are inspected in the order given. Returns the sole distinct
/// identifier found, `Ok(None)` when no component has one, and
/// [`TargetError::Ambiguous`] when two components disagree. Duplicate
/// occurrences of the same identifier are fine.
pub fn select_target<I>(parts: I) -> Result<Option<TargetId>, TargetError>
where
    I: IntoIterator<Item = Result<Option<TargetId>, TargetError>>,
{
    let mut found: Option<TargetId> = None;
    for part in parts {
        match (found, part?) {
            (None, Some(id)) => found = Some(id),
            (Some(first), Some(second)) if first != second => {
                return Err(TargetError::Ambiguous { first, second });
            }
            _ => {}
        }
    }
    Ok(found)
}
