//! Prefix recognition seam.
//!
//! The router never tokenizes prefixes itself; a [`Prefix`] collaborator
//! decides whether a message addresses the bot and hands back the command
//! line that follows.

/// Decides whether `content` addresses the bot.
///
/// Returns the command line after the prefix, or `None` when the message
/// is not addressed to the bot. Closures of the matching shape implement
/// this directly.
pub trait Prefix: Send + Sync {
    fn strip<'a>(&self, content: &'a str) -> Option<&'a str>;
}

impl<F> Prefix for F
where
    F: for<'a> Fn(&'a str) -> Option<&'a str> + Send + Sync,
{
    fn strip<'a>(&self, content: &'a str) -> Option<&'a str> {
        self(content)
    }
}

/// A fixed leading string, e.g. `"!"` or `"bot, "`.
#[derive(Debug, Clone)]
pub struct StaticPrefix {
    prefix: String,
}

impl StaticPrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Prefix for StaticPrefix {
    fn strip<'a>(&self, content: &'a str) -> Option<&'a str> {
        content.strip_prefix(self.prefix.as_str())
    }
}
