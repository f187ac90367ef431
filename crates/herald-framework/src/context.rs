//! Shared bot context handed to every registered group.
//!
//! Groups are built before the router exists, so each one carries a
//! [`BindContext`] binder; registration fills it in with the live
//! [`BotContext`] exactly once.

use std::sync::Arc;

use parking_lot::RwLock;

use herald_core::{Reply, Replier, SendError, TargetId};

/// Hook applied to outgoing plain text before delivery.
pub type Sanitizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The live dispatch context: reply collaborator plus the text sanitizer.
pub struct BotContext {
    replier: Arc<dyn Replier>,
    sanitizer: RwLock<Sanitizer>,
}

impl BotContext {
    pub fn new(replier: Arc<dyn Replier>) -> Self {
        Self {
            replier,
            sanitizer: RwLock::new(Arc::new(|text: &str| text.to_owned())),
        }
    }

    /// Replaces the outgoing-text sanitizer. The default is identity.
    pub fn set_sanitizer(&self, sanitizer: impl Fn(&str) -> String + Send + Sync + 'static) {
        *self.sanitizer.write() = Arc::new(sanitizer);
    }

    pub fn sanitize(&self, text: &str) -> String {
        (self.sanitizer.read())(text)
    }

    /// Sends `reply` to `target`, sanitizing its plain text content first.
    /// Rich segments pass through untouched.
    pub async fn reply(&self, target: TargetId, reply: Reply) -> Result<(), SendError> {
        let reply = match reply {
            Reply::Text(text) => Reply::Text(self.sanitize(&text)),
            Reply::Payload(mut payload) => {
                payload.content = self.sanitize(&payload.content);
                Reply::Payload(payload)
            }
            rich => rich,
        };
        self.replier.send(target, reply).await
    }
}

impl std::fmt::Debug for BotContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotContext").finish_non_exhaustive()
    }
}

/// Receiver of the shared context back-reference.
///
/// Handler closures that need the context capture an [`ContextCell`] clone
/// at build time; registration binds the cell before any dispatch runs.
pub trait BindContext: Send + Sync {
    fn bind(&self, ctx: Arc<BotContext>);
}

/// The stock [`BindContext`] implementation: a late-bound slot.
#[derive(Default)]
pub struct ContextCell {
    slot: RwLock<Option<Arc<BotContext>>>,
}

impl ContextCell {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The bound context, or `None` before registration.
    pub fn get(&self) -> Option<Arc<BotContext>> {
        self.slot.read().clone()
    }
}

impl BindContext for ContextCell {
    fn bind(&self, ctx: Arc<BotContext>) {
        *self.slot.write() = Some(ctx);
    }
}

impl std::fmt::Debug for ContextCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextCell")
            .field("bound", &self.slot.read().is_some())
            .finish()
    }
}
