//! Event model.
//!
//! Events are type-erased behind [`BoxedEvent`] and downcast back to
//! concrete types where a handler declares one. The engine itself only
//! knows one concrete shape, [`MessageCreated`]; transports may define
//! arbitrarily many others by implementing [`Event`].

use std::any::Any;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::target::{ReplySource, TargetError, TargetId};

/// The base trait for all events.
///
/// Every event carries the reply-target capability so the dispatcher can
/// route a handler's reply without knowing the payload shape.
pub trait Event: ReplySource + Any + Send + Sync {
    /// Human-readable name of this event type.
    fn event_name(&self) -> &'static str;

    /// Reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// A type-erased, cheaply clonable event container.
#[derive(Clone)]
pub struct BoxedEvent {
    inner: Arc<dyn Event>,
}

impl BoxedEvent {
    /// Wraps a concrete event.
    pub fn new<E: Event + 'static>(event: E) -> Self {
        Self {
            inner: Arc::new(event),
        }
    }

    /// Attempts to downcast to a concrete event type.
    pub fn downcast_ref<E: Event + 'static>(&self) -> Option<&E> {
        self.inner.as_any().downcast_ref()
    }
}

impl std::ops::Deref for BoxedEvent {
    type Target = dyn Event;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl<E: Event + 'static> From<E> for BoxedEvent {
    fn from(event: E) -> Self {
        Self::new(event)
    }
}

impl std::fmt::Debug for BoxedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedEvent")
            .field("event_name", &self.event_name())
            .finish()
    }
}

/// The canonical "message received" event.
///
/// This is the only shape the command pass of the dispatcher consumes;
/// everything else flows through the event-handler tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageCreated {
    /// Conversation the message arrived in. Zero when unknown.
    pub channel_id: TargetId,
    /// Author of the message. Zero when unknown.
    pub author_id: TargetId,
    /// The raw textual content.
    pub content: String,
}

impl MessageCreated {
    /// Convenience constructor for a message with content only.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

impl ReplySource for MessageCreated {
    fn reply_target(&self) -> Result<Option<TargetId>, TargetError> {
        Ok(self.channel_id.non_zero())
    }
}

impl Event for MessageCreated {
    fn event_name(&self) -> &'static str {
        "message_created"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxed_event_downcast() {
        let event = BoxedEvent::new(MessageCreated::with_content("hi"));
        let msg = event.downcast_ref::<MessageCreated>().unwrap();
        assert_eq!(msg.content, "hi");
        assert_eq!(event.event_name(), "message_created");
    }

    #[test]
    fn message_reply_target() {
        let mut msg = MessageCreated::with_content("hi");
        assert_eq!(msg.reply_target(), Ok(None));

        msg.channel_id = TargetId(42);
        assert_eq!(msg.reply_target(), Ok(Some(TargetId(42))));
    }
}
