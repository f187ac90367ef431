//! The dispatcher: routes incoming events through the group tree.

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, trace, Instrument};

use herald_core::{BoxedEvent, MessageCreated, Replier, SendError};

use crate::args::TokenCursor;
use crate::context::BotContext;
use crate::error::{DispatchError, SetupError};
use crate::group::{CommandGroup, CommandSpec, GroupBuilder};
use crate::help;
use crate::prefix::Prefix;

/// Runtime knobs; all fields default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Underline argument usages in help output.
    pub help_underline: bool,
    /// Suppress the unknown-command error globally.
    pub quiet_unknown: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            help_underline: true,
            quiet_unknown: false,
        }
    }
}

/// The dispatch engine. Built once, then shared read-only across
/// arbitrarily many concurrent [`dispatch`](Router::dispatch) calls.
pub struct Router {
    ctx: Arc<BotContext>,
    prefix: Arc<dyn Prefix>,
    root: CommandGroup,
    config: RouterConfig,
}

impl Router {
    /// Builds the router from the root group. Registration-time
    /// validation errors surface here and nothing is registered.
    pub fn new(
        replier: Arc<dyn Replier>,
        prefix: impl Prefix + 'static,
        root: GroupBuilder,
    ) -> Result<Self, SetupError> {
        let ctx = Arc::new(BotContext::new(replier));
        let root = root.build()?;
        bind_tree(&ctx, &root);
        Ok(Self {
            ctx,
            prefix: Arc::new(prefix),
            root,
            config: RouterConfig::default(),
        })
    }

    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the outgoing-text sanitizer (identity by default).
    pub fn set_sanitizer(&self, sanitizer: impl Fn(&str) -> String + Send + Sync + 'static) {
        self.ctx.set_sanitizer(sanitizer);
    }

    /// Registers another top-level group under the root.
    pub fn register(&mut self, group: GroupBuilder) -> Result<(), SetupError> {
        let group = group.build()?;
        if self.root.find_subgroup(&group.name).is_some() {
            return Err(SetupError::DuplicateGroup {
                group: self.root.name.clone(),
                name: group.name,
            });
        }
        bind_tree(&self.ctx, &group);
        self.root.subgroups.push(group);
        Ok(())
    }

    /// Looks up a command by group and command name. An empty group name
    /// addresses the root; subgroups are searched depth-first.
    pub fn find_command(&self, group: &str, name: &str) -> Option<Arc<CommandSpec>> {
        let group = if group.is_empty() {
            Some(&self.root)
        } else {
            find_group(&self.root, group)
        };
        group?.match_command(name).cloned()
    }

    /// Renders help for every visible, non-admin command.
    pub fn help(&self) -> String {
        help::render(&self.root, &self.config, false)
    }

    /// Renders help including admin-only entries.
    pub fn help_admin(&self) -> String {
        help::render(&self.root, &self.config, true)
    }

    /// Routes one event: the event-handler pass over the whole tree,
    /// then the command pass for prefixed message events.
    pub async fn dispatch(&self, event: BoxedEvent) -> Result<(), DispatchError> {
        let span = debug_span!("dispatch", event = event.event_name());
        async {
            self.event_pass(&self.root, &event).await?;

            let Some(message) = event.downcast_ref::<MessageCreated>() else {
                return Ok(());
            };
            let Some(line) = self.prefix.strip(&message.content) else {
                trace!("no prefix match");
                return Ok(());
            };
            self.command_pass(&event, message, line).await
        }
        .instrument(span)
        .await
    }

    /// Wraps the router in a `tower::Service` adapter.
    pub fn into_service(self) -> RouterService {
        RouterService {
            router: Arc::new(self),
        }
    }

    fn event_pass<'a>(
        &'a self,
        group: &'a CommandGroup,
        event: &'a BoxedEvent,
    ) -> BoxFuture<'a, Result<(), DispatchError>> {
        Box::pin(async move {
            for entry in &group.events {
                if let Some(fut) = (entry.call)(event) {
                    trace!(group = %group.name, handler = %entry.name, event = entry.event, "event handler");
                    fut.await.map_err(DispatchError::Handler)?;
                }
            }
            for sub in &group.subgroups {
                self.event_pass(sub, event).await?;
            }
            Ok(())
        })
    }

    async fn command_pass(
        &self,
        event: &BoxedEvent,
        message: &MessageCreated,
        line: &str,
    ) -> Result<(), DispatchError> {
        // walk leading tokens down the subgroup tree
        let mut cursor = TokenCursor::new(line);
        let mut group = &self.root;
        let mut quiet = self.config.quiet_unknown || self.root.quiet_unknown;
        loop {
            let probe = cursor.clone();
            match cursor.next_token() {
                Some(token) => match group.find_subgroup(token) {
                    Some(sub) => {
                        group = sub;
                        quiet |= sub.quiet_unknown;
                    }
                    None => {
                        cursor = probe;
                        break;
                    }
                },
                None => break,
            }
        }

        for (index, hook) in group.middleware.iter().enumerate() {
            trace!(group = %group.name, index, "middleware");
            hook(event.clone()).await.map_err(DispatchError::Middleware)?;
        }

        let spec = if group.plumbed {
            group.commands.first()
        } else {
            match cursor.next_token() {
                Some(token) => match group.match_command(token) {
                    Some(spec) => Some(spec),
                    None if quiet => {
                        debug!(token, "unknown command suppressed");
                        return Ok(());
                    }
                    None => return Err(DispatchError::UnknownCommand(token.to_owned())),
                },
                // a bare prefix addresses nobody
                None => return Ok(()),
            }
        };
        let Some(spec) = spec else {
            return Ok(());
        };

        debug!(group = %group.name, command = %spec.name, "invoking");
        let outcome = (spec.call)(message.clone(), cursor.rest().to_owned()).await?;

        if let Some(reply) = outcome.reply {
            if !reply.is_empty() {
                match event.reply_target()? {
                    Some(target) => self.ctx.reply(target, reply).await?,
                    None => {
                        return Err(DispatchError::Send(SendError::NoTarget {
                            event: event.event_name(),
                        }));
                    }
                }
            }
        }
        match outcome.error {
            Some(err) => Err(DispatchError::Handler(err)),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn bind_tree(ctx: &Arc<BotContext>, group: &CommandGroup) {
    group.binder.bind(ctx.clone());
    for sub in &group.subgroups {
        bind_tree(ctx, sub);
    }
}

fn find_group<'a>(group: &'a CommandGroup, name: &str) -> Option<&'a CommandGroup> {
    for sub in &group.subgroups {
        if sub.name == name {
            return Some(sub);
        }
        if let Some(found) = find_group(sub, name) {
            return Some(found);
        }
    }
    None
}

/// `tower::Service` adapter over a shared [`Router`].
#[derive(Clone)]
pub struct RouterService {
    router: Arc<Router>,
}

impl RouterService {
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }
}

impl tower::Service<BoxedEvent> for RouterService {
    type Response = ();
    type Error = DispatchError;
    type Future = BoxFuture<'static, Result<(), DispatchError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: BoxedEvent) -> Self::Future {
        let router = self.router.clone();
        Box::pin(async move { router.dispatch(event).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_from_empty_json() {
        let config: RouterConfig = serde_json::from_str("{}").unwrap();
        assert!(config.help_underline);
        assert!(!config.quiet_unknown);
    }

    #[test]
    fn config_overrides() {
        let config: RouterConfig =
            serde_json::from_str(r#"{"quiet_unknown": true, "help_underline": false}"#).unwrap();
        assert!(!config.help_underline);
        assert!(config.quiet_unknown);
    }
}
