//! Command groups and their declarative builder.
//!
//! A [`GroupBuilder`] collects descriptors for commands, event handlers,
//! middleware and nested subgroups, validates each entry as it arrives,
//! and produces an immutable [`CommandGroup`] when handed to the router.
//! Validation errors latch: the first one is kept and surfaced at
//! registration, and nothing is registered partially.

use std::any::type_name;
use std::sync::Arc;

use herald_core::{flags::lower_first, CommandFlags, Event};

use crate::args::ArgSpec;
use crate::context::BindContext;
use crate::error::SetupError;
use crate::handler::{
    into_command, into_event_handler, into_hidden_handler, into_middleware, BoxedCommand,
    BoxedEventHandler, BoxedMiddleware, CommandHandler, IntoResult,
};

/// One registered command: name, metadata and the erased invoke closure.
pub struct CommandSpec {
    /// Cleaned name; empty for the plumb entry.
    pub name: String,
    pub description: String,
    pub flags: CommandFlags,
    /// True when the final argument absorbs every remaining token.
    pub variadic: bool,
    pub args: Vec<ArgSpec>,
    pub(crate) call: BoxedCommand,
}

impl CommandSpec {
    /// True for the nameless fallback entry.
    pub fn is_plumb(&self) -> bool {
        self.flags.contains(CommandFlags::PLUMB)
    }
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// One registered event handler.
pub(crate) struct EventEntry {
    /// Registration label, for logs and lookup.
    pub name: String,
    /// Declared event type.
    pub event: &'static str,
    pub flags: CommandFlags,
    pub call: BoxedEventHandler,
}

/// A finalized, immutable group of commands.
pub struct CommandGroup {
    pub name: String,
    pub description: String,
    pub flags: CommandFlags,
    pub(crate) commands: Vec<Arc<CommandSpec>>,
    pub(crate) events: Vec<EventEntry>,
    pub(crate) middleware: Vec<BoxedMiddleware>,
    pub(crate) subgroups: Vec<CommandGroup>,
    pub(crate) plumbed: bool,
    pub(crate) quiet_unknown: bool,
    pub(crate) binder: Arc<dyn BindContext>,
}

impl CommandGroup {
    /// The registered commands, plumb entry included.
    pub fn commands(&self) -> impl Iterator<Item = &Arc<CommandSpec>> {
        self.commands.iter()
    }

    pub fn subgroups(&self) -> impl Iterator<Item = &CommandGroup> {
        self.subgroups.iter()
    }

    /// Looks up a command by its cleaned name, falling back to a match
    /// with the first character lowercased unless the entry is raw-named.
    pub(crate) fn match_command(&self, token: &str) -> Option<&Arc<CommandSpec>> {
        if let Some(spec) = self
            .commands
            .iter()
            .find(|c| !c.is_plumb() && c.name == token)
        {
            return Some(spec);
        }
        let folded = lower_first(token);
        self.commands.iter().find(|c| {
            !c.is_plumb() && !c.flags.contains(CommandFlags::RAW) && c.name == folded
        })
    }

    pub(crate) fn find_subgroup(&self, name: &str) -> Option<&CommandGroup> {
        self.subgroups.iter().find(|g| g.name == name)
    }
}

impl std::fmt::Debug for CommandGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandGroup")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("commands", &self.commands)
            .field("subgroups", &self.subgroups)
            .finish_non_exhaustive()
    }
}

/// Mutable view handed to the setup hook. Tables are out of reach.
#[derive(Debug)]
pub struct GroupMeta {
    pub name: String,
    pub description: String,
}

type SetupHook = Box<dyn FnOnce(&mut GroupMeta) + Send>;

/// Declarative builder for a [`CommandGroup`].
pub struct GroupBuilder {
    name: String,
    description: String,
    flags: CommandFlags,
    commands: Vec<CommandSpec>,
    events: Vec<EventEntry>,
    middleware: Vec<BoxedMiddleware>,
    subgroups: Vec<GroupBuilder>,
    plumbed: bool,
    quiet_unknown: bool,
    binder: Arc<dyn BindContext>,
    setup: Option<SetupHook>,
    error: Option<SetupError>,
}

impl GroupBuilder {
    /// Starts a group. `binder` receives the shared context at
    /// registration; without one there is no way to build a group.
    pub fn new(name: impl Into<String>, binder: Arc<dyn BindContext>) -> Self {
        let name = name.into();
        let error = name.is_empty().then_some(SetupError::UnnamedGroup);
        Self {
            name,
            description: String::new(),
            flags: CommandFlags::NONE,
            commands: Vec::new(),
            events: Vec::new(),
            middleware: Vec::new(),
            subgroups: Vec::new(),
            plumbed: false,
            quiet_unknown: false,
            binder,
            setup: None,
            error,
        }
    }

    /// Sets the group description shown in help output.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Unions `flags` into the group flags; every command inherits them
    /// at build time.
    pub fn flags(mut self, flags: CommandFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Suppresses the unknown-command error for this group and its
    /// descendants.
    pub fn quiet_unknown(mut self) -> Self {
        self.quiet_unknown = true;
        self
    }

    /// Registers a command under `name`. Marker characters before the
    /// `ー` separator still derive flags, same as an explicit
    /// [`command_with`](Self::command_with) call.
    pub fn command<H, T>(self, name: impl Into<String>, handler: H) -> Self
    where
        H: CommandHandler<T>,
        T: 'static,
    {
        self.command_with(name, CommandFlags::NONE, handler)
    }

    /// Registers a command with explicit flags, unioned with any the
    /// name's marker prefix derives.
    pub fn command_with<H, T>(
        mut self,
        name: impl Into<String>,
        flags: CommandFlags,
        handler: H,
    ) -> Self
    where
        H: CommandHandler<T>,
        T: 'static,
    {
        if self.error.is_some() || self.plumbed {
            return self;
        }
        let (derived, cleaned) = CommandFlags::derive(&name.into());
        let flags = flags | derived;
        if flags.contains(CommandFlags::PLUMB) {
            return self.install_plumb(flags, handler);
        }

        let args = H::arg_specs();
        if let Some(err) = validate_args(&cleaned, &args) {
            self.error = Some(err);
            return self;
        }
        if flags.contains(CommandFlags::HIDDEN) {
            if !args.is_empty() {
                self.error = Some(SetupError::HiddenTakesArguments { command: cleaned });
                return self;
            }
            self.events.push(EventEntry {
                name: cleaned,
                event: type_name::<herald_core::MessageCreated>(),
                flags,
                call: into_hidden_handler(handler),
            });
            return self;
        }
        if self.commands.iter().any(|c| c.name == cleaned) {
            self.error = Some(SetupError::DuplicateCommand {
                group: self.name.clone(),
                name: cleaned,
            });
            return self;
        }

        let variadic = args.last().is_some_and(ArgSpec::is_trailing);
        self.commands.push(CommandSpec {
            name: cleaned,
            description: String::new(),
            flags,
            variadic,
            args,
            call: into_command(handler),
        });
        self
    }

    /// Sets the description of the most recently registered command.
    pub fn describe(mut self, text: impl Into<String>) -> Self {
        if let Some(last) = self.commands.last_mut() {
            last.description = text.into();
        }
        self
    }

    /// Installs the sole nameless fallback command. Every already
    /// registered command is dropped and later `command` calls are
    /// ignored. A second plumb is an error.
    pub fn plumb<H, T>(self, handler: H) -> Self
    where
        H: CommandHandler<T>,
        T: 'static,
    {
        self.install_plumb(CommandFlags::PLUMB, handler)
    }

    fn install_plumb<H, T>(mut self, flags: CommandFlags, handler: H) -> Self
    where
        H: CommandHandler<T>,
        T: 'static,
    {
        if self.error.is_some() {
            return self;
        }
        if self.plumbed {
            self.error = Some(SetupError::DuplicatePlumb {
                group: self.name.clone(),
            });
            return self;
        }
        let args = H::arg_specs();
        if let Some(err) = validate_args("", &args) {
            self.error = Some(err);
            return self;
        }
        let variadic = args.last().is_some_and(ArgSpec::is_trailing);
        self.commands.clear();
        self.commands.push(CommandSpec {
            name: String::new(),
            description: String::new(),
            flags: flags | CommandFlags::PLUMB,
            variadic,
            args,
            call: into_command(handler),
        });
        self.plumbed = true;
        self
    }

    /// Appends a middleware hook: raw event in, error-or-unit out, run
    /// before name resolution for every dispatch reaching this group.
    pub fn middleware<F, Fut, R>(mut self, hook: F) -> Self
    where
        F: Fn(herald_core::BoxedEvent) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = R> + Send + 'static,
        R: IntoResult,
    {
        if self.error.is_none() {
            self.middleware.push(into_middleware(hook));
        }
        self
    }

    /// Appends a typed event handler, invoked whenever the runtime event
    /// type equals `E`. No argument binding happens.
    pub fn on_event<F, E, Fut, R>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        E: Event + Clone + 'static,
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = R> + Send + 'static,
        R: IntoResult,
    {
        if self.error.is_none() {
            self.events.push(EventEntry {
                name: name.into(),
                event: type_name::<E>(),
                flags: CommandFlags::NONE,
                call: into_event_handler(handler),
            });
        }
        self
    }

    /// Nests a built-up group under this one.
    pub fn subgroup(mut self, child: GroupBuilder) -> Self {
        if self.error.is_some() {
            return self;
        }
        if self.subgroups.iter().any(|g| g.name == child.name) {
            self.error = Some(SetupError::DuplicateGroup {
                group: self.name.clone(),
                name: child.name,
            });
            return self;
        }
        self.subgroups.push(child);
        self
    }

    /// Registers the post-build hook; it may adjust the group's name and
    /// description before the tables freeze.
    pub fn setup(mut self, hook: impl FnOnce(&mut GroupMeta) + Send + 'static) -> Self {
        self.setup = Some(Box::new(hook));
        self
    }

    /// Finalizes the group: runs the setup hook, applies flag
    /// inheritance and recursively builds subgroups.
    pub(crate) fn build(self) -> Result<CommandGroup, SetupError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut meta = GroupMeta {
            name: self.name,
            description: self.description,
        };
        if let Some(hook) = self.setup {
            hook(&mut meta);
        }

        let group_flags = self.flags;
        let commands = self
            .commands
            .into_iter()
            .map(|mut cmd| {
                cmd.flags |= group_flags;
                Arc::new(cmd)
            })
            .collect();
        let events = self
            .events
            .into_iter()
            .map(|mut entry| {
                entry.flags |= group_flags;
                entry
            })
            .collect();
        let subgroups = self
            .subgroups
            .into_iter()
            .map(GroupBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CommandGroup {
            name: meta.name,
            description: meta.description,
            flags: group_flags,
            commands,
            events,
            middleware: self.middleware,
            subgroups,
            plumbed: self.plumbed,
            quiet_unknown: self.quiet_unknown,
            binder: self.binder,
        })
    }
}

impl std::fmt::Debug for GroupBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupBuilder")
            .field("name", &self.name)
            .field("commands", &self.commands)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Trailing-position check: a custom, manual, raw or variadic argument
/// must be the last one.
fn validate_args(command: &str, args: &[ArgSpec]) -> Option<SetupError> {
    for spec in args.iter().rev().skip(1) {
        if spec.is_trailing() {
            return Some(SetupError::TrailingArgument {
                command: command.to_owned(),
                usage: spec.usage.clone(),
            });
        }
    }
    None
}
