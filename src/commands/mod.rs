//! Command dispatch for gator.
//!
//! Commands are looked up by name in a [`CommandRegistry`]. Commands that
//! act on behalf of a user are written as [`UserCommandHandler`]s and
//! wrapped in [`LoggedIn`], which resolves the current user before the
//! handler runs.

mod agg;
mod feed;
mod user;

pub use agg::AggCommand;
pub use feed::{
    AddFeedCommand, BrowseCommand, FeedsCommand, FollowCommand, FollowingCommand,
    UnfollowCommand, DEFAULT_BROWSE_LIMIT,
};
pub use user::{LoginCommand, RegisterCommand, ResetCommand, UsersCommand};

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::db::{Database, User, UserRepository};
use crate::{GatorError, Result};

/// A parsed command line: command name plus positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    /// Create a command.
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Positional argument `index`, or a usage error naming `usage`.
    pub fn arg(&self, index: usize, usage: &str) -> Result<&str> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| GatorError::Usage(format!("usage: {}", usage)))
    }
}

/// Where command output goes.
#[derive(Debug)]
enum Output {
    Stdout,
    Captured(Vec<String>),
}

/// Process state shared by all commands.
pub struct State {
    /// Database handle.
    pub db: Database,
    /// Loaded configuration.
    pub config: Config,
    /// Path the configuration is saved to.
    pub config_path: PathBuf,
    output: Output,
}

impl State {
    /// State printing command output to stdout.
    pub fn new(db: Database, config: Config, config_path: PathBuf) -> Self {
        Self {
            db,
            config,
            config_path,
            output: Output::Stdout,
        }
    }

    /// State keeping command output in memory; see [`State::output`].
    pub fn captured(db: Database, config: Config, config_path: PathBuf) -> Self {
        Self {
            db,
            config,
            config_path,
            output: Output::Captured(Vec::new()),
        }
    }

    /// Emit one line of command output.
    pub fn say(&mut self, line: impl Into<String>) {
        let line = line.into();
        match &mut self.output {
            Output::Stdout => println!("{}", line),
            Output::Captured(lines) => lines.push(line),
        }
    }

    /// Lines emitted so far when output is captured.
    pub fn output(&self) -> &[String] {
        match &self.output {
            Output::Stdout => &[],
            Output::Captured(lines) => lines,
        }
    }

    /// Persist a new current user name.
    pub fn set_current_user(&mut self, name: &str) -> Result<()> {
        self.config.set_user(name, &self.config_path)
    }
}

/// A command that needs no logged in user.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, state: &mut State, cmd: &Command) -> Result<()>;
}

/// A command that acts on behalf of the current user.
#[async_trait]
pub trait UserCommandHandler: Send + Sync {
    async fn run(&self, state: &mut State, cmd: &Command, user: &User) -> Result<()>;
}

/// Adapts a [`UserCommandHandler`] into a [`CommandHandler`] by resolving
/// the configured current user first.
///
/// If nobody is logged in, or the stored name no longer matches a user,
/// the invocation fails with [`GatorError::Auth`] and the inner handler is
/// never called.
pub struct LoggedIn<H>(pub H);

#[async_trait]
impl<H: UserCommandHandler> CommandHandler for LoggedIn<H> {
    async fn run(&self, state: &mut State, cmd: &Command) -> Result<()> {
        let user = resolve_current_user(state).await?;
        debug!("Running {} as {}", cmd.name, user.name);
        self.0.run(state, cmd, &user).await
    }
}

/// Look up the user named by the configuration.
pub async fn resolve_current_user(state: &State) -> Result<User> {
    let name = state
        .config
        .current_user()
        .ok_or_else(|| GatorError::Auth("no user logged in".to_string()))?;

    UserRepository::new(state.db.pool())
        .get_by_name(name)
        .await?
        .ok_or_else(|| GatorError::Auth(format!("user {} not registered", name)))
}

struct Entry {
    description: String,
    handler: Box<dyn CommandHandler>,
}

/// Name to handler mapping.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Entry>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous one.
    pub fn register<H>(&mut self, name: &str, description: &str, handler: H)
    where
        H: CommandHandler + 'static,
    {
        self.commands.insert(
            name.to_string(),
            Entry {
                description: description.to_string(),
                handler: Box::new(handler),
            },
        );
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Run the handler registered for `cmd.name`.
    pub async fn run(&self, state: &mut State, cmd: &Command) -> Result<()> {
        let entry = self
            .commands
            .get(&cmd.name)
            .ok_or_else(|| GatorError::NotFound("command".to_string()))?;
        entry.handler.run(state, cmd).await
    }

    /// (name, description) pairs sorted by name.
    pub fn descriptions(&self) -> Vec<(&str, &str)> {
        self.commands
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.description.as_str()))
            .collect()
    }
}

/// Registry holding every built-in command.
pub fn builtin_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    registry.register("login", "Log in as an existing user: login <name>", LoginCommand);
    registry.register(
        "register",
        "Register a new user and log in: register <name>",
        RegisterCommand,
    );
    registry.register("reset", "Delete every user and their data: reset", ResetCommand);
    registry.register("users", "List registered users: users", UsersCommand);
    registry.register("feeds", "List all feeds and who added them: feeds", FeedsCommand);
    registry.register(
        "addfeed",
        "Add a feed and follow it: addfeed <name> <url>",
        LoggedIn(AddFeedCommand),
    );
    registry.register(
        "follow",
        "Follow an existing feed: follow <url>",
        LoggedIn(FollowCommand),
    );
    registry.register(
        "following",
        "List the feeds you follow: following",
        LoggedIn(FollowingCommand),
    );
    registry.register(
        "unfollow",
        "Stop following a feed: unfollow <url>",
        LoggedIn(UnfollowCommand),
    );
    registry.register(
        "browse",
        "Show the newest posts from followed feeds: browse [limit]",
        LoggedIn(BrowseCommand),
    );
    registry.register(
        "agg",
        "Collect feeds until interrupted: agg <interval, e.g. 30s or 1m>",
        AggCommand,
    );

    registry
}
