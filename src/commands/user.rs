//! User commands: login, register, reset, users.

use async_trait::async_trait;
use tracing::info;

use super::{Command, CommandHandler, State};
use crate::db::UserRepository;
use crate::{GatorError, Result};

/// `login <name>`
pub struct LoginCommand;

#[async_trait]
impl CommandHandler for LoginCommand {
    async fn run(&self, state: &mut State, cmd: &Command) -> Result<()> {
        let name = cmd.arg(0, "login <name>")?;

        let user = UserRepository::new(state.db.pool())
            .get_by_name(name)
            .await?
            .ok_or_else(|| GatorError::NotFound(format!("user {}", name)))?;

        state.set_current_user(&user.name)?;
        info!("Logged in as {}", user.name);
        state.say(format!("Logged in as {}", user.name));
        Ok(())
    }
}

/// `register <name>`
pub struct RegisterCommand;

#[async_trait]
impl CommandHandler for RegisterCommand {
    async fn run(&self, state: &mut State, cmd: &Command) -> Result<()> {
        let name = cmd.arg(0, "register <name>")?.trim();
        if name.is_empty() {
            return Err(GatorError::Usage("usage: register <name>".to_string()));
        }

        let user = UserRepository::new(state.db.pool())
            .create(name)
            .await
            .map_err(|e| match e {
                GatorError::Conflict(_) => GatorError::Conflict("User with that name".to_string()),
                other => other,
            })?;

        state.set_current_user(&user.name)?;
        info!("Registered user {} ({})", user.name, user.id);
        state.say(format!("Registered user {} ({})", user.name, user.id));
        Ok(())
    }
}

/// `reset`
pub struct ResetCommand;

#[async_trait]
impl CommandHandler for ResetCommand {
    async fn run(&self, state: &mut State, _cmd: &Command) -> Result<()> {
        let deleted = UserRepository::new(state.db.pool()).delete_all().await?;
        info!("Reset: deleted {} user(s)", deleted);
        state.say(format!("Deleted {} user(s)", deleted));
        Ok(())
    }
}

/// `users`
pub struct UsersCommand;

#[async_trait]
impl CommandHandler for UsersCommand {
    async fn run(&self, state: &mut State, _cmd: &Command) -> Result<()> {
        let users = UserRepository::new(state.db.pool()).list_all().await?;
        let current = state.config.current_user().map(str::to_string);

        for user in users {
            if current.as_deref() == Some(user.name.as_str()) {
                state.say(format!("* {} (current)", user.name));
            } else {
                state.say(format!("* {}", user.name));
            }
        }
        Ok(())
    }
}
