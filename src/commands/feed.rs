//! Feed commands: feeds, addfeed, follow, following, unfollow, browse.

use async_trait::async_trait;
use tracing::info;

use super::{Command, CommandHandler, State, UserCommandHandler};
use crate::datetime::format_display;
use crate::db::User;
use crate::feed::{validate_url, FeedFollowRepository, FeedRepository, PostRepository};
use crate::{GatorError, Result};

/// Number of posts `browse` shows without an explicit limit.
pub const DEFAULT_BROWSE_LIMIT: i64 = 2;

/// `feeds`
pub struct FeedsCommand;

#[async_trait]
impl CommandHandler for FeedsCommand {
    async fn run(&self, state: &mut State, _cmd: &Command) -> Result<()> {
        let feeds = FeedRepository::new(state.db.pool())
            .list_with_owners()
            .await?;

        if feeds.is_empty() {
            state.say("No feeds found.");
            return Ok(());
        }

        for feed in feeds {
            state.say(format!("* {}", feed.name));
            state.say(format!("  URL:     {}", feed.url));
            state.say(format!("  Creator: {}", feed.owner_name));
        }
        Ok(())
    }
}

/// `addfeed <name> <url>`
pub struct AddFeedCommand;

#[async_trait]
impl UserCommandHandler for AddFeedCommand {
    async fn run(&self, state: &mut State, cmd: &Command, user: &User) -> Result<()> {
        const USAGE: &str = "addfeed <name> <url>";
        let name = cmd.arg(0, USAGE)?;
        let url = cmd.arg(1, USAGE)?;
        validate_url(url).map_err(|e| GatorError::Usage(format!("invalid feed URL: {}", e)))?;

        let feed = FeedRepository::new(state.db.pool())
            .create(name, url, &user.id)
            .await?;
        let follow = FeedFollowRepository::new(state.db.pool())
            .create(&user.id, &feed.id)
            .await?;

        info!("User {} added feed {} ({})", user.name, feed.name, feed.url);
        state.say("Feed created:");
        state.say(format!("  ID:      {}", feed.id));
        state.say(format!("  Name:    {}", feed.name));
        state.say(format!("  URL:     {}", feed.url));
        state.say(format!("  Created: {}", format_display(&feed.created_at)));
        state.say(format!("{} now follows {}", follow.user_name, follow.feed_name));
        Ok(())
    }
}

/// `follow <url>`
pub struct FollowCommand;

#[async_trait]
impl UserCommandHandler for FollowCommand {
    async fn run(&self, state: &mut State, cmd: &Command, user: &User) -> Result<()> {
        let url = cmd.arg(0, "follow <url>")?;

        let feed = FeedRepository::new(state.db.pool())
            .get_by_url(url)
            .await?
            .ok_or_else(|| GatorError::NotFound(format!("feed {}", url)))?;
        let follow = FeedFollowRepository::new(state.db.pool())
            .create(&user.id, &feed.id)
            .await?;

        info!("User {} followed {}", user.name, feed.url);
        state.say(format!("{} now follows {}", follow.user_name, follow.feed_name));
        Ok(())
    }
}

/// `following`
pub struct FollowingCommand;

#[async_trait]
impl UserCommandHandler for FollowingCommand {
    async fn run(&self, state: &mut State, _cmd: &Command, user: &User) -> Result<()> {
        let follows = FeedFollowRepository::new(state.db.pool())
            .list_for_user(&user.id)
            .await?;

        if follows.is_empty() {
            state.say(format!("{} does not follow any feeds.", user.name));
            return Ok(());
        }

        for follow in follows {
            state.say(format!("* {}", follow.feed_name));
        }
        Ok(())
    }
}

/// `unfollow <url>`
pub struct UnfollowCommand;

#[async_trait]
impl UserCommandHandler for UnfollowCommand {
    async fn run(&self, state: &mut State, cmd: &Command, user: &User) -> Result<()> {
        let url = cmd.arg(0, "unfollow <url>")?;

        let removed = FeedFollowRepository::new(state.db.pool())
            .delete_by_user_and_url(&user.id, url)
            .await?;
        if !removed {
            return Err(GatorError::NotFound(format!("follow of {}", url)));
        }

        info!("User {} unfollowed {}", user.name, url);
        state.say(format!("{} unfollowed {}", user.name, url));
        Ok(())
    }
}

/// `browse [limit]`
pub struct BrowseCommand;

#[async_trait]
impl UserCommandHandler for BrowseCommand {
    async fn run(&self, state: &mut State, cmd: &Command, user: &User) -> Result<()> {
        let limit = match cmd.args.first() {
            Some(raw) => parse_limit(raw)?,
            None => DEFAULT_BROWSE_LIMIT,
        };

        let posts = PostRepository::new(state.db.pool())
            .list_for_user(&user.id, limit)
            .await?;

        if posts.is_empty() {
            state.say("No posts found.");
            return Ok(());
        }

        for post in posts {
            state.say(format!("Title: {}", post.title));
            state.say(format!("Published: {}", format_display(&post.published_at)));
            state.say(format!("URL: {}", post.url));
            if !post.description.is_empty() {
                state.say(post.description);
            }
            state.say("-----------------------------------");
        }
        Ok(())
    }
}

fn parse_limit(raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(GatorError::Usage(format!(
            "usage: browse [limit] (limit must be a positive number, got {:?})",
            raw
        ))),
    }
}
