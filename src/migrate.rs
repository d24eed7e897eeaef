use chrono::{Duration, Local};
use dialoguer::console::Style;
use log::{debug, info};

use crate::api::{BlogApi, BlogIdentifier, Post, UserInfo};
use crate::error::RebloggrError;

/// Tumblr allows 250 new posts per day.
pub const DAILY_POST_LIMIT: u32 = 250;
const QUOTA_COOLDOWN_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The source blog has no posts left.
    SourceExhausted,
    /// The daily limit stopped the run, the rest stays on the source.
    QuotaReached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationSummary {
    pub migrated: u64,
    pub outcome: Outcome,
}

/// Both blogs must belong to the user and must differ. A user needs at least
/// two blogs for that.
pub fn check_blogs(
    user: &UserInfo,
    source: &BlogIdentifier,
    destination: &BlogIdentifier,
) -> Result<(), RebloggrError> {
    check_blog_count(user)?;
    let blogs = user.blog_identifiers()?;
    for blog in [source, destination] {
        if !blogs.contains(blog) {
            return Err(RebloggrError::Precondition(format!(
                "{blog} is not one of your blogs"
            )));
        }
    }
    if source == destination {
        return Err(RebloggrError::Precondition(
            "Source and destination blog must differ".to_string(),
        ));
    }
    Ok(())
}

pub fn check_blog_count(user: &UserInfo) -> Result<(), RebloggrError> {
    if user.blogs.len() < 2 {
        return Err(RebloggrError::Precondition(
            "You must have at least 2 blogs to use this tool..".to_string(),
        ));
    }
    Ok(())
}

/// Moves every post from `source` to `destination`: reblog first, then delete
/// the original.
///
/// Posts are always fetched at offset 0, the deletions make the next page
/// appear there. A post is only deleted after its reblog succeeded, so it
/// exists on at least one blog at any time. If deleting fails the post is left
/// on both blogs and the run is aborted.
pub async fn migrate<A: BlogApi>(
    api: &A,
    source: &BlogIdentifier,
    destination: &BlogIdentifier,
) -> Result<MigrationSummary, RebloggrError> {
    let user = api.user_info().await?;
    check_blogs(&user, source, destination)?;
    info!("Migrating posts of {} from {source} to {destination}", user.name);

    let red = Style::new().red();
    let green = Style::new().green();
    let cyan = Style::new().cyan();
    let mut migrated = 0;
    loop {
        let page = api.list_posts(source, 0).await?;
        debug!("Fetched {} posts from {source}", page.len());
        if page.is_empty() {
            return Ok(MigrationSummary {
                migrated,
                outcome: Outcome::SourceExhausted,
            });
        }

        for raw_post in &page {
            let post = Post::decode(raw_post)?;

            if let Err(error) = api.reblog(destination, post.id, &post.reblog_key).await {
                if error.is_quota_exceeded() {
                    let retry_at = Local::now() + Duration::hours(QUOTA_COOLDOWN_HOURS);
                    println!(
                        "{}",
                        Style::new().yellow().apply_to(format!(
                            "You have hit the limit of {DAILY_POST_LIMIT} posts per day, \
                             try running again after {}.",
                            retry_at.format("%Y-%m-%d %H:%M")
                        ))
                    );
                    return Ok(MigrationSummary {
                        migrated,
                        outcome: Outcome::QuotaReached,
                    });
                }
                return Err(error);
            }
            migrated += 1;
            println!(
                "[{}] Reblogged {} - {} to {}",
                green.apply_to(migrated),
                post.id,
                cyan.apply_to(&post.post_url),
                cyan.apply_to(destination)
            );

            api.delete_post(source, post.id)
                .await
                .map_err(|error| RebloggrError::Deletion {
                    post_id: post.id,
                    blog: source.to_string(),
                    source: Box::new(error),
                })?;
            println!(
                "[{}] Deleted {} - {} from {}",
                red.apply_to(migrated),
                post.id,
                cyan.apply_to(&post.post_url),
                cyan.apply_to(source)
            );
        }
    }
}
