use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use url::Url;

use crate::error::RebloggrError;

/// The remote operations the migration needs.
///
/// `TumblrClient` talks to the real API, tests substitute an in-memory blog
/// store.
#[allow(async_fn_in_trait)]
pub trait BlogApi {
    async fn user_info(&self) -> Result<UserInfo, RebloggrError>;

    /// Newest posts first, starting at `offset`. Posts are returned raw so
    /// that decoding failures surface in the migration loop.
    async fn list_posts(
        &self,
        blog: &BlogIdentifier,
        offset: u64,
    ) -> Result<Vec<Value>, RebloggrError>;

    async fn reblog(
        &self,
        blog: &BlogIdentifier,
        post_id: u64,
        reblog_key: &str,
    ) -> Result<(), RebloggrError>;

    async fn delete_post(&self, blog: &BlogIdentifier, post_id: u64) -> Result<(), RebloggrError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub name: String,
    #[serde(default)]
    pub blogs: Vec<Blog>,
}

impl UserInfo {
    /// Host identifiers of all blogs, in the order the API lists them.
    pub fn blog_identifiers(&self) -> Result<Vec<BlogIdentifier>, RebloggrError> {
        self.blogs.iter().map(|blog| BlogIdentifier::from_url(&blog.url)).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Blog {
    pub name: String,
    pub url: String,
}

/// A blog named by its host only, for example `example.tumblr.com`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlogIdentifier(String);

impl BlogIdentifier {
    pub fn new(host: impl Into<String>) -> Self {
        BlogIdentifier(host.into())
    }

    // Strip scheme and path from a blog URL.
    pub fn from_url(blog_url: &str) -> Result<Self, RebloggrError> {
        let parsed = Url::parse(blog_url).map_err(|e| {
            RebloggrError::Precondition(format!("Invalid blog URL {blog_url}: {e}"))
        })?;
        match parsed.host_str() {
            Some(host) => Ok(BlogIdentifier(host.to_string())),
            None => Err(RebloggrError::Precondition(format!(
                "Blog URL {blog_url} has no host"
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlogIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fields of a post needed to reblog and delete it. Everything else in
/// the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub post_url: String,
    pub reblog_key: String,
}

impl Post {
    pub fn decode(raw: &Value) -> Result<Post, RebloggrError> {
        Post::deserialize(raw).map_err(RebloggrError::Decode)
    }
}
