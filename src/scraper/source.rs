//! Remote entity source abstraction.
//!
//! The transport that actually talks to the remote network (entity
//! resolution, participant lists, message history) sits behind these traits;
//! the scrapers only ever see domain records and lazy streams. A connection
//! is acquired per scrape run and released when the run ends.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

/// Errors surfaced by an entity source
#[derive(Debug, Error)]
pub enum SourceError {
    /// The reference does not correspond to a reachable entity
    #[error("entity `{0}` not found")]
    NotFound(String),
    /// Transport failure while talking to the remote network
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Resolved entity metadata, obtained once per run and threaded through
/// collection and export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityInfo {
    /// Numeric identifier on the remote network
    pub id: i64,
    /// Display title; also names the export file
    pub title: String,
}

/// One discovered user, as the scrapers hand it to the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceUser {
    /// Numeric identifier; dedup key for the channel walk
    pub id: i64,
    pub username: Option<String>,
    /// Opaque, source-specific access token
    pub access_hash: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Identifier of a channel post within its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostId(pub i64);

/// A single reply in a post's comment thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The concrete user who sent the reply. `None` for anonymous or
    /// channel-signed senders, which the channel walk skips.
    pub sender: Option<AudienceUser>,
}

/// Hands out connections to an entity source.
#[async_trait]
pub trait EntityConnector: Send + Sync {
    /// Open a connection scoped to one scrape run.
    async fn connect(&self) -> Result<Box<dyn EntityClient>, SourceError>;
}

/// One open connection to an entity source.
#[async_trait]
pub trait EntityClient: Send + Sync {
    /// Resolve an entity reference (URL or handle) to its metadata.
    async fn resolve(&self, reference: &str) -> Result<EntityInfo, SourceError>;

    /// The full participant listing of a group.
    async fn participants(&self, entity: &EntityInfo) -> Result<Vec<AudienceUser>, SourceError>;

    /// The entity's posts, newest first. Finite; restartable per call.
    fn posts<'a>(&'a self, entity: &'a EntityInfo) -> BoxStream<'a, Result<PostId, SourceError>>;

    /// Replies addressed to one post, in thread order. Finite.
    fn replies<'a>(
        &'a self,
        entity: &'a EntityInfo,
        post: PostId,
    ) -> BoxStream<'a, Result<Reply, SourceError>>;

    /// Release the connection. Failure here is non-fatal for the run.
    async fn close(&self) -> Result<(), SourceError>;
}
