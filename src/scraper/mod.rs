//! Scraping pipeline.
//!
//! A scrape run resolves the entity once, enumerates its audience bounded by
//! a target count, and writes the CSV artifact. The two entity kinds collect
//! users differently (participant listing vs. comment-thread walk) behind one
//! shared contract; callers pick the variant by [`EntityKind`].

/// Channel commentator discovery.
pub mod channel;
/// Compiled-in canned source backend.
pub mod dummy;
/// CSV artifact writing.
pub mod export;
/// Group participant listing.
pub mod group;
/// Remote entity source traits and domain records.
pub mod source;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

pub use channel::ChannelScraper;
pub use export::{Artifact, ExportError};
pub use group::GroupScraper;
pub use source::{AudienceUser, EntityClient, EntityConnector, EntityInfo, SourceError};

/// The two shapes of scrapable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Flat membership listing
    Group,
    /// Audience derived from comment threads
    Channel,
}

impl EntityKind {
    /// Stable tag stored in scrape-history rows.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Group => "group",
            EntityKind::Channel => "channel",
        }
    }
}

/// Errors from a scrape run, tagged by the stage that failed
#[derive(Debug, Error)]
pub enum ScraperError {
    /// Could not open a source connection
    #[error("failed to open source connection: {0}")]
    Connect(SourceError),
    /// The entity reference is invalid or unreachable
    #[error("failed to resolve `{reference}`: {source}")]
    Resolution {
        /// The reference as the user supplied it
        reference: String,
        source: SourceError,
    },
    /// Transport failure while enumerating users
    #[error("failed to enumerate users: {0}")]
    Enumeration(SourceError),
    /// The artifact could not be written
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Shared contract of the two scraper variants.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Which entity kind this variant handles.
    fn kind(&self) -> EntityKind;

    /// Enumerate up to `limit` users of the already-resolved entity.
    async fn collect(
        &self,
        client: &dyn EntityClient,
        entity: &EntityInfo,
        limit: usize,
    ) -> Result<Vec<AudienceUser>, SourceError>;

    /// One full scrape: acquire a connection, resolve the entity once,
    /// collect its audience, export the CSV. The connection is released on
    /// both the success and the failure path; a close failure is logged and
    /// does not fail the run.
    async fn run(
        &self,
        connector: &dyn EntityConnector,
        reference: &str,
        limit: usize,
        export_dir: &Path,
    ) -> Result<Artifact, ScraperError> {
        let client = connector.connect().await.map_err(ScraperError::Connect)?;

        let outcome = async {
            let entity =
                client
                    .resolve(reference)
                    .await
                    .map_err(|source| ScraperError::Resolution {
                        reference: reference.to_string(),
                        source,
                    })?;
            let users = self
                .collect(client.as_ref(), &entity, limit)
                .await
                .map_err(ScraperError::Enumeration)?;
            let artifact = export::export_users(export_dir, &entity, &users)?;
            info!(
                kind = self.kind().as_str(),
                entity = %entity.title,
                users = artifact.user_count,
                "scrape finished"
            );
            Ok(artifact)
        }
        .await;

        if let Err(e) = client.close().await {
            warn!("source connection close failed: {e}");
        }
        outcome
    }
}

/// Select the scraper variant for an entity kind.
#[must_use]
pub fn scraper_for(kind: EntityKind) -> &'static dyn Scraper {
    match kind {
        EntityKind::Group => &GroupScraper,
        EntityKind::Channel => &ChannelScraper,
    }
}
