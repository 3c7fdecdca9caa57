//! Group participant scraping.

use async_trait::async_trait;

use super::source::{AudienceUser, EntityClient, EntityInfo, SourceError};
use super::{EntityKind, Scraper};

/// Collects the members a group lists directly.
pub struct GroupScraper;

#[async_trait]
impl Scraper for GroupScraper {
    fn kind(&self) -> EntityKind {
        EntityKind::Group
    }

    /// Full participant listing, truncated to the first `limit` entries.
    /// Asking for more users than the group has returns the whole listing.
    /// A listing has no inherent duplicates, so no dedup happens here.
    async fn collect(
        &self,
        client: &dyn EntityClient,
        entity: &EntityInfo,
        limit: usize,
    ) -> Result<Vec<AudienceUser>, SourceError> {
        let mut users = client.participants(entity).await?;
        if users.len() > limit {
            users.truncate(limit);
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::super::dummy::{demo_source, DEMO_GROUP};
    use super::super::source::EntityConnector;
    use super::*;

    async fn collect(limit: usize) -> Vec<AudienceUser> {
        let connector = demo_source();
        let client = connector.connect().await.expect("connect");
        let entity = client.resolve(DEMO_GROUP).await.expect("resolve");
        GroupScraper
            .collect(client.as_ref(), &entity, limit)
            .await
            .expect("collect")
    }

    #[tokio::test]
    async fn truncates_to_requested_count_in_listing_order() {
        let all = collect(usize::MAX).await;
        assert!(all.len() >= 3, "demo group should have several members");

        let three = collect(3).await;
        assert_eq!(three.len(), 3);
        assert_eq!(three[..], all[..3]);
    }

    #[tokio::test]
    async fn count_beyond_listing_returns_full_listing() {
        let all = collect(usize::MAX).await;
        let more = collect(all.len() + 50).await;
        assert_eq!(more, all);
    }

    #[tokio::test]
    async fn zero_count_returns_nothing() {
        assert!(collect(0).await.is_empty());
    }
}
