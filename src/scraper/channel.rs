//! Channel commentator discovery.

use std::collections::HashSet;

use async_trait::async_trait;
use futures_util::TryStreamExt;

use super::source::{AudienceUser, EntityClient, EntityInfo, SourceError};
use super::{EntityKind, Scraper};

/// Collects the users who commented under a channel's posts. Channels expose
/// no member listing, so the audience is derived from reply threads instead.
pub struct ChannelScraper;

#[async_trait]
impl Scraper for ChannelScraper {
    fn kind(&self) -> EntityKind {
        EntityKind::Channel
    }

    /// Walks posts newest-first and, within each post, its reply thread in
    /// order. Every reply sent by a concrete user is collected once per run
    /// (dedup by sender id); anonymous and channel-signed replies carry no
    /// sender and are skipped. Returns the moment `limit` users are
    /// collected, or when the post stream runs dry.
    async fn collect(
        &self,
        client: &dyn EntityClient,
        entity: &EntityInfo,
        limit: usize,
    ) -> Result<Vec<AudienceUser>, SourceError> {
        let mut commentators = Vec::new();
        if limit == 0 {
            return Ok(commentators);
        }

        let mut seen: HashSet<i64> = HashSet::new();
        let mut posts = client.posts(entity);
        while let Some(post) = posts.try_next().await? {
            let mut replies = client.replies(entity, post);
            while let Some(reply) = replies.try_next().await? {
                let Some(user) = reply.sender else {
                    continue;
                };
                if seen.insert(user.id) {
                    commentators.push(user);
                    if commentators.len() == limit {
                        return Ok(commentators);
                    }
                }
            }
        }
        Ok(commentators)
    }
}

#[cfg(test)]
mod tests {
    use super::super::dummy::{demo_source, DummyEntity, DummyPost, DummySource, DEMO_CHANNEL};
    use super::super::source::{EntityConnector, PostId, Reply};
    use super::*;

    fn user(id: i64) -> AudienceUser {
        AudienceUser {
            id,
            username: Some(format!("user{id}")),
            access_hash: Some(id * 1000),
            first_name: None,
            last_name: None,
            phone: None,
        }
    }

    fn reply(sender_id: i64) -> Reply {
        Reply {
            sender: Some(user(sender_id)),
        }
    }

    fn anonymous() -> Reply {
        Reply { sender: None }
    }

    /// Three posts, newest first; user 2 comments under two of them and the
    /// newest thread also holds an anonymous reply.
    fn threaded_channel() -> DummySource {
        let mut source = DummySource::empty();
        source.insert(
            "test_channel",
            DummyEntity::channel(9000, "Test Channel")
                .with_post(DummyPost::new(PostId(3)).with_replies(vec![
                    reply(1),
                    anonymous(),
                    reply(2),
                ]))
                .with_post(DummyPost::new(PostId(2)).with_replies(vec![reply(2), reply(3)]))
                .with_post(DummyPost::new(PostId(1)).with_replies(vec![reply(4)])),
        );
        source
    }

    async fn collect_from(source: &DummySource, reference: &str, limit: usize) -> Vec<i64> {
        let client = source.connect().await.expect("connect");
        let entity = client.resolve(reference).await.expect("resolve");
        ChannelScraper
            .collect(client.as_ref(), &entity, limit)
            .await
            .expect("collect")
            .into_iter()
            .map(|u| u.id)
            .collect()
    }

    #[tokio::test]
    async fn collects_distinct_senders_in_first_discovered_order() {
        let source = threaded_channel();
        let ids = collect_from(&source, "test_channel", 100).await;
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn stops_as_soon_as_the_target_count_is_reached() {
        let source = threaded_channel();
        let ids = collect_from(&source, "test_channel", 2).await;
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn returns_fewer_when_the_channel_runs_dry() {
        let source = threaded_channel();
        let ids = collect_from(&source, "test_channel", 50).await;
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn zero_limit_collects_nothing() {
        let source = threaded_channel();
        assert!(collect_from(&source, "test_channel", 0).await.is_empty());
    }

    #[tokio::test]
    async fn two_runs_over_an_unchanged_channel_agree() {
        let source = threaded_channel();
        let first = collect_from(&source, "test_channel", 3).await;
        let second = collect_from(&source, "test_channel", 3).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn demo_channel_skips_anonymous_repliers() {
        let connector = demo_source();
        let client = connector.connect().await.expect("connect");
        let entity = client.resolve(DEMO_CHANNEL).await.expect("resolve");
        let users = ChannelScraper
            .collect(client.as_ref(), &entity, 100)
            .await
            .expect("collect");

        let ids: HashSet<i64> = users.iter().map(|u| u.id).collect();
        assert_eq!(ids.len(), users.len(), "every sender appears at most once");
        assert!(!users.is_empty());
    }
}
