//! A compiled-in entity source with canned data.
//!
//! Useful for verifying the whole dialog → scrape → export pipeline without a
//! live network backend, and doubles as the fixture the tests build on.
//! Selected with `source_backend = "dummy"`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};

use super::source::{
    AudienceUser, EntityClient, EntityConnector, EntityInfo, PostId, Reply, SourceError,
};

/// Reference of the demo group served by [`demo_source`].
pub const DEMO_GROUP: &str = "https://t.me/acme_chat";
/// Reference of the demo channel served by [`demo_source`].
pub const DEMO_CHANNEL: &str = "https://t.me/acme_news";

/// One canned post with its reply thread.
#[derive(Debug, Clone)]
pub struct DummyPost {
    id: PostId,
    replies: Vec<Reply>,
}

impl DummyPost {
    #[must_use]
    pub fn new(id: PostId) -> Self {
        Self {
            id,
            replies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_replies(mut self, replies: Vec<Reply>) -> Self {
        self.replies = replies;
        self
    }
}

/// One canned entity: metadata plus whichever of the two audience shapes it
/// has (participants for groups, posts with replies for channels).
#[derive(Debug, Clone)]
pub struct DummyEntity {
    info: EntityInfo,
    participants: Vec<AudienceUser>,
    /// Newest first, matching the remote network's iteration order.
    posts: Vec<DummyPost>,
}

impl DummyEntity {
    #[must_use]
    pub fn group(id: i64, title: &str) -> Self {
        Self {
            info: EntityInfo {
                id,
                title: title.to_string(),
            },
            participants: Vec::new(),
            posts: Vec::new(),
        }
    }

    #[must_use]
    pub fn channel(id: i64, title: &str) -> Self {
        Self::group(id, title)
    }

    #[must_use]
    pub fn with_participants(mut self, participants: Vec<AudienceUser>) -> Self {
        self.participants = participants;
        self
    }

    #[must_use]
    pub fn with_post(mut self, post: DummyPost) -> Self {
        self.posts.push(post);
        self
    }
}

/// A connector serving canned entities from memory.
pub struct DummySource {
    entities: Arc<HashMap<String, DummyEntity>>,
}

impl DummySource {
    /// An empty source; populate it with [`DummySource::insert`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entities: Arc::new(HashMap::new()),
        }
    }

    /// Register an entity under a reference (URL or bare handle).
    pub fn insert(&mut self, reference: &str, entity: DummyEntity) {
        Arc::make_mut(&mut self.entities).insert(normalize(reference).to_string(), entity);
    }
}

/// Strip the URL scheme, host and `@` so that `https://t.me/acme_chat`,
/// `t.me/acme_chat` and `@acme_chat` all name the same entity.
fn normalize(reference: &str) -> &str {
    let reference = reference.trim().trim_end_matches('/');
    let reference = reference
        .strip_prefix("https://")
        .or_else(|| reference.strip_prefix("http://"))
        .unwrap_or(reference);
    let reference = reference.strip_prefix("t.me/").unwrap_or(reference);
    reference.strip_prefix('@').unwrap_or(reference)
}

#[async_trait]
impl EntityConnector for DummySource {
    async fn connect(&self) -> Result<Box<dyn EntityClient>, SourceError> {
        Ok(Box::new(DummyClient {
            entities: Arc::clone(&self.entities),
        }))
    }
}

struct DummyClient {
    entities: Arc<HashMap<String, DummyEntity>>,
}

impl DummyClient {
    fn by_id(&self, id: i64) -> Result<&DummyEntity, SourceError> {
        self.entities
            .values()
            .find(|e| e.info.id == id)
            .ok_or_else(|| SourceError::NotFound(format!("entity id {id}")))
    }
}

#[async_trait]
impl EntityClient for DummyClient {
    async fn resolve(&self, reference: &str) -> Result<EntityInfo, SourceError> {
        self.entities
            .get(normalize(reference))
            .map(|e| e.info.clone())
            .ok_or_else(|| SourceError::NotFound(reference.to_string()))
    }

    async fn participants(&self, entity: &EntityInfo) -> Result<Vec<AudienceUser>, SourceError> {
        Ok(self.by_id(entity.id)?.participants.clone())
    }

    fn posts<'a>(&'a self, entity: &'a EntityInfo) -> BoxStream<'a, Result<PostId, SourceError>> {
        let posts = match self.by_id(entity.id) {
            Ok(e) => e.posts.iter().map(|p| Ok(p.id)).collect::<Vec<_>>(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(posts).boxed()
    }

    fn replies<'a>(
        &'a self,
        entity: &'a EntityInfo,
        post: PostId,
    ) -> BoxStream<'a, Result<Reply, SourceError>> {
        let replies = match self.by_id(entity.id) {
            Ok(e) => e
                .posts
                .iter()
                .find(|p| p.id == post)
                .map(|p| p.replies.iter().cloned().map(Ok).collect::<Vec<_>>())
                .unwrap_or_default(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(replies).boxed()
    }

    async fn close(&self) -> Result<(), SourceError> {
        Ok(())
    }
}

fn demo_user(
    id: i64,
    username: &str,
    first_name: &str,
    last_name: Option<&str>,
) -> AudienceUser {
    AudienceUser {
        id,
        username: Some(username.to_string()),
        access_hash: Some(id.wrapping_mul(-7_654_321)),
        first_name: Some(first_name.to_string()),
        last_name: last_name.map(str::to_string),
        phone: None,
    }
}

fn demo_reply(user: AudienceUser) -> Reply {
    Reply { sender: Some(user) }
}

/// The source served when `source_backend = "dummy"`: one group and one
/// channel with a handful of plausible members and comment threads.
#[must_use]
pub fn demo_source() -> DummySource {
    let mut source = DummySource::empty();

    source.insert(
        DEMO_GROUP,
        DummyEntity::group(1_001, "Acme Chat").with_participants(vec![
            demo_user(101, "ivan_petrov", "Ivan", Some("Petrov")),
            demo_user(102, "olena_k", "Olena", Some("Kovalenko")),
            demo_user(103, "max_dev", "Max", None),
            demo_user(104, "daria_s", "Daria", Some("Shevchenko")),
            demo_user(105, "pavel_m", "Pavel", Some("Morozov")),
            demo_user(106, "kate_li", "Kate", None),
        ]),
    );

    source.insert(
        DEMO_CHANNEL,
        DummyEntity::channel(2_001, "Acme News")
            .with_post(DummyPost::new(PostId(33)).with_replies(vec![
                demo_reply(demo_user(102, "olena_k", "Olena", Some("Kovalenko"))),
                Reply { sender: None },
                demo_reply(demo_user(201, "night_owl", "Oleg", None)),
            ]))
            .with_post(DummyPost::new(PostId(32)).with_replies(vec![
                demo_reply(demo_user(201, "night_owl", "Oleg", None)),
                demo_reply(demo_user(202, "sunny_day", "Anna", Some("Bila"))),
            ]))
            .with_post(DummyPost::new(PostId(31)).with_replies(vec![demo_reply(demo_user(
                203,
                "quiet_reader",
                "Roman",
                None,
            ))])),
    );

    source
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_urls_handles_and_bare_names() {
        let connector = demo_source();
        let client = connector.connect().await.expect("connect");

        let by_url = client.resolve(DEMO_GROUP).await.expect("by url");
        let by_handle = client.resolve("@acme_chat").await.expect("by handle");
        let by_name = client.resolve("acme_chat").await.expect("by name");
        assert_eq!(by_url, by_handle);
        assert_eq!(by_url, by_name);
        assert_eq!(by_url.title, "Acme Chat");
    }

    #[tokio::test]
    async fn unknown_reference_is_not_found() {
        let connector = demo_source();
        let client = connector.connect().await.expect("connect");
        let err = client.resolve("https://t.me/no_such_thing").await;
        assert!(matches!(err, Err(SourceError::NotFound(_))));
    }
}
