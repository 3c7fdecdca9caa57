//! User records and scrape history.
//!
//! SQLite-backed store behind the [`UserStore`] trait. Users are created on
//! first contact and only ever change their language; scrape requests are
//! append-only history.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::warn;

use crate::scraper::EntityKind;
use crate::texts::Language;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// No user row exists for the given external identifier
    #[error("unknown user: telegram id {0}")]
    UnknownUser(i64),
}

/// A scrape-history row to append once a scrape attempt completes.
#[derive(Debug, Clone)]
pub struct NewScrapeRequest {
    /// Entity kind the scrape targeted
    pub kind: EntityKind,
    /// The reference the user supplied
    pub link: String,
    /// Resolved entity title
    pub title: String,
    /// The requested user count
    pub user_count: i64,
}

/// A scrape-history row as stored.
#[derive(Debug, Clone)]
pub struct StoredScrapeRequest {
    pub kind: String,
    pub link: String,
    pub title: String,
    pub user_count: i64,
    pub created_at: String,
}

/// Interface to the user record store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Whether a user row exists for this external identifier.
    async fn user_exists(&self, telegram_id: i64) -> Result<bool, StoreError>;
    /// Create the user row. The caller checks existence first.
    async fn create_user(&self, telegram_id: i64, language: Language) -> Result<(), StoreError>;
    /// The user's stored language.
    async fn language(&self, telegram_id: i64) -> Result<Language, StoreError>;
    /// Persist a language change.
    async fn set_language(&self, telegram_id: i64, language: Language) -> Result<(), StoreError>;
    /// Internal primary key for an external identifier.
    async fn user_pk(&self, telegram_id: i64) -> Result<i64, StoreError>;
    /// Append one scrape-history row for an existing user.
    async fn record_scrape(
        &self,
        user_pk: i64,
        request: &NewScrapeRequest,
    ) -> Result<(), StoreError>;
}

/// SQLite implementation of [`UserStore`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to the database, creating the file and schema if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the schema
    /// cannot be created.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                telegram_id INTEGER NOT NULL UNIQUE,
                language TEXT NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scrape_requests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                kind TEXT NOT NULL,
                link TEXT NOT NULL,
                title TEXT NOT NULL,
                user_count INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// The stored scrape history of one user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn scrape_requests(
        &self,
        user_pk: i64,
    ) -> Result<Vec<StoredScrapeRequest>, StoreError> {
        let rows = sqlx::query(
            "SELECT kind, link, title, user_count, created_at \
             FROM scrape_requests WHERE user_id = ? ORDER BY id",
        )
        .bind(user_pk)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| StoredScrapeRequest {
                kind: row.get("kind"),
                link: row.get("link"),
                title: row.get("title"),
                user_count: row.get("user_count"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn user_exists(&self, telegram_id: i64) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM users WHERE telegram_id = ?")
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn create_user(&self, telegram_id: i64, language: Language) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO users (telegram_id, language) VALUES (?, ?)")
            .bind(telegram_id)
            .bind(language.code())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn language(&self, telegram_id: i64) -> Result<Language, StoreError> {
        let row = sqlx::query("SELECT language FROM users WHERE telegram_id = ?")
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::UnknownUser(telegram_id))?;

        let code: String = row.get("language");
        Ok(Language::from_code(&code).unwrap_or_else(|| {
            warn!("user {telegram_id} has unsupported language `{code}`, using default");
            Language::default()
        }))
    }

    async fn set_language(&self, telegram_id: i64, language: Language) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET language = ? WHERE telegram_id = ?")
            .bind(language.code())
            .bind(telegram_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownUser(telegram_id));
        }
        Ok(())
    }

    async fn user_pk(&self, telegram_id: i64) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT id FROM users WHERE telegram_id = ?")
            .bind(telegram_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::UnknownUser(telegram_id))?;
        Ok(row.get("id"))
    }

    async fn record_scrape(
        &self,
        user_pk: i64,
        request: &NewScrapeRequest,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO scrape_requests (user_id, kind, link, title, user_count, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user_pk)
        .bind(request.kind.as_str())
        .bind(&request.link)
        .bind(&request.title)
        .bind(request.user_count)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> SqliteStore {
        let path = std::env::temp_dir().join(format!(
            "audience-bot-db-{}.sqlite",
            uuid::Uuid::new_v4().simple()
        ));
        SqliteStore::connect(&format!("sqlite://{}", path.display()))
            .await
            .expect("connect")
    }

    #[tokio::test]
    async fn first_contact_creates_a_user_with_the_default_language() {
        let store = temp_store().await;

        assert!(!store.user_exists(7).await.expect("exists"));
        store
            .create_user(7, Language::default())
            .await
            .expect("create");
        assert!(store.user_exists(7).await.expect("exists"));
        assert_eq!(store.language(7).await.expect("language"), Language::Ru);
    }

    #[tokio::test]
    async fn language_changes_persist() {
        let store = temp_store().await;
        store.create_user(7, Language::Ru).await.expect("create");

        store.set_language(7, Language::Ua).await.expect("set");
        assert_eq!(store.language(7).await.expect("language"), Language::Ua);
    }

    #[tokio::test]
    async fn operations_on_unknown_users_fail() {
        let store = temp_store().await;

        assert!(matches!(
            store.language(99).await,
            Err(StoreError::UnknownUser(99))
        ));
        assert!(matches!(
            store.set_language(99, Language::Ua).await,
            Err(StoreError::UnknownUser(99))
        ));
        assert!(matches!(
            store.user_pk(99).await,
            Err(StoreError::UnknownUser(99))
        ));
    }

    #[tokio::test]
    async fn scrape_history_appends_and_reads_back() {
        let store = temp_store().await;
        store.create_user(7, Language::Ru).await.expect("create");
        let pk = store.user_pk(7).await.expect("pk");

        let request = NewScrapeRequest {
            kind: EntityKind::Group,
            link: "https://t.me/acme_chat".to_string(),
            title: "Acme Chat".to_string(),
            user_count: 5,
        };
        store.record_scrape(pk, &request).await.expect("record");

        let rows = store.scrape_requests(pk).await.expect("read");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, "group");
        assert_eq!(rows[0].title, "Acme Chat");
        assert_eq!(rows[0].user_count, 5);
        assert!(!rows[0].created_at.is_empty());
    }

    #[tokio::test]
    async fn scrape_rows_require_an_existing_user() {
        let store = temp_store().await;

        let request = NewScrapeRequest {
            kind: EntityKind::Channel,
            link: "https://t.me/acme_news".to_string(),
            title: "Acme News".to_string(),
            user_count: 3,
        };
        let result = store.record_scrape(12345, &request).await;
        assert!(matches!(result, Err(StoreError::Database(_))));
    }
}
