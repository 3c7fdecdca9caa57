//! CSV export of scraped audiences.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use super::source::{AudienceUser, EntityInfo};

/// The eight export columns. Fixed for both entity kinds.
pub const CSV_HEADER: [&str; 8] = [
    "username",
    "user id",
    "access hash",
    "first name",
    "last name",
    "phone",
    "group name",
    "group id",
];

/// Errors that can occur while writing an export file
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization failure
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    /// Filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A finished export, ready for delivery and subsequent removal.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Where the file lives on disk; uuid-suffixed so that concurrent scrapes
    /// of same-titled entities cannot clobber each other
    pub path: PathBuf,
    /// Clean name the document is delivered under
    pub file_name: String,
    /// The entity the export was built from
    pub entity: EntityInfo,
    /// Number of data rows written
    pub user_count: usize,
}

/// Write `users` to `<dir>/<sanitized title>-<uuid8>.csv` in enumeration
/// order: one header row, then one row per user, UTF-8, empty cells for
/// absent optional fields.
pub fn export_users(
    dir: &Path,
    entity: &EntityInfo,
    users: &[AudienceUser],
) -> Result<Artifact, ExportError> {
    let stem = sanitize_title(&entity.title);
    let suffix = Uuid::new_v4().simple().to_string();
    let path = dir.join(format!("{stem}-{}.csv", &suffix[..8]));

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(CSV_HEADER)?;
    let entity_id = entity.id.to_string();
    for user in users {
        let user_id = user.id.to_string();
        let access_hash = user.access_hash.map(|h| h.to_string()).unwrap_or_default();
        writer.write_record([
            user.username.as_deref().unwrap_or(""),
            user_id.as_str(),
            access_hash.as_str(),
            user.first_name.as_deref().unwrap_or(""),
            user.last_name.as_deref().unwrap_or(""),
            user.phone.as_deref().unwrap_or(""),
            entity.title.as_str(),
            entity_id.as_str(),
        ])?;
    }
    writer.flush()?;

    Ok(Artifact {
        path,
        file_name: format!("{stem}.csv"),
        entity: entity.clone(),
        user_count: users.len(),
    })
}

/// Entity titles end up in file names; keep letters, digits, spaces and a few
/// joiners, replace the rest.
fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('.').to_string();
    if cleaned.is_empty() {
        "export".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> EntityInfo {
        EntityInfo {
            id: 42,
            title: "Acme Chat".to_string(),
        }
    }

    fn user(id: i64) -> AudienceUser {
        AudienceUser {
            id,
            username: Some(format!("user{id}")),
            access_hash: Some(id * 10),
            first_name: Some("Ann, the First".to_string()),
            last_name: None,
            phone: None,
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("audience-bot-{}", Uuid::new_v4().simple()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn writes_header_and_rows_in_order() {
        let dir = temp_dir();
        let artifact =
            export_users(&dir, &entity(), &[user(1), user(2)]).expect("export");

        let content = std::fs::read_to_string(&artifact.path).expect("read back");
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("username,user id,access hash,first name,last name,phone,group name,group id")
        );
        // Comma inside a field gets quoted, empty optionals stay empty
        assert_eq!(
            lines.next(),
            Some("user1,1,10,\"Ann, the First\",,,Acme Chat,42")
        );
        assert_eq!(
            lines.next(),
            Some("user2,2,20,\"Ann, the First\",,,Acme Chat,42")
        );
        assert_eq!(lines.next(), None);
        assert_eq!(artifact.user_count, 2);
        assert_eq!(artifact.file_name, "Acme Chat.csv");

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn same_title_exports_get_distinct_paths() {
        let dir = temp_dir();
        let first = export_users(&dir, &entity(), &[user(1)]).expect("export");
        let second = export_users(&dir, &entity(), &[user(1)]).expect("export");
        assert_ne!(first.path, second.path);
        assert_eq!(first.file_name, second.file_name);

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn empty_audience_still_produces_a_header() {
        let dir = temp_dir();
        let artifact = export_users(&dir, &entity(), &[]).expect("export");
        let content = std::fs::read_to_string(&artifact.path).expect("read back");
        assert_eq!(content.lines().count(), 1);
        assert_eq!(artifact.user_count, 0);

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn hostile_titles_are_tamed() {
        assert_eq!(sanitize_title("Acme Chat"), "Acme Chat");
        assert_eq!(sanitize_title("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_title("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_title("⚡ Новости"), "_ Новости");
        assert_eq!(sanitize_title(""), "export");
    }
}
