use crate::composer::draft::{SavedDraft, Section};
use crate::delivery::DraftSink;
use crate::error::{ComposerError, Result};
use crate::template::{Template, TemplateStore, Theme};
use anyhow::Context;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub mod types;
pub use types::StoredDraft;

const ACTIVE_TEMPLATE_KEY: &str = "active_template";
const THEME_KEY: &str = "theme";

/// SQLite store for templates, theme settings and saved drafts
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Create a new store instance
    ///
    /// Uses `COMPOSER_DB` when set, otherwise a database file in the user's
    /// data directory.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("COMPOSER_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "campaign-composer", "campaign-composer")
            .ok_or_else(|| ComposerError::Store("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| ComposerError::Store(e.to_string()))?;

        let store = Self {
            db_path: data_dir.join("composer.db"),
        };
        store.init()?;

        Ok(store)
    }

    /// Create a store backed by the given database file
    ///
    /// # Examples
    ///
    /// ```
    /// use campaign_composer::storage::SqliteStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SqliteStore::new_with_path(dir.path().join("composer.db")).unwrap();
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| ComposerError::Store(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Open the configured database, or the default one
    pub fn open(db_path: Option<&Path>) -> Result<Self> {
        match db_path {
            Some(path) => Self::new_with_path(path),
            None => Self::new(),
        }
    }

    /// Path of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| ComposerError::Store(e.to_string()))?)
    }

    fn init(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS templates (
                name TEXT PRIMARY KEY,
                html TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS drafts (
                id TEXT PRIMARY KEY,
                section TEXT NOT NULL,
                subject TEXT NOT NULL,
                preheader TEXT NOT NULL,
                html TEXT NOT NULL,
                saved_at TEXT NOT NULL
            );",
        )
        .context("Failed to create tables")
        .map_err(|e| ComposerError::Store(e.to_string()))?;

        Ok(())
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        Ok(conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query setting")
            .map_err(|e| ComposerError::Store(e.to_string()))?)
    }

    fn put_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .context("Failed to write setting")
        .map_err(|e| ComposerError::Store(e.to_string()))?;
        Ok(())
    }

    /// Most recently saved drafts first
    pub fn list_drafts(&self, limit: usize) -> Result<Vec<StoredDraft>> {
        let conn = self.connect()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, section, subject, preheader, html, saved_at
                FROM drafts
                ORDER BY saved_at DESC
                LIMIT ?",
            )
            .context("Failed to prepare statement")
            .map_err(|e| ComposerError::Store(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit as i64], row_to_draft)
            .context("Failed to query drafts")
            .map_err(|e| ComposerError::Store(e.to_string()))?;

        Ok(rows.flatten().collect())
    }

    /// Load a draft by id (full UUID or prefix)
    pub fn get_draft(&self, id: &str) -> Result<Option<StoredDraft>> {
        let conn = self.connect()?;

        let (query, param) = if id.len() == 36 {
            (
                "SELECT id, section, subject, preheader, html, saved_at FROM drafts WHERE id = ?",
                id.to_string(),
            )
        } else {
            (
                "SELECT id, section, subject, preheader, html, saved_at FROM drafts
                WHERE id LIKE ? ORDER BY saved_at DESC LIMIT 1",
                format!("{}%", id),
            )
        };

        Ok(conn
            .query_row(query, params![param], row_to_draft)
            .optional()
            .context("Failed to query draft")
            .map_err(|e| ComposerError::Store(e.to_string()))?)
    }
}

fn row_to_draft(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredDraft> {
    let section: String = row.get(1)?;
    let saved_at: String = row.get(5)?;
    Ok(StoredDraft {
        id: row.get(0)?,
        section: Section::parse_str(&section).unwrap_or_default(),
        subject: row.get(2)?,
        preheader: row.get(3)?,
        html: row.get(4)?,
        saved_at: DateTime::parse_from_rfc3339(&saved_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
    })
}

impl TemplateStore for SqliteStore {
    fn save_template(&self, template: &Template) -> Result<()> {
        let template = Template::new(&template.name, template.html.clone())?;
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO templates (name, html, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET html = excluded.html, updated_at = excluded.updated_at",
            params![template.name, template.html, Utc::now().to_rfc3339()],
        )
        .context("Failed to save template")
        .map_err(|e| ComposerError::Store(e.to_string()))?;
        tracing::debug!("Saved template {}", template.name);
        Ok(())
    }

    fn delete_template(&self, name: &str) -> Result<bool> {
        let conn = self.connect()?;
        let removed = conn
            .execute("DELETE FROM templates WHERE name = ?", params![name.trim()])
            .context("Failed to delete template")
            .map_err(|e| ComposerError::Store(e.to_string()))?;
        Ok(removed > 0)
    }

    fn list_templates(&self) -> Result<Vec<Template>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT name, html FROM templates ORDER BY name")
            .context("Failed to prepare statement")
            .map_err(|e| ComposerError::Store(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Template {
                    name: row.get(0)?,
                    html: row.get(1)?,
                })
            })
            .context("Failed to query templates")
            .map_err(|e| ComposerError::Store(e.to_string()))?;

        Ok(rows.flatten().collect())
    }

    fn set_active_template(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ComposerError::Validation("Name required".to_string()).into());
        }
        self.put_setting(ACTIVE_TEMPLATE_KEY, name)
    }

    fn active_template(&self) -> Result<Option<String>> {
        self.get_setting(ACTIVE_TEMPLATE_KEY)
    }

    fn load_theme(&self) -> Result<Theme> {
        let stored = match self.get_setting(THEME_KEY)? {
            Some(json) => serde_json::from_str::<BTreeMap<String, String>>(&json)
                .context("Failed to deserialize theme")
                .map_err(|e| ComposerError::Store(e.to_string()))?,
            None => BTreeMap::new(),
        };
        Ok(Theme::from_stored(stored))
    }

    fn save_theme(&self, theme: &Theme) -> Result<()> {
        let json = serde_json::to_string(theme.settings())
            .context("Failed to serialize theme")
            .map_err(|e| ComposerError::Store(e.to_string()))?;
        self.put_setting(THEME_KEY, &json)
    }

    fn reset_theme(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM settings WHERE key = ?", params![THEME_KEY])
            .context("Failed to reset theme")
            .map_err(|e| ComposerError::Store(e.to_string()))?;
        Ok(())
    }
}

impl DraftSink for SqliteStore {
    fn save_draft(&self, draft: &SavedDraft) -> Result<String> {
        let mut conn = self.connect()?;
        let now = Utc::now().to_rfc3339();

        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| ComposerError::Store(e.to_string()))?;

        let existing = match &draft.id {
            Some(id) => tx
                .query_row("SELECT id FROM drafts WHERE id = ?", params![id], |row| {
                    row.get::<_, String>(0)
                })
                .optional()
                .context("Failed to query draft")
                .map_err(|e| ComposerError::Store(e.to_string()))?,
            None => None,
        };

        let id = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE drafts SET section = ?, subject = ?, preheader = ?, html = ?, saved_at = ?
                    WHERE id = ?",
                    params![
                        draft.section.key(),
                        draft.subject,
                        draft.preheader,
                        draft.html,
                        now,
                        id
                    ],
                )
                .context("Failed to update draft")
                .map_err(|e| ComposerError::Store(e.to_string()))?;
                id
            }
            None => {
                let id = draft
                    .id
                    .clone()
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
                tx.execute(
                    "INSERT INTO drafts (id, section, subject, preheader, html, saved_at)
                    VALUES (?, ?, ?, ?, ?, ?)",
                    params![
                        id,
                        draft.section.key(),
                        draft.subject,
                        draft.preheader,
                        draft.html,
                        now
                    ],
                )
                .context("Failed to insert draft")
                .map_err(|e| ComposerError::Store(e.to_string()))?;
                id
            }
        };

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| ComposerError::Store(e.to_string()))?;

        tracing::info!("Saved draft {}", id);
        Ok(id)
    }
}
