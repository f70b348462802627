// src/core/database.rs
//! Local archive of finished briefs (SQLite)

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

use crate::core::FsOps;
use crate::session::SessionId;

// ===== Core Database Connection Management =====

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the archive and run migrations
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            FsOps::ensure_dir_exists(parent).await?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!("Database connection established: {}", database_path.display());

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn briefs(&self) -> BriefRepository<'_> {
        BriefRepository::new(&self.pool)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS briefs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL UNIQUE,
                title TEXT,
                language TEXT NOT NULL,
                seniority TEXT NOT NULL,
                sections TEXT NOT NULL,
                markdown TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create briefs table")?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_briefs_created_at ON briefs(created_at);")
            .execute(&self.pool)
            .await?;

        info!("Database migrations completed");
        Ok(())
    }
}

// ===== Brief Models =====

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BriefRecord {
    pub id: i64,
    pub session_id: String,
    pub title: Option<String>,
    pub language: String,
    pub seniority: String,
    /// Comma-separated section slugs
    pub sections: String,
    pub markdown: String,
    pub created_at: DateTime<Utc>,
}

impl BriefRecord {
    pub fn section_slugs(&self) -> Vec<&str> {
        self.sections.split(',').filter(|s| !s.is_empty()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct NewBrief {
    pub session_id: SessionId,
    pub title: Option<String>,
    pub language: String,
    pub seniority: String,
    pub sections: Vec<String>,
    pub markdown: String,
}

// ===== Brief Repository =====

pub struct BriefRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BriefRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a finished brief. Saving the same session twice keeps the
    /// latest document.
    pub async fn save(&self, brief: &NewBrief) -> Result<BriefRecord> {
        let now = Utc::now();
        let session_id = brief.session_id.to_string();

        sqlx::query(
            r#"
            INSERT INTO briefs (session_id, title, language, seniority, sections, markdown, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(session_id) DO UPDATE SET
                title = excluded.title,
                language = excluded.language,
                seniority = excluded.seniority,
                sections = excluded.sections,
                markdown = excluded.markdown,
                created_at = excluded.created_at
            "#,
        )
        .bind(&session_id)
        .bind(&brief.title)
        .bind(&brief.language)
        .bind(&brief.seniority)
        .bind(brief.sections.join(","))
        .bind(&brief.markdown)
        .bind(now)
        .execute(self.pool)
        .await
        .context("Failed to save brief")?;

        info!("Archived brief for session {}", session_id);

        self.find_by_session(&session_id)
            .await?
            .context("Saved brief could not be read back")
    }

    pub async fn find_by_session(&self, session_id: &str) -> Result<Option<BriefRecord>> {
        let record = sqlx::query_as::<_, BriefRecord>(
            r#"
            SELECT id, session_id, title, language, seniority, sections, markdown, created_at
            FROM briefs
            WHERE session_id = ?
            "#,
        )
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Most recent briefs first
    pub async fn list(&self, limit: u32) -> Result<Vec<BriefRecord>> {
        let records = sqlx::query_as::<_, BriefRecord>(
            r#"
            SELECT id, session_id, title, language, seniority, sections, markdown, created_at
            FROM briefs
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }
}
