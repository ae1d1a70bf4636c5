//! Audit log collaborator: append-only, one human-readable entry per
//! state-changing action. Failures never reach the caller.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn insert_log(&self, message: &str);
}

pub struct SqliteAuditLog {
    db: SqlitePool,
}

impl SqliteAuditLog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditLog for SqliteAuditLog {
    async fn insert_log(&self, message: &str) {
        let id = Uuid::new_v4().to_string();
        let logged_at = Utc::now().to_rfc3339();
        let result = sqlx::query("INSERT INTO audit_log (id, message, logged_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(message)
            .bind(&logged_at)
            .execute(&self.db)
            .await;
        if let Err(err) = result {
            warn!("failed to write audit log entry: {err}");
        }
    }
}

/// Discards every entry. Used in tests.
pub struct NoopAuditLog;

#[async_trait]
impl AuditLog for NoopAuditLog {
    async fn insert_log(&self, _message: &str) {}
}
