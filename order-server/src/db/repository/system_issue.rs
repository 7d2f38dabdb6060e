//! System Issue Repository

use super::{RepoError, RepoResult};
use shared::models::{SystemIssue, SystemIssueCreate};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, source, kind, title, description, params, status, created_at";

pub async fn create(pool: &SqlitePool, data: SystemIssueCreate) -> RepoResult<SystemIssue> {
    let now = shared::util::now_millis();
    let params_json = serde_json::to_string(&data.params).unwrap_or_else(|_| "{}".to_string());

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO system_issue (source, kind, title, description, params, status, created_at) \
         VALUES (?, ?, ?, ?, ?, 'pending', ?) RETURNING id",
    )
    .bind(&data.source)
    .bind(&data.kind)
    .bind(&data.title)
    .bind(&data.description)
    .bind(&params_json)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create system_issue".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<SystemIssue>> {
    let issue =
        sqlx::query_as::<_, SystemIssue>(&format!("SELECT {COLUMNS} FROM system_issue WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(issue)
}

pub async fn find_pending(pool: &SqlitePool) -> RepoResult<Vec<SystemIssue>> {
    let issues = sqlx::query_as::<_, SystemIssue>(&format!(
        "SELECT {COLUMNS} FROM system_issue WHERE status = 'pending' ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(issues)
}
