//! System Issue Model
//!
//! Operator-visible fault records. The reconciler files one when money was
//! taken but the order write failed, so the mismatch is never silent.

use serde::{Deserialize, Serialize};

/// System issue entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SystemIssue {
    pub id: i64,
    /// Component that raised the issue (e.g. "reconciler")
    pub source: String,
    /// Machine-readable kind (e.g. "orphan_charge")
    pub kind: String,
    pub title: String,
    pub description: String,
    /// JSON parameters for tooling (transaction id, amount, ...)
    pub params: String,
    /// "pending" | "resolved"
    pub status: String,
    pub created_at: i64,
}

/// Create system issue payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemIssueCreate {
    pub source: String,
    pub kind: String,
    pub title: String,
    pub description: String,
    pub params: serde_json::Value,
}
