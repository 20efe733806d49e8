//! Aggregate rows for the dashboard endpoints.

use coursemart_core::types::Cents;
use serde::Serialize;
use sqlx::FromRow;

/// Learning stats for any user.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct StudentStats {
    pub enrolled_courses: i64,
    pub completed_courses: i64,
    pub in_progress_courses: i64,
    pub average_progress: f64,
}

/// Teaching/sales stats for creators.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct CreatorStats {
    pub total_courses: i64,
    pub published_courses: i64,
    pub total_students: i64,
    pub completed_sales: i64,
    pub revenue_cents: Cents,
}
