use serde::{Deserialize, Serialize};

use crate::models::Category;

/// Per-category slice of an analytics summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category: Category,
    pub count: i64,
    /// Share of all traces, rounded to one decimal place.
    pub percentage: f64,
}

/// Aggregate statistics over the whole trace collection.
///
/// `by_category` lists only categories that actually have traces, in
/// canonical category order. An empty collection yields zero totals and
/// an empty list rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub total_traces: i64,
    pub by_category: Vec<CategoryStat>,
    pub avg_response_time_ms: f64,
}
