use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Category;

/// One recorded support interaction.
///
/// Traces are classified once at ingestion and immutable afterwards;
/// nothing in the system updates or re-labels a stored trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    pub id: Uuid,
    pub user_message: String,
    pub bot_response: String,
    pub category: Category,
    /// Assigned by the store at insertion (the seeder backdates it).
    pub timestamp: DateTime<Utc>,
    /// Wall-clock latency of the bot response, as measured by the caller.
    pub response_time_ms: i64,
}

/// Input for [`crate::store::append_trace`]: everything except the id and
/// timestamp, which the store assigns.
#[derive(Debug, Clone)]
pub struct NewTrace {
    pub user_message: String,
    pub bot_response: String,
    pub category: Category,
    pub response_time_ms: i64,
}
