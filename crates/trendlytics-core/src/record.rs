use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the pre-aggregated daily product snapshot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendRecord {
    pub timestamp: DateTime<Utc>,
    /// Cumulative product count as of this snapshot.
    pub total_so_far: i64,
    pub added: i64,
    pub removed: i64,
}

/// One visit from the append-only visitor log. Only the timestamp matters
/// for bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
}
