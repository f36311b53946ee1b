use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Per-user progression aggregate. `total_xp` and `streak` are the raw
/// counters; `level` is a cached derivation of `total_xp` and is rewritten on
/// every XP change, never trusted as an independent source of truth.
///
/// `version` is the optimistic-concurrency token: every write bumps it, and
/// conditional updates match on the value read.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub total_xp: u64,
    pub level: u32,
    pub streak: u32,
    pub last_active_date: Option<NaiveDate>,
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(id: &str, display_name: &str) -> Self {
        User {
            id: id.to_string(),
            display_name: display_name.to_string(),
            total_xp: 0,
            level: 1,
            streak: 0,
            last_active_date: None,
            version: 0,
            created_at: Some(Utc::now()),
        }
    }
}
