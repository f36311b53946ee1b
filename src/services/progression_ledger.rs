use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    repositories::UserRepository,
};

/// Level is pure arithmetic over lifetime XP: 100 XP per level, starting at
/// level 1. The stored `level` field is only ever a cache of this function.
pub fn level_for_xp(total_xp: u64) -> u32 {
    (total_xp / 100) as u32 + 1
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XpApplied {
    pub total_xp: u64,
    pub level: u32,
    pub leveled_up: bool,
}

/// Applies non-negative XP deltas to a user's total with optimistic
/// concurrency: read, recompute, conditional write, retry on lost race.
/// Totals are monotonically non-decreasing; this type has no way to subtract.
pub struct ProgressionLedger {
    users: Arc<dyn UserRepository>,
    max_retries: u32,
}

impl ProgressionLedger {
    pub fn new(users: Arc<dyn UserRepository>, max_retries: u32) -> Self {
        Self { users, max_retries }
    }

    pub async fn apply_xp(&self, user_id: &str, delta: u64) -> AppResult<XpApplied> {
        for attempt in 0..self.max_retries.max(1) {
            let mut user = self
                .users
                .find_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))?;

            let old_level = level_for_xp(user.total_xp);
            let expected_version = user.version;

            user.total_xp += delta;
            user.level = level_for_xp(user.total_xp);
            user.version += 1;

            if self.users.update_if_version(&user, expected_version).await? {
                return Ok(XpApplied {
                    total_xp: user.total_xp,
                    level: user.level,
                    leveled_up: user.level > old_level,
                });
            }

            log::warn!(
                "XP update for user '{}' lost the race (attempt {}), retrying",
                user_id,
                attempt + 1
            );
        }

        Err(AppError::ConcurrencyConflict(format!(
            "Could not apply XP for user '{}' after {} attempts",
            user_id, self.max_retries
        )))
    }
}
