use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    errors::{AppError, AppResult},
    repositories::UserRepository,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreakState {
    pub streak: u32,
    pub last_active_date: NaiveDate,
}

/// Streak transition over UTC calendar dates. Multiple activities on the
/// same day count once, a one-day step extends the streak, any larger gap
/// resets it, and out-of-order dates (retries, clock skew) are ignored so a
/// streak can never be corrupted downward.
pub fn advance_streak(
    last_active_date: Option<NaiveDate>,
    streak: u32,
    activity_date: NaiveDate,
) -> StreakState {
    let Some(last_active) = last_active_date else {
        return StreakState {
            streak: 1,
            last_active_date: activity_date,
        };
    };

    if activity_date <= last_active {
        return StreakState {
            streak: streak.max(1),
            last_active_date: last_active,
        };
    }

    let gap_days = (activity_date - last_active).num_days();
    StreakState {
        streak: if gap_days == 1 { streak + 1 } else { 1 },
        last_active_date: activity_date,
    }
}

/// Persists streak transitions with the same conditional-write retry loop
/// the ledger uses.
pub struct StreakTracker {
    users: Arc<dyn UserRepository>,
    max_retries: u32,
}

impl StreakTracker {
    pub fn new(users: Arc<dyn UserRepository>, max_retries: u32) -> Self {
        Self { users, max_retries }
    }

    pub async fn record_activity(
        &self,
        user_id: &str,
        activity_date: NaiveDate,
    ) -> AppResult<StreakState> {
        for _ in 0..self.max_retries.max(1) {
            let mut user = self
                .users
                .find_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))?;

            let next = advance_streak(user.last_active_date, user.streak, activity_date);

            if user.last_active_date == Some(next.last_active_date) && user.streak == next.streak {
                return Ok(next);
            }

            let expected_version = user.version;
            user.streak = next.streak;
            user.last_active_date = Some(next.last_active_date);
            user.version += 1;

            if self.users.update_if_version(&user, expected_version).await? {
                return Ok(next);
            }

            log::warn!("Streak update for user '{}' lost the race, retrying", user_id);
        }

        Err(AppError::ConcurrencyConflict(format!(
            "Could not record activity for user '{}' after {} attempts",
            user_id, self.max_retries
        )))
    }
}
