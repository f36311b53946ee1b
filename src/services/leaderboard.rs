use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    errors::{AppError, AppResult},
    models::domain::User,
    models::dto::response::{LeaderboardEntry, LeaderboardPage},
    repositories::{QuizAttemptRepository, UserRepository},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timeframe {
    All,
    Weekly,
    Monthly,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::All => "all",
            Timeframe::Weekly => "weekly",
            Timeframe::Monthly => "monthly",
        }
    }

    fn window_days(&self) -> Option<i64> {
        match self {
            Timeframe::All => None,
            Timeframe::Weekly => Some(7),
            Timeframe::Monthly => Some(30),
        }
    }
}

impl FromStr for Timeframe {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(Timeframe::All),
            "weekly" => Ok(Timeframe::Weekly),
            "monthly" => Ok(Timeframe::Monthly),
            other => Err(AppError::InvalidSubmission(format!(
                "Unknown leaderboard timeframe '{}'",
                other
            ))),
        }
    }
}

/// Deterministic ordering key: XP descending, then user id ascending so
/// equal totals always land in the same relative order.
pub fn order_for_ranking(users: &mut [User]) {
    users.sort_by(|a, b| b.total_xp.cmp(&a.total_xp).then_with(|| a.id.cmp(&b.id)));
}

/// Read-only, eventually-consistent ranking over the user aggregates.
///
/// Windowed timeframes restrict the candidate set to users with recent quiz
/// activity but still order by all-time XP. That mirrors the production
/// behavior this service replaces; windowed XP sums are a known possible
/// follow-up, not an oversight.
pub struct LeaderboardRanker {
    users: Arc<dyn UserRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
}

impl LeaderboardRanker {
    pub fn new(users: Arc<dyn UserRepository>, attempts: Arc<dyn QuizAttemptRepository>) -> Self {
        Self { users, attempts }
    }

    pub async fn rank(
        &self,
        timeframe: Timeframe,
        page: u32,
        page_size: u32,
    ) -> AppResult<LeaderboardPage> {
        let mut candidates = self.users.find_all().await?;

        if let Some(days) = timeframe.window_days() {
            let cutoff = Utc::now() - Duration::days(days);
            let active: HashSet<String> = self
                .attempts
                .user_ids_active_since(cutoff)
                .await?
                .into_iter()
                .collect();
            candidates.retain(|user| active.contains(&user.id));
        }

        order_for_ranking(&mut candidates);

        let total_count = candidates.len() as u64;
        let page = page.max(1);
        let page_size = page_size.max(1);
        let start = (page as usize - 1) * page_size as usize;

        let entries = candidates
            .into_iter()
            .enumerate()
            .skip(start)
            .take(page_size as usize)
            .map(|(index, user)| LeaderboardEntry {
                rank: index as u64 + 1,
                user_id: user.id,
                display_name: user.display_name,
                total_xp: user.total_xp,
                level: user.level,
                streak: user.streak,
            })
            .collect();

        Ok(LeaderboardPage {
            entries,
            total_count,
            page,
            page_size,
            timeframe: timeframe.as_str().to_string(),
        })
    }
}
