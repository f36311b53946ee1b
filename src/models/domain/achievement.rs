use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Achievement catalog entry. Conditions are declarative predicates over a
/// user's cumulative stats, stored alongside the content so new achievements
/// can be seeded without code changes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub xp_reward: u64,
    pub condition: AchievementCondition,
}

/// The closed set of supported condition types. The serialized form matches
/// the seeded catalog: `{"type": "streak", "days": 7}` and so on.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AchievementCondition {
    /// Total quiz attempts recorded for the user reaches `count`.
    QuizCompletion { count: u64 },
    /// Completed lessons reach `count`, optionally restricted to one
    /// category; `"all"` means every lesson in that category.
    LessonCompletion {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
        count: LessonTarget,
    },
    /// Current consecutive-day streak reaches `days`.
    Streak { days: u32 },
    /// Any attempt with a full score.
    QuizPerfectScore {},
    /// Any attempt finished within the time limit.
    QuizSpeed { time_limit_seconds: u32 },
}

/// Either a fixed lesson count or the keyword `"all"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LessonTarget {
    Count(u64),
    All,
}

impl Serialize for LessonTarget {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            LessonTarget::Count(n) => serializer.serialize_u64(*n),
            LessonTarget::All => serializer.serialize_str("all"),
        }
    }
}

impl<'de> Deserialize<'de> for LessonTarget {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u64),
            Keyword(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(LessonTarget::Count(n)),
            Raw::Keyword(s) if s == "all" => Ok(LessonTarget::All),
            Raw::Keyword(s) => Err(serde::de::Error::custom(format!(
                "unknown lesson completion target '{}'",
                s
            ))),
        }
    }
}

/// Join record marking an unlock. At most one exists per
/// (user_id, achievement_id) pair, enforced by a unique compound index.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserAchievement {
    pub user_id: String,
    pub achievement_id: String,
    pub unlocked_at: DateTime<Utc>,
}

impl UserAchievement {
    pub fn new(user_id: &str, achievement_id: &str) -> Self {
        UserAchievement {
            user_id: user_id.to_string(),
            achievement_id: achievement_id.to_string(),
            unlocked_at: Utc::now(),
        }
    }
}
