pub mod achievement_evaluator;
pub mod leaderboard;
pub mod path_progress;
pub mod progression_ledger;
pub mod progression_service;
pub mod score_calculator;
pub mod streak_tracker;

pub use achievement_evaluator::{AchievementEvaluator, StatsSnapshot};
pub use leaderboard::{LeaderboardRanker, Timeframe};
pub use path_progress::PathProgressTracker;
pub use progression_ledger::ProgressionLedger;
pub use progression_service::ProgressionService;
pub use score_calculator::ScoreCalculator;
pub use streak_tracker::StreakTracker;
