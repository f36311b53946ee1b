pub mod health_handler;
pub mod leaderboard_handler;
pub mod progression_handler;
pub mod user_handler;

pub use health_handler::health_check;
pub use leaderboard_handler::get_leaderboard;
pub use progression_handler::{complete_lesson, submit_quiz_attempt};
pub use user_handler::{get_user_path_progress, get_user_stats, register_user};
