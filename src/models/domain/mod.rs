pub mod achievement;
pub mod events;
pub mod learning_path;
pub mod lesson;
pub mod quiz;
pub mod quiz_attempt;
pub mod user;

pub use achievement::{Achievement, AchievementCondition, LessonTarget, UserAchievement};
pub use events::ProgressionEvent;
pub use learning_path::{LearningPath, PathEnrollment};
pub use lesson::{Lesson, LessonCompletion};
pub use quiz::{Quiz, QuizOption, QuizQuestion};
pub use quiz_attempt::{AnswerRecord, QuizAttempt};
pub use user::User;
