pub mod achievement_repository;
pub mod enrollment_repository;
pub mod learning_path_repository;
pub mod lesson_progress_repository;
pub mod lesson_repository;
pub mod quiz_attempt_repository;
pub mod quiz_repository;
pub mod user_repository;

pub use achievement_repository::{
    AchievementRepository, MongoAchievementRepository, MongoUserAchievementRepository,
    UserAchievementRepository,
};
pub use enrollment_repository::{EnrollmentRepository, MongoEnrollmentRepository};
pub use learning_path_repository::{LearningPathRepository, MongoLearningPathRepository};
pub use lesson_progress_repository::{LessonProgressRepository, MongoLessonProgressRepository};
pub use lesson_repository::{LessonRepository, MongoLessonRepository};
pub use quiz_attempt_repository::{MongoQuizAttemptRepository, QuizAttemptRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
