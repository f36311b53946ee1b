mod common;

use chrono::{Duration, Utc};

use common::TestHarness;
use trainme_server::{
    models::domain::{QuizAttempt, User},
    repositories::{QuizAttemptRepository, UserRepository},
    services::Timeframe,
};

async fn seed_ranked_user(harness: &TestHarness, id: &str, total_xp: u64) {
    let mut user = User::new(id, id);
    user.total_xp = total_xp;
    harness
        .users
        .create(user)
        .await
        .expect("user creation should succeed");
}

async fn seed_attempt(harness: &TestHarness, user_id: &str, days_ago: i64) {
    let attempt = QuizAttempt {
        id: format!("{}-attempt-{}", user_id, days_ago),
        user_id: user_id.to_string(),
        quiz_id: "quiz-1".to_string(),
        answers: vec![],
        raw_score: 1,
        total_questions: 1,
        time_spent_seconds: 60,
        xp_earned: 10,
        xp_awarded: true,
        completed_at: Utc::now() - Duration::days(days_ago),
    };
    harness
        .attempts
        .create(attempt)
        .await
        .expect("attempt creation should succeed");
}

#[tokio::test]
async fn all_time_board_orders_by_xp_descending() {
    let harness = TestHarness::new(vec![], vec![], vec![], vec![]);
    seed_ranked_user(&harness, "casey", 50).await;
    seed_ranked_user(&harness, "blair", 200).await;
    seed_ranked_user(&harness, "alex", 120).await;

    let page = harness
        .leaderboard
        .rank(Timeframe::All, 1, 20)
        .await
        .expect("ranking should succeed");

    assert_eq!(page.total_count, 3);
    assert_eq!(page.timeframe, "all");
    let ids: Vec<&str> = page.entries.iter().map(|e| e.user_id.as_str()).collect();
    assert_eq!(ids, vec!["blair", "alex", "casey"]);
    let ranks: Vec<u64> = page.entries.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[tokio::test]
async fn equal_totals_rank_in_stable_id_order() {
    let harness = TestHarness::new(vec![], vec![], vec![], vec![]);
    seed_ranked_user(&harness, "zeta", 100).await;
    seed_ranked_user(&harness, "alpha", 100).await;
    seed_ranked_user(&harness, "mid", 100).await;

    for _ in 0..3 {
        let page = harness
            .leaderboard
            .rank(Timeframe::All, 1, 20)
            .await
            .expect("ranking should succeed");
        let ids: Vec<&str> = page.entries.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
    }
}

#[tokio::test]
async fn ranks_continue_across_pages() {
    let harness = TestHarness::new(vec![], vec![], vec![], vec![]);
    for n in 1..=5 {
        seed_ranked_user(&harness, &format!("user-{}", n), n * 100).await;
    }

    let first = harness
        .leaderboard
        .rank(Timeframe::All, 1, 2)
        .await
        .expect("ranking should succeed");
    assert_eq!(first.total_count, 5);
    assert_eq!(first.entries.len(), 2);
    assert_eq!(first.entries[0].rank, 1);
    assert_eq!(first.entries[0].user_id, "user-5");
    assert_eq!(first.entries[1].rank, 2);

    let second = harness
        .leaderboard
        .rank(Timeframe::All, 2, 2)
        .await
        .expect("ranking should succeed");
    assert_eq!(second.total_count, 5);
    assert_eq!(second.entries[0].rank, 3);
    assert_eq!(second.entries[0].user_id, "user-3");
    assert_eq!(second.entries[1].rank, 4);

    let past_the_end = harness
        .leaderboard
        .rank(Timeframe::All, 4, 2)
        .await
        .expect("ranking should succeed");
    assert!(past_the_end.entries.is_empty());
    assert_eq!(past_the_end.total_count, 5);
}

#[tokio::test]
async fn weekly_board_drops_users_without_recent_attempts() {
    let harness = TestHarness::new(vec![], vec![], vec![], vec![]);
    // Highest all-time XP but idle for weeks.
    seed_ranked_user(&harness, "veteran", 900).await;
    seed_attempt(&harness, "veteran", 20).await;
    seed_ranked_user(&harness, "regular", 300).await;
    seed_attempt(&harness, "regular", 1).await;
    seed_ranked_user(&harness, "newcomer", 40).await;
    seed_attempt(&harness, "newcomer", 2).await;

    let weekly = harness
        .leaderboard
        .rank(Timeframe::Weekly, 1, 20)
        .await
        .expect("ranking should succeed");

    assert_eq!(weekly.total_count, 2);
    let ids: Vec<&str> = weekly.entries.iter().map(|e| e.user_id.as_str()).collect();
    assert_eq!(ids, vec!["regular", "newcomer"]);
}

#[tokio::test]
async fn monthly_window_is_wider_than_weekly() {
    let harness = TestHarness::new(vec![], vec![], vec![], vec![]);
    seed_ranked_user(&harness, "veteran", 900).await;
    seed_attempt(&harness, "veteran", 20).await;
    seed_ranked_user(&harness, "regular", 300).await;
    seed_attempt(&harness, "regular", 1).await;

    let monthly = harness
        .leaderboard
        .rank(Timeframe::Monthly, 1, 20)
        .await
        .expect("ranking should succeed");

    assert_eq!(monthly.total_count, 2);
    // Candidates are filtered by the window but still ordered by all-time XP.
    let ids: Vec<&str> = monthly.entries.iter().map(|e| e.user_id.as_str()).collect();
    assert_eq!(ids, vec!["veteran", "regular"]);
}

#[tokio::test]
async fn windowed_board_with_no_activity_is_empty() {
    let harness = TestHarness::new(vec![], vec![], vec![], vec![]);
    seed_ranked_user(&harness, "idle", 500).await;

    let weekly = harness
        .leaderboard
        .rank(Timeframe::Weekly, 1, 20)
        .await
        .expect("ranking should succeed");

    assert!(weekly.entries.is_empty());
    assert_eq!(weekly.total_count, 0);
}
