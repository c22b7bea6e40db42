mod common;

use chrono::{Duration, Utc};
use common::{create_local_store, create_sql_store};
use quizotidien::db::{self, Store};
use quizotidien::models::{
    Difficulty, GlobalConfig, Question, QuestionOrigin, QuizResult, Role, User,
};

async fn both_stores() -> [Store; 2] {
    [create_sql_store().await, create_local_store()]
}

fn make_result(username: &str, score: u32, days_ago: i64) -> QuizResult {
    QuizResult {
        username: username.to_string(),
        score,
        total_questions: 6,
        date: Utc::now() - Duration::days(days_ago),
        difficulty_level: Difficulty::Easy,
    }
}

fn make_question(text: &str) -> Question {
    Question {
        id: None,
        question_text: text.to_string(),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_answer_index: 1,
        explanation: "because".to_string(),
        difficulty: Difficulty::Medium,
        source: QuestionOrigin::Ai,
    }
}

#[tokio::test]
async fn results_are_append_only_and_read_back() {
    for store in both_stores().await {
        assert!(store.get_results().await.unwrap().is_empty());

        store
            .save_result(&make_result("amina", 20, 1))
            .await
            .unwrap();
        store
            .save_result(&make_result("bilal", 10, 0))
            .await
            .unwrap();

        let results = store.get_results().await.unwrap();
        assert_eq!(results.len(), 2);
        // Newest first.
        assert_eq!(results[0].username, "bilal");
        assert_eq!(results[1].username, "amina");
        assert_eq!(results[1].score, 20);
        assert_eq!(results[1].total_questions, 6);
    }
}

#[tokio::test]
async fn save_result_stamps_last_played_date() {
    for store in both_stores().await {
        db::ensure_user(&store, "amina").await.unwrap();

        let result = make_result("amina", 20, 0);
        store.save_result(&result).await.unwrap();

        let user = store.get_user("amina").await.unwrap().unwrap();
        assert_eq!(user.last_played_date, Some(result.date.date_naive()));
    }
}

#[tokio::test]
async fn ensure_user_creates_then_returns_existing() {
    for store in both_stores().await {
        assert!(store.get_user("amina").await.unwrap().is_none());

        let created = db::ensure_user(&store, "amina").await.unwrap();
        assert_eq!(created.role, Role::User);
        assert!(created.last_played_date.is_none());

        // Second login returns the stored user instead of resetting it.
        store
            .save_user(&User {
                username: "amina".to_string(),
                role: Role::Admin,
                last_played_date: None,
            })
            .await
            .unwrap();
        let again = db::ensure_user(&store, "amina").await.unwrap();
        assert_eq!(again.role, Role::Admin);
    }
}

#[tokio::test]
async fn badge_award_is_idempotent() {
    for store in both_stores().await {
        store.award_badge("amina", "FIRST_STEP").await.unwrap();
        store.award_badge("amina", "FIRST_STEP").await.unwrap();

        let badges = store.get_user_badges("amina").await.unwrap();
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].badge_id, "FIRST_STEP");

        // Other users are unaffected.
        assert!(store.get_user_badges("bilal").await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn question_bank_insert_update_delete() {
    for store in both_stores().await {
        store.save_question(&make_question("Q1")).await.unwrap();

        let bank = store.get_question_bank().await.unwrap();
        assert_eq!(bank.len(), 1);
        let saved = &bank[0];
        assert!(saved.id.is_some());
        assert_eq!(saved.question_text, "Q1");
        assert_eq!(saved.options.len(), 4);
        assert_eq!(saved.correct_answer_index, 1);
        assert_eq!(saved.source, QuestionOrigin::Ai);

        // Update in place by id.
        let mut updated = saved.clone();
        updated.question_text = "Q1 (edited)".to_string();
        store.save_question(&updated).await.unwrap();
        let bank = store.get_question_bank().await.unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank[0].question_text, "Q1 (edited)");

        store.delete_question(updated.id.unwrap()).await.unwrap();
        assert!(store.get_question_bank().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn seen_texts_are_read_as_a_set() {
    for store in both_stores().await {
        let q1 = make_question("seen one");
        let q2 = make_question("seen two");

        store.mark_seen("amina", &q1).await.unwrap();
        store.mark_seen("amina", &q1).await.unwrap();
        store.mark_seen("amina", &q2).await.unwrap();
        store.mark_seen("bilal", &q2).await.unwrap();

        let seen = store.get_seen_texts("amina").await.unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("seen one"));
        assert!(seen.contains("seen two"));

        let other = store.get_seen_texts("bilal").await.unwrap();
        assert_eq!(other.len(), 1);

        assert!(store.get_seen_texts("nobody").await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn global_config_defaults_and_upsert() {
    for store in both_stores().await {
        let config = store.get_global_config().await.unwrap();
        assert!(!config.is_quiz_open);
        assert!(!config.is_manual_override);
        assert_eq!(config.max_questions_per_quiz, 10);
        assert_eq!(config.points_per_question, 5);

        let updated = GlobalConfig {
            is_quiz_open: true,
            is_manual_override: true,
            ..config
        };
        store.save_global_config(&updated).await.unwrap();

        // Last write wins.
        let reread = store.get_global_config().await.unwrap();
        assert!(reread.is_quiz_open);
        assert!(reread.is_manual_override);
        assert_eq!(reread.points_per_question, 5);
    }
}

#[tokio::test]
async fn log_event_never_fails_the_caller() {
    for store in both_stores().await {
        store
            .log_event(
                Some("amina"),
                "quiz.finished",
                serde_json::json!({ "score": 20 }),
            )
            .await;
        store.log_event(None, "store.init", serde_json::json!({})).await;
    }
}
