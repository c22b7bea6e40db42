mod common;

use chrono::{Duration, Utc};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use common::{create_local_store, create_sql_store};
use quizotidien::engine;
use quizotidien::generate::QuestionSource;
use quizotidien::models::{Difficulty, Question, QuestionOrigin, QuizResult, Role, User};
use quizotidien::names;
use quizotidien::session::{Phase, QuizSession};

struct FixedSource(Vec<Question>);

impl QuestionSource for FixedSource {
    async fn generate(&self, count: usize, _difficulty: Difficulty) -> Result<Vec<Question>> {
        Ok(self.0.iter().take(count).cloned().collect())
    }
}

struct FailingSource;

impl QuestionSource for FailingSource {
    async fn generate(&self, _count: usize, _difficulty: Difficulty) -> Result<Vec<Question>> {
        Err(eyre!("generator offline"))
    }
}

fn test_user(username: &str) -> User {
    User {
        username: username.to_string(),
        role: Role::User,
        last_played_date: None,
    }
}

fn six_questions() -> Vec<Question> {
    (0..6)
        .map(|i| Question {
            id: None,
            question_text: format!("Question {i}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer_index: i % 4,
            explanation: String::new(),
            difficulty: Difficulty::Easy,
            source: QuestionOrigin::Manual,
        })
        .collect()
}

fn seed_result(username: &str, score: u32, days_ago: i64) -> QuizResult {
    QuizResult {
        username: username.to_string(),
        score,
        total_questions: 6,
        date: Utc::now() - Duration::days(days_ago),
        difficulty_level: Difficulty::Easy,
    }
}

/// Answer every remaining question, the first `correct` of them correctly.
async fn answer_all<S>(session: &mut QuizSession<S>, correct: usize) {
    let mut answered = 0;
    while session.phase() == Phase::Playing {
        let question = session.current_question().expect("a current question");
        let right = question.correct_answer_index;
        let wrong = (right + 1) % question.options.len();

        if answered < correct {
            session.choose(right);
        } else {
            session.choose(wrong);
        }
        answered += 1;
        session.advance().await.expect("advance");
    }
}

#[tokio::test]
async fn first_attempt_scores_and_awards_first_step() {
    let store = create_sql_store().await;
    let mut session = QuizSession::new(
        store.clone(),
        FixedSource(six_questions()),
        test_user("amina"),
        None,
    )
    .await
    .unwrap();

    assert_eq!(session.phase(), Phase::Setup);
    session.start(Difficulty::Easy).await.unwrap();
    assert_eq!(session.phase(), Phase::Playing);
    assert_eq!(session.question_count(), 6);

    answer_all(&mut session, 4).await;

    assert_eq!(session.phase(), Phase::Finished);
    assert_eq!(session.score(), 20);

    let results = store.get_results().await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 20);
    assert_eq!(results[0].total_questions, 6);
    assert_eq!(results[0].difficulty_level, Difficulty::Easy);

    assert_eq!(session.newly_awarded(), ["FIRST_STEP"]);
    let badges = store.get_user_badges("amina").await.unwrap();
    assert_eq!(badges.len(), 1);
    assert_eq!(badges[0].badge_id, "FIRST_STEP");

    assert_eq!(engine::average_score("amina", &results), 66);
}

#[tokio::test]
async fn progressive_choice_substitutes_the_recommendation() {
    let store = create_local_store();
    for i in 0..3 {
        store
            .save_result(&seed_result("amina", 15, i + 1))
            .await
            .unwrap();
    }

    let mut session = QuizSession::new(
        store,
        FixedSource(six_questions()),
        test_user("amina"),
        None,
    )
    .await
    .unwrap();

    assert_eq!(session.recommendation().difficulty, Difficulty::Medium);
    session.start(Difficulty::Adaptive).await.unwrap();
    assert_eq!(session.difficulty(), Difficulty::Medium);
}

#[tokio::test]
async fn explicit_choice_is_used_verbatim() {
    let store = create_local_store();
    let mut session = QuizSession::new(
        store,
        FixedSource(six_questions()),
        test_user("amina"),
        None,
    )
    .await
    .unwrap();

    session.start(Difficulty::Hard).await.unwrap();
    assert_eq!(session.difficulty(), Difficulty::Hard);
}

#[tokio::test]
async fn a_result_today_blocks_the_session() {
    let store = create_sql_store().await;
    store.save_result(&seed_result("amina", 20, 0)).await.unwrap();

    let mut session = QuizSession::new(
        store.clone(),
        FixedSource(six_questions()),
        test_user("amina"),
        None,
    )
    .await
    .unwrap();

    assert_eq!(session.phase(), Phase::Blocked);
    // The blocked screen still shows the user where they stand.
    assert_eq!(session.recommendation().total_taken, 1);
    assert!(!session.recommendation().can_take_quiz);

    assert!(session.start(Difficulty::Easy).await.is_err());
    assert_eq!(session.phase(), Phase::Blocked);

    // No second save happened for the same day.
    assert_eq!(store.get_results().await.unwrap().len(), 1);
}

#[tokio::test]
async fn yesterdays_result_does_not_block() {
    let store = create_local_store();
    store.save_result(&seed_result("amina", 20, 1)).await.unwrap();

    let session = QuizSession::new(
        store,
        FixedSource(six_questions()),
        test_user("amina"),
        None,
    )
    .await
    .unwrap();

    assert_eq!(session.phase(), Phase::Setup);
}

#[tokio::test]
async fn generation_failure_falls_back_to_the_static_set() {
    let store = create_local_store();
    let mut session = QuizSession::new(store, FailingSource, test_user("amina"), None)
        .await
        .unwrap();

    session.start(Difficulty::Easy).await.unwrap();
    assert_eq!(session.phase(), Phase::Playing);
    assert_eq!(session.question_count(), names::QUESTIONS_PER_QUIZ);
    assert!(session
        .current_question()
        .is_some_and(|q| q.is_well_formed()));
}

#[tokio::test]
async fn timeout_locks_with_no_selection() {
    let store = create_local_store();
    let mut session = QuizSession::new(
        store,
        FixedSource(six_questions()),
        test_user("amina"),
        None,
    )
    .await
    .unwrap();
    session.start(Difficulty::Easy).await.unwrap();

    assert_eq!(session.time_left(), names::QUESTION_TIME_LIMIT);
    for _ in 0..names::QUESTION_TIME_LIMIT {
        session.tick();
    }

    assert!(session.is_answered());
    assert_eq!(session.selected(), None);
    assert_eq!(session.score(), 0);

    // Selection after the timeout is a no-op.
    let right = session.current_question().unwrap().correct_answer_index;
    session.choose(right);
    assert_eq!(session.selected(), None);
    assert_eq!(session.score(), 0);

    // The next question starts with a fresh timer.
    session.advance().await.unwrap();
    assert_eq!(session.time_left(), names::QUESTION_TIME_LIMIT);
    assert!(!session.is_answered());
}

#[tokio::test]
async fn first_selection_locks_in() {
    let store = create_local_store();
    let mut session = QuizSession::new(
        store,
        FixedSource(six_questions()),
        test_user("amina"),
        None,
    )
    .await
    .unwrap();
    session.start(Difficulty::Easy).await.unwrap();

    let right = session.current_question().unwrap().correct_answer_index;
    let wrong = (right + 1) % 4;

    session.choose(wrong);
    assert_eq!(session.selected(), Some(wrong));
    assert_eq!(session.score(), 0);

    session.choose(right);
    assert_eq!(session.selected(), Some(wrong));
    assert_eq!(session.score(), 0);
}

#[tokio::test]
async fn advancing_requires_an_answer() {
    let store = create_local_store();
    let mut session = QuizSession::new(
        store,
        FixedSource(six_questions()),
        test_user("amina"),
        None,
    )
    .await
    .unwrap();
    session.start(Difficulty::Easy).await.unwrap();

    assert!(session.advance().await.is_err());
    assert_eq!(session.current_index(), 0);
}

#[tokio::test]
async fn perfect_first_attempt_unlocks_two_badges_at_once() {
    let store = create_sql_store().await;
    let mut session = QuizSession::new(
        store.clone(),
        FixedSource(six_questions()),
        test_user("amina"),
        None,
    )
    .await
    .unwrap();

    session.start(Difficulty::Easy).await.unwrap();
    answer_all(&mut session, 6).await;

    assert_eq!(session.phase(), Phase::Finished);
    assert_eq!(session.score(), 30);

    let newly = session.newly_awarded();
    assert!(newly.contains(&"FIRST_STEP"));
    assert!(newly.contains(&"PERFECTIONIST"));

    let badges = store.get_user_badges("amina").await.unwrap();
    assert_eq!(badges.len(), 2);
}

#[tokio::test]
async fn perfect_score_badge_is_independent_of_quiz_length() {
    let store = create_local_store();
    let two_questions: Vec<Question> = six_questions().into_iter().take(2).collect();
    let mut session = QuizSession::new(
        store.clone(),
        FixedSource(two_questions),
        test_user("amina"),
        None,
    )
    .await
    .unwrap();

    session.start(Difficulty::Easy).await.unwrap();
    assert_eq!(session.question_count(), 2);
    answer_all(&mut session, 2).await;

    assert_eq!(session.score(), 10);
    assert!(session.newly_awarded().contains(&"PERFECTIONIST"));
}
