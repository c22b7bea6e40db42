//! Eligibility and recommendation rules: daily play limit, progressive
//! difficulty, and performance summary. Pure functions over a username and
//! the result history; callers decide what to do with the answers.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};

use crate::models::{Difficulty, Question, QuizResult, User};
use crate::names;

/// True iff the user has a result on the given UTC calendar day.
pub fn has_taken_quiz_on(username: &str, results: &[QuizResult], day: NaiveDate) -> bool {
    results
        .iter()
        .any(|r| r.username == username && r.date.date_naive() == day)
}

/// Daily limit check. "Today" is the UTC calendar day.
pub fn has_taken_quiz_today(username: &str, results: &[QuizResult]) -> bool {
    has_taken_quiz_on(username, results, Utc::now().date_naive())
}

/// Recommended difficulty from the user's all-time attempt count:
/// EASY until 3 attempts, MEDIUM until 7, HARD until 15, EXPERT until 30,
/// ADAPTIVE for veterans.
pub fn progressive_difficulty(username: &str, results: &[QuizResult]) -> Difficulty {
    let completed = results.iter().filter(|r| r.username == username).count();

    if completed < names::MEDIUM_AFTER {
        Difficulty::Easy
    } else if completed < names::HARD_AFTER {
        Difficulty::Medium
    } else if completed < names::EXPERT_AFTER {
        Difficulty::Hard
    } else if completed < names::ADAPTIVE_AFTER {
        Difficulty::Expert
    } else {
        Difficulty::Adaptive
    }
}

/// Mean of per-result percentages for the user, truncated to an integer in
/// [0, 100]. Each result scores `score / (total_questions * 5) * 100`.
/// Returns 0 when the user has no results.
pub fn average_score(username: &str, results: &[QuizResult]) -> u32 {
    let user_results: Vec<&QuizResult> =
        results.iter().filter(|r| r.username == username).collect();
    if user_results.is_empty() {
        return 0;
    }

    let total_percentage: f64 = user_results
        .iter()
        .map(|r| {
            let max_score = (r.total_questions * names::POINTS_PER_QUESTION) as f64;
            if max_score == 0.0 {
                0.0
            } else {
                r.score as f64 / max_score * 100.0
            }
        })
        .sum();

    (total_percentage / user_results.len() as f64).floor() as u32
}

#[derive(Clone, Debug)]
pub struct Recommendation {
    pub difficulty: Difficulty,
    pub average_score: u32,
    pub total_taken: usize,
    pub message: &'static str,
    pub can_take_quiz: bool,
}

/// Composes the eligibility and difficulty rules into one summary for the
/// session setup screen.
pub fn recommendation(user: &User, results: &[QuizResult]) -> Recommendation {
    let difficulty = progressive_difficulty(&user.username, results);
    let total_taken = results
        .iter()
        .filter(|r| r.username == user.username)
        .count();

    Recommendation {
        difficulty,
        average_score: average_score(&user.username, results),
        total_taken,
        message: difficulty_message(difficulty),
        can_take_quiz: !has_taken_quiz_today(&user.username, results),
    }
}

/// Fixed per-difficulty message. Keyed by difficulty only; the computed
/// average score intentionally does not change the text.
pub fn difficulty_message(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "Bienvenue! Commençons par le niveau débutant.",
        Difficulty::Medium => "Vous progressez bien! Passons au niveau intermédiaire.",
        Difficulty::Hard => "Vous êtes en bonne forme! Relevez le défi avancé.",
        Difficulty::Expert => "Bravo pour votre progression! Testez votre expertise.",
        Difficulty::Adaptive => "Vous êtes un vétéran! Mode progressif adapté à votre niveau.",
    }
}

/// Drops questions the user has already been shown, keyed by question text.
/// Identity when there is no exposure history.
pub fn filter_new_questions(questions: Vec<Question>, seen: &HashSet<String>) -> Vec<Question> {
    if seen.is_empty() {
        return questions;
    }
    questions
        .into_iter()
        .filter(|q| !seen.contains(&q.question_text))
        .collect()
}
