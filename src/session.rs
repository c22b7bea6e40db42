//! One play-through of the daily quiz: SETUP → LOADING → PLAYING →
//! FINISHED, or straight to BLOCKED when the user already played today.
//! Owns per-question timing, scoring, and the end-of-attempt persistence.

use std::collections::HashSet;

use chrono::Utc;
use color_eyre::{eyre::bail, Result};
use rand::seq::SliceRandom;
use serde_json::json;

use crate::badges;
use crate::db::Store;
use crate::email;
use crate::engine::{self, Recommendation};
use crate::generate::{self, QuestionSource};
use crate::models::{Difficulty, Question, QuizResult, User};
use crate::names;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Loading,
    Playing,
    Finished,
    Blocked,
}

/// Where to send the score summary once the session finishes.
#[derive(Clone, Debug)]
pub struct Notify {
    pub resend_api_key: String,
    pub recipient: String,
}

pub struct QuizSession<S> {
    store: Store,
    source: S,
    user: User,
    notify: Option<Notify>,
    recommendation: Recommendation,
    points_per_question: u32,

    phase: Phase,
    questions: Vec<Question>,
    current: usize,
    selected: Option<usize>,
    answered: bool,
    score: u32,
    time_left: u32,
    difficulty: Difficulty,
    newly_awarded: Vec<&'static str>,
}

impl<S: QuestionSource> QuizSession<S> {
    /// Loads the history and decides the entry phase: BLOCKED when the user
    /// already has a result today, SETUP otherwise. The recommendation is
    /// computed either way so a blocked user still sees what comes next.
    pub async fn new(
        store: Store,
        source: S,
        user: User,
        notify: Option<Notify>,
    ) -> Result<Self> {
        let history = store.get_results().await?;

        let points_per_question = match store.get_global_config().await {
            Ok(config) => config.points_per_question,
            Err(e) => {
                tracing::warn!("could not load global config, using defaults: {e}");
                names::POINTS_PER_QUESTION
            }
        };

        let recommendation = engine::recommendation(&user, &history);
        let phase = if engine::has_taken_quiz_today(&user.username, &history) {
            Phase::Blocked
        } else {
            Phase::Setup
        };

        Ok(Self {
            store,
            source,
            user,
            notify,
            recommendation,
            points_per_question,
            phase,
            questions: Vec::new(),
            current: 0,
            selected: None,
            answered: false,
            score: 0,
            time_left: names::QUESTION_TIME_LIMIT,
            difficulty: Difficulty::Adaptive,
            newly_awarded: Vec::new(),
        })
    }

    /// SETUP → LOADING → PLAYING. A progressive (ADAPTIVE) choice is replaced
    /// by the concrete recommended difficulty when one was computed; an
    /// explicit choice is used verbatim. Generation failures fall back to the
    /// static question set, so loading itself never sinks the session.
    pub async fn start(&mut self, selected: Difficulty) -> Result<()> {
        if self.phase != Phase::Setup {
            bail!("quiz can only be started from setup");
        }

        let resolved = if selected == Difficulty::Adaptive
            && self.recommendation.difficulty != Difficulty::Adaptive
        {
            self.recommendation.difficulty
        } else {
            selected
        };

        self.difficulty = resolved;
        self.phase = Phase::Loading;

        let generated = match self
            .source
            .generate(names::QUESTIONS_PER_QUIZ, resolved)
            .await
        {
            Ok(questions) => questions,
            Err(e) => {
                tracing::error!("question generation failed, using the static set: {e}");
                generate::fallback_questions(names::QUESTIONS_PER_QUIZ)
            }
        };

        let mut questions: Vec<Question> =
            generated.into_iter().filter(Question::is_well_formed).collect();
        if questions.is_empty() {
            questions = generate::fallback_questions(names::QUESTIONS_PER_QUIZ);
        }

        questions.shuffle(&mut rand::thread_rng());

        // Repeat avoidance is a bias, not a guarantee: unseen questions go
        // first, and a read failure counts as no history.
        let seen = match self.store.get_seen_texts(&self.user.username).await {
            Ok(seen) => seen,
            Err(e) => {
                tracing::warn!("could not load seen questions, treating as none: {e}");
                HashSet::new()
            }
        };
        if !seen.is_empty() {
            questions.sort_by_key(|q| seen.contains(&q.question_text));
        }

        // Persist the generated batch to the bank without holding up the quiz.
        for question in questions.clone() {
            let store = self.store.clone();
            tokio::spawn(async move {
                if let Err(e) = store.save_question(&question).await {
                    tracing::warn!("could not save generated question: {e}");
                }
            });
        }

        self.questions = questions;
        self.current = 0;
        self.score = 0;
        self.selected = None;
        self.answered = false;
        self.time_left = names::QUESTION_TIME_LIMIT;
        self.mark_current_seen();
        self.phase = Phase::Playing;

        Ok(())
    }
}

impl<S> QuizSession<S> {
    /// One unit of wall-clock time elapsed on the current question. At zero
    /// the question locks with no selection, which scores nothing.
    pub fn tick(&mut self) {
        if self.phase != Phase::Playing || self.answered {
            return;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.answered = true;
            self.selected = None;
        }
    }

    /// Lock in an option. The first call wins; later calls (and calls after
    /// a timeout) are no-ops.
    pub fn choose(&mut self, index: usize) {
        if self.phase != Phase::Playing || self.answered {
            return;
        }
        let Some(question) = self.questions.get(self.current) else {
            return;
        };
        if index >= question.options.len() {
            return;
        }

        self.selected = Some(index);
        self.answered = true;
        if index == question.correct_answer_index {
            self.score += self.points_per_question;
        }
    }

    /// Move past an answered question: next question with a fresh timer, or
    /// the finishing sequence after the last one.
    pub async fn advance(&mut self) -> Result<()> {
        if self.phase != Phase::Playing {
            bail!("no question to advance from");
        }
        if !self.answered {
            bail!("current question has not been answered");
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.selected = None;
            self.answered = false;
            self.time_left = names::QUESTION_TIME_LIMIT;
            self.mark_current_seen();
        } else {
            self.finish().await;
        }

        Ok(())
    }

    /// Persist the attempt, evaluate badges, and notify. Persistence trouble
    /// is logged and the session still reaches FINISHED; the score email is
    /// fired detached either way.
    async fn finish(&mut self) {
        let result = QuizResult {
            username: self.user.username.clone(),
            score: self.score,
            total_questions: self.questions.len() as u32,
            date: Utc::now(),
            difficulty_level: self.difficulty,
        };

        match self.store.save_result(&result).await {
            Ok(()) => {
                match badges::check_badges(&self.store, &result.username, &result).await {
                    Ok(newly_awarded) => self.newly_awarded = newly_awarded,
                    Err(e) => {
                        tracing::warn!("badge evaluation failed, it will rerun next attempt: {e}")
                    }
                }

                self.store
                    .log_event(
                        Some(&result.username),
                        "quiz.finished",
                        json!({
                            "score": result.score,
                            "totalQuestions": result.total_questions,
                            "difficulty": result.difficulty_level,
                        }),
                    )
                    .await;
            }
            Err(e) => tracing::error!("could not save quiz result: {e}"),
        }

        self.phase = Phase::Finished;

        if let Some(notify) = self.notify.clone() {
            let max_score = result.max_score();
            tokio::spawn(async move {
                if let Err(e) = email::send_score_email(
                    &notify.resend_api_key,
                    &notify.recipient,
                    &result.username,
                    result.score,
                    max_score,
                    result.difficulty_level,
                    result.total_questions,
                    result.date,
                )
                .await
                {
                    tracing::warn!("could not send score email: {e}");
                }
            });
        }
    }

    fn mark_current_seen(&self) {
        let Some(question) = self.questions.get(self.current) else {
            return;
        };
        let store = self.store.clone();
        let username = self.user.username.clone();
        let question = question.clone();
        tokio::spawn(async move {
            if let Err(e) = store.mark_seen(&username, &question).await {
                tracing::warn!("could not mark question as seen: {e}");
            }
        });
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn recommendation(&self) -> &Recommendation {
        &self.recommendation
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn max_score(&self) -> u32 {
        self.questions.len() as u32 * self.points_per_question
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn newly_awarded(&self) -> &[&'static str] {
        &self.newly_awarded
    }
}
