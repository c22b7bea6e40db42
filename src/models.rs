use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use color_eyre::eyre::eyre;
use serde::{Deserialize, Serialize};

use crate::names;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::User => f.write_str("USER"),
            Role::Admin => f.write_str("ADMIN"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
    Adaptive,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Difficulty::Easy => f.write_str("EASY"),
            Difficulty::Medium => f.write_str("MEDIUM"),
            Difficulty::Hard => f.write_str("HARD"),
            Difficulty::Expert => f.write_str("EXPERT"),
            Difficulty::Adaptive => f.write_str("ADAPTIVE"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = color_eyre::eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EASY" => Ok(Difficulty::Easy),
            "MEDIUM" => Ok(Difficulty::Medium),
            "HARD" => Ok(Difficulty::Hard),
            "EXPERT" => Ok(Difficulty::Expert),
            "ADAPTIVE" => Ok(Difficulty::Adaptive),
            other => Err(eyre!("unknown difficulty: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionOrigin {
    Ai,
    #[default]
    Manual,
}

impl fmt::Display for QuestionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QuestionOrigin::Ai => f.write_str("AI"),
            QuestionOrigin::Manual => f.write_str("MANUAL"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: Role,
    pub last_played_date: Option<NaiveDate>,
}

/// A multiple-choice question, either AI-generated or hand-written.
/// `id` is absent until the question has been persisted to the bank.
/// Wire format is camelCase (the generation API and the question bank JSON).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub id: Option<i64>,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    #[serde(default)]
    pub explanation: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub source: QuestionOrigin,
}

impl Question {
    /// Exactly four options with the correct index in range.
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == names::OPTIONS_PER_QUESTION
            && self.correct_answer_index < self.options.len()
    }
}

/// One completed (or timed-out) play-through. Append-only, never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizResult {
    pub username: String,
    pub score: u32,
    pub total_questions: u32,
    pub date: DateTime<Utc>,
    pub difficulty_level: Difficulty,
}

impl QuizResult {
    pub fn max_score(&self) -> u32 {
        self.total_questions * names::POINTS_PER_QUESTION
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserBadge {
    pub username: String,
    pub badge_id: String,
    pub date_earned: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BadgeCondition {
    /// Total games played reaches the threshold.
    Count(u32),
    /// Cumulative score across all results reaches the threshold.
    TotalScore(u32),
    /// The current result is a perfect score.
    Perfect,
}

/// Static catalog entry; definitions are compiled in, not persisted.
#[derive(Clone, Copy, Debug)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub condition: BadgeCondition,
}

/// Operational flags, stored as a singleton JSON value under the "config" key.
/// Last write wins.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default)]
    pub is_manual_override: bool,
    #[serde(default)]
    pub is_quiz_open: bool,
    #[serde(default = "default_max_questions")]
    pub max_questions_per_quiz: u32,
    #[serde(default = "default_points_per_question")]
    pub points_per_question: u32,
}

fn default_max_questions() -> u32 {
    names::DEFAULT_MAX_QUESTIONS_PER_QUIZ
}

fn default_points_per_question() -> u32 {
    names::POINTS_PER_QUESTION
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            is_manual_override: false,
            is_quiz_open: false,
            max_questions_per_quiz: default_max_questions(),
            points_per_question: default_points_per_question(),
        }
    }
}
