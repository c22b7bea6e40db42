// Local fallback store - JSON files on disk, used when no database is
// configured or the backend stays unreachable. Same operations, weaker
// durability; good enough for a single machine.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{GlobalConfig, Question, QuizResult, User, UserBadge};

const USERS_FILE: &str = "users.json";
const RESULTS_FILE: &str = "results.json";
const QUESTIONS_FILE: &str = "questions.json";
const BADGES_FILE: &str = "badges.json";
const SEEN_FILE: &str = "seen.json";
const GLOBAL_FILE: &str = "global.json";

#[derive(Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        tracing::info!("local store initialized at {}", dir.display());
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn read<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        fs::write(self.dir.join(file), serde_json::to_string_pretty(value)?)?;
        Ok(())
    }

    pub fn get_user(&self, username: &str) -> Result<Option<User>> {
        let users: Vec<User> = self.read(USERS_FILE)?;
        Ok(users.into_iter().find(|u| u.username == username))
    }

    pub fn save_user(&self, user: &User) -> Result<()> {
        let mut users: Vec<User> = self.read(USERS_FILE)?;
        match users.iter_mut().find(|u| u.username == user.username) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        self.write(USERS_FILE, &users)
    }

    pub fn get_results(&self) -> Result<Vec<QuizResult>> {
        let mut results: Vec<QuizResult> = self.read(RESULTS_FILE)?;
        results.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(results)
    }

    pub fn save_result(&self, result: &QuizResult) -> Result<()> {
        let mut results: Vec<QuizResult> = self.read(RESULTS_FILE)?;
        results.push(result.clone());
        self.write(RESULTS_FILE, &results)?;

        let mut users: Vec<User> = self.read(USERS_FILE)?;
        if let Some(user) = users.iter_mut().find(|u| u.username == result.username) {
            user.last_played_date = Some(result.date.date_naive());
            self.write(USERS_FILE, &users)?;
        }

        tracing::info!(
            "result saved for {}: {}/{} at {}",
            result.username,
            result.score,
            result.max_score(),
            result.difficulty_level
        );
        Ok(())
    }

    pub fn get_user_badges(&self, username: &str) -> Result<Vec<UserBadge>> {
        let badges: Vec<UserBadge> = self.read(BADGES_FILE)?;
        Ok(badges
            .into_iter()
            .filter(|b| b.username == username)
            .collect())
    }

    pub fn award_badge(&self, username: &str, badge_id: &str) -> Result<()> {
        let mut badges: Vec<UserBadge> = self.read(BADGES_FILE)?;
        if badges
            .iter()
            .any(|b| b.username == username && b.badge_id == badge_id)
        {
            return Ok(());
        }

        badges.push(UserBadge {
            username: username.to_string(),
            badge_id: badge_id.to_string(),
            date_earned: chrono::Utc::now(),
        });
        self.write(BADGES_FILE, &badges)?;
        tracing::info!("badge {badge_id} awarded to {username}");
        Ok(())
    }

    pub fn get_question_bank(&self) -> Result<Vec<Question>> {
        let mut questions: Vec<Question> = self.read(QUESTIONS_FILE)?;
        questions.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(questions)
    }

    pub fn save_question(&self, question: &Question) -> Result<()> {
        let mut questions: Vec<Question> = self.read(QUESTIONS_FILE)?;
        match question.id {
            Some(id) => {
                if let Some(existing) = questions.iter_mut().find(|q| q.id == Some(id)) {
                    *existing = question.clone();
                }
            }
            None => {
                // Synthetic id, since there is no database to assign one.
                let next_id = questions.iter().filter_map(|q| q.id).max().unwrap_or(0) + 1;
                let mut question = question.clone();
                question.id = Some(next_id);
                questions.push(question);
            }
        }
        self.write(QUESTIONS_FILE, &questions)
    }

    pub fn delete_question(&self, id: i64) -> Result<()> {
        let mut questions: Vec<Question> = self.read(QUESTIONS_FILE)?;
        questions.retain(|q| q.id != Some(id));
        self.write(QUESTIONS_FILE, &questions)
    }

    pub fn get_seen_texts(&self, username: &str) -> Result<HashSet<String>> {
        let seen: HashMap<String, Vec<String>> = self.read(SEEN_FILE)?;
        Ok(seen
            .get(username)
            .map(|texts| texts.iter().cloned().collect())
            .unwrap_or_default())
    }

    pub fn mark_seen(&self, username: &str, question: &Question) -> Result<()> {
        let mut seen: HashMap<String, Vec<String>> = self.read(SEEN_FILE)?;
        let texts = seen.entry(username.to_string()).or_default();
        if !texts.contains(&question.question_text) {
            texts.push(question.question_text.clone());
        }
        self.write(SEEN_FILE, &seen)
    }

    pub fn get_global_config(&self) -> Result<GlobalConfig> {
        let path = self.dir.join(GLOBAL_FILE);
        if !path.exists() {
            return Ok(GlobalConfig::default());
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn save_global_config(&self, config: &GlobalConfig) -> Result<()> {
        self.write(GLOBAL_FILE, config)
    }

    /// No event table here; the trace log is the record.
    pub fn log_event(&self, username: Option<&str>, event_type: &str, payload: serde_json::Value) {
        tracing::info!(
            username = username.unwrap_or("-"),
            event_type,
            %payload,
            "event"
        );
    }
}
