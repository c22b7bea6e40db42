// Persistence gateway - uniform data access over the SQL backend and the
// local JSON fallback store.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::{eyre::OptionExt, Result};

mod badges;
mod config;
mod events;
mod helpers;
mod local;
mod questions;
mod results;
mod schema;
mod seen;
mod users;

pub use local::LocalStore;
pub use users::ensure_user;

use crate::models::{GlobalConfig, Question, QuizResult, User, UserBadge};
use crate::names;

// Main database handle
#[derive(Clone)]
pub struct Db {
    db: Arc<libsql::Database>,
}

impl Db {
    pub async fn new(url: &str, auth_token: &str) -> Result<Self> {
        let db = if let Some(path) = url.strip_prefix("file:") {
            // Local SQLite file
            libsql::Builder::new_local(path).build().await?
        } else {
            // Remote Turso database
            libsql::Builder::new_remote(url.to_owned(), auth_token.to_owned())
                .build()
                .await?
        };

        let conn = db.connect()?;

        // Verify connection
        let one = conn
            .query("SELECT 1", ())
            .await?
            .next()
            .await?
            .ok_or_eyre("connection check failed")?
            .get::<i32>(0)?;
        assert_eq!(one, 1);

        // Initialize schema
        schema::create_schema(&conn).await?;

        tracing::info!("database connection has been verified");

        Ok(Self { db: Arc::new(db) })
    }

    fn conn(&self) -> Result<libsql::Connection> {
        Ok(self.db.connect()?)
    }
}

/// The backend chosen at startup. Core logic talks to this one surface and
/// never branches on which store is behind it.
#[derive(Clone)]
pub enum Store {
    Sql(Db),
    Local(LocalStore),
}

impl Store {
    /// Connect to the configured database with a small bounded retry, falling
    /// back to the local JSON store for the process lifetime when the backend
    /// stays unreachable or no URL is configured.
    pub async fn connect(url: Option<&str>, auth_token: &str, data_dir: &Path) -> Result<Self> {
        if let Some(url) = url {
            for attempt in 1..=names::MAX_CONNECT_ATTEMPTS {
                match Db::new(url, auth_token).await {
                    Ok(db) => return Ok(Store::Sql(db)),
                    Err(e) => {
                        tracing::error!(
                            "database connection failed (attempt {attempt}/{}): {e}",
                            names::MAX_CONNECT_ATTEMPTS
                        );
                        if attempt < names::MAX_CONNECT_ATTEMPTS {
                            tokio::time::sleep(Duration::from_secs(
                                names::CONNECT_RETRY_DELAY_SECS,
                            ))
                            .await;
                        }
                    }
                }
            }
            tracing::warn!("falling back to the local store at {}", data_dir.display());
        } else {
            tracing::warn!("no database URL configured, using the local store");
        }

        Ok(Store::Local(LocalStore::new(data_dir)?))
    }

    pub async fn get_user(&self, username: &str) -> Result<Option<User>> {
        match self {
            Store::Sql(db) => db.get_user(username).await,
            Store::Local(ls) => ls.get_user(username),
        }
    }

    pub async fn save_user(&self, user: &User) -> Result<()> {
        match self {
            Store::Sql(db) => db.save_user(user).await,
            Store::Local(ls) => ls.save_user(user),
        }
    }

    /// All results, newest first.
    pub async fn get_results(&self) -> Result<Vec<QuizResult>> {
        match self {
            Store::Sql(db) => db.get_results().await,
            Store::Local(ls) => ls.get_results(),
        }
    }

    /// Appends the result and stamps the user's last played day.
    pub async fn save_result(&self, result: &QuizResult) -> Result<()> {
        match self {
            Store::Sql(db) => db.save_result(result).await,
            Store::Local(ls) => ls.save_result(result),
        }
    }

    pub async fn get_user_badges(&self, username: &str) -> Result<Vec<UserBadge>> {
        match self {
            Store::Sql(db) => db.get_user_badges(username).await,
            Store::Local(ls) => ls.get_user_badges(username),
        }
    }

    /// Idempotent: awarding an already-held (username, badge) pair is a no-op.
    pub async fn award_badge(&self, username: &str, badge_id: &str) -> Result<()> {
        match self {
            Store::Sql(db) => db.award_badge(username, badge_id).await,
            Store::Local(ls) => ls.award_badge(username, badge_id),
        }
    }

    pub async fn get_question_bank(&self) -> Result<Vec<Question>> {
        match self {
            Store::Sql(db) => db.get_question_bank().await,
            Store::Local(ls) => ls.get_question_bank(),
        }
    }

    /// Inserts a new question, or updates it in place when it carries an id.
    pub async fn save_question(&self, question: &Question) -> Result<()> {
        match self {
            Store::Sql(db) => db.save_question(question).await,
            Store::Local(ls) => ls.save_question(question),
        }
    }

    pub async fn delete_question(&self, id: i64) -> Result<()> {
        match self {
            Store::Sql(db) => db.delete_question(id).await,
            Store::Local(ls) => ls.delete_question(id),
        }
    }

    /// De-duplicated set of question texts the user has been shown.
    pub async fn get_seen_texts(&self, username: &str) -> Result<HashSet<String>> {
        match self {
            Store::Sql(db) => db.get_seen_texts(username).await,
            Store::Local(ls) => ls.get_seen_texts(username),
        }
    }

    pub async fn mark_seen(&self, username: &str, question: &Question) -> Result<()> {
        match self {
            Store::Sql(db) => db.mark_seen(username, question).await,
            Store::Local(ls) => ls.mark_seen(username, question),
        }
    }

    /// Returns the stored singleton, or the defaults when none was saved yet.
    pub async fn get_global_config(&self) -> Result<GlobalConfig> {
        match self {
            Store::Sql(db) => db.get_global_config().await,
            Store::Local(ls) => ls.get_global_config(),
        }
    }

    pub async fn save_global_config(&self, config: &GlobalConfig) -> Result<()> {
        match self {
            Store::Sql(db) => db.save_global_config(config).await,
            Store::Local(ls) => ls.save_global_config(config),
        }
    }

    /// Best-effort event log; failures are traced and swallowed.
    pub async fn log_event(
        &self,
        username: Option<&str>,
        event_type: &str,
        payload: serde_json::Value,
    ) {
        match self {
            Store::Sql(db) => db.log_event(username, event_type, payload).await,
            Store::Local(ls) => ls.log_event(username, event_type, payload),
        }
    }
}
