use color_eyre::Result;
use libsql::params;

use super::helpers::query_all;
use super::Db;
use crate::models::QuizResult;

impl Db {
    pub async fn get_results(&self) -> Result<Vec<QuizResult>> {
        let conn = self.conn()?;
        query_all::<QuizResult>(
            &conn,
            "SELECT username, score, total_questions, date, difficulty_level \
             FROM results ORDER BY id DESC",
            (),
        )
        .await
    }

    /// Append-only insert; also moves the user's last played day to the
    /// result's UTC calendar day.
    pub async fn save_result(&self, result: &QuizResult) -> Result<()> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO results (username, score, total_questions, date, difficulty_level) \
             VALUES (?, ?, ?, ?, ?)",
            params![
                result.username.as_str(),
                result.score as i64,
                result.total_questions as i64,
                result.date.to_rfc3339(),
                result.difficulty_level.to_string()
            ],
        )
        .await?;

        conn.execute(
            "UPDATE users SET last_played_date = ? WHERE username = ?",
            params![
                result.date.date_naive().to_string(),
                result.username.as_str()
            ],
        )
        .await?;

        tracing::info!(
            "result saved for {}: {}/{} at {}",
            result.username,
            result.score,
            result.max_score(),
            result.difficulty_level
        );
        Ok(())
    }
}
