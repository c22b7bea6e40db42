use std::collections::HashSet;

use color_eyre::Result;
use libsql::params;
use serde_json::json;

use super::Db;
use crate::models::Question;

impl Db {
    /// Append-only exposure log, keyed by question text because generated
    /// questions have no stable id before they reach the bank.
    pub async fn mark_seen(&self, username: &str, question: &Question) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO seen_questions (username, question_text, question_id) VALUES (?, ?, ?)",
            params![username, question.question_text.as_str(), question.id],
        )
        .await?;

        self.log_event(
            Some(username),
            "question.seen",
            json!({ "questionText": question.question_text }),
        )
        .await;

        Ok(())
    }

    /// The log may hold repeats; readers get the de-duplicated set.
    pub async fn get_seen_texts(&self, username: &str) -> Result<HashSet<String>> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT question_text FROM seen_questions WHERE username = ?",
                params![username],
            )
            .await?;

        let mut texts = HashSet::new();
        while let Some(row) = rows.next().await? {
            texts.insert(row.get::<String>(0)?);
        }
        Ok(texts)
    }
}
