use color_eyre::Result;
use libsql::params;
use serde::Deserialize;

use super::helpers::query_all;
use super::Db;
use crate::models::Question;

// Options are stored as a JSON array in a TEXT column.
#[derive(Deserialize)]
struct QuestionRow {
    id: i64,
    question_text: String,
    options: String,
    correct_index: i64,
    explanation: Option<String>,
    difficulty: String,
    source: String,
}

impl QuestionRow {
    fn into_question(self) -> Result<Question> {
        Ok(Question {
            id: Some(self.id),
            question_text: self.question_text,
            options: serde_json::from_str(&self.options)?,
            correct_answer_index: self.correct_index as usize,
            explanation: self.explanation.unwrap_or_default(),
            difficulty: self.difficulty.parse()?,
            source: serde_json::from_value(serde_json::Value::String(self.source))?,
        })
    }
}

impl Db {
    pub async fn get_question_bank(&self) -> Result<Vec<Question>> {
        let conn = self.conn()?;
        let rows = query_all::<QuestionRow>(
            &conn,
            "SELECT id, question_text, options, correct_index, explanation, difficulty, source \
             FROM questions ORDER BY id DESC",
            (),
        )
        .await?;

        rows.into_iter().map(QuestionRow::into_question).collect()
    }

    /// Insert, or update in place when the question already has an id.
    pub async fn save_question(&self, question: &Question) -> Result<()> {
        let conn = self.conn()?;
        let options = serde_json::to_string(&question.options)?;

        match question.id {
            Some(id) => {
                conn.execute(
                    "UPDATE questions SET question_text = ?, options = ?, correct_index = ?, \
                     explanation = ?, difficulty = ?, source = ? WHERE id = ?",
                    params![
                        question.question_text.as_str(),
                        options,
                        question.correct_answer_index as i64,
                        question.explanation.as_str(),
                        question.difficulty.to_string(),
                        question.source.to_string(),
                        id
                    ],
                )
                .await?;
            }
            None => {
                conn.execute(
                    "INSERT INTO questions (question_text, options, correct_index, explanation, \
                     difficulty, source) VALUES (?, ?, ?, ?, ?, ?)",
                    params![
                        question.question_text.as_str(),
                        options,
                        question.correct_answer_index as i64,
                        question.explanation.as_str(),
                        question.difficulty.to_string(),
                        question.source.to_string()
                    ],
                )
                .await?;
            }
        }

        Ok(())
    }

    pub async fn delete_question(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM questions WHERE id = ?", params![id])
            .await?;
        tracing::info!("deleted question {id}");
        Ok(())
    }
}
