//! Question source: Gemini-backed generation with a static fallback set.
//! The generator degrades to the fallback on any failure (missing key,
//! network, malformed response) instead of propagating the error.

use std::time::Duration;

use color_eyre::{eyre::OptionExt, Result};
use serde::Deserialize;
use serde_json::json;

use crate::models::{Difficulty, Question, QuestionOrigin};

const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";
const GEMINI_TIMEOUT: Duration = Duration::from_secs(10);

pub trait QuestionSource {
    #[allow(async_fn_in_trait)]
    async fn generate(&self, count: usize, difficulty: Difficulty) -> Result<Vec<Question>>;
}

pub struct GeminiSource {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl GeminiSource {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    async fn request_questions(
        &self,
        api_key: &str,
        count: usize,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt(count, difficulty) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "questionText": { "type": "STRING" },
                            "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                            "correctAnswerIndex": { "type": "INTEGER" },
                            "explanation": { "type": "STRING" },
                            "difficulty": { "type": "STRING" }
                        },
                        "required": [
                            "questionText", "options", "correctAnswerIndex",
                            "explanation", "difficulty"
                        ]
                    }
                }
            }
        });

        let resp = self
            .client
            .post(GEMINI_ENDPOINT)
            .query(&[("key", api_key)])
            .timeout(GEMINI_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            color_eyre::eyre::bail!("Gemini API returned {status}: {text}");
        }

        let resp: GenerateContentResponse = resp.json().await?;
        let text = resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_eyre("empty Gemini response")?;

        let questions: Vec<Question> = serde_json::from_str(&text)?;

        // Discard malformed questions rather than failing the batch.
        let questions: Vec<Question> = questions
            .into_iter()
            .filter(|q| q.is_well_formed())
            .map(|q| Question {
                source: QuestionOrigin::Ai,
                ..q
            })
            .collect();

        if questions.is_empty() {
            color_eyre::eyre::bail!("no well-formed questions in Gemini response");
        }

        Ok(questions)
    }
}

impl QuestionSource for GeminiSource {
    async fn generate(&self, count: usize, difficulty: Difficulty) -> Result<Vec<Question>> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("no Gemini API key configured, using the static question set");
            return Ok(fallback_questions(count));
        };

        match self.request_questions(api_key, count, difficulty).await {
            Ok(questions) => Ok(questions),
            Err(e) => {
                tracing::error!("question generation failed, using the static set: {e}");
                Ok(fallback_questions(count))
            }
        }
    }
}

fn prompt(count: usize, difficulty: Difficulty) -> String {
    let difficulty_prompt = match difficulty {
        Difficulty::Easy => "NIVEAU: DÉBUTANT (Facile). Questions accessibles à tous.".to_string(),
        Difficulty::Medium => {
            "NIVEAU: INTERMÉDIAIRE. Questions demandant un peu de réflexion.".to_string()
        }
        Difficulty::Hard => {
            "NIVEAU: AVANCÉ. Questions difficiles sur des détails précis.".to_string()
        }
        Difficulty::Expert => "NIVEAU: EXPERT / SAVANT. Questions très pointues.".to_string(),
        Difficulty::Adaptive => "NIVEAU PROGRESSIF (ADAPTIVE):\n\
             - La 1ère et 2ème question doivent être de niveau FACILE.\n\
             - La 3ème et 4ème question doivent être de niveau MOYEN.\n\
             - La 5ème question doit être de niveau DIFFICILE.\n\
             - La 6ème question doit être de niveau EXPERT."
            .to_string(),
    };

    format!(
        "Génère {count} questions à choix multiples (QCM) sur l'Islam \
         (Histoire, Coran, Hadith, Fiqh, Sirah) en français.\n\n\
         {difficulty_prompt}\n\n\
         Les questions doivent être:\n\
         1. Basées sur des sources authentiques (Coran et Sounnah).\n\
         2. Variées (ne pas répéter les mêmes sujets).\n\
         3. Chaque question doit avoir 4 options dont 1 seule bonne réponse.\n\
         4. Le champ \"difficulty\" doit refléter le niveau de la question \
         (EASY, MEDIUM, HARD, EXPERT)."
    )
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: String,
}

/// The hand-written question set served when generation is unavailable.
pub fn fallback_questions(count: usize) -> Vec<Question> {
    let q = |text: &str, options: [&str; 4], correct: usize, explanation: &str, difficulty| {
        Question {
            id: None,
            question_text: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer_index: correct,
            explanation: explanation.to_string(),
            difficulty,
            source: QuestionOrigin::Manual,
        }
    };

    let questions = vec![
        q(
            "Quelle sourate est connue comme le 'Cœur du Coran' ?",
            ["Al-Fatiha", "Ya-Sin", "Al-Baqara", "Al-Ikhlas"],
            1,
            "Le Prophète (paix sur lui) a dit que tout a un cœur, et le cœur du Coran est la sourate Ya-Sin.",
            Difficulty::Easy,
        ),
        q(
            "En quelle année l'Hégire a-t-elle eu lieu ?",
            ["610", "622", "632", "570"],
            1,
            "L'Hégire a eu lieu en 622 après J.C.",
            Difficulty::Medium,
        ),
        q(
            "Lequel de ces piliers est le premier pilier de l'Islam ?",
            ["Salat", "Zakat", "Shahada", "Hajj"],
            2,
            "La Shahada est le fondement de la foi.",
            Difficulty::Easy,
        ),
        q(
            "Combien y a-t-il de sourates dans le Saint Coran ?",
            ["110", "112", "114", "116"],
            2,
            "Il y a 114 sourates.",
            Difficulty::Easy,
        ),
        q(
            "Quel compagnon a été le premier Calife ?",
            ["Umar", "Ali", "Uthman", "Abu Bakr"],
            3,
            "Abu Bakr (ra) fut le premier Calife.",
            Difficulty::Medium,
        ),
        q(
            "Quelle prière est après le coucher du soleil ?",
            ["Dohr", "Asr", "Maghrib", "Isha"],
            2,
            "Maghrib est juste après le coucher.",
            Difficulty::Easy,
        ),
    ];

    questions.into_iter().take(count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_set_is_well_formed() {
        let questions = fallback_questions(6);
        assert_eq!(questions.len(), 6);
        assert!(questions.iter().all(|q| q.is_well_formed()));
    }

    #[test]
    fn fallback_respects_requested_count() {
        assert_eq!(fallback_questions(3).len(), 3);
    }

    #[tokio::test]
    async fn gemini_without_key_serves_fallback() {
        let source = GeminiSource::new(None);
        let questions = source.generate(6, Difficulty::Easy).await.unwrap();
        assert_eq!(questions.len(), 6);
        assert!(questions.iter().all(|q| q.source == QuestionOrigin::Manual));
    }
}
