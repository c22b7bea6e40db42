use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::Serialize;

use crate::models::Difficulty;

#[derive(Serialize)]
struct SendEmailRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

/// Send the end-of-quiz score summary via the Resend API. Dispatched as a
/// detached task after a session finishes; the caller never waits on it.
pub async fn send_score_email(
    api_key: &str,
    to_email: &str,
    username: &str,
    score: u32,
    max_score: u32,
    difficulty: Difficulty,
    total_questions: u32,
    date: DateTime<Utc>,
) -> Result<()> {
    let client = reqwest::Client::new();

    let body = SendEmailRequest {
        from: "Quizotidien <noreply@quizotidien.app>".to_string(),
        to: vec![to_email.to_string()],
        subject: format!("Score Quiz - {username}"),
        html: format!(
            r#"<p>As-salamu alaykum,</p>
<p>Voici le résultat du quiz pour le participant : <strong>{username}</strong></p>
<p>SCORE : <strong>{score} / {max_score}</strong><br>
Niveau : {difficulty}<br>
Questions posées : {total_questions}<br>
Date : {}</p>"#,
            date.format("%d/%m/%Y %H:%M")
        ),
    };

    let resp = client
        .post("https://api.resend.com/emails")
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        tracing::error!("Resend API error: {status} - {text}");
        color_eyre::eyre::bail!("Resend API returned {status}");
    }

    tracing::info!("score email sent to {to_email}");
    Ok(())
}
