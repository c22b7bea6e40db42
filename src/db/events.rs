use chrono::Utc;
use color_eyre::Result;
use libsql::params;

use super::Db;

impl Db {
    /// Best-effort event log. Failures are traced and swallowed so a logging
    /// problem can never abort the operation being logged.
    pub async fn log_event(
        &self,
        username: Option<&str>,
        event_type: &str,
        payload: serde_json::Value,
    ) {
        if let Err(e) = self.try_log_event(username, event_type, &payload).await {
            tracing::warn!("could not log event {event_type}: {e}");
        }
    }

    async fn try_log_event(
        &self,
        username: Option<&str>,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO event_logs (username, event_type, payload, created_at) \
             VALUES (?, ?, ?, ?)",
            params![
                username.map(str::to_string),
                event_type,
                payload.to_string(),
                Utc::now().to_rfc3339()
            ],
        )
        .await?;
        Ok(())
    }
}
