use color_eyre::Result;
use libsql::params;

use super::helpers::query_optional;
use super::Db;
use crate::models::GlobalConfig;
use crate::names;

#[derive(serde::Deserialize)]
struct ConfigRow {
    value: String,
}

impl Db {
    pub async fn get_global_config(&self) -> Result<GlobalConfig> {
        let conn = self.conn()?;
        let row = query_optional::<ConfigRow>(
            &conn,
            "SELECT value FROM global_state WHERE key = ?",
            params![names::CONFIG_KEY],
        )
        .await?;

        match row {
            Some(row) => Ok(serde_json::from_str(&row.value)?),
            None => Ok(GlobalConfig::default()),
        }
    }

    /// Singleton upsert; last write wins.
    pub async fn save_global_config(&self, config: &GlobalConfig) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO global_state (key, value, updated_at) VALUES (?, ?, datetime('now'))
            ON CONFLICT (key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![names::CONFIG_KEY, serde_json::to_string(config)?],
        )
        .await?;
        Ok(())
    }
}
