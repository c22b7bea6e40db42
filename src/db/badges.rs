use chrono::Utc;
use color_eyre::Result;
use libsql::params;

use super::helpers::query_all;
use super::Db;
use crate::models::UserBadge;

impl Db {
    pub async fn get_user_badges(&self, username: &str) -> Result<Vec<UserBadge>> {
        let conn = self.conn()?;
        query_all::<UserBadge>(
            &conn,
            "SELECT username, badge_id, date_earned FROM user_badges WHERE username = ?",
            params![username],
        )
        .await
    }

    /// At-most-once award: the (username, badge_id) primary key makes a
    /// repeat insert a silent no-op.
    pub async fn award_badge(&self, username: &str, badge_id: &str) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn
            .execute(
                "INSERT OR IGNORE INTO user_badges (username, badge_id, date_earned) \
                 VALUES (?, ?, ?)",
                params![username, badge_id, Utc::now().to_rfc3339()],
            )
            .await?;

        if affected > 0 {
            tracing::info!("badge {badge_id} awarded to {username}");
        }
        Ok(())
    }
}
