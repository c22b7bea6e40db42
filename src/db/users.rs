use color_eyre::Result;
use libsql::params;

use super::helpers::query_optional;
use super::Db;
use crate::models::{Role, User};

impl Db {
    pub async fn get_user(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        query_optional::<User>(
            &conn,
            "SELECT username, role, last_played_date FROM users WHERE username = ?",
            params![username],
        )
        .await
    }

    /// Upsert keyed by username; role and last played day follow the caller.
    pub async fn save_user(&self, user: &User) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO users (username, role, last_played_date) VALUES (?, ?, ?)
            ON CONFLICT (username)
            DO UPDATE SET role = excluded.role, last_played_date = excluded.last_played_date
            "#,
            params![
                user.username.as_str(),
                user.role.to_string(),
                user.last_played_date.map(|d| d.to_string())
            ],
        )
        .await?;
        Ok(())
    }
}

/// First-login convenience: fetch the user, creating a plain USER on miss.
pub async fn ensure_user(store: &super::Store, username: &str) -> Result<User> {
    if let Some(user) = store.get_user(username).await? {
        return Ok(user);
    }

    let user = User {
        username: username.to_string(),
        role: Role::User,
        last_played_date: None,
    };
    store.save_user(&user).await?;
    tracing::info!("new user created: username={username}");
    Ok(user)
}
