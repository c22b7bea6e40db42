// Database schema initialization

use color_eyre::Result;

pub async fn create_schema(conn: &libsql::Connection) -> Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            username TEXT PRIMARY KEY,
            role TEXT NOT NULL CHECK (role IN ('USER', 'ADMIN')),
            last_played_date TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS results (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
            score INTEGER NOT NULL,
            total_questions INTEGER NOT NULL,
            date TEXT NOT NULL,
            difficulty_level TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_results_username ON results(username)",
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY,
            question_text TEXT NOT NULL,
            options TEXT NOT NULL,
            correct_index INTEGER NOT NULL,
            explanation TEXT,
            difficulty TEXT CHECK (difficulty IN ('EASY', 'MEDIUM', 'HARD', 'EXPERT', 'ADAPTIVE')),
            source TEXT CHECK (source IN ('AI', 'MANUAL')),
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_questions_difficulty ON questions(difficulty)",
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS user_badges (
            username TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
            badge_id TEXT NOT NULL,
            date_earned TEXT NOT NULL,
            PRIMARY KEY (username, badge_id)
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS global_state (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TEXT DEFAULT (datetime('now'))
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS seen_questions (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
            question_text TEXT NOT NULL,
            question_id INTEGER,
            seen_at TEXT DEFAULT (datetime('now'))
        )
        "#,
        (),
    )
    .await?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS event_logs (
            id INTEGER PRIMARY KEY,
            username TEXT,
            event_type TEXT NOT NULL,
            payload TEXT,
            created_at TEXT NOT NULL
        )
        "#,
        (),
    )
    .await?;

    // Seed the configuration singleton on first run.
    conn.execute(
        r#"
        INSERT OR IGNORE INTO global_state (key, value)
        VALUES ('config', '{"isManualOverride":false,"isQuizOpen":false,"maxQuestionsPerQuiz":10,"pointsPerQuestion":5}')
        "#,
        (),
    )
    .await?;

    Ok(())
}
