use rusqlite::Connection;
use tracing::info;

use crate::error::StoreResult;

/// Creates `users` and `messages` if absent. Safe to run any number of times.
pub fn run(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            name            TEXT PRIMARY KEY NOT NULL,
            hashed_password TEXT NOT NULL,
            role            TEXT NOT NULL DEFAULT 'Client',
            CHECK (role IN ('Client', 'Doctor'))
        );

        CREATE TABLE IF NOT EXISTS messages (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            author_name TEXT NOT NULL,
            message     TEXT NOT NULL,
            status      TEXT NOT NULL DEFAULT 'Queue',
            time        TEXT NOT NULL DEFAULT '2000-01-01, 00:00',
            is_doc      INTEGER NOT NULL DEFAULT 0,
            CHECK (status IN ('Queue', 'Answered')),
            CHECK (length(message) <= 1000)
        );

        CREATE INDEX IF NOT EXISTS idx_messages_status
            ON messages(status, id);

        CREATE INDEX IF NOT EXISTS idx_messages_author
            ON messages(author_name, id);
        ",
    )?;

    info!("Store schema ready");
    Ok(())
}
