use medq_types::models::{MAX_MESSAGE_CHARS, MessageStatus, User, UserRole};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, error, warn};

use crate::StoreGateway;
use crate::error::{StoreError, StoreResult};
use crate::models::UserRow;

/// `messages.time` layout: local time, minute precision.
pub const SENT_DATE_FORMAT: &str = "%Y-%m-%d, %H:%M";

impl StoreGateway {
    // -- Users --

    /// Inserts the user unless the name is taken; an existing row is left untouched.
    /// Returns `true` when a new row was written.
    pub fn try_insert_user_or_exists(
        &self,
        name: &str,
        hashed_password: &str,
        role: UserRole,
    ) -> StoreResult<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO users (name, hashed_password, role) VALUES (?1, ?2, ?3)",
                params![name, hashed_password, role.as_str()],
            )?;
            if inserted == 0 {
                debug!("User {} already exists", name);
            }
            Ok(inserted == 1)
        })
    }

    /// `false` only on a store failure; an existing name still counts as success.
    pub fn insert_user_or_exists(&self, name: &str, hashed_password: &str, role: UserRole) -> bool {
        absorb(
            "insert_user_or_exists",
            self.try_insert_user_or_exists(name, hashed_password, role)
                .map(|_| true),
            || false,
        )
    }

    pub fn try_get_user(&self, name: &str) -> StoreResult<Option<User>> {
        self.with_conn(|conn| query_user(conn, name))
    }

    /// `None` both when the user does not exist and when the lookup failed.
    pub fn get_user(&self, name: &str) -> Option<User> {
        absorb("get_user", self.try_get_user(name), || None)
    }

    // -- Messages --

    /// Appends a `Queue` message stamped with the current time and returns its id.
    pub fn try_insert_message(&self, author: &str, text: &str, is_doc: bool) -> StoreResult<i64> {
        check_length(text)?;
        let now = sent_date_now();

        self.with_conn(|conn| insert_message_row(conn, author, text, &now, is_doc))
    }

    pub fn insert_message(&self, author: &str, text: &str, is_doc: bool) -> bool {
        absorb(
            "insert_message",
            self.try_insert_message(author, text, is_doc).map(|_| true),
            || false,
        )
    }

    /// Unchecked status write: any status may be set, including back to `Queue`.
    /// Returns the number of rows touched (0 or 1).
    pub fn try_change_message_status(
        &self,
        message_id: i64,
        new_status: MessageStatus,
    ) -> StoreResult<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET status = ?1 WHERE id = ?2",
                params![new_status.as_str(), message_id],
            )?;
            Ok(changed)
        })
    }

    pub fn change_message_status(&self, message_id: i64, new_status: MessageStatus) -> bool {
        absorb(
            "change_message_status",
            self.try_change_message_status(message_id, new_status)
                .map(|_| true),
            || false,
        )
    }

    /// Guarded Queue -> Answered transition for one message.
    /// Returns `false` when the message is missing or already answered.
    pub fn answer_message(&self, message_id: i64) -> StoreResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET status = ?1 WHERE id = ?2 AND status = ?3",
                params![
                    MessageStatus::Answered.as_str(),
                    message_id,
                    MessageStatus::Queue.as_str()
                ],
            )?;
            Ok(changed == 1)
        })
    }

    /// Marks every message in the author's thread answered, whatever its
    /// current status. Returns the number of rows touched.
    pub fn try_mark_messages_as_answered(&self, author_name: &str) -> StoreResult<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE messages SET status = ?1 WHERE author_name = ?2",
                params![MessageStatus::Answered.as_str(), author_name],
            )?;
            debug!("Marked {} messages by {} answered", changed, author_name);
            Ok(changed)
        })
    }

    pub fn mark_messages_as_answered(&self, author_name: &str) -> bool {
        absorb(
            "mark_messages_as_answered",
            self.try_mark_messages_as_answered(author_name)
                .map(|_| true),
            || false,
        )
    }

    /// Marks the author's messages with an id up to `through_id` answered.
    /// Anything the author sent later stays as it is.
    pub fn try_mark_messages_as_answered_through(
        &self,
        author_name: &str,
        through_id: i64,
    ) -> StoreResult<usize> {
        self.with_conn(|conn| mark_answered_through(conn, author_name, through_id))
    }

    /// Files a doctor reply into `client`'s thread and closes the thread up to
    /// and including the reply, in one transaction. Returns the reply's id.
    pub fn try_insert_reply(&self, client: &str, text: &str) -> StoreResult<i64> {
        check_length(text)?;
        let now = sent_date_now();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let id = insert_message_row(&tx, client, text, &now, true)?;
            let closed = mark_answered_through(&tx, client, id)?;
            tx.commit()?;

            debug!("Reply {} closed {} messages in {}'s thread", id, closed, client);
            Ok(id)
        })
    }
}

fn check_length(text: &str) -> StoreResult<()> {
    let len = text.chars().count();
    if len > MAX_MESSAGE_CHARS {
        return Err(StoreError::MessageTooLong {
            len,
            max: MAX_MESSAGE_CHARS,
        });
    }
    Ok(())
}

fn sent_date_now() -> String {
    chrono::Local::now().format(SENT_DATE_FORMAT).to_string()
}

fn insert_message_row(
    conn: &Connection,
    author: &str,
    text: &str,
    sent_date: &str,
    is_doc: bool,
) -> StoreResult<i64> {
    conn.execute(
        "INSERT INTO messages (author_name, message, status, time, is_doc)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![author, text, MessageStatus::Queue.as_str(), sent_date, is_doc],
    )?;
    Ok(conn.last_insert_rowid())
}

fn mark_answered_through(
    conn: &Connection,
    author_name: &str,
    through_id: i64,
) -> StoreResult<usize> {
    let changed = conn.execute(
        "UPDATE messages SET status = ?1 WHERE author_name = ?2 AND id <= ?3",
        params![MessageStatus::Answered.as_str(), author_name, through_id],
    )?;
    Ok(changed)
}

fn query_user(conn: &Connection, name: &str) -> StoreResult<Option<User>> {
    let mut stmt = conn.prepare("SELECT name, hashed_password, role FROM users WHERE name = ?1")?;

    let row = stmt.query_row([name], UserRow::from_row).optional()?;

    row.map(User::try_from).transpose()
}

/// Logs a failed operation and swaps the error for the operation's negative value.
pub(crate) fn absorb<T>(op: &str, result: StoreResult<T>, fallback: impl FnOnce() -> T) -> T {
    result.unwrap_or_else(|e| {
        match &e {
            StoreError::MessageTooLong { .. } => warn!("{} rejected: {}", op, e),
            _ => error!("Store error in '{}': {}", op, e),
        }
        fallback()
    })
}
