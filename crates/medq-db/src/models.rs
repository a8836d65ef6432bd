//! Raw row shapes as SQLite returns them. Enum columns stay as text here and
//! are decoded when converted into the `medq-types` models.

use medq_types::models::{Message, MessageStatus, User, UserRole};
use rusqlite::Row;

use crate::error::StoreError;

pub(crate) const MESSAGE_COLUMNS: &str = "id, author_name, message, status, time, is_doc";

pub struct UserRow {
    pub name: String,
    pub hashed_password: String,
    pub role: String,
}

impl UserRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            hashed_password: row.get(1)?,
            role: row.get(2)?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = UserRole::from_name(&row.role).ok_or(StoreError::UnknownRole(row.role))?;
        Ok(User {
            name: row.name,
            hashed_password: row.hashed_password,
            role,
        })
    }
}

pub struct MessageRow {
    pub id: i64,
    pub author_name: String,
    pub message: String,
    pub status: String,
    pub time: String,
    pub is_doc: bool,
}

impl MessageRow {
    /// Expects the columns in `MESSAGE_COLUMNS` order.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            author_name: row.get(1)?,
            message: row.get(2)?,
            status: row.get(3)?,
            time: row.get(4)?,
            is_doc: row.get(5)?,
        })
    }
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let status =
            MessageStatus::from_name(&row.status).ok_or(StoreError::UnknownStatus(row.status))?;
        Ok(Message {
            id: row.id,
            author_name: row.author_name,
            message_text: row.message,
            status,
            sent_date: row.time,
            is_doc: row.is_doc,
        })
    }
}
