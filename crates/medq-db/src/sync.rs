//! "What's new" reads.
//!
//! Two ways to resume a poll. Offset reads refetch every matching row in id
//! order and drop the first `offset` of them; they are only stable while no
//! earlier row leaves the result set. Cursor reads return rows with an id
//! greater than the last one the caller saw, which survives status changes
//! and costs only the new rows.

use medq_types::models::{Message, MessageStatus};
use rusqlite::{Connection, ToSql, params};

use crate::StoreGateway;
use crate::error::StoreResult;
use crate::models::{MESSAGE_COLUMNS, MessageRow};
use crate::queries::absorb;

impl StoreGateway {
    // -- Offset sync --

    /// Queued messages in id order, minus the first `offset`.
    pub fn try_get_queue(&self, offset: usize) -> StoreResult<Vec<Message>> {
        self.with_conn(|conn| {
            let sql =
                format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE status = ?1 ORDER BY id");
            query_messages(conn, &sql, params![MessageStatus::Queue.as_str()], offset)
        })
    }

    /// Empty both when nothing is new and when the store failed.
    pub fn get_queue(&self, offset: usize) -> Vec<Message> {
        absorb("get_queue", self.try_get_queue(offset), Vec::new)
    }

    /// Every message in `username`'s thread, any status, in id order, minus the first `offset`.
    pub fn try_get_new_messages(&self, username: &str, offset: usize) -> StoreResult<Vec<Message>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE author_name = ?1 ORDER BY id"
            );
            query_messages(conn, &sql, params![username], offset)
        })
    }

    pub fn get_new_messages(&self, username: &str, offset: usize) -> Vec<Message> {
        absorb(
            "get_new_messages",
            self.try_get_new_messages(username, offset),
            Vec::new,
        )
    }

    // -- Cursor sync --

    /// Queued messages with an id above `last_seen_id`.
    pub fn try_get_queue_after(&self, last_seen_id: i64) -> StoreResult<Vec<Message>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE status = ?1 AND id > ?2 ORDER BY id"
            );
            query_messages(
                conn,
                &sql,
                params![MessageStatus::Queue.as_str(), last_seen_id],
                0,
            )
        })
    }

    pub fn get_queue_after(&self, last_seen_id: i64) -> Vec<Message> {
        absorb(
            "get_queue_after",
            self.try_get_queue_after(last_seen_id),
            Vec::new,
        )
    }

    /// Messages in `username`'s thread with an id above `last_seen_id`.
    pub fn try_get_new_messages_after(
        &self,
        username: &str,
        last_seen_id: i64,
    ) -> StoreResult<Vec<Message>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE author_name = ?1 AND id > ?2 ORDER BY id"
            );
            query_messages(conn, &sql, params![username, last_seen_id], 0)
        })
    }

    pub fn get_new_messages_after(&self, username: &str, last_seen_id: i64) -> Vec<Message> {
        absorb(
            "get_new_messages_after",
            self.try_get_new_messages_after(username, last_seen_id),
            Vec::new,
        )
    }
}

fn query_messages(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
    offset: usize,
) -> StoreResult<Vec<Message>> {
    let mut stmt = conn.prepare(sql)?;

    let rows = stmt
        .query_map(params, MessageRow::from_row)?
        .skip(offset)
        .map(|row| Message::try_from(row?))
        .collect::<StoreResult<Vec<_>>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_gateway;

    fn texts(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.message_text.as_str()).collect()
    }

    fn seed_queue(gateway: &StoreGateway, n: usize) -> Vec<i64> {
        (1..=n)
            .map(|i| gateway.try_insert_message("alice", &format!("q{i}"), false).unwrap())
            .collect()
    }

    #[test]
    fn queue_offset_returns_suffix() {
        let (_dir, gateway) = temp_gateway();
        seed_queue(&gateway, 5);

        assert_eq!(texts(&gateway.get_queue(0)), ["q1", "q2", "q3", "q4", "q5"]);
        assert_eq!(texts(&gateway.get_queue(2)), ["q3", "q4", "q5"]);
        assert!(gateway.get_queue(5).is_empty());
        assert!(gateway.get_queue(50).is_empty());
    }

    #[test]
    fn queue_excludes_answered_messages() {
        let (_dir, gateway) = temp_gateway();
        let ids = seed_queue(&gateway, 3);
        gateway.change_message_status(ids[1], MessageStatus::Answered);

        let queue = gateway.get_queue(0);
        assert_eq!(texts(&queue), ["q1", "q3"]);
        assert!(queue.iter().all(|m| m.status == MessageStatus::Queue));
    }

    #[test]
    fn answering_shifts_queue_offsets() {
        let (_dir, gateway) = temp_gateway();
        let ids = seed_queue(&gateway, 4);

        // A poller that has seen two messages...
        let seen = gateway.get_queue(0)[..2].to_vec();
        assert_eq!(texts(&seen), ["q1", "q2"]);

        // ...misses q3 after q1 leaves the queue, because offsets are positional.
        gateway.change_message_status(ids[0], MessageStatus::Answered);
        assert_eq!(texts(&gateway.get_queue(2)), ["q4"]);

        // The cursor read resumes from the last id seen and still finds it.
        let last_seen = seen.last().unwrap().id;
        assert_eq!(texts(&gateway.get_queue_after(last_seen)), ["q3", "q4"]);
    }

    #[test]
    fn author_sync_skips_other_authors() {
        let (_dir, gateway) = temp_gateway();
        gateway.insert_message("alice", "a1", false);
        gateway.insert_message("bob", "b1", false);
        gateway.insert_message("alice", "a2", false);
        gateway.insert_message("bob", "b2", false);
        gateway.insert_message("alice", "a3", true);

        let new = gateway.get_new_messages("alice", 1);
        assert_eq!(texts(&new), ["a2", "a3"]);
        assert!(new.iter().all(|m| m.author_name == "alice"));
        assert!(new.last().unwrap().is_doc);
    }

    #[test]
    fn author_sync_includes_answered_messages() {
        let (_dir, gateway) = temp_gateway();
        gateway.insert_message("alice", "a1", false);
        gateway.insert_message("alice", "a2", false);
        gateway.mark_messages_as_answered("alice");

        let all = gateway.get_new_messages("alice", 0);
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|m| m.status == MessageStatus::Answered));
        assert!(gateway.get_queue(0).is_empty());
    }

    #[test]
    fn author_cursor_sync_returns_only_newer_ids() {
        let (_dir, gateway) = temp_gateway();
        let first = gateway.try_insert_message("alice", "a1", false).unwrap();
        gateway.insert_message("bob", "b1", false);
        gateway.insert_message("alice", "a2", false);

        assert_eq!(texts(&gateway.get_new_messages_after("alice", 0)), ["a1", "a2"]);
        assert_eq!(texts(&gateway.get_new_messages_after("alice", first)), ["a2"]);
        assert!(gateway.get_new_messages_after("carol", 0).is_empty());
    }

    #[test]
    fn reads_on_unreachable_store_are_empty_but_try_variants_err() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = StoreGateway::connect(crate::StoreConfig::new(
            dir.path().join("missing").join("medq.db"),
        ));

        assert!(gateway.get_queue(0).is_empty());
        assert!(gateway.get_new_messages("alice", 0).is_empty());
        assert!(gateway.try_get_queue(0).is_err());
        assert!(gateway.try_get_new_messages_after("alice", 0).is_err());
    }
}
