//! Named key-value slots stored in `kv_slots`.
//!
//! A slot holds one opaque text document. Writes replace the whole value;
//! there are no partial or append writes.

use super::DbResult;
use rusqlite::{params, Connection, OptionalExtension};

/// Reads the raw value stored in `key`, or `None` when the slot is empty.
pub fn read_slot(conn: &Connection, key: &str) -> DbResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM kv_slots WHERE key = ?1;",
            [key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

/// Replaces the value stored in `key` in a single transaction.
pub fn write_slot(conn: &mut Connection, key: &str, value: &str) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO kv_slots (key, value, updated_at)
         VALUES (?1, ?2, strftime('%s', 'now') * 1000)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at;",
        params![key, value],
    )?;
    tx.commit()?;
    Ok(())
}

/// Removes `key`. Returns whether a slot existed.
pub fn remove_slot(conn: &Connection, key: &str) -> DbResult<bool> {
    let changed = conn.execute("DELETE FROM kv_slots WHERE key = ?1;", [key])?;
    Ok(changed > 0)
}
