//! A SQLite-resident advisory lock used to serialize indexing runs on the
//! same project. Stands in for the Redis lock the reference implementation
//! uses (`redis/lock_utils.py`); there is no Redis dependency anywhere in
//! this workspace, and a single `indexing_locks` row gives the same
//! acquire/extend/release contract without a second moving part.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Debug, Clone)]
pub struct LockHandle {
    pub key: String,
    pub holder: String,
    pub expires_at: DateTime<Utc>,
}

pub fn acquire(conn: &Connection, key: &str, holder: &str, ttl: Duration) -> Result<Option<LockHandle>> {
    let now = Utc::now();
    let expires_at = now + ttl;

    let tx = conn.unchecked_transaction()?;
    let current_expiry: Option<String> = tx
        .query_row(
            "SELECT expires_at FROM indexing_locks WHERE lock_key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;

    let free = match current_expiry {
        None => true,
        Some(raw) => parse(&raw)? <= now,
    };

    if !free {
        return Ok(None);
    }

    tx.execute(
        "INSERT INTO indexing_locks (lock_key, holder, expires_at) VALUES (?1, ?2, ?3)
         ON CONFLICT (lock_key) DO UPDATE SET holder = excluded.holder, expires_at = excluded.expires_at",
        params![key, holder, expires_at.to_rfc3339()],
    )?;
    tx.commit()?;

    Ok(Some(LockHandle {
        key: key.to_string(),
        holder: holder.to_string(),
        expires_at,
    }))
}

pub fn extend(conn: &Connection, handle: &mut LockHandle, ttl: Duration) -> Result<()> {
    let expires_at = Utc::now() + ttl;
    conn.execute(
        "UPDATE indexing_locks SET expires_at = ?1 WHERE lock_key = ?2 AND holder = ?3",
        params![expires_at.to_rfc3339(), handle.key, handle.holder],
    )?;
    handle.expires_at = expires_at;
    Ok(())
}

pub fn release(conn: &Connection, handle: &LockHandle) -> Result<()> {
    conn.execute(
        "DELETE FROM indexing_locks WHERE lock_key = ?1 AND holder = ?2",
        params![handle.key, handle.holder],
    )?;
    Ok(())
}

pub fn locked(conn: &Connection, key: &str) -> Result<bool> {
    let now = Utc::now();
    let current_expiry: Option<String> = conn
        .query_row(
            "SELECT expires_at FROM indexing_locks WHERE lock_key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(match current_expiry {
        None => false,
        Some(raw) => parse(&raw)? > now,
    })
}

/// Pure renewal policy: only push `expires_at` out once at least a quarter
/// of `ttl` has elapsed since the last renewal, so a fast-running task
/// issuing frequent heartbeats doesn't also hammer the lock table.
pub fn extend_lock(
    last_extended_at: DateTime<Utc>,
    now: DateTime<Utc>,
    ttl: Duration,
) -> DateTime<Utc> {
    if now - last_extended_at > ttl / 4 {
        now
    } else {
        last_extended_at
    }
}

fn parse(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(Utc::now()))
}
