//! Entry reads and writes within a generation.
//!
//! Writes use UPSERT semantics, so concurrent populations of the same
//! request resolve to the last write.

use super::connection::CacheDb;
use super::entry::{RequestKey, StoredResponse};
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, Transaction};

fn upsert(tx: &Transaction<'_>, generation: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&response.headers)?;
    tx.execute(
        "INSERT INTO entries (
            generation, key, method, url, response_url, status, status_text, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(generation, key) DO UPDATE SET
            response_url = excluded.response_url,
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            generation,
            key.digest(),
            &key.method,
            &key.url,
            &response.url,
            response.status,
            &response.status_text,
            headers_json,
            &response.body,
            &response.stored_at,
        ],
    )?;
    Ok(())
}

fn open_in(tx: &Transaction<'_>, generation: &str) -> Result<(), Error> {
    tx.execute(
        "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
        params![generation, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

impl CacheDb {
    /// Store one entry, opening the generation first if needed.
    pub async fn put_entry(&self, generation: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error> {
        let generation = generation.to_string();
        let key = key.clone();
        let response = response.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                open_in(&tx, &generation)?;
                upsert(&tx, &generation, &key, &response)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store a batch of entries in one transaction: all are written or none are.
    pub async fn put_entries(&self, generation: &str, entries: &[(RequestKey, StoredResponse)]) -> Result<(), Error> {
        let generation = generation.to_string();
        let entries = entries.to_vec();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                open_in(&tx, &generation)?;
                for (key, response) in &entries {
                    upsert(&tx, &generation, key, response)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the entry for a request identity in one generation.
    ///
    /// Returns None if the generation or the entry doesn't exist.
    pub async fn match_entry(&self, generation: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        let generation = generation.to_string();
        let digest = key.digest();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT response_url, status, status_text, headers_json, body, stored_at
                     FROM entries WHERE generation = ?1 AND key = ?2",
                )?;

                let result = stmt.query_row(params![generation, digest], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u16>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Vec<u8>>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                });

                match result {
                    Ok((url, status, status_text, headers_json, body, stored_at)) => Ok(Some(StoredResponse {
                        url,
                        status,
                        status_text,
                        headers: serde_json::from_str(&headers_json)?,
                        body,
                        stored_at,
                    })),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries stored in a generation.
    pub async fn count_entries(&self, generation: &str) -> Result<u64, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE generation = ?1", params![generation], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
