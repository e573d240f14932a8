use crate::model::{AuthSpec, BodySpec, NameValue, RequestRecord, ResponseRecord};
use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Requests in id order plus one message per row that could not be decoded.
#[derive(Debug, Default)]
pub struct LoadedRequests {
    pub requests: Vec<RequestRecord>,
    pub warnings: Vec<String>,
}

pub trait Store {
    fn list_requests(&self) -> Result<LoadedRequests, StoreError>;
    /// Inserts when `request.id` is `None` (assigning it), upserts otherwise.
    fn save(&mut self, request: &mut RequestRecord) -> Result<(), StoreError>;
    /// Removes the request and its responses.
    fn delete(&mut self, id: i64) -> Result<(), StoreError>;
    fn append_response(&mut self, response: &mut ResponseRecord) -> Result<(), StoreError>;
}

const SCHEMA: &str = "
PRAGMA foreign_keys = ON;
CREATE TABLE IF NOT EXISTS requests (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    method TEXT NOT NULL,
    url TEXT,
    body TEXT,
    auth TEXT,
    query TEXT,
    headers TEXT
);
CREATE TABLE IF NOT EXISTS responses (
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    request_id INTEGER NOT NULL,
    request_method TEXT,
    request_url TEXT,
    body TEXT,
    status TEXT,
    headers TEXT,
    cookies TEXT,
    duration TEXT,
    size TEXT,
    response_at INTEGER,
    trace_logs TEXT,
    FOREIGN KEY (request_id) REFERENCES requests (id) ON DELETE CASCADE ON UPDATE CASCADE
);
";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

struct RawRequest {
    id: i64,
    name: String,
    method: String,
    url: Option<String>,
    body: Option<String>,
    auth: Option<String>,
    query: Option<String>,
    headers: Option<String>,
}

impl RawRequest {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            method: row.get(2)?,
            url: row.get(3)?,
            body: row.get(4)?,
            auth: row.get(5)?,
            query: row.get(6)?,
            headers: row.get(7)?,
        })
    }

    fn decode(self) -> Result<RequestRecord, StoreError> {
        let mut body: BodySpec = decode_or_default(self.body.as_deref())?;
        body.normalize();
        let mut auth: AuthSpec = decode_or_default(self.auth.as_deref())?;
        auth.normalize();
        Ok(RequestRecord {
            id: Some(self.id),
            name: self.name,
            method: self.method,
            url: self.url.unwrap_or_default(),
            body,
            auth,
            query: decode_or_default(self.query.as_deref())?,
            headers: decode_or_default(self.headers.as_deref())?,
            responses: Vec::new(),
        })
    }
}

struct RawResponse {
    id: i64,
    request_id: i64,
    request_method: Option<String>,
    request_url: Option<String>,
    body: Option<String>,
    status: Option<String>,
    headers: Option<String>,
    cookies: Option<String>,
    duration: Option<String>,
    size: Option<String>,
    response_at: Option<i64>,
    trace_logs: Option<String>,
}

impl RawResponse {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            request_id: row.get(1)?,
            request_method: row.get(2)?,
            request_url: row.get(3)?,
            body: row.get(4)?,
            status: row.get(5)?,
            headers: row.get(6)?,
            cookies: row.get(7)?,
            duration: row.get(8)?,
            size: row.get(9)?,
            response_at: row.get(10)?,
            trace_logs: row.get(11)?,
        })
    }

    fn decode(self) -> Result<ResponseRecord, StoreError> {
        let response_at = self
            .response_at
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_default();
        Ok(ResponseRecord {
            id: Some(self.id),
            request_id: self.request_id,
            request_method: self.request_method.unwrap_or_default(),
            request_url: self.request_url.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            headers: decode_or_default(self.headers.as_deref())?,
            cookies: decode_or_default(self.cookies.as_deref())?,
            duration: self.duration.unwrap_or_default(),
            size: self.size.unwrap_or_default(),
            response_at,
            trace_logs: self.trace_logs.unwrap_or_default(),
        })
    }
}

fn decode_or_default<T: serde::de::DeserializeOwned + Default>(
    raw: Option<&str>,
) -> Result<T, StoreError> {
    match raw.map(str::trim) {
        None | Some("") | Some("null") => Ok(T::default()),
        Some(s) => Ok(serde_json::from_str(s)?),
    }
}

fn pairs_json(pairs: &[NameValue]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(pairs)?)
}

impl Store for SqliteStore {
    fn list_requests(&self) -> Result<LoadedRequests, StoreError> {
        let mut out = LoadedRequests::default();
        let mut index: HashMap<i64, usize> = HashMap::new();

        let mut stmt = self.conn.prepare(
            "SELECT id, name, method, url, body, auth, query, headers FROM requests ORDER BY id",
        )?;
        let rows = stmt.query_map([], RawRequest::from_row)?;
        for row in rows {
            let raw = row?;
            let id = raw.id;
            match raw.decode() {
                Ok(req) => {
                    index.insert(id, out.requests.len());
                    out.requests.push(req);
                }
                Err(e) => {
                    tracing::warn!(request_id = id, error = %e, "skipping undecodable request");
                    out.warnings.push(format!("request {id}: {e}"));
                }
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, request_id, request_method, request_url, body, status, headers, cookies, \
             duration, size, response_at, trace_logs FROM responses \
             ORDER BY response_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], RawResponse::from_row)?;
        for row in rows {
            let raw = row?;
            let (id, request_id) = (raw.id, raw.request_id);
            let Some(&slot) = index.get(&request_id) else {
                continue;
            };
            match raw.decode() {
                Ok(res) => out.requests[slot].responses.push(res),
                Err(e) => {
                    tracing::warn!(response_id = id, error = %e, "skipping undecodable response");
                    out.warnings.push(format!("response {id}: {e}"));
                }
            }
        }
        Ok(out)
    }

    fn save(&mut self, request: &mut RequestRecord) -> Result<(), StoreError> {
        let body = serde_json::to_string(&request.body)?;
        let auth = serde_json::to_string(&request.auth)?;
        let query = pairs_json(&request.query)?;
        let headers = pairs_json(&request.headers)?;
        match request.id {
            None => {
                self.conn.execute(
                    "INSERT INTO requests (name, method, url, body, auth, query, headers) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![request.name, request.method, request.url, body, auth, query, headers],
                )?;
                request.id = Some(self.conn.last_insert_rowid());
            }
            Some(id) => {
                self.conn.execute(
                    "INSERT INTO requests (id, name, method, url, body, auth, query, headers) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
                     ON CONFLICT(id) DO UPDATE SET name = excluded.name, method = excluded.method, \
                     url = excluded.url, body = excluded.body, auth = excluded.auth, \
                     query = excluded.query, headers = excluded.headers",
                    params![id, request.name, request.method, request.url, body, auth, query, headers],
                )?;
            }
        }
        tracing::debug!(request_id = ?request.id, name = %request.name, "request saved");
        Ok(())
    }

    fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM responses WHERE request_id = ?1", params![id])?;
        tx.execute("DELETE FROM requests WHERE id = ?1", params![id])?;
        tx.commit()?;
        tracing::debug!(request_id = id, "request deleted");
        Ok(())
    }

    fn append_response(&mut self, response: &mut ResponseRecord) -> Result<(), StoreError> {
        let headers = pairs_json(&response.headers)?;
        let cookies = pairs_json(&response.cookies)?;
        self.conn.execute(
            "INSERT INTO responses (request_id, request_method, request_url, body, status, headers, \
             cookies, duration, size, response_at, trace_logs) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                response.request_id,
                response.request_method,
                response.request_url,
                response.body,
                response.status,
                headers,
                cookies,
                response.duration,
                response.size,
                response.response_at.timestamp_millis(),
                response.trace_logs,
            ],
        )?;
        response.id = Some(self.conn.last_insert_rowid());
        Ok(())
    }
}

impl SqliteStore {
    #[cfg(test)]
    fn response_count(&self, request_id: i64) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM responses WHERE request_id = ?1",
            params![request_id],
            |r| r.get(0),
        )?)
    }
}
