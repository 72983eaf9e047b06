// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Row stores: the remote tables every collection is persisted to.
//!
//! Rows travel as JSON objects whose keys are the storage field names. The
//! typed helpers at the bottom map records to and from those rows.

use chrono::{SecondsFormat, Utc};
use log::debug;
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::path::Path;

use crate::db::{TABLES, init_schema};
use crate::error::{DeskError, DeskResult};
use crate::models::Record;

/// Table/collection access shared by the local and hosted backends.
pub trait RowStore {
    /// All rows, newest `created_at` first.
    fn select_all(&self, table: &str) -> DeskResult<Vec<Value>>;

    fn select_one(&self, table: &str, id: &str) -> DeskResult<Option<Value>>;

    fn insert(&self, table: &str, row: &Value) -> DeskResult<()>;

    fn update(&self, table: &str, id: &str, row: &Value) -> DeskResult<()>;

    fn delete(&self, table: &str, id: &str) -> DeskResult<()>;

    /// Insert or replace; used for the single settings row.
    fn upsert(&self, table: &str, id: &str, row: &Value) -> DeskResult<()>;
}

fn check_table(table: &str) -> DeskResult<()> {
    if TABLES.contains(&table) {
        Ok(())
    } else {
        Err(DeskError::Invalid(format!("unknown table '{}'", table)))
    }
}

fn not_found(table: &str, id: &str) -> DeskError {
    DeskError::NotFound {
        table: table.to_string(),
        id: id.to_string(),
    }
}

/// SQLite-backed store; each table keeps the row JSON in a `data` column.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> DeskResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> DeskResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> DeskResult<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn created_at_of(row: &Value) -> String {
        row.get("created_at")
            .and_then(Value::as_str)
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

impl RowStore for SqliteStore {
    fn select_all(&self, table: &str) -> DeskResult<Vec<Value>> {
        check_table(table)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT data FROM {table} ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            let data = row?;
            out.push(serde_json::from_str(&data)?);
        }
        Ok(out)
    }

    fn select_one(&self, table: &str, id: &str) -> DeskResult<Option<Value>> {
        check_table(table)?;
        let data: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT data FROM {table} WHERE id=?1"),
                params![id],
                |r| r.get(0),
            )
            .optional()?;
        match data {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, table: &str, row: &Value) -> DeskResult<()> {
        check_table(table)?;
        let id = row
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| DeskError::Invalid(format!("{} row without id", table)))?;
        self.conn.execute(
            &format!("INSERT INTO {table}(id, created_at, data) VALUES (?1, ?2, ?3)"),
            params![id, Self::created_at_of(row), serde_json::to_string(row)?],
        )?;
        Ok(())
    }

    fn update(&self, table: &str, id: &str, row: &Value) -> DeskResult<()> {
        check_table(table)?;
        let changed = self.conn.execute(
            &format!("UPDATE {table} SET created_at=?2, data=?3 WHERE id=?1"),
            params![id, Self::created_at_of(row), serde_json::to_string(row)?],
        )?;
        if changed == 0 {
            return Err(not_found(table, id));
        }
        Ok(())
    }

    fn delete(&self, table: &str, id: &str) -> DeskResult<()> {
        check_table(table)?;
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {table} WHERE id=?1"), params![id])?;
        if changed == 0 {
            return Err(not_found(table, id));
        }
        Ok(())
    }

    fn upsert(&self, table: &str, id: &str, row: &Value) -> DeskResult<()> {
        check_table(table)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {table}(id, created_at, data) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET data=excluded.data"
            ),
            params![id, Self::created_at_of(row), serde_json::to_string(row)?],
        )?;
        Ok(())
    }
}

/// Hosted backend speaking the PostgREST dialect (`/rest/v1/{table}`).
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: String,
}

impl RestStore {
    pub fn new(client: Client, base_url: &str, api_key: &str, access_token: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: access_token.to_string(),
        }
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.access_token)
    }

    fn send_rows(&self, req: RequestBuilder) -> DeskResult<Vec<Value>> {
        let resp = req.send()?.error_for_status()?;
        Ok(resp.json::<Vec<Value>>()?)
    }
}

impl RowStore for RestStore {
    fn select_all(&self, table: &str) -> DeskResult<Vec<Value>> {
        check_table(table)?;
        debug!("GET {}", self.table_url(table));
        self.send_rows(
            self.request(Method::GET, table)
                .query(&[("select", "*"), ("order", "created_at.desc")]),
        )
    }

    fn select_one(&self, table: &str, id: &str) -> DeskResult<Option<Value>> {
        check_table(table)?;
        let rows = self.send_rows(
            self.request(Method::GET, table)
                .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))]),
        )?;
        Ok(rows.into_iter().next())
    }

    fn insert(&self, table: &str, row: &Value) -> DeskResult<()> {
        check_table(table)?;
        self.request(Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn update(&self, table: &str, id: &str, row: &Value) -> DeskResult<()> {
        check_table(table)?;
        let rows = self.send_rows(
            self.request(Method::PATCH, table)
                .query(&[("id", format!("eq.{id}"))])
                .header("Prefer", "return=representation")
                .json(row),
        )?;
        if rows.is_empty() {
            return Err(not_found(table, id));
        }
        Ok(())
    }

    fn delete(&self, table: &str, id: &str) -> DeskResult<()> {
        check_table(table)?;
        let rows = self.send_rows(
            self.request(Method::DELETE, table)
                .query(&[("id", format!("eq.{id}"))])
                .header("Prefer", "return=representation"),
        )?;
        if rows.is_empty() {
            return Err(not_found(table, id));
        }
        Ok(())
    }

    fn upsert(&self, table: &str, id: &str, row: &Value) -> DeskResult<()> {
        check_table(table)?;
        let mut body = row.clone();
        if let Some(obj) = body.as_object_mut() {
            obj.insert("id".to_string(), Value::String(id.to_string()));
        }
        self.request(Method::POST, table)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body)
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

pub fn fetch_all<T: Record>(store: &dyn RowStore) -> DeskResult<Vec<T>> {
    store
        .select_all(T::TABLE)?
        .into_iter()
        .map(|row| serde_json::from_value(row).map_err(DeskError::from))
        .collect()
}

pub fn insert_record<T: Record>(store: &dyn RowStore, record: &T) -> DeskResult<()> {
    store.insert(T::TABLE, &serde_json::to_value(record)?)
}

pub fn update_record<T: Record>(store: &dyn RowStore, record: &T) -> DeskResult<()> {
    store.update(T::TABLE, record.id(), &serde_json::to_value(record)?)
}

pub fn delete_record<T: Record>(store: &dyn RowStore, id: &str) -> DeskResult<()> {
    store.delete(T::TABLE, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sqlite_rows_come_back_newest_first() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .insert("sales", &json!({"id": "a", "created_at": "2024-03-01T10:00:00Z"}))
            .unwrap();
        store
            .insert("sales", &json!({"id": "b", "created_at": "2024-03-02T10:00:00Z"}))
            .unwrap();
        let rows = store.select_all("sales").unwrap();
        assert_eq!(rows[0]["id"], "b");
        assert_eq!(rows[1]["id"], "a");
    }

    #[test]
    fn sqlite_update_and_delete_of_missing_row_is_not_found() {
        let store = SqliteStore::in_memory().unwrap();
        let err = store.update("sales", "nope", &json!({"id": "nope"})).unwrap_err();
        assert!(matches!(err, DeskError::NotFound { .. }));
        let err = store.delete("sales", "nope").unwrap_err();
        assert!(matches!(err, DeskError::NotFound { .. }));
    }

    #[test]
    fn unknown_table_is_rejected() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.select_all("sales; DROP TABLE sales").is_err());
    }

    #[test]
    fn rest_table_url_trims_trailing_slash() {
        let store = RestStore::new(Client::new(), "https://desk.example.co/", "k", "t");
        assert_eq!(store.table_url("sales"), "https://desk.example.co/rest/v1/sales");
    }
}
