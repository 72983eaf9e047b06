// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use std::path::PathBuf;

use crate::db;
use crate::session::Session;
use crate::store::{RestStore, RowStore, SqliteStore};
use crate::utils::http_client;

#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    Sqlite(PathBuf),
    Rest {
        url: String,
        api_key: String,
        access_token: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub session: Option<Session>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match (get("TRADEDESK_BACKEND_URL"), get("TRADEDESK_BACKEND_KEY")) {
            (Some(url), Some(api_key)) => {
                let access_token = get("TRADEDESK_ACCESS_TOKEN").unwrap_or_else(|| api_key.clone());
                Backend::Rest {
                    url,
                    api_key,
                    access_token,
                }
            }
            (Some(_), None) => bail!("TRADEDESK_BACKEND_URL is set but TRADEDESK_BACKEND_KEY is not"),
            _ => {
                let path = match get("TRADEDESK_DB") {
                    Some(p) => PathBuf::from(p),
                    None => db::default_db_path()?,
                };
                Backend::Sqlite(path)
            }
        };

        let session = match get("TRADEDESK_USER_EMAIL") {
            Some(email) => {
                let user_id = get("TRADEDESK_USER_ID").unwrap_or_else(|| email.clone());
                Some(Session::new(&user_id, &email))
            }
            None if matches!(backend, Backend::Sqlite(_)) => Some(Session::local()),
            None => None,
        };

        Ok(Self { backend, session })
    }

    pub fn open_store(&self) -> Result<Box<dyn RowStore>> {
        match &self.backend {
            Backend::Sqlite(path) => {
                let conn = db::open_or_init(path)?;
                let store = SqliteStore::from_connection(conn)
                    .with_context(|| format!("Init store at {}", path.display()))?;
                Ok(Box::new(store))
            }
            Backend::Rest {
                url,
                api_key,
                access_token,
            } => Ok(Box::new(RestStore::new(
                http_client()?,
                url,
                api_key,
                access_token,
            ))),
        }
    }

    pub fn describe(&self) -> String {
        match &self.backend {
            Backend::Sqlite(path) => format!("sqlite {}", path.display()),
            Backend::Rest { url, .. } => format!("rest {}", url),
        }
    }
}
