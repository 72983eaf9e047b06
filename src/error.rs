// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Result alias for store, ledger and price operations.
pub type DeskResult<T> = Result<T, DeskError>;

/// Error type surfaced by the library layer. Commands wrap it in `anyhow`.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("{table} row '{id}' not found")]
    NotFound { table: String, id: String },
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("no authenticated user")]
    NoSession,
}

impl From<rusqlite::Error> for DeskError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<reqwest::Error> for DeskError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value.to_string())
    }
}

impl From<serde_json::Error> for DeskError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}
