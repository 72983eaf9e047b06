// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal_macros::dec;
use serde_json::Value;
use tradedesk::error::{DeskError, DeskResult};
use tradedesk::ledger::Ledger;
use tradedesk::models::{
    BeneficiaryEntry, ExpenseEntry, ExpenseKind, PlatformEntity, RiskLevel, SalesEntry,
    TransferEntry, new_id,
};
use tradedesk::price::push_settings;
use tradedesk::session::Session;
use tradedesk::store::{RowStore, SqliteStore, fetch_all, insert_record};

struct OfflineStore;

fn offline() -> DeskError {
    DeskError::Http("connection refused".into())
}

impl RowStore for OfflineStore {
    fn select_all(&self, _table: &str) -> DeskResult<Vec<Value>> {
        Err(offline())
    }
    fn select_one(&self, _table: &str, _id: &str) -> DeskResult<Option<Value>> {
        Err(offline())
    }
    fn insert(&self, _table: &str, _row: &Value) -> DeskResult<()> {
        Err(offline())
    }
    fn update(&self, _table: &str, _id: &str, _row: &Value) -> DeskResult<()> {
        Err(offline())
    }
    fn delete(&self, _table: &str, _id: &str) -> DeskResult<()> {
        Err(offline())
    }
    fn upsert(&self, _table: &str, _id: &str, _row: &Value) -> DeskResult<()> {
        Err(offline())
    }
}

fn session() -> Session {
    Session::new("u-1", "trader@desk.test")
}

#[test]
fn refresh_replaces_collections_and_settings() {
    let store = SqliteStore::in_memory().unwrap();
    insert_record(&store, &SalesEntry::new("o1", "HDFC", "X", dec!(90), dec!(2))).unwrap();
    insert_record(&store, &TransferEntry::new("X", "Y", dec!(1))).unwrap();
    let mut settings = tradedesk::models::Settings::default();
    settings.required_margin = dec!(3.5);
    push_settings(&store, &settings).unwrap();

    let mut ledger = Ledger::new();
    ledger
        .expenses
        .push(ExpenseEntry::new("stale", dec!(1), ExpenseKind::Expense));
    let report = ledger.refresh(&store, Some(&session())).unwrap();

    assert_eq!(report.failed(), 0);
    assert_eq!(ledger.sales.len(), 1);
    assert_eq!(ledger.transfers.len(), 1);
    assert!(ledger.expenses.is_empty());
    assert_eq!(ledger.settings.required_margin, dec!(3.5));

    // running it again is idempotent
    let snapshot = ledger.clone();
    ledger.refresh(&store, Some(&session())).unwrap();
    assert_eq!(ledger, snapshot);
}

#[test]
fn refresh_without_session_is_skipped() {
    let store = SqliteStore::in_memory().unwrap();
    insert_record(&store, &SalesEntry::new("o1", "HDFC", "X", dec!(90), dec!(2))).unwrap();
    let mut ledger = Ledger::new();
    let err = ledger.refresh(&store, None).unwrap_err();
    assert!(matches!(err, DeskError::NoSession));
    assert!(ledger.sales.is_empty());
}

#[test]
fn failed_fetch_keeps_cached_rows() {
    let mut ledger = Ledger::new();
    ledger
        .sales
        .push(SalesEntry::new("o1", "HDFC", "X", dec!(90), dec!(2)));
    ledger.settings.required_margin = dec!(2);
    let report = ledger.refresh(&OfflineStore, Some(&session())).unwrap();
    assert_eq!(report.failed(), report.outcomes.len());
    assert_eq!(ledger.sales.len(), 1);
    assert_eq!(ledger.settings.required_margin, dec!(2));
}

#[test]
fn writes_are_remote_first() {
    let mut ledger = Ledger::new();
    let sale = SalesEntry::new("o1", "HDFC", "X", dec!(90), dec!(2));
    assert!(ledger.create(&OfflineStore, sale.clone()).is_err());
    assert!(ledger.sales.is_empty());

    ledger.sales.push(sale.clone());
    assert!(ledger.remove::<SalesEntry>(&OfflineStore, &sale.id).is_err());
    assert_eq!(ledger.sales.len(), 1);

    let mut edited = sale.clone();
    edited.total_price = dec!(1);
    assert!(ledger.update(&OfflineStore, &session(), edited).is_err());
    assert_eq!(ledger.sales[0], sale);
}

#[test]
fn create_update_remove_round_trip_through_store() {
    let store = SqliteStore::in_memory().unwrap();
    let mut ledger = Ledger::new();
    let first = SalesEntry::new("o1", "HDFC", "X", dec!(90), dec!(2));
    let second = SalesEntry::new("o2", "HDFC", "X", dec!(91), dec!(3));
    ledger.create(&store, first.clone()).unwrap();
    ledger.create(&store, second.clone()).unwrap();
    assert_eq!(ledger.sales[0].id, second.id);
    assert!(ledger.sales[0].edited_by.is_none());

    let mut edited = first.clone();
    edited.total_price = dec!(170);
    let saved = ledger.update(&store, &session(), edited).unwrap();
    assert_eq!(saved.edited_by.as_deref(), Some("trader@desk.test"));
    assert!(saved.updated_at.is_some());

    let stored: Vec<SalesEntry> = fetch_all(&store).unwrap();
    let row = stored.iter().find(|s| s.id == first.id).unwrap();
    assert_eq!(row.total_price, dec!(170));
    assert_eq!(row.edited_by.as_deref(), Some("trader@desk.test"));

    ledger.remove::<SalesEntry>(&store, &second.id).unwrap();
    assert_eq!(ledger.sales.len(), 1);
    assert_eq!(fetch_all::<SalesEntry>(&store).unwrap().len(), 1);
}

#[test]
fn removing_unknown_id_is_not_found() {
    let store = SqliteStore::in_memory().unwrap();
    let mut ledger = Ledger::new();
    let err = ledger
        .remove::<PlatformEntity>(&store, "missing")
        .unwrap_err();
    assert!(matches!(err, DeskError::NotFound { .. }));
}

#[test]
fn beneficiary_files_survive_storage() {
    let store = SqliteStore::in_memory().unwrap();
    let mut ledger = Ledger::new();
    let b = BeneficiaryEntry {
        id: new_id(),
        name: "R. Mehta".into(),
        contact_no: "+91 90000 00000".into(),
        government_id: "ABCDE1234F".into(),
        risk_level: RiskLevel::High,
        assigned_bank: "HDFC".into(),
        files: vec![tradedesk::models::AttachedFile {
            name: "kyc.pdf".into(),
            size_bytes: 2048,
            content_type: "application/pdf".into(),
            path: "/docs/kyc.pdf".into(),
            uploaded_at: chrono::Utc::now(),
        }],
        created_at: chrono::Utc::now(),
        created_by: "trader@desk.test".into(),
        edited_by: None,
        updated_at: None,
    };
    ledger.create(&store, b.clone()).unwrap();
    ledger.clear();
    ledger.refresh(&store, Some(&session())).unwrap();
    assert_eq!(ledger.beneficiaries, vec![b]);
}

#[test]
fn sign_out_clears_everything() {
    let mut ledger = Ledger::new();
    ledger
        .sales
        .push(SalesEntry::new("o1", "HDFC", "X", dec!(90), dec!(2)));
    ledger.settings.current_usd_price = dec!(83);
    ledger.clear();
    assert_eq!(ledger, Ledger::default());
}
