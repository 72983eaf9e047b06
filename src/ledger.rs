// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! In-memory copy of every collection, kept in step with a row store.
//!
//! Writes go to the store first and touch the local copy only once the store
//! has accepted them. A refresh replaces each collection wholesale with what
//! the store returned; a collection whose fetch fails keeps its old contents.

use chrono::Utc;
use log::{error, info, warn};
use serde::Serialize;

use crate::error::{DeskError, DeskResult};
use crate::models::{
    BankEntity, BankTransferEntry, BeneficiaryEntry, ExpenseEntry, PlatformEntity,
    PurchaseEntry, Record, SalesEntry, Settings, TransferEntry,
};
use crate::price::sync_settings;
use crate::session::Session;
use crate::store::{RowStore, delete_record, fetch_all, insert_record, update_record};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    pub sales: Vec<SalesEntry>,
    pub purchases: Vec<PurchaseEntry>,
    pub transfers: Vec<TransferEntry>,
    pub bank_transfers: Vec<BankTransferEntry>,
    pub expenses: Vec<ExpenseEntry>,
    pub beneficiaries: Vec<BeneficiaryEntry>,
    pub banks: Vec<BankEntity>,
    pub platforms: Vec<PlatformEntity>,
    pub settings: Settings,
}

/// Records the ledger keeps a collection of.
pub trait Collection: Record {
    fn slot(ledger: &Ledger) -> &Vec<Self>;
    fn slot_mut(ledger: &mut Ledger) -> &mut Vec<Self>;
}

macro_rules! collection {
    ($ty:ty, $field:ident) => {
        impl Collection for $ty {
            fn slot(ledger: &Ledger) -> &Vec<Self> {
                &ledger.$field
            }
            fn slot_mut(ledger: &mut Ledger) -> &mut Vec<Self> {
                &mut ledger.$field
            }
        }
    };
}

collection!(SalesEntry, sales);
collection!(PurchaseEntry, purchases);
collection!(TransferEntry, transfers);
collection!(BankTransferEntry, bank_transfers);
collection!(ExpenseEntry, expenses);
collection!(BeneficiaryEntry, beneficiaries);
collection!(BankEntity, banks);
collection!(PlatformEntity, platforms);

/// Outcome of one collection fetch during a refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshOutcome {
    pub table: &'static str,
    pub rows: Option<usize>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshReport {
    pub outcomes: Vec<RefreshOutcome>,
}

impl RefreshReport {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything; called on sign-out.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn all<T: Collection>(&self) -> &[T] {
        T::slot(self)
    }

    pub fn find<T: Collection>(&self, id: &str) -> Option<&T> {
        T::slot(self).iter().find(|r| r.id() == id)
    }

    /// Re-read every collection and the settings row from `store`.
    pub fn refresh(
        &mut self,
        store: &dyn RowStore,
        session: Option<&Session>,
    ) -> DeskResult<RefreshReport> {
        let Some(session) = session else {
            warn!("refresh skipped: no authenticated user");
            return Err(DeskError::NoSession);
        };
        info!("refreshing ledger for {}", session.email);

        let mut report = RefreshReport::default();
        report.outcomes.push(self.reload::<SalesEntry>(store));
        report.outcomes.push(self.reload::<PurchaseEntry>(store));
        report.outcomes.push(self.reload::<TransferEntry>(store));
        report.outcomes.push(self.reload::<BankTransferEntry>(store));
        report.outcomes.push(self.reload::<ExpenseEntry>(store));
        report.outcomes.push(self.reload::<BeneficiaryEntry>(store));
        report.outcomes.push(self.reload::<BankEntity>(store));
        report.outcomes.push(self.reload::<PlatformEntity>(store));

        let settings = match sync_settings(store, self) {
            Ok(found) => RefreshOutcome {
                table: "settings",
                rows: Some(usize::from(found)),
                error: None,
            },
            Err(e) => {
                error!("settings sync failed: {}", e);
                RefreshOutcome {
                    table: "settings",
                    rows: None,
                    error: Some(e.to_string()),
                }
            }
        };
        report.outcomes.push(settings);
        Ok(report)
    }

    fn reload<T: Collection>(&mut self, store: &dyn RowStore) -> RefreshOutcome {
        match fetch_all::<T>(store) {
            Ok(rows) => {
                let n = rows.len();
                *T::slot_mut(self) = rows;
                RefreshOutcome {
                    table: T::TABLE,
                    rows: Some(n),
                    error: None,
                }
            }
            Err(e) => {
                error!("fetch {} failed, keeping cached rows: {}", T::TABLE, e);
                RefreshOutcome {
                    table: T::TABLE,
                    rows: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Insert into the store, then at the head of the local collection.
    pub fn create<T: Collection>(&mut self, store: &dyn RowStore, record: T) -> DeskResult<()> {
        if let Err(e) = insert_record(store, &record) {
            error!("insert into {} failed: {}", T::TABLE, e);
            return Err(e);
        }
        T::slot_mut(self).insert(0, record);
        Ok(())
    }

    /// Replace the record with the same id, stamping the edit trail.
    pub fn update<T: Collection>(
        &mut self,
        store: &dyn RowStore,
        session: &Session,
        mut record: T,
    ) -> DeskResult<T> {
        record.stamp_edit(session.stamp(), Utc::now());
        if let Err(e) = update_record(store, &record) {
            error!("update of {} '{}' failed: {}", T::TABLE, record.id(), e);
            return Err(e);
        }
        let slot = T::slot_mut(self);
        match slot.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => *existing = record.clone(),
            None => slot.insert(0, record.clone()),
        }
        Ok(record)
    }

    pub fn remove<T: Collection>(&mut self, store: &dyn RowStore, id: &str) -> DeskResult<()> {
        if let Err(e) = delete_record::<T>(store, id) {
            error!("delete of {} '{}' failed: {}", T::TABLE, id, e);
            return Err(e);
        }
        T::slot_mut(self).retain(|r| r.id() != id);
        Ok(())
    }
}
