// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::error::DeskError;

/// Platform/bank name reserved for one-sided manual corrections.
pub const ADJUSTMENT: &str = "ADJUSTMENT";

/// A row that lives in one row-store table.
pub trait Record: Serialize + DeserializeOwned + Clone {
    const TABLE: &'static str;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    /// Records with an edit trail override this; it runs on update only.
    fn stamp_edit(&mut self, _by: &str, _at: DateTime<Utc>) {}
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Either side of a transfer. Stored as a plain string; `"ADJUSTMENT"`
/// becomes `Account::Adjustment`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Account {
    Real(String),
    Adjustment,
}

impl Account {
    pub fn name(&self) -> &str {
        match self {
            Account::Real(name) => name,
            Account::Adjustment => ADJUSTMENT,
        }
    }

    pub fn is_adjustment(&self) -> bool {
        matches!(self, Account::Adjustment)
    }
}

impl From<String> for Account {
    fn from(s: String) -> Self {
        if s == ADJUSTMENT {
            Account::Adjustment
        } else {
            Account::Real(s)
        }
    }
}

impl From<&str> for Account {
    fn from(s: &str) -> Self {
        Account::from(s.to_string())
    }
}

impl From<Account> for String {
    fn from(a: Account) -> Self {
        match a {
            Account::Real(name) => name,
            Account::Adjustment => ADJUSTMENT.to_string(),
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Marker for which side of the desk a trade belongs to.
pub trait Side: Clone + fmt::Debug + Default + PartialEq + Send + Sync + 'static {
    const TABLE: &'static str;
    const LABEL: &'static str;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sale;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Purchase;

impl Side for Sale {
    const TABLE: &'static str = "sales";
    const LABEL: &'static str = "sale";
}

impl Side for Purchase {
    const TABLE: &'static str = "purchases";
    const LABEL: &'static str = "purchase";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Trade<S: Side> {
    pub id: String,
    pub order_number: String,
    pub bank: String,
    pub platform: String,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    pub total_price: Decimal, // trusted as stored, never re-derived
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact_no: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beneficiary_id: Option<String>,
    #[serde(skip)]
    side: PhantomData<S>,
}

pub type SalesEntry = Trade<Sale>;
pub type PurchaseEntry = Trade<Purchase>;

/// `price * quantity`, or `None` when it overflows.
pub fn line_total(price: Decimal, quantity: Decimal) -> Option<Decimal> {
    price.checked_mul(quantity)
}

impl<S: Side> Trade<S> {
    /// New trade stamped now; `total_price` starts as `price * quantity`.
    pub fn new(
        order_number: &str,
        bank: &str,
        platform: &str,
        price: Decimal,
        quantity: Decimal,
    ) -> Self {
        Self {
            id: new_id(),
            order_number: order_number.to_string(),
            bank: bank.to_string(),
            platform: platform.to_string(),
            price,
            quantity: Some(quantity),
            total_price: line_total(price, quantity).unwrap_or(Decimal::ZERO),
            name: String::new(),
            contact_no: String::new(),
            created_at: Utc::now(),
            edited_by: None,
            updated_at: None,
            beneficiary_id: None,
            side: PhantomData,
        }
    }

    /// Stored quantity, or `total_price / price` for rows written without one.
    pub fn effective_quantity(&self) -> Decimal {
        match self.quantity {
            Some(q) => q,
            None => self
                .total_price
                .checked_div(self.price)
                .unwrap_or(Decimal::ZERO),
        }
    }
}

impl<S: Side> Record for Trade<S> {
    const TABLE: &'static str = S::TABLE;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn stamp_edit(&mut self, by: &str, at: DateTime<Utc>) {
        self.edited_by = Some(by.to_string());
        self.updated_at = Some(at);
    }
}

/// Platform-to-platform stock move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferEntry {
    pub id: String,
    pub from: Account,
    pub to: Account,
    pub quantity: Decimal,
    pub created_at: DateTime<Utc>,
}

impl TransferEntry {
    pub fn new(from: impl Into<Account>, to: impl Into<Account>, quantity: Decimal) -> Self {
        Self {
            id: new_id(),
            from: from.into(),
            to: to.into(),
            quantity,
            created_at: Utc::now(),
        }
    }
}

impl Record for TransferEntry {
    const TABLE: &'static str = "transfers";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Bank-to-bank cash move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransferEntry {
    pub id: String,
    pub from_bank: Account,
    #[serde(default)]
    pub from_account: String,
    pub to_bank: Account,
    #[serde(default)]
    pub to_account: String,
    pub amount: Decimal,
    #[serde(default)]
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

impl BankTransferEntry {
    pub fn new(from_bank: impl Into<Account>, to_bank: impl Into<Account>, amount: Decimal) -> Self {
        Self {
            id: new_id(),
            from_bank: from_bank.into(),
            from_account: String::new(),
            to_bank: to_bank.into(),
            to_account: String::new(),
            amount,
            reference: String::new(),
            created_at: Utc::now(),
        }
    }
}

impl Record for BankTransferEntry {
    const TABLE: &'static str = "bank_transfers";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseKind {
    Expense,
    Income,
}

impl FromStr for ExpenseKind {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(ExpenseKind::Expense),
            "income" => Ok(ExpenseKind::Income),
            other => Err(DeskError::Invalid(format!(
                "unknown entry type '{}' (use expense|income)",
                other
            ))),
        }
    }
}

impl fmt::Display for ExpenseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpenseKind::Expense => f.write_str("expense"),
            ExpenseKind::Income => f.write_str("income"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub id: String,
    pub bank: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: ExpenseKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl ExpenseEntry {
    pub fn new(bank: &str, amount: Decimal, kind: ExpenseKind) -> Self {
        Self {
            id: new_id(),
            bank: bank.to_string(),
            amount,
            kind,
            category: String::new(),
            description: String::new(),
            created_at: Utc::now(),
        }
    }
}

impl Record for ExpenseEntry {
    const TABLE: &'static str = "expenses";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl FromStr for RiskLevel {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            other => Err(DeskError::Invalid(format!(
                "unknown risk level '{}' (use low|medium|high|critical)",
                other
            ))),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// File metadata only; contents live wherever `path` points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedFile {
    pub name: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub content_type: String,
    pub path: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeneficiaryEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contact_no: String,
    #[serde(default)]
    pub government_id: String,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub assigned_bank: String,
    #[serde(default)]
    pub files: Vec<AttachedFile>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for BeneficiaryEntry {
    const TABLE: &'static str = "beneficiaries";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn stamp_edit(&mut self, by: &str, at: DateTime<Utc>) {
        self.edited_by = Some(by.to_string());
        self.updated_at = Some(at);
    }
}

/// Marker for the kind of reference data an `Entity` row describes.
pub trait EntityKind: Clone + fmt::Debug + Default + PartialEq + Send + Sync + 'static {
    const TABLE: &'static str;
    const LABEL: &'static str;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BankKind;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformKind;

impl EntityKind for BankKind {
    const TABLE: &'static str = "banks";
    const LABEL: &'static str = "bank";
}

impl EntityKind for PlatformKind {
    const TABLE: &'static str = "platforms";
    const LABEL: &'static str = "platform";
}

/// Reference data naming a valid bank or platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Entity<K: EntityKind> {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    kind: PhantomData<K>,
}

pub type BankEntity = Entity<BankKind>;
pub type PlatformEntity = Entity<PlatformKind>;

impl<K: EntityKind> Entity<K> {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            description: description.to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            kind: PhantomData,
        }
    }
}

impl<K: EntityKind> Record for Entity<K> {
    const TABLE: &'static str = K::TABLE;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn stamp_edit(&mut self, _by: &str, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
}

/// Desk-wide settings, one row in the `settings` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub required_margin: Decimal,
    pub current_usd_price: Decimal,
    pub sales_price_range: Decimal, // 0 = use the calculated value
    pub buy_price_usdt: Decimal,
    pub last_usdt_price_update: i64, // epoch ms
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            required_margin: Decimal::ZERO,
            current_usd_price: Decimal::ZERO,
            sales_price_range: Decimal::ZERO,
            buy_price_usdt: Decimal::ZERO,
            last_usdt_price_update: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn adjustment_round_trips_as_plain_string() {
        let t = TransferEntry::new(ADJUSTMENT, "Binance", dec!(5));
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["from"], "ADJUSTMENT");
        assert_eq!(v["to"], "Binance");
        let back: TransferEntry = serde_json::from_value(v).unwrap();
        assert_eq!(back.from, Account::Adjustment);
        assert_eq!(back.to, Account::Real("Binance".into()));
    }

    #[test]
    fn quantity_falls_back_to_total_over_price() {
        let raw = serde_json::json!({
            "id": "s1",
            "order_number": "A-1",
            "bank": "HDFC",
            "platform": "Binance",
            "price": "90",
            "total_price": "900",
            "created_at": "2024-03-01T10:00:00Z"
        });
        let sale: SalesEntry = serde_json::from_value(raw).unwrap();
        assert_eq!(sale.quantity, None);
        assert_eq!(sale.effective_quantity(), dec!(10));
    }

    #[test]
    fn expense_kind_is_stored_under_type() {
        let e = ExpenseEntry::new("HDFC", dec!(12.5), ExpenseKind::Income);
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["type"], "income");
    }
}
