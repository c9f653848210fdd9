//! Collaborator interfaces for the hosted store.
//!
//! The triage core never talks to the network itself: the client layer
//! implements these traits over its own transport and the dispatcher issues
//! side effects through them. Futures must be `Send` so side effects can be
//! spawned fire-and-forget.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{MoneyCents, PendingTransaction, RuleDraft, StoreResult};

/// A category the user can assign to a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
}

impl CategoryOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Account totals used for the safe-to-spend allowance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub total: MoneyCents,
    pub locked: MoneyCents,
}

/// Source of transactions awaiting review, most recent first.
pub trait TransactionSource: Send + Sync {
    fn fetch_unverified(&self)
    -> impl Future<Output = StoreResult<Vec<PendingTransaction>>> + Send;
}

/// Write side of transaction verification.
pub trait TransactionStore: Send + Sync {
    fn mark_verified(&self, id: String) -> impl Future<Output = StoreResult<()>> + Send;

    fn update_category_and_verify(
        &self,
        id: String,
        category: String,
    ) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Source of assignable categories.
pub trait CategorySource: Send + Sync {
    fn list_categories(&self) -> impl Future<Output = StoreResult<Vec<CategoryOption>>> + Send;
}

/// Sink for merchant-pattern rules.
///
/// A duplicate pattern surfaces as [`StoreError::DuplicateRule`]; callers on
/// the triage path treat it as an ignorable conflict.
///
/// [`StoreError::DuplicateRule`]: crate::StoreError::DuplicateRule
pub trait RuleSink: Send + Sync {
    fn save_rule(&self, draft: RuleDraft) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Source of account balances for the info bar.
pub trait BalanceSource: Send + Sync {
    fn fetch_balances(&self) -> impl Future<Output = StoreResult<BalanceSnapshot>> + Send;
}
