//! The transaction record a card in the review queue represents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::MoneyCents;

/// An expense awaiting a triage decision.
///
/// Records enter the queue with `verified == false` and leave it the moment a
/// decision resolves them; verification state is only ever flipped in the
/// hosted store, never on the in-queue copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub id: String,
    pub merchant_label: String,
    pub amount: MoneyCents,
    pub suggested_category: Option<String>,
    pub verified: bool,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl PendingTransaction {
    pub fn new(
        id: impl Into<String>,
        merchant_label: impl Into<String>,
        amount: MoneyCents,
    ) -> Self {
        Self {
            id: id.into(),
            merchant_label: merchant_label.into(),
            amount,
            suggested_category: None,
            verified: false,
            occurred_at: None,
        }
    }

    /// Category shown on the card when no explicit suggestion exists.
    pub fn category_label(&self) -> &str {
        self.suggested_category.as_deref().unwrap_or("General")
    }
}
