use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod transaction {
    use super::*;

    /// A transaction row as the backend returns it.
    ///
    /// Ids are strings because clients may hold non-backend rows (demo
    /// seeds) in the same list.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: String,
        /// Raw merchant descriptor, e.g. `AMZN-19283`.
        pub name: String,
        pub amount_minor: i64,
        pub category: Option<String>,
        pub is_verified: bool,
        /// RFC3339 timestamp (UTC).
        pub occurred_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UnverifiedListResponse {
        /// Most recent first; the client preserves this order.
        pub transactions: Vec<TransactionView>,
    }

    /// Body for flipping the verified flag.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct VerifyUpdate {
        pub is_verified: bool,
    }

    /// Body for reassigning the category and verifying in one write.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub category: String,
        pub is_verified: bool,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod rule {
    use super::*;

    /// Request body for creating a merchant-pattern rule.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RuleNew {
        /// Merchant match pattern, `*` as wildcard.
        pub match_pattern: String,
        pub target_category_id: String,
        pub priority: i32,
        pub is_active: bool,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct RuleView {
        pub id: Uuid,
        pub match_pattern: String,
        pub target_category_id: String,
        pub priority: i32,
        pub is_active: bool,
    }
}

pub mod balance {
    use super::*;

    /// Account totals for the safe-to-spend allowance.
    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub total_minor: i64,
        /// Funds committed to upcoming bills, excluded from the allowance.
        pub locked_minor: i64,
    }
}
