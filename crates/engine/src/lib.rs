pub use budget::{days_left_in_month, safe_to_spend};
pub use dispatcher::{CardPhase, Dispatcher, Outcome, Resolution};
pub use error::{StoreError, StoreResult};
pub use gesture::{GestureState, SWIPE_THRESHOLD_RATIO, SwipeDecision, classify};
pub use money::MoneyCents;
pub use queue::ReviewQueue;
pub use rules::{DEFAULT_RULE_PRIORITY, Rule, RuleDraft, first_match, pattern_matches};
pub use split::{split_bill, split_even};
pub use store::{
    BalanceSnapshot, BalanceSource, CategoryOption, CategorySource, RuleSink, TransactionSource,
    TransactionStore,
};
pub use transaction::PendingTransaction;

mod budget;
mod dispatcher;
mod error;
mod gesture;
mod money;
mod queue;
mod rules;
mod split;
mod store;
mod transaction;
