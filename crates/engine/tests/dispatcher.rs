use std::future::Future;
use std::sync::{Arc, Mutex};

use engine::{
    CardPhase, Dispatcher, MoneyCents, Outcome, PendingTransaction, Resolution, RuleDraft,
    RuleSink, StoreError, StoreResult, SwipeDecision, TransactionStore,
};

#[derive(Default)]
struct RecordingStore {
    verified: Mutex<Vec<String>>,
    categorized: Mutex<Vec<(String, String)>>,
    fail_verify: bool,
}

impl TransactionStore for RecordingStore {
    fn mark_verified(&self, id: String) -> impl Future<Output = StoreResult<()>> + Send {
        async move {
            if self.fail_verify {
                return Err(StoreError::Persistence("store offline".to_string()));
            }
            self.verified.lock().unwrap().push(id);
            Ok(())
        }
    }

    fn update_category_and_verify(
        &self,
        id: String,
        category: String,
    ) -> impl Future<Output = StoreResult<()>> + Send {
        async move {
            self.categorized.lock().unwrap().push((id, category));
            Ok(())
        }
    }
}

#[derive(Default)]
struct RecordingRules {
    saved: Mutex<Vec<RuleDraft>>,
    conflict: bool,
}

impl RuleSink for RecordingRules {
    fn save_rule(&self, draft: RuleDraft) -> impl Future<Output = StoreResult<()>> + Send {
        async move {
            if self.conflict {
                return Err(StoreError::DuplicateRule(draft.pattern));
            }
            self.saved.lock().unwrap().push(draft);
            Ok(())
        }
    }
}

fn tx(id: &str, merchant: &str) -> PendingTransaction {
    PendingTransaction::new(id, merchant, MoneyCents::new(4_299))
}

fn dispatcher_with(
    store: Arc<RecordingStore>,
    rules: Arc<RecordingRules>,
    items: Vec<PendingTransaction>,
) -> Dispatcher<RecordingStore, RecordingRules> {
    let mut dispatcher = Dispatcher::new(store, rules);
    dispatcher.load(items);
    dispatcher
}

// Screen width 400: threshold = 100, release at dx = 120.
const THRESHOLD: f32 = 100.0;

#[tokio::test]
async fn approve_marks_verified_and_advances() {
    let store = Arc::new(RecordingStore::default());
    let rules = Arc::new(RecordingRules::default());
    let mut dispatcher = dispatcher_with(
        Arc::clone(&store),
        rules,
        vec![tx("a", "AMZN-19283"), tx("b", "NETFLIX"), tx("c", "UBER *EATS")],
    );

    let outcome = dispatcher.release(120.0, 0.0, THRESHOLD);
    let Outcome::Resolved(card, Resolution::Approved) = outcome else {
        panic!("expected approve resolution, got {outcome:?}");
    };
    assert_eq!(card.id, "a");
    assert_eq!(dispatcher.queue().len(), 2);
    assert_eq!(
        dispatcher.queue().peek_head().map(|t| t.id.as_str()),
        Some("b")
    );

    dispatcher.settle().await;
    assert_eq!(*store.verified.lock().unwrap(), vec!["a".to_string()]);
}

#[tokio::test]
async fn edit_opens_picker_then_categorizes() {
    let store = Arc::new(RecordingStore::default());
    let rules = Arc::new(RecordingRules::default());
    let mut dispatcher =
        dispatcher_with(Arc::clone(&store), rules, vec![tx("a", "AMZN-19283")]);

    let outcome = dispatcher.release(-120.0, 0.0, THRESHOLD);
    assert!(matches!(outcome, Outcome::CategoryPicker(ref card) if card.id == "a"));
    assert_eq!(dispatcher.phase(), CardPhase::Resolving);
    // The card stays at the head until the picker settles it.
    assert_eq!(dispatcher.queue().len(), 1);

    let outcome = dispatcher.submit_category(Some("Groceries".to_string()));
    let Outcome::Resolved(card, Resolution::Categorized(category)) = outcome else {
        panic!("expected categorized resolution, got {outcome:?}");
    };
    assert_eq!(card.id, "a");
    assert_eq!(category, "Groceries");
    assert!(dispatcher.queue().is_empty());

    dispatcher.settle().await;
    assert_eq!(
        *store.categorized.lock().unwrap(),
        vec![("a".to_string(), "Groceries".to_string())]
    );
}

#[tokio::test]
async fn picker_dismissed_still_resolves_as_skipped() {
    let store = Arc::new(RecordingStore::default());
    let rules = Arc::new(RecordingRules::default());
    let mut dispatcher =
        dispatcher_with(Arc::clone(&store), rules, vec![tx("a", "AMZN-19283")]);

    dispatcher.decide(SwipeDecision::Edit);
    let outcome = dispatcher.submit_category(None);
    assert!(matches!(outcome, Outcome::Resolved(_, Resolution::Skipped)));
    assert!(dispatcher.queue().is_empty());

    dispatcher.settle().await;
    assert!(store.categorized.lock().unwrap().is_empty());
    assert!(store.verified.lock().unwrap().is_empty());
}

#[tokio::test]
async fn create_rule_prefills_and_saves() {
    let store = Arc::new(RecordingStore::default());
    let rules = Arc::new(RecordingRules::default());
    let mut dispatcher =
        dispatcher_with(store, Arc::clone(&rules), vec![tx("a", "UBER *EATS")]);

    let outcome = dispatcher.release(0.0, -120.0, THRESHOLD);
    let Outcome::RuleBuilder(card) = outcome else {
        panic!("expected rule builder, got {outcome:?}");
    };
    assert_eq!(card.merchant_label, "UBER *EATS");

    let draft = RuleDraft::new(card.merchant_label, "dining");
    let outcome = dispatcher.submit_rule(Some(draft));
    assert!(matches!(outcome, Outcome::Resolved(_, Resolution::RuleSaved)));
    assert!(dispatcher.queue().is_empty());

    dispatcher.settle().await;
    let saved = rules.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].pattern, "UBER *EATS");
    assert_eq!(saved[0].category_id, "dining");
    assert_eq!(saved[0].priority, 0);
    assert!(saved[0].active);
}

#[tokio::test]
async fn rule_skip_resolves_without_persisting() {
    let store = Arc::new(RecordingStore::default());
    let rules = Arc::new(RecordingRules::default());
    let mut dispatcher =
        dispatcher_with(store, Arc::clone(&rules), vec![tx("a", "NETFLIX")]);

    dispatcher.decide(SwipeDecision::CreateRule);
    let outcome = dispatcher.submit_rule(None);
    assert!(matches!(outcome, Outcome::Resolved(_, Resolution::Skipped)));
    assert!(dispatcher.queue().is_empty());

    dispatcher.settle().await;
    assert!(rules.saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_rule_conflict_still_resolves() {
    let store = Arc::new(RecordingStore::default());
    let rules = Arc::new(RecordingRules {
        conflict: true,
        ..Default::default()
    });
    let mut dispatcher = dispatcher_with(
        store,
        Arc::clone(&rules),
        vec![tx("a", "NETFLIX"), tx("b", "SPOTIFY")],
    );

    dispatcher.decide(SwipeDecision::CreateRule);
    let outcome = dispatcher.submit_rule(Some(RuleDraft::new("NETFLIX", "subscriptions")));
    assert!(matches!(outcome, Outcome::Resolved(_, Resolution::RuleSaved)));

    // The conflict is swallowed; the queue advanced regardless.
    dispatcher.settle().await;
    assert_eq!(
        dispatcher.queue().peek_head().map(|t| t.id.as_str()),
        Some("b")
    );
    assert!(rules.saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_approval_does_not_block_advancement() {
    let store = Arc::new(RecordingStore {
        fail_verify: true,
        ..Default::default()
    });
    let rules = Arc::new(RecordingRules::default());
    let mut dispatcher = dispatcher_with(
        Arc::clone(&store),
        rules,
        vec![tx("a", "AMZN-19283"), tx("b", "NETFLIX")],
    );

    let outcome = dispatcher.release(120.0, 0.0, THRESHOLD);
    assert!(matches!(outcome, Outcome::Resolved(_, Resolution::Approved)));
    assert_eq!(
        dispatcher.queue().peek_head().map(|t| t.id.as_str()),
        Some("b")
    );

    dispatcher.settle().await;
    assert!(store.verified.lock().unwrap().is_empty());
}

#[tokio::test]
async fn second_gesture_while_resolving_is_dropped() {
    let store = Arc::new(RecordingStore::default());
    let rules = Arc::new(RecordingRules::default());
    let mut dispatcher = dispatcher_with(
        Arc::clone(&store),
        rules,
        vec![tx("a", "AMZN-19283"), tx("b", "NETFLIX")],
    );

    assert!(matches!(
        dispatcher.release(-120.0, 0.0, THRESHOLD),
        Outcome::CategoryPicker(_)
    ));
    // Rapid re-swipe before the picker settles: dropped, nothing dispatched.
    assert_eq!(dispatcher.release(120.0, 0.0, THRESHOLD), Outcome::Ignored);
    assert_eq!(dispatcher.queue().len(), 2);

    dispatcher.submit_category(Some("Shopping".to_string()));
    dispatcher.settle().await;
    assert!(store.verified.lock().unwrap().is_empty());
    assert_eq!(store.categorized.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn submit_without_pending_resolution_is_ignored() {
    let store = Arc::new(RecordingStore::default());
    let rules = Arc::new(RecordingRules::default());
    let mut dispatcher = dispatcher_with(store, rules, vec![tx("a", "AMZN-19283")]);

    assert_eq!(
        dispatcher.submit_category(Some("Shopping".to_string())),
        Outcome::Ignored
    );
    assert_eq!(dispatcher.submit_rule(None), Outcome::Ignored);
    assert_eq!(dispatcher.queue().len(), 1);
}

#[tokio::test]
async fn cancel_leaves_the_queue_untouched() {
    let store = Arc::new(RecordingStore::default());
    let rules = Arc::new(RecordingRules::default());
    let mut dispatcher = dispatcher_with(
        Arc::clone(&store),
        rules,
        vec![tx("a", "AMZN-19283"), tx("b", "NETFLIX")],
    );

    // Below threshold.
    let outcome = dispatcher.release(40.0, 0.0, THRESHOLD);
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(dispatcher.queue().len(), 2);
    assert_eq!(dispatcher.phase(), CardPhase::Idle);

    dispatcher.settle().await;
    assert!(store.verified.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_queue_ignores_gestures() {
    let store = Arc::new(RecordingStore::default());
    let rules = Arc::new(RecordingRules::default());
    let mut dispatcher = dispatcher_with(store, rules, Vec::new());

    assert_eq!(dispatcher.release(500.0, 0.0, THRESHOLD), Outcome::Ignored);
    assert!(dispatcher.queue().is_empty());
}
