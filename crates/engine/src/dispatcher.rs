//! The per-card decision state machine.
//!
//! The dispatcher owns the queue and a phase guard. A classified decision is
//! accepted only while the phase is [`CardPhase::Idle`]; approve resolves the
//! card immediately, edit and create-rule park the phase at
//! [`CardPhase::Resolving`] until the matching `submit_*` call lands. Side
//! effects are spawned fire-and-forget: the queue advances optimistically and
//! a failed write is logged, never retried and never surfaced as a blocking
//! error.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::{
    PendingTransaction, ReviewQueue, RuleDraft, RuleSink, StoreError, SwipeDecision,
    TransactionStore, classify,
};

/// Where the head card is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CardPhase {
    /// At rest, awaiting a gesture.
    #[default]
    Idle,
    /// A decision was made; an overlay or side effect is in flight.
    Resolving,
}

/// How a resolved card left the queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Right swipe: the suggested category was accepted.
    Approved,
    /// Category picked from the overlay.
    Categorized(String),
    /// Rule builder saved a pattern.
    RuleSaved,
    /// Overlay dismissed without a choice; the card is not re-queued.
    Skipped,
}

/// What the caller must do after handing the dispatcher a decision.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The card resolved and the queue advanced.
    Resolved(PendingTransaction, Resolution),
    /// Present the category picker for this transaction.
    CategoryPicker(PendingTransaction),
    /// Present the rule builder pre-filled with the merchant label.
    RuleBuilder(PendingTransaction),
    /// Below threshold: reset the gesture, the card stays put.
    Cancelled,
    /// Dropped by the at-most-once guard or the queue was empty.
    Ignored,
}

pub struct Dispatcher<S, R>
where
    S: TransactionStore + 'static,
    R: RuleSink + 'static,
{
    queue: ReviewQueue,
    phase: CardPhase,
    store: Arc<S>,
    rules: Arc<R>,
    effects: JoinSet<()>,
}

impl<S, R> Dispatcher<S, R>
where
    S: TransactionStore + 'static,
    R: RuleSink + 'static,
{
    pub fn new(store: Arc<S>, rules: Arc<R>) -> Self {
        Self {
            queue: ReviewQueue::new(),
            phase: CardPhase::Idle,
            store,
            rules,
            effects: JoinSet::new(),
        }
    }

    pub fn queue(&self) -> &ReviewQueue {
        &self.queue
    }

    pub fn phase(&self) -> CardPhase {
        self.phase
    }

    /// Replaces the queue and rearms the guard.
    pub fn load(&mut self, items: impl IntoIterator<Item = PendingTransaction>) {
        self.queue.load(items);
        self.phase = CardPhase::Idle;
    }

    /// Classifies a released gesture and dispatches the decision.
    pub fn release(&mut self, dx: f32, dy: f32, threshold: f32) -> Outcome {
        self.decide(classify(dx, dy, threshold))
    }

    /// Dispatches a decision for the head card.
    ///
    /// A decision arriving while a card is still resolving is dropped, so a
    /// rapid second gesture can never double-dispatch a side effect.
    pub fn decide(&mut self, decision: SwipeDecision) -> Outcome {
        if self.phase != CardPhase::Idle {
            tracing::debug!(?decision, "decision dropped while resolving");
            return Outcome::Ignored;
        }
        let Some(head) = self.queue.peek_head() else {
            return Outcome::Ignored;
        };
        let card = head.clone();

        match decision {
            SwipeDecision::Cancel => Outcome::Cancelled,
            SwipeDecision::Approve => {
                self.spawn_mark_verified(card.id.clone());
                self.queue.advance(&card.id);
                Outcome::Resolved(card, Resolution::Approved)
            }
            SwipeDecision::Edit => {
                self.phase = CardPhase::Resolving;
                Outcome::CategoryPicker(card)
            }
            SwipeDecision::CreateRule => {
                self.phase = CardPhase::Resolving;
                Outcome::RuleBuilder(card)
            }
        }
    }

    /// Completes an `Edit` resolution.
    ///
    /// `Some(category)` updates the transaction and verifies it; `None`
    /// (picker dismissed) resolves the card as skipped either way.
    pub fn submit_category(&mut self, choice: Option<String>) -> Outcome {
        let Some(card) = self.take_resolving_card() else {
            return Outcome::Ignored;
        };

        let resolution = match choice {
            Some(category) => {
                self.spawn_update_category(card.id.clone(), category.clone());
                Resolution::Categorized(category)
            }
            None => Resolution::Skipped,
        };
        self.queue.advance(&card.id);
        Outcome::Resolved(card, resolution)
    }

    /// Completes a `CreateRule` resolution.
    ///
    /// `Some(draft)` persists the rule; a duplicate-pattern conflict is
    /// swallowed. `None` (explicit skip) resolves without persisting.
    pub fn submit_rule(&mut self, draft: Option<RuleDraft>) -> Outcome {
        let Some(card) = self.take_resolving_card() else {
            return Outcome::Ignored;
        };

        let resolution = match draft {
            Some(draft) => {
                self.spawn_save_rule(draft);
                Resolution::RuleSaved
            }
            None => Resolution::Skipped,
        };
        self.queue.advance(&card.id);
        Outcome::Resolved(card, resolution)
    }

    /// Awaits all in-flight side effects.
    ///
    /// In-flight writes are never cancelled by UI state; the client calls
    /// this on shutdown so pending writes flush before exit.
    pub async fn settle(&mut self) {
        while self.effects.join_next().await.is_some() {}
    }

    fn take_resolving_card(&mut self) -> Option<PendingTransaction> {
        if self.phase != CardPhase::Resolving {
            tracing::debug!("submit dropped: no card resolving");
            return None;
        }
        self.phase = CardPhase::Idle;
        self.queue.peek_head().cloned()
    }

    fn spawn_mark_verified(&mut self, id: String) {
        let store = Arc::clone(&self.store);
        self.effects.spawn(async move {
            if let Err(err) = store.mark_verified(id.clone()).await {
                tracing::warn!("failed to mark {id} verified: {err}");
            }
        });
    }

    fn spawn_update_category(&mut self, id: String, category: String) {
        let store = Arc::clone(&self.store);
        self.effects.spawn(async move {
            if let Err(err) = store.update_category_and_verify(id.clone(), category).await {
                tracing::warn!("failed to update category for {id}: {err}");
            }
        });
    }

    fn spawn_save_rule(&mut self, draft: RuleDraft) {
        let rules = Arc::clone(&self.rules);
        self.effects.spawn(async move {
            let pattern = draft.pattern.clone();
            match rules.save_rule(draft).await {
                Ok(()) => {}
                // An identical pattern already exists; the card resolves as
                // if the rule were saved.
                Err(StoreError::DuplicateRule(_)) => {
                    tracing::debug!("rule \"{pattern}\" already exists");
                }
                Err(err) => {
                    tracing::warn!("failed to save rule \"{pattern}\": {err}");
                }
            }
        });
    }
}
