use std::collections::VecDeque;

use crate::PendingTransaction;

/// Ordered store of transactions awaiting review.
///
/// The queue is the sole owner of membership: cards are removed by
/// [`advance`], never flagged in place. An empty queue is the normal
/// "inbox zero" end state, not an error.
///
/// [`advance`]: ReviewQueue::advance
#[derive(Debug, Default)]
pub struct ReviewQueue {
    items: VecDeque<PendingTransaction>,
}

impl ReviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole queue, preserving the given order.
    ///
    /// Records that are already verified never belong in the queue and are
    /// dropped here.
    pub fn load(&mut self, items: impl IntoIterator<Item = PendingTransaction>) {
        self.items = items.into_iter().filter(|tx| !tx.verified).collect();
    }

    /// The card currently up for review.
    pub fn peek_head(&self) -> Option<&PendingTransaction> {
        self.items.front()
    }

    /// The card rendered underneath the current one.
    pub fn peek_next(&self) -> Option<&PendingTransaction> {
        self.items.get(1)
    }

    /// Removes the head after a resolution.
    ///
    /// The id of the resolved card is required so that a duplicate advance
    /// for the same resolution is a no-op instead of skipping a second item.
    /// Returns whether the head was actually removed.
    pub fn advance(&mut self, resolved_id: &str) -> bool {
        match self.items.front() {
            Some(head) if head.id == resolved_id => {
                self.items.pop_front();
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingTransaction> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MoneyCents;

    fn tx(id: &str) -> PendingTransaction {
        PendingTransaction::new(id, "MERCHANT", MoneyCents::new(1000))
    }

    #[test]
    fn load_drops_already_verified_records() {
        let mut queue = ReviewQueue::new();
        let mut verified = tx("a");
        verified.verified = true;
        queue.load([verified, tx("b")]);

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek_head().map(|t| t.id.as_str()), Some("b"));
    }

    #[test]
    fn peek_does_not_mutate() {
        let mut queue = ReviewQueue::new();
        queue.load([tx("a"), tx("b"), tx("c")]);

        assert_eq!(queue.peek_head().map(|t| t.id.as_str()), Some("a"));
        assert_eq!(queue.peek_next().map(|t| t.id.as_str()), Some("b"));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn advance_removes_exactly_one_item() {
        let mut queue = ReviewQueue::new();
        queue.load([tx("a"), tx("b")]);

        assert!(queue.advance("a"));
        assert_eq!(queue.peek_head().map(|t| t.id.as_str()), Some("b"));
    }

    #[test]
    fn duplicate_advance_is_a_noop() {
        let mut queue = ReviewQueue::new();
        queue.load([tx("a"), tx("b")]);

        assert!(queue.advance("a"));
        assert!(!queue.advance("a"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek_head().map(|t| t.id.as_str()), Some("b"));
    }

    #[test]
    fn advance_on_empty_queue_is_a_noop() {
        let mut queue = ReviewQueue::new();
        assert!(!queue.advance("a"));
        assert!(queue.is_empty());
    }
}
