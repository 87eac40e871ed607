use std::collections::VecDeque;

use crate::model::AnswerEvent;

/// Capped ring buffer of the most recent answers, for display only.
///
/// Progress derivation always reads the full log; this buffer is never fed
/// back into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentAnswers {
    capacity: usize,
    entries: VecDeque<AnswerEvent>,
}

impl RecentAnswers {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    /// Keep the `capacity` latest events of `events` by timestamp.
    #[must_use]
    pub fn from_log(events: &[AnswerEvent], capacity: usize) -> Self {
        let mut sorted: Vec<&AnswerEvent> = events.iter().collect();
        sorted.sort_by_key(|e| e.answered_at());

        let mut recent = Self::new(capacity);
        for event in sorted {
            recent.push(event.clone());
        }
        recent
    }

    /// Add an event, evicting the oldest one when full.
    pub fn push(&mut self, event: AnswerEvent) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &AnswerEvent> {
        self.entries.iter().rev()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&AnswerEvent> {
        self.entries.back()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
