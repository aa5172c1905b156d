//! Cancellable timers on a monotonic millisecond clock.
//!
//! The event loop advances the clock once per frame and handles whatever
//! came due. Timers bound to a conversation carry its [`ChatId`] as scope so
//! that clearing or deleting the conversation can drop them in one call.

use std::collections::{BTreeMap, HashMap};

use crate::chat_list::ChatId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Entry<T> {
    scope: Option<ChatId>,
    event: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    // (due, id) keeps same-instant timers in insertion order
    queue: BTreeMap<(u64, u64), Entry<T>>,
    due_by_id: HashMap<u64, u64>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            queue: BTreeMap::new(),
            due_by_id: HashMap::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn schedule(&mut self, delay_ms: u64, scope: Option<ChatId>, event: T) -> TimerHandle {
        self.next_id += 1;
        let id = self.next_id;
        let due = self.now_ms.saturating_add(delay_ms);
        self.queue.insert((due, id), Entry { scope, event });
        self.due_by_id.insert(id, due);
        TimerHandle(id)
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.due_by_id.contains_key(&handle.0)
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.due_by_id.remove(&handle.0) {
            Some(due) => self.queue.remove(&(due, handle.0)).is_some(),
            None => false,
        }
    }

    /// Drop every pending timer bound to `scope`.
    pub fn cancel_scope(&mut self, scope: ChatId) -> usize {
        self.cancel_matching(scope, |_| true)
    }

    /// Drop pending timers bound to `scope` whose event satisfies `pred`.
    pub fn cancel_matching<F>(&mut self, scope: ChatId, pred: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let doomed: Vec<(u64, u64)> = self
            .queue
            .iter()
            .filter(|(_, e)| e.scope == Some(scope) && pred(&e.event))
            .map(|(k, _)| *k)
            .collect();
        for key in &doomed {
            self.queue.remove(key);
            self.due_by_id.remove(&key.1);
        }
        doomed.len()
    }

    /// Move the clock forward and return due events in firing order.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<T> {
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
        let mut fired = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > self.now_ms {
                break;
            }
            let ((_, id), e) = entry.remove_entry();
            self.due_by_id.remove(&id);
            fired.push(e.event);
        }
        fired
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
