//! # Undo/Redo History
//!
//! Snapshot-based history over a cloneable document.
//!
//! ```text
//!   past: [v0, v1, v2]   present: v3   future: [v5, v4]
//!                 undo() ◄──────────────────► redo()
//! ```
//!
//! Callers mutate `present` through [`History::record`], which snapshots the
//! previous value first. Edits tagged with the same [`EditGroup`] as the
//! previous edit coalesce into one undo step, so typing a sentence undoes in
//! one go instead of one keystroke at a time.

use std::mem;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Tag for coalescing consecutive edits into one undo step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditGroup {
    Prompt,
    Parameters,
    ConversationInput(String),
}

#[derive(Debug, Clone)]
pub struct History<T> {
    past: Vec<T>,
    present: T,
    future: Vec<T>,
    limit: usize,
    /// Group of the most recent recorded edit. Cleared by undo/redo and ungrouped edits.
    last_group: Option<EditGroup>,
}

impl<T: Clone + PartialEq> History<T> {
    pub fn new(present: T, limit: usize) -> Self {
        Self {
            past: Vec::new(),
            present,
            future: Vec::new(),
            limit: limit.max(1),
            last_group: None,
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Mutable access that bypasses history. Used for changes that must not be undoable
    /// (normalization, resolved sends).
    pub fn present_mut(&mut self) -> &mut T {
        &mut self.present
    }

    /// Applies `edit` to the present and records an undo step.
    ///
    /// Returns `false` (and records nothing) if the edit left the document unchanged.
    pub fn record<F>(&mut self, group: Option<EditGroup>, edit: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let before = self.present.clone();
        edit(&mut self.present);
        if self.present == before {
            return false;
        }

        let coalesce = group.is_some() && group == self.last_group;
        if !coalesce {
            self.past.push(before);
            if self.past.len() > self.limit {
                self.past.remove(0);
            }
        }
        self.future.clear();
        self.last_group = group;
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        match self.past.pop() {
            Some(previous) => {
                let current = mem::replace(&mut self.present, previous);
                self.future.push(current);
                self.last_group = None;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.future.pop() {
            Some(next) => {
                let current = mem::replace(&mut self.present, next);
                self.past.push(current);
                self.last_group = None;
                true
            }
            None => false,
        }
    }

    /// Ends the current coalescing run, so the next grouped edit starts a new step.
    pub fn break_group(&mut self) {
        self.last_group = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(h: &mut History<Vec<u8>>, v: u8) -> bool {
        h.record(None, |doc| doc.push(v))
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut h = History::new(vec![], 10);
        push(&mut h, 1);
        push(&mut h, 2);
        assert_eq!(h.present(), &vec![1, 2]);

        assert!(h.undo());
        assert_eq!(h.present(), &vec![1]);
        assert!(h.redo());
        assert_eq!(h.present(), &vec![1, 2]);
        assert!(!h.redo());
    }

    #[test]
    fn test_new_edit_clears_future() {
        let mut h = History::new(vec![], 10);
        push(&mut h, 1);
        h.undo();
        assert!(h.can_redo());
        push(&mut h, 2);
        assert!(!h.can_redo());
        assert_eq!(h.present(), &vec![2]);
    }

    #[test]
    fn test_noop_edit_not_recorded() {
        let mut h = History::new(vec![1u8], 10);
        assert!(!h.record(None, |_| {}));
        assert!(!h.can_undo());
    }

    #[test]
    fn test_grouped_edits_coalesce() {
        let mut h = History::new(String::new(), 10);
        for c in "abc".chars() {
            h.record(Some(EditGroup::Prompt), |s| s.push(c));
        }
        assert_eq!(h.present(), "abc");
        assert!(h.undo());
        assert_eq!(h.present(), "");
        assert!(!h.can_undo());
    }

    #[test]
    fn test_different_groups_do_not_coalesce() {
        let mut h = History::new(String::new(), 10);
        h.record(Some(EditGroup::Prompt), |s| s.push('a'));
        h.record(Some(EditGroup::ConversationInput("c1".into())), |s| s.push('b'));
        h.record(Some(EditGroup::ConversationInput("c2".into())), |s| s.push('c'));
        h.undo();
        assert_eq!(h.present(), "ab");
        h.undo();
        assert_eq!(h.present(), "a");
    }

    #[test]
    fn test_break_group_starts_new_step() {
        let mut h = History::new(String::new(), 10);
        h.record(Some(EditGroup::Prompt), |s| s.push('a'));
        h.break_group();
        h.record(Some(EditGroup::Prompt), |s| s.push('b'));
        h.undo();
        assert_eq!(h.present(), "a");
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut h = History::new(vec![], 2);
        push(&mut h, 1);
        push(&mut h, 2);
        push(&mut h, 3);
        assert!(h.undo());
        assert!(h.undo());
        assert!(!h.undo());
        assert_eq!(h.present(), &vec![1]);
    }

    #[test]
    fn test_present_mut_bypasses_history() {
        let mut h = History::new(vec![], 10);
        h.present_mut().push(9);
        assert!(!h.can_undo());
        assert_eq!(h.present(), &vec![9]);
    }
}
