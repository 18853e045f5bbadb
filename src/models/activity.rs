//! Activity log shown under the controls.

use std::collections::VecDeque;

/// Severity of an activity entry, mapped to a text color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityLevel {
    Info,
    Success,
    Warn,
    Error,
}

/// A single line in the activity log.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityEntry {
    /// Monotonic id, used as the list key.
    pub id: usize,
    pub level: ActivityLevel,
    pub message: String,
}

/// Bounded log of session activity, newest last.
#[derive(Clone, Debug)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
    next_id: usize,
}

impl ActivityLog {
    /// Create an empty log keeping at most `capacity` entries.
    ///
    /// # Panics
    /// Panics if capacity is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ActivityLog capacity must be greater than 0");
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Append an entry, dropping the oldest when full.
    pub fn push(&mut self, level: ActivityLevel, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ActivityEntry {
            id: self.next_id,
            level,
            message: message.into(),
        });
        self.next_id += 1;
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ActivityLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ActivityLevel::Success, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(ActivityLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ActivityLevel::Error, message);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// Clone entries into a Vec for rendering.
    pub fn to_vec(&self) -> Vec<ActivityEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_increasing_ids() {
        let mut log = ActivityLog::new(4);
        log.info("a");
        log.error("b");
        let ids: Vec<_> = log.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(log.to_vec()[1].level, ActivityLevel::Error);
    }

    #[test]
    fn test_oldest_entries_are_dropped() {
        let mut log = ActivityLog::new(2);
        log.info("first");
        log.success("second");
        log.warn("third");
        assert_eq!(log.len(), 2);
        let messages: Vec<_> = log.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "third"]);
        assert_eq!(log.iter().next().map(|e| e.id), Some(1));
    }

    #[test]
    fn test_empty() {
        let log = ActivityLog::new(1);
        assert!(log.is_empty());
        assert!(log.to_vec().is_empty());
    }

    #[test]
    #[should_panic(expected = "capacity must be greater than 0")]
    fn test_zero_capacity_panics() {
        let _ = ActivityLog::new(0);
    }
}
