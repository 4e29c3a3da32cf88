//! Navigation history record.
//!
//! # Design Decisions
//! - Entries are committed `full_path`s; only commits write here
//! - Pushing after going back drops the forward entries
//! - Bounded: the oldest entries fall off beyond `max_entries`

use serde::Serialize;

/// Ordered committed locations plus a cursor into them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationRecord {
    entries: Vec<String>,
    cursor: Option<usize>,
    #[serde(skip)]
    max_entries: usize,
}

impl NavigationRecord {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            max_entries: max_entries.max(1),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Entry at the cursor.
    pub fn current(&self) -> Option<&str> {
        self.cursor
            .and_then(|index| self.entries.get(index))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index `delta` steps from the cursor, if it exists.
    pub fn target(&self, delta: isize) -> Option<usize> {
        let cursor = self.cursor? as isize;
        let index = cursor.checked_add(delta)?;
        (0..self.entries.len() as isize)
            .contains(&index)
            .then_some(index as usize)
    }

    pub(crate) fn push(&mut self, full_path: String) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
        self.entries.push(full_path);

        let overflow = self.entries.len().saturating_sub(self.max_entries);
        if overflow > 0 {
            self.entries.drain(..overflow);
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Overwrite the entry at the cursor (push when empty).
    pub(crate) fn replace(&mut self, full_path: String) {
        match self.cursor {
            Some(cursor) => self.entries[cursor] = full_path,
            None => self.push(full_path),
        }
    }

    /// Move the cursor to `index`, refreshing the entry with the committed
    /// location. Only moves while the entry still reads `expected`; returns
    /// false and leaves the record alone once it has shifted.
    pub(crate) fn move_to(&mut self, index: usize, expected: &str, full_path: String) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if entry == expected => {
                *entry = full_path;
                self.cursor = Some(index);
                true
            }
            _ => false,
        }
    }
}
