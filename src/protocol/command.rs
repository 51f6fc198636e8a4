//! Command definitions
//!
//! Represents commands sent to the filter service.

use std::fmt;
use std::slice;

/// Command verbs as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Add,
    Remove,
    Has,
    Count,
    Binary,
}

impl Verb {
    /// Wire spelling of the verb
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Add => "ADD",
            Verb::Remove => "RMV",
            Verb::Has => "HAS",
            Verb::Count => "CNT",
            Verb::Binary => "BIN",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command to send to the filter service
///
/// Immutable once constructed. Items are opaque strings; the protocol
/// joins them with spaces, so items containing whitespace cannot be
/// represented on the wire. The codec does not enforce this.
#[derive(Debug, Clone)]
pub enum Command {
    /// Add items to the filter
    Add { items: Vec<String> },

    /// Remove items from the filter
    Remove { items: Vec<String> },

    /// Test one item for membership
    Has { item: String },

    /// Fetch the counter for one item
    Count { item: String },

    /// Fetch the raw filter state
    Binary,
}

impl Command {
    /// Get the command's verb
    pub fn verb(&self) -> Verb {
        match self {
            Command::Add { .. } => Verb::Add,
            Command::Remove { .. } => Verb::Remove,
            Command::Has { .. } => Verb::Has,
            Command::Count { .. } => Verb::Count,
            Command::Binary => Verb::Binary,
        }
    }

    /// Get the command's arguments in wire order
    pub fn args(&self) -> &[String] {
        match self {
            Command::Add { items } | Command::Remove { items } => items,
            Command::Has { item } | Command::Count { item } => slice::from_ref(item),
            Command::Binary => &[],
        }
    }
}
