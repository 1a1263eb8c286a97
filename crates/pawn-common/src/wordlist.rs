//! Keyword lists settable by the host.

use rustc_hash::FxHashSet;

/// A whitespace-separated word list with fast membership lookup.
///
/// Entry order is preserved so the preprocessor-definitions list can be
/// parsed in the order the host supplied it.
#[derive(Debug, Default)]
pub struct WordList {
    entries: Vec<String>,
    lookup: FxHashSet<String>,
}

impl WordList {
    pub fn new() -> WordList {
        WordList::default()
    }

    /// Replace the list contents from whitespace-separated text.
    ///
    /// Returns `true` when the resulting list differs from the previous one,
    /// so hosts can skip re-lexing after a no-op update.
    pub fn set(&mut self, text: &str) -> bool {
        let entries: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
        if entries == self.entries {
            return false;
        }
        self.lookup = entries.iter().cloned().collect();
        self.entries = entries;
        true
    }

    pub fn contains(&self, word: &str) -> bool {
        self.lookup.contains(word)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the order the host supplied them.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_splits_on_whitespace() {
        let mut list = WordList::new();
        assert!(list.set("if else\twhile\nreturn"));
        assert!(list.contains("if"));
        assert!(list.contains("while"));
        assert!(!list.contains("for"));
        assert_eq!(list.entries().len(), 4);
    }

    #[test]
    fn set_reports_changes_only() {
        let mut list = WordList::new();
        assert!(list.set("a b"));
        assert!(!list.set("a  b")); // same words, different spacing
        assert!(list.set("a b c"));
        assert!(list.set(""));
        assert!(list.is_empty());
    }

    #[test]
    fn entry_order_is_preserved() {
        let mut list = WordList::new();
        list.set("ZED alpha MID");
        assert_eq!(list.entries(), ["ZED", "alpha", "MID"]);
    }
}
