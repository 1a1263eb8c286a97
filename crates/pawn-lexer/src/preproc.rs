//! Macro definition events, the append-only history log, and the pure
//! merge producing the active definition table.

use rustc_hash::FxHashMap;
use serde::Serialize;

/// A `#define` discovered while scanning, recorded against the line that
/// declared it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroDefinition {
    pub line: usize,
    pub name: String,
    pub value: String,
}

/// Line-ordered log of `#define` events.
///
/// Monotonic in line index by construction: events are appended in scan
/// order and truncated whenever a scan restarts at or before their line.
#[derive(Debug, Default)]
pub struct MacroHistory {
    events: Vec<MacroDefinition>,
}

impl MacroHistory {
    pub fn new() -> MacroHistory {
        MacroHistory::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn record(&mut self, line: usize, name: &str, value: &str) {
        self.events.push(MacroDefinition {
            line,
            name: name.to_owned(),
            value: value.to_owned(),
        });
    }

    /// Drop every event recorded at or after `line`. Returns whether any
    /// event was dropped, so the caller can signal a wider restyle.
    pub fn truncate_from(&mut self, line: usize) -> bool {
        match self.events.iter().position(|event| event.line >= line) {
            Some(first_invalid) => {
                self.events.truncate(first_invalid);
                true
            }
            None => false,
        }
    }

    pub fn events(&self) -> &[MacroDefinition] {
        &self.events
    }
}

/// Parse the host's preprocessor-definitions word list into the static
/// table: `NAME` defaults to value `"1"`, `NAME=VALUE` uses the given value.
pub fn parse_definitions(entries: &[String]) -> FxHashMap<String, String> {
    let mut table = FxHashMap::default();
    for entry in entries {
        match entry.split_once('=') {
            Some((name, value)) => table.insert(name.to_owned(), value.to_owned()),
            None => table.insert(entry.clone(), "1".to_owned()),
        };
    }
    table
}

/// Merge the static table with the surviving history, later events winning
/// for the same name. Pure: neither input is modified.
pub fn active_definitions(
    static_table: &FxHashMap<String, String>,
    history: &MacroHistory,
) -> FxHashMap<String, String> {
    let mut table = static_table.clone();
    for event in history.events() {
        table.insert(event.name.clone(), event.value.clone());
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_definitions_defaults_to_one() {
        let entries = vec!["DEBUG".to_owned(), "VERSION=200".to_owned(), "EMPTY=".to_owned()];
        let table = parse_definitions(&entries);
        assert_eq!(table.get("DEBUG").map(String::as_str), Some("1"));
        assert_eq!(table.get("VERSION").map(String::as_str), Some("200"));
        assert_eq!(table.get("EMPTY").map(String::as_str), Some(""));
    }

    #[test]
    fn truncate_drops_at_and_after_line() {
        let mut history = MacroHistory::new();
        history.record(3, "A", "1");
        history.record(7, "B", "2");
        history.record(9, "C", "3");

        assert!(history.truncate_from(7));
        let lines: Vec<usize> = history.events().iter().map(|e| e.line).collect();
        assert_eq!(lines, [3]);

        assert!(!history.truncate_from(7));
        assert!(history.truncate_from(0));
        assert!(history.events().is_empty());
    }

    #[test]
    fn merge_lets_history_override_static_table() {
        let mut static_table = FxHashMap::default();
        static_table.insert("X".to_owned(), "static".to_owned());
        static_table.insert("Y".to_owned(), "kept".to_owned());

        let mut history = MacroHistory::new();
        history.record(1, "X", "first");
        history.record(5, "X", "second");

        let merged = active_definitions(&static_table, &history);
        assert_eq!(merged.get("X").map(String::as_str), Some("second"));
        assert_eq!(merged.get("Y").map(String::as_str), Some("kept"));
        // inputs untouched
        assert_eq!(static_table.get("X").map(String::as_str), Some("static"));
        assert_eq!(history.events().len(), 2);
    }
}
