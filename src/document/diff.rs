//! Snapshot comparison
//!
//! Compares two documents setting by setting. Neither input is modified and
//! nothing is merged; the result only describes what differs.

use serde::Serialize;

use super::Document;
use crate::types::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "lowercase")]
pub enum Change {
    Added { name: String, value: Value },
    Removed { name: String, value: Value },
    Changed { name: String, old: Value, new: Value },
}

impl Change {
    pub fn name(&self) -> &str {
        match self {
            Change::Added { name, .. }
            | Change::Removed { name, .. }
            | Change::Changed { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentDiff {
    pub changes: Vec<Change>,
}

impl DocumentDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Settings removed or changed follow `old`'s declaration order, then
/// additions follow `new`'s.
pub fn diff(old: &Document, new: &Document) -> DocumentDiff {
    let mut changes = Vec::new();

    for setting in old.iter() {
        match new.get(&setting.name) {
            None => changes.push(Change::Removed {
                name: setting.name.clone(),
                value: setting.value.clone(),
            }),
            Some(value) if *value != setting.value => changes.push(Change::Changed {
                name: setting.name.clone(),
                old: setting.value.clone(),
                new: value.clone(),
            }),
            Some(_) => {}
        }
    }

    for setting in new.iter().filter(|s| !old.contains(&s.name)) {
        changes.push(Change::Added {
            name: setting.name.clone(),
            value: setting.value.clone(),
        });
    }

    DocumentDiff { changes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_snapshots() {
        let old = Document::parse("AUTHOR = 'a'\nTHEME = 'notmyidea'\nLINKS = ()\n", ".").unwrap();
        let new = Document::parse(
            "AUTHOR = 'a'\nTHEME = 'alchemy'\nHIDE_AUTHORS = True\n",
            ".",
        )
        .unwrap();

        let result = diff(&old, &new);
        let names: Vec<&str> = result.changes.iter().map(Change::name).collect();
        assert_eq!(names, vec!["THEME", "LINKS", "HIDE_AUTHORS"]);
        assert_eq!(
            result.changes[0],
            Change::Changed {
                name: "THEME".to_string(),
                old: Value::from("notmyidea"),
                new: Value::from("alchemy"),
            }
        );
        assert!(matches!(result.changes[1], Change::Removed { .. }));
        assert!(matches!(result.changes[2], Change::Added { .. }));
    }

    #[test]
    fn test_diff_identical() {
        let doc = Document::parse("A = [1, 2]\n", ".").unwrap();
        assert!(diff(&doc, &doc).is_empty());
    }
}
