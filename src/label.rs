//! Label Model
//!
//! Snapshot of a repository label as read from GitHub

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Labels of one repository keyed by label name
///
/// Ordered by name so that every traversal is deterministic.
pub type LabelSet = BTreeMap<String, Label>;

/// GitHub Label
///
/// Name, color and description of a label at the time it was fetched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    /// Label name (unique within a repository)
    pub name: String,

    /// Label color (6-digit hexadecimal, without #)
    pub color: String,

    /// Label description
    #[serde(default)]
    pub description: Option<String>,
}

impl Label {
    /// Create a label without a description
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            description: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Description, treating an empty string as absent
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    /// Normalize color (remove # and convert to lowercase)
    pub fn normalize_color(color: &str) -> String {
        color.trim_start_matches('#').to_lowercase()
    }
}

impl From<octocrab::models::Label> for Label {
    fn from(label: octocrab::models::Label) -> Self {
        Label {
            name: label.name,
            color: label.color,
            description: label.description,
        }
    }
}

/// Build a [`LabelSet`] from a list of labels
///
/// A later label with the same name replaces an earlier one.
pub fn label_set<I: IntoIterator<Item = Label>>(labels: I) -> LabelSet {
    labels
        .into_iter()
        .map(|label| (label.name.clone(), label))
        .collect()
}
