//! Label Diffing
//!
//! Field-level label comparison and sync job planning

use std::collections::BTreeMap;
use std::fmt;

use crate::label::{Label, LabelSet};

/// Label field that can differ between two repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LabelField {
    Name,
    Color,
    Description,
}

impl fmt::Display for LabelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelField::Name => f.write_str("name"),
            LabelField::Color => f.write_str("color"),
            LabelField::Description => f.write_str("description"),
        }
    }
}

/// Action applied to a target repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Create a label that is missing from the target
    Create,

    /// Overwrite a target label with the leader's definition
    Update,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Create => f.write_str("create"),
            SyncAction::Update => f.write_str("update"),
        }
    }
}

/// One planned change to one label in one target repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    /// Target repository name
    pub repository: String,

    /// Label name
    pub label: String,

    pub action: SyncAction,
}

impl SyncJob {
    pub fn new(repository: &str, label: &str, action: SyncAction) -> Self {
        Self {
            repository: repository.to_string(),
            label: label.to_string(),
            action,
        }
    }
}

/// Compare two labels
///
/// # Returns
/// The fields that differ, in the order name, color, description.
/// Empty when the labels are in sync.
pub fn compare_labels(a: &Label, b: &Label) -> Vec<LabelField> {
    let mut changes = Vec::new();

    if a.name != b.name {
        changes.push(LabelField::Name);
    }

    if Label::normalize_color(&a.color) != Label::normalize_color(&b.color) {
        changes.push(LabelField::Color);
    }

    if a.description() != b.description() {
        changes.push(LabelField::Description);
    }

    changes
}

/// Plan the jobs that bring every target repository in line with the leader
///
/// Repositories and labels are visited in name order. Target labels the
/// leader does not have are never touched.
pub fn plan_sync(leader: &LabelSet, targets: &BTreeMap<String, LabelSet>) -> Vec<SyncJob> {
    let mut jobs = Vec::new();

    for (repository, target_labels) in targets {
        for (name, leader_label) in leader {
            match target_labels.get(name) {
                Some(target_label) => {
                    if !compare_labels(leader_label, target_label).is_empty() {
                        jobs.push(SyncJob::new(repository, name, SyncAction::Update));
                    }
                }
                None => jobs.push(SyncJob::new(repository, name, SyncAction::Create)),
            }
        }
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::label_set;

    fn leader() -> LabelSet {
        label_set(vec![Label::new("bug", "ff0000").with_description("defect")])
    }

    fn targets(labels: Vec<Label>) -> BTreeMap<String, LabelSet> {
        let mut targets = BTreeMap::new();
        targets.insert("web".to_string(), label_set(labels));
        targets
    }

    #[test]
    fn test_compare_identical_labels() {
        let label = Label::new("bug", "ff0000").with_description("defect");
        assert!(compare_labels(&label, &label).is_empty());
    }

    #[test]
    fn test_compare_reports_each_field() {
        let a = Label::new("bug", "ff0000").with_description("defect");
        let b = Label::new("Bug", "000000");

        assert_eq!(
            compare_labels(&a, &b),
            vec![LabelField::Name, LabelField::Color, LabelField::Description]
        );

        let mut reversed = compare_labels(&b, &a);
        reversed.sort();
        assert_eq!(reversed, compare_labels(&a, &b));
    }

    #[test]
    fn test_compare_color_ignores_case_and_hash() {
        let a = Label::new("bug", "FF0000");
        let b = Label::new("bug", "#ff0000");
        assert!(compare_labels(&a, &b).is_empty());
    }

    #[test]
    fn test_compare_empty_and_absent_description() {
        let a = Label::new("bug", "ff0000").with_description("");
        let b = Label::new("bug", "ff0000");
        assert!(compare_labels(&a, &b).is_empty());
    }

    #[test]
    fn test_plan_in_sync() {
        let jobs = plan_sync(&leader(), &targets(vec![
            Label::new("bug", "ff0000").with_description("defect"),
        ]));
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_plan_update_on_color_change() {
        let jobs = plan_sync(&leader(), &targets(vec![
            Label::new("bug", "000000").with_description("defect"),
        ]));
        assert_eq!(jobs, vec![SyncJob::new("web", "bug", SyncAction::Update)]);
    }

    #[test]
    fn test_plan_create_when_missing() {
        let jobs = plan_sync(&leader(), &targets(vec![]));
        assert_eq!(jobs, vec![SyncJob::new("web", "bug", SyncAction::Create)]);
    }

    #[test]
    fn test_plan_leaves_extra_target_labels_alone() {
        let jobs = plan_sync(&leader(), &targets(vec![
            Label::new("bug", "ff0000").with_description("defect"),
            Label::new("local-only", "cccccc"),
        ]));
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_plan_order_is_deterministic() {
        let leader = label_set(vec![
            Label::new("feature", "00ff00"),
            Label::new("bug", "ff0000"),
        ]);
        let mut targets = BTreeMap::new();
        targets.insert("zeta".to_string(), LabelSet::new());
        targets.insert("alpha".to_string(), label_set(vec![Label::new("bug", "000000")]));

        let jobs = plan_sync(&leader, &targets);

        assert_eq!(
            jobs,
            vec![
                SyncJob::new("alpha", "bug", SyncAction::Update),
                SyncJob::new("alpha", "feature", SyncAction::Create),
                SyncJob::new("zeta", "bug", SyncAction::Create),
                SyncJob::new("zeta", "feature", SyncAction::Create),
            ]
        );
        assert_eq!(plan_sync(&leader, &targets), jobs);
    }
}
