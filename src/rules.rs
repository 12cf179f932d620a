//! Label Filter Rules
//!
//! Ordered include/ignore rules deciding which leader labels take part in a sync

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::error::{Error, Result};
use crate::label::LabelSet;

/// What a matching rule does with a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMode {
    /// Propagate the label to target repositories
    Include,

    /// Leave the label out of the sync
    Ignore,
}

impl fmt::Display for RuleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleMode::Include => f.write_str("include"),
            RuleMode::Ignore => f.write_str("ignore"),
        }
    }
}

impl FromStr for RuleMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "include" => Ok(RuleMode::Include),
            "ignore" => Ok(RuleMode::Ignore),
            other => Err(Error::config(format!("invalid rule mode: {other}"))),
        }
    }
}

/// Compiled filter rule
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    regex: Regex,
    mode: RuleMode,
}

impl Rule {
    /// Compile a rule
    ///
    /// The pattern matches when it matches at the start of a label name.
    ///
    /// # Errors
    /// Returns an error if the pattern is not a valid regular expression
    pub fn new(pattern: &str, mode: RuleMode) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})")).map_err(|source| {
            Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            mode,
        })
    }

    /// Pattern as written in the configuration
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn mode(&self) -> RuleMode {
        self.mode
    }

    /// Whether this rule applies to the given label name
    pub fn matches(&self, label_name: &str) -> bool {
        self.regex.is_match(label_name)
    }
}

/// Leader labels split by rule outcome
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterResult {
    /// Labels to synchronize
    pub included: LabelSet,

    /// Labels left out of the sync
    pub ignored: LabelSet,
}

/// Classify a label name
///
/// The last matching rule wins. A name no rule matches is ignored.
pub fn classify(label_name: &str, rules: &[Rule]) -> RuleMode {
    rules
        .iter()
        .rev()
        .find(|rule| rule.matches(label_name))
        .map(Rule::mode)
        .unwrap_or(RuleMode::Ignore)
}

/// Partition labels into included and ignored sets
pub fn filter_labels(labels: LabelSet, rules: &[Rule]) -> FilterResult {
    let mut result = FilterResult::default();

    for (name, label) in labels {
        match classify(&name, rules) {
            RuleMode::Include => result.included.insert(name, label),
            RuleMode::Ignore => result.ignored.insert(name, label),
        };
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{label_set, Label};

    fn rule(pattern: &str, mode: RuleMode) -> Rule {
        Rule::new(pattern, mode).unwrap()
    }

    #[test]
    fn test_no_rules_ignores_everything() {
        assert_eq!(classify("bug", &[]), RuleMode::Ignore);
    }

    #[test]
    fn test_last_match_wins() {
        let rules = vec![
            rule(".*", RuleMode::Include),
            rule("^wip", RuleMode::Ignore),
            rule("^wip-keep$", RuleMode::Include),
        ];

        assert_eq!(classify("bug", &rules), RuleMode::Include);
        assert_eq!(classify("wip-draft", &rules), RuleMode::Ignore);
        assert_eq!(classify("wip-keep", &rules), RuleMode::Include);
    }

    #[test]
    fn test_later_non_matching_rule_does_not_override() {
        let rules = vec![rule("bug", RuleMode::Include), rule("feature", RuleMode::Ignore)];
        assert_eq!(classify("bug", &rules), RuleMode::Include);
    }

    #[test]
    fn test_pattern_is_anchored_at_start() {
        let rules = vec![rule("bug", RuleMode::Include)];
        assert_eq!(classify("bug-report", &rules), RuleMode::Include);
        assert_eq!(classify("not-a-bug", &rules), RuleMode::Ignore);
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let rules = vec![rule("bug|feature", RuleMode::Include)];
        assert_eq!(classify("feature", &rules), RuleMode::Include);
        assert_eq!(classify("new-feature", &rules), RuleMode::Ignore);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Rule::new("(unclosed", RuleMode::Include).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("include".parse::<RuleMode>().unwrap(), RuleMode::Include);
        assert_eq!("ignore".parse::<RuleMode>().unwrap(), RuleMode::Ignore);

        let err = "exclude".parse::<RuleMode>().unwrap_err();
        assert!(err.to_string().contains("invalid rule mode: exclude"));
    }

    #[test]
    fn test_filter_labels_partitions_input() {
        let labels = label_set(vec![
            Label::new("bug", "ff0000").with_description("defect"),
            Label::new("feature", "00ff00").with_description(""),
        ]);
        let rules = vec![rule(".*", RuleMode::Include), rule("^feature$", RuleMode::Ignore)];

        let result = filter_labels(labels.clone(), &rules);

        assert_eq!(result.included.keys().collect::<Vec<_>>(), vec!["bug"]);
        assert_eq!(result.ignored.keys().collect::<Vec<_>>(), vec!["feature"]);
        assert_eq!(result.included.len() + result.ignored.len(), labels.len());
        assert!(result.included.keys().all(|k| !result.ignored.contains_key(k)));
    }

    #[test]
    fn test_lone_feature_ignore_rule_leaves_bug_ignored() {
        // Only the ignore rule is configured, so nothing is ever included
        let labels = label_set(vec![
            Label::new("bug", "ff0000").with_description("defect"),
            Label::new("feature", "00ff00"),
        ]);
        let rules = vec![rule("^feature$", RuleMode::Ignore)];

        let result = filter_labels(labels, &rules);

        assert!(result.included.is_empty());
        assert_eq!(result.ignored.len(), 2);
    }
}
