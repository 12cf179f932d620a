//! # label-leader
//!
//! Synchronizes GitHub issue labels from one leader repository to a set of
//! target repositories
//!
//! ## Features
//! - Ordered include/ignore rules choosing which leader labels propagate
//! - Deterministic create/update plan, printed before anything is written
//! - Dry-run mode
//! - Fail-fast execution that reports the job that failed

pub mod config;
pub mod diff;
pub mod error;
pub mod github;
pub mod label;
pub mod prompt;
pub mod rules;
pub mod sync;

pub use config::{load_config, SyncConfig};
pub use diff::{compare_labels, plan_sync, LabelField, SyncAction, SyncJob};
pub use error::{Error, Result};
pub use github::{read_repo_labels, GitHubClient, LabelService, RepositoryHandle};
pub use label::{Label, LabelSet};
pub use prompt::{Confirmation, TerminalPrompt};
pub use rules::{classify, filter_labels, FilterResult, Rule, RuleMode};
pub use sync::{LabelSyncer, RunOptions, SyncOutcome, SyncPlan};
