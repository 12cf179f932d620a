//! Label Synchronization Functionality
//!
//! Fetches leader and target labels, prints the plan, asks for confirmation
//! and applies the jobs one by one.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use colored::Colorize;
use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::diff::{compare_labels, plan_sync, LabelField, SyncAction, SyncJob};
use crate::error::{Error, Result};
use crate::github::{read_repo_labels, LabelService, RepositoryHandle};
use crate::label::{Label, LabelSet};
use crate::prompt::Confirmation;

/// Question asked before any label is written
pub const CONFIRM_QUESTION: &str =
    "Do you want to continue to synchronize labels as described above?";

/// Options for a single run
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Print the plan and stop
    pub dry_run: bool,

    /// Show the changed fields of each update job
    pub verbose: bool,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing to do
    InSync,

    /// Plan printed, nothing applied
    DryRun { planned: usize },

    /// The user declined the plan
    Cancelled { planned: usize },

    /// Every job was applied
    Applied { applied: usize },
}

/// Labels fetched for one run and the jobs derived from them
#[derive(Debug, Clone)]
pub struct SyncPlan {
    /// Jobs in execution order
    pub jobs: Vec<SyncJob>,

    /// Included leader labels
    pub leader_labels: LabelSet,

    /// Leader labels left out by the rules
    pub ignored_labels: LabelSet,

    /// Labels of each target repository
    pub target_labels: BTreeMap<String, LabelSet>,
}

impl SyncPlan {
    /// Build the plan from fetched labels
    pub fn new(
        leader_labels: LabelSet,
        ignored_labels: LabelSet,
        target_labels: BTreeMap<String, LabelSet>,
    ) -> Self {
        let jobs = plan_sync(&leader_labels, &target_labels);
        Self {
            jobs,
            leader_labels,
            ignored_labels,
            target_labels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Fields an update job will change
    pub fn changes(&self, job: &SyncJob) -> Vec<LabelField> {
        let leader = self.leader_labels.get(&job.label);
        let target = self
            .target_labels
            .get(&job.repository)
            .and_then(|labels| labels.get(&job.label));

        match (leader, target) {
            (Some(leader), Some(target)) => compare_labels(leader, target),
            _ => Vec::new(),
        }
    }

    fn leader_label(&self, name: &str) -> Result<&Label> {
        self.leader_labels
            .get(name)
            .ok_or_else(|| Error::UnknownLeaderLabel(name.to_string()))
    }
}

/// Label Synchronization Engine
///
/// Brings every target repository's labels in line with the leader
pub struct LabelSyncer<S> {
    service: S,
    config: SyncConfig,
}

impl<S: LabelService> LabelSyncer<S> {
    pub fn new(service: S, config: SyncConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Remote service the syncer talks to
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Run a full sync: fetch, plan, confirm and execute
    ///
    /// # Errors
    /// Returns an error if fetching labels, prompting or applying a job fails
    pub async fn run<W: Write>(
        &self,
        options: RunOptions,
        prompt: &mut dyn Confirmation,
        out: &mut W,
    ) -> Result<SyncOutcome> {
        let plan = self.plan(out).await?;

        if plan.is_empty() {
            writeln!(out, "\n{}", "Everything in sync!".green())?;
            info!("everything in sync");
            return Ok(SyncOutcome::InSync);
        }

        print_plan(&plan, options.verbose, out)?;

        if options.dry_run {
            writeln!(out, "Exiting without actions, as --dry-run was used.")?;
            return Ok(SyncOutcome::DryRun {
                planned: plan.jobs.len(),
            });
        }

        out.flush()?;
        if !prompt.confirm(CONFIRM_QUESTION)? {
            info!("synchronization cancelled by user");
            return Ok(SyncOutcome::Cancelled {
                planned: plan.jobs.len(),
            });
        }

        let applied = self.execute(&plan, out).await?;
        writeln!(
            out,
            "\n{} {} job(s) applied",
            "Synchronization completed:".green(),
            applied
        )?;

        Ok(SyncOutcome::Applied { applied })
    }

    /// Fetch labels and compute the jobs
    ///
    /// The leader's labels go through the rules; target labels are used as-is.
    ///
    /// # Errors
    /// Returns an error if any repository cannot be read
    pub async fn plan<W: Write>(&self, out: &mut W) -> Result<SyncPlan> {
        let organization = &self.config.organization;

        writeln!(
            out,
            "Fetching labels from the leader repository {}/{}...",
            organization,
            self.config.leader.cyan()
        )?;
        let leader = read_repo_labels(
            &self.service,
            organization,
            &self.config.leader,
            Some(self.config.rules.as_slice()),
        )
        .await?;
        info!(
            repository = %self.config.leader,
            included = leader.included.len(),
            ignored = leader.ignored.len(),
            "leader labels filtered"
        );

        let mut targets = BTreeMap::new();
        for target in &self.config.targets {
            writeln!(
                out,
                "Fetching labels from the target repository {}/{}...",
                organization,
                target.cyan()
            )?;
            let labels = read_repo_labels(&self.service, organization, target, None).await?;
            targets.insert(target.clone(), labels.included);
        }

        for target in targets.keys() {
            writeln!(out, "Comparing labels for repository {}...", target.cyan())?;
        }

        let plan = SyncPlan::new(leader.included, leader.ignored, targets);
        debug!(jobs = plan.jobs.len(), "sync plan computed");
        Ok(plan)
    }

    /// Apply the plan's jobs in order
    ///
    /// Stops at the first failing job; jobs before it stay applied.
    ///
    /// # Returns
    /// Number of jobs applied
    ///
    /// # Errors
    /// Returns `JobFailed` naming the job that failed
    pub async fn execute<W: Write>(&self, plan: &SyncPlan, out: &mut W) -> Result<usize> {
        let mut handles: HashMap<&str, RepositoryHandle> = HashMap::new();

        writeln!(out, "\nExecuting synchronization plan")?;
        for (completed, job) in plan.jobs.iter().enumerate() {
            writeln!(
                out,
                "{}: {} label {}",
                job.repository,
                action_label(job.action),
                job.label.cyan()
            )?;

            self.apply(plan, job, &mut handles)
                .await
                .map_err(|source| Error::JobFailed {
                    repository: job.repository.clone(),
                    label: job.label.clone(),
                    action: job.action,
                    completed,
                    source: Box::new(source),
                })?;
        }

        Ok(plan.jobs.len())
    }

    async fn apply<'a>(
        &self,
        plan: &SyncPlan,
        job: &'a SyncJob,
        handles: &mut HashMap<&'a str, RepositoryHandle>,
    ) -> Result<()> {
        let label = plan.leader_label(&job.label)?;

        if !handles.contains_key(job.repository.as_str()) {
            let handle = self
                .service
                .get_repository(&self.config.organization, &job.repository)
                .await?;
            handles.insert(job.repository.as_str(), handle);
        }
        let repo = &handles[job.repository.as_str()];

        match job.action {
            SyncAction::Create => self.service.create_label(repo, label).await?,
            SyncAction::Update => self.service.edit_label(repo, &job.label, label).await?,
        }

        debug!(repository = %repo.full_name(), label = %job.label, action = %job.action, "job applied");
        Ok(())
    }
}

fn action_label(action: SyncAction) -> colored::ColoredString {
    match action {
        SyncAction::Create => action.to_string().green(),
        SyncAction::Update => action.to_string().yellow(),
    }
}

/// Print the jobs and the number of ignored leader labels
pub fn print_plan<W: Write>(plan: &SyncPlan, verbose: bool, out: &mut W) -> Result<()> {
    writeln!(out, "\nHere is our synchronization plan:\n")?;

    for job in &plan.jobs {
        writeln!(
            out,
            "- {}: {} label {}",
            job.repository,
            action_label(job.action),
            job.label.cyan()
        )?;

        if verbose && job.action == SyncAction::Update {
            let fields: Vec<String> = plan.changes(job).iter().map(ToString::to_string).collect();
            writeln!(out, "    {}", format!("changed: {}", fields.join(", ")).dimmed())?;
        }
    }

    writeln!(
        out,
        "\n{} labels from the leader repository will be ignored.\n",
        plan.ignored_labels.len()
    )?;

    Ok(())
}
