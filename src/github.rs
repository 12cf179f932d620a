//! GitHub API Client
//!
//! Module for managing interactions with the GitHub API

use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

use crate::error::{Error, Result};
use crate::label::{label_set, Label, LabelSet};
use crate::rules::{filter_labels, FilterResult, Rule};

/// Encode a string for use in URL path segments (RFC 3986 with UTF-8 support)
///
/// Only unreserved characters (A-Z, a-z, 0-9, -, ., _, ~) are left unencoded.
fn encode_path_segment(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' | '_' | '~' => c.to_string(),
            _ => c
                .to_string()
                .bytes()
                .map(|b| format!("%{:02X}", b))
                .collect::<String>(),
        })
        .collect()
}

/// Check if an octocrab error is a 404 Not Found
fn is_not_found_error(err: &octocrab::Error) -> bool {
    err.to_string().contains("Not Found")
}

/// Resolved repository on the remote service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryHandle {
    /// Organization or user owning the repository
    pub owner: String,

    /// Repository name
    pub name: String,
}

impl RepositoryHandle {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Label operations the synchronizer needs from the remote service
#[async_trait]
pub trait LabelService: Send + Sync {
    /// Look up a repository by name
    ///
    /// # Errors
    /// Returns `RepositoryNotFound` if the repository does not exist
    async fn get_repository(&self, owner: &str, name: &str) -> Result<RepositoryHandle>;

    /// List every label of the repository
    async fn list_labels(&self, repo: &RepositoryHandle) -> Result<Vec<Label>>;

    /// Create a new label
    async fn create_label(&self, repo: &RepositoryHandle, label: &Label) -> Result<()>;

    /// Overwrite the label currently named `current_name`
    ///
    /// A `None` or empty description is left out of the request instead of
    /// being sent as an empty string.
    async fn edit_label(
        &self,
        repo: &RepositoryHandle,
        current_name: &str,
        label: &Label,
    ) -> Result<()>;
}

/// Read the labels of one repository
///
/// Without rules every label is returned as used and nothing is ignored.
/// With rules the labels are partitioned by [`filter_labels`].
///
/// # Errors
/// Returns an error if the repository cannot be found or its labels cannot be listed
pub async fn read_repo_labels<S: LabelService + ?Sized>(
    service: &S,
    organization: &str,
    repository: &str,
    rules: Option<&[Rule]>,
) -> Result<FilterResult> {
    let repo = service.get_repository(organization, repository).await?;
    let labels = label_set(service.list_labels(&repo).await?);
    debug!(repository = %repo.full_name(), count = labels.len(), "fetched labels");

    Ok(match rules {
        Some(rules) => filter_labels(labels, rules),
        None => FilterResult {
            included: labels,
            ignored: LabelSet::new(),
        },
    })
}

/// GitHub API Client
///
/// [`LabelService`] backed by the GitHub REST API
pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    /// Create a new GitHub client
    ///
    /// # Arguments
    /// - `access_token`: GitHub access token
    ///
    /// # Errors
    /// Returns an error if client initialization fails or the token is rejected
    pub async fn new(access_token: &str) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(access_token.to_string())
            .build()
            .map_err(Error::GitHubApi)?;

        // Authentication test
        let user = octocrab
            .current()
            .user()
            .await
            .map_err(|e| Error::AuthenticationFailed(e.to_string()))?;
        debug!(login = %user.login, "authenticated with GitHub");

        Ok(Self { octocrab })
    }

    fn map_not_found(repo: &RepositoryHandle) -> impl FnOnce(octocrab::Error) -> Error + '_ {
        move |e| {
            if is_not_found_error(&e) {
                Error::RepositoryNotFound(repo.full_name())
            } else {
                Error::GitHubApi(e)
            }
        }
    }
}

#[async_trait]
impl LabelService for GitHubClient {
    async fn get_repository(&self, owner: &str, name: &str) -> Result<RepositoryHandle> {
        let handle = RepositoryHandle::new(owner, name);
        self.octocrab
            .repos(owner, name)
            .get()
            .await
            .map_err(Self::map_not_found(&handle))?;

        Ok(handle)
    }

    async fn list_labels(&self, repo: &RepositoryHandle) -> Result<Vec<Label>> {
        let mut labels = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .octocrab
                .issues(&repo.owner, &repo.name)
                .list_labels_for_repo()
                .page(page)
                .per_page(100)
                .send()
                .await
                .map_err(Self::map_not_found(repo))?;

            if response.items.is_empty() {
                break;
            }

            labels.extend(response.items.into_iter().map(Label::from));
            page += 1;
        }

        Ok(labels)
    }

    async fn create_label(&self, repo: &RepositoryHandle, label: &Label) -> Result<()> {
        self.octocrab
            .issues(&repo.owner, &repo.name)
            .create_label(
                &label.name,
                Label::normalize_color(&label.color),
                label.description().unwrap_or(""),
            )
            .await
            .map_err(Error::GitHubApi)?;

        Ok(())
    }

    async fn edit_label(
        &self,
        repo: &RepositoryHandle,
        current_name: &str,
        label: &Label,
    ) -> Result<()> {
        let route = format!(
            "/repos/{}/{}/labels/{}",
            encode_path_segment(&repo.owner),
            encode_path_segment(&repo.name),
            encode_path_segment(current_name)
        );

        let _updated: octocrab::models::Label = self
            .octocrab
            .patch(route, Some(&edit_label_body(label)))
            .await
            .map_err(Error::GitHubApi)?;

        Ok(())
    }
}

/// Request body for `PATCH /repos/{owner}/{repo}/labels/{name}`
fn edit_label_body(label: &Label) -> serde_json::Value {
    let mut body = serde_json::json!({
        "new_name": label.name,
        "color": Label::normalize_color(&label.color),
    });

    if let Some(description) = label.description() {
        body["description"] = serde_json::Value::String(description.to_string());
    }

    body
}
