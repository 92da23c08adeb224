//! Account-wide IAM authorization details.
//!
//! [`AccountDetails`] is built once per audit run from a paginated
//! `iam:GetAccountAuthorizationDetails` fetch and is immutable afterwards.
//! SDK types are converted into crate-owned records at the boundary so the
//! aggregation logic stays pure and testable.

use crate::error::{Error, Result};
use aws_sdk_iam::types::{GroupDetail, ManagedPolicyDetail, PolicyDetail, UserDetail};
use aws_sdk_iam::Client;

/// A principal record from the account authorization details.
#[derive(Debug, Clone, Default)]
pub struct UserRecord {
    /// User name.
    pub name: String,
    /// Names of the groups the user belongs to.
    pub groups: Vec<String>,
    /// ARNs of managed policies attached directly to the user.
    pub attached_policy_arns: Vec<String>,
    /// Inline policies embedded on the user (name + URL-encoded document).
    pub inline_policies: Vec<PolicySource>,
}

/// A group record, with inline and attached policy references.
#[derive(Debug, Clone, Default)]
pub struct GroupRecord {
    /// Group name.
    pub name: String,
    /// ARNs of managed policies attached to the group.
    pub attached_policy_arns: Vec<String>,
    /// Inline policies embedded on the group.
    pub inline_policies: Vec<PolicySource>,
}

/// An account-wide managed policy with its version history.
#[derive(Debug, Clone, Default)]
pub struct ManagedPolicyRecord {
    /// Policy ARN.
    pub arn: String,
    /// Policy name.
    pub name: String,
    /// Default version id, e.g. `v3`.
    pub default_version_id: Option<String>,
    /// All known versions.
    pub versions: Vec<PolicyVersionRecord>,
}

/// One version of a managed policy.
#[derive(Debug, Clone, Default)]
pub struct PolicyVersionRecord {
    /// Version id.
    pub version_id: Option<String>,
    /// URL-encoded policy document.
    pub document: String,
    /// Whether the API flagged this version as the default.
    pub is_default: bool,
}

/// A named, still-encoded policy document ready for parsing.
#[derive(Debug, Clone, Default)]
pub struct PolicySource {
    /// Policy name or ARN, used in logs and error messages.
    pub name: String,
    /// URL-encoded document.
    pub document: String,
}

impl ManagedPolicyRecord {
    /// Returns the document of the policy's default version.
    ///
    /// Prefers the version flagged default by the API, then the version
    /// matching `default_version_id`, then the first listed.
    pub fn default_document(&self) -> Option<&PolicyVersionRecord> {
        self.versions
            .iter()
            .find(|v| v.is_default)
            .or_else(|| {
                let wanted = self.default_version_id.as_deref()?;
                self.versions
                    .iter()
                    .find(|v| v.version_id.as_deref() == Some(wanted))
            })
            .or_else(|| self.versions.first())
    }
}

/// All users, groups and managed policies of the account, fetched once and
/// immutable thereafter.
#[derive(Debug, Clone, Default)]
pub struct AccountDetails {
    /// Principal records.
    pub users: Vec<UserRecord>,
    /// Group records.
    pub groups: Vec<GroupRecord>,
    /// Account-wide managed policies.
    pub policies: Vec<ManagedPolicyRecord>,
}

impl AccountDetails {
    /// Fetches the complete account authorization details, following the
    /// truncation marker until exhausted.
    ///
    /// Any page failure aborts the fetch; there is no retry. A preflight
    /// that cannot see the whole account cannot give a trustworthy answer.
    pub async fn fetch(client: &Client) -> Result<Self> {
        let mut details = Self::default();
        let mut marker: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let resp = client
                .get_account_authorization_details()
                .set_marker(marker)
                .send()
                .await
                .map_err(|e| Error::api("GetAccountAuthorizationDetails", e))?;

            pages += 1;

            details
                .users
                .extend(resp.user_detail_list().iter().map(UserRecord::from));
            details
                .groups
                .extend(resp.group_detail_list().iter().map(GroupRecord::from));
            details
                .policies
                .extend(resp.policies().iter().map(ManagedPolicyRecord::from));

            if resp.is_truncated() {
                marker = resp.marker().map(str::to_string);
                if marker.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        tracing::info!(
            pages,
            users = details.users.len(),
            groups = details.groups.len(),
            policies = details.policies.len(),
            "fetched account authorization details"
        );

        Ok(details)
    }

    /// Linear scan for a user record by name.
    pub fn find_user(&self, name: &str) -> Option<&UserRecord> {
        self.users.iter().find(|user| user.name == name)
    }

    /// Resolves a managed policy by ARN.
    pub fn find_policy(&self, arn: &str) -> Option<&ManagedPolicyRecord> {
        self.policies.iter().find(|policy| policy.arn == arn)
    }

    /// Collects the raw policy documents granted directly to a user:
    /// inline policies plus attached managed policies resolved against the
    /// account-wide policy list.
    ///
    /// Attached ARNs that do not resolve are logged and skipped; the
    /// authorization-details response is expected to be self-consistent.
    pub fn documents_for_user(&self, user: &UserRecord) -> Vec<PolicySource> {
        let mut documents = user.inline_policies.clone();
        documents.extend(self.resolve_attached(&user.attached_policy_arns));
        documents
    }

    /// Collects the raw policy documents a user holds via group membership:
    /// for every group the user belongs to, the group's inline policies plus
    /// its attached managed policies.
    pub fn documents_for_groups(&self, user: &UserRecord) -> Vec<PolicySource> {
        let mut documents = Vec::new();

        for group_name in &user.groups {
            let Some(group) = self.groups.iter().find(|g| &g.name == group_name) else {
                tracing::warn!(group = %group_name, "group membership refers to unknown group");
                continue;
            };

            documents.extend(group.inline_policies.iter().cloned());
            documents.extend(self.resolve_attached(&group.attached_policy_arns));
        }

        documents
    }

    fn resolve_attached(&self, arns: &[String]) -> Vec<PolicySource> {
        let mut documents = Vec::new();

        for arn in arns {
            let Some(policy) = self.find_policy(arn) else {
                tracing::warn!(%arn, "attached policy not present in account policy list");
                continue;
            };
            match policy.default_document() {
                Some(version) => documents.push(PolicySource {
                    name: policy.arn.clone(),
                    document: version.document.clone(),
                }),
                None => tracing::warn!(%arn, "managed policy has no versions"),
            }
        }

        documents
    }
}

impl From<&UserDetail> for UserRecord {
    fn from(detail: &UserDetail) -> Self {
        Self {
            name: detail.user_name().unwrap_or_default().to_string(),
            groups: detail.group_list().to_vec(),
            attached_policy_arns: detail
                .attached_managed_policies()
                .iter()
                .filter_map(|p| p.policy_arn().map(str::to_string))
                .collect(),
            inline_policies: detail
                .user_policy_list()
                .iter()
                .filter_map(policy_source)
                .collect(),
        }
    }
}

impl From<&GroupDetail> for GroupRecord {
    fn from(detail: &GroupDetail) -> Self {
        Self {
            name: detail.group_name().unwrap_or_default().to_string(),
            attached_policy_arns: detail
                .attached_managed_policies()
                .iter()
                .filter_map(|p| p.policy_arn().map(str::to_string))
                .collect(),
            inline_policies: detail
                .group_policy_list()
                .iter()
                .filter_map(policy_source)
                .collect(),
        }
    }
}

impl From<&ManagedPolicyDetail> for ManagedPolicyRecord {
    fn from(detail: &ManagedPolicyDetail) -> Self {
        Self {
            arn: detail.arn().unwrap_or_default().to_string(),
            name: detail.policy_name().unwrap_or_default().to_string(),
            default_version_id: detail.default_version_id().map(str::to_string),
            versions: detail
                .policy_version_list()
                .iter()
                .map(|v| PolicyVersionRecord {
                    version_id: v.version_id().map(str::to_string),
                    document: v.document().unwrap_or_default().to_string(),
                    is_default: v.is_default_version(),
                })
                .collect(),
        }
    }
}

fn policy_source(detail: &PolicyDetail) -> Option<PolicySource> {
    let document = detail.policy_document()?;
    Some(PolicySource {
        name: detail.policy_name().unwrap_or("inline").to_string(),
        document: document.to_string(),
    })
}
