//! Top-level permission audit orchestration.
//!
//! A single deterministic pass: resolve the caller, fetch the account
//! authorization details, aggregate the caller's policy documents (direct
//! and via groups), extract the granted actions, and check them off against
//! the required-action checklist.

use crate::aws::identity::{AccountDetails, PolicySource};
use crate::aws::{self, CallerIdentity};
use crate::checklist::Checklist;
use crate::error::{Error, Result};
use crate::policy;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of a permission audit.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// Audited IAM user name.
    pub principal: String,
    /// Full principal ARN.
    pub principal_arn: String,
    /// Account id, when known.
    pub account: Option<String>,
    /// Number of required actions.
    pub required: usize,
    /// Actions confirmed granted, in checklist order.
    pub granted: Vec<String>,
    /// Actions still missing, in checklist order.
    pub missing: Vec<String>,
    /// When the audit ran.
    pub checked_at: DateTime<Utc>,
}

impl AuditReport {
    /// True when every required action was granted.
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Runs the effective-permission audit for the calling principal.
pub struct PermissionAuditor {
    iam: aws_sdk_iam::Client,
    identity: CallerIdentity,
    checklist: Checklist,
}

impl PermissionAuditor {
    /// Builds an auditor from the default credential chain.
    ///
    /// Fails fast when the chain yields no usable credentials; the
    /// caller-identity call is the credential preflight.
    pub async fn connect(
        region: Option<&str>,
        profile: Option<&str>,
        checklist: Checklist,
    ) -> Result<Self> {
        let config = aws::load_sdk_config(region, profile).await;
        let identity = aws::caller_identity(&config).await?;

        Ok(Self {
            iam: aws_sdk_iam::Client::new(&config),
            identity,
            checklist,
        })
    }

    /// Builds an auditor from an already-loaded SDK config and identity.
    pub fn new(
        config: &aws_config::SdkConfig,
        identity: CallerIdentity,
        checklist: Checklist,
    ) -> Self {
        Self {
            iam: aws_sdk_iam::Client::new(config),
            identity,
            checklist,
        }
    }

    /// Executes the audit and produces a report.
    pub async fn run(mut self) -> Result<AuditReport> {
        let user_name = self.identity.user_name()?.to_string();
        tracing::info!(user = %user_name, "auditing effective permissions");

        let details = AccountDetails::fetch(&self.iam).await?;

        let user = details
            .find_user(&user_name)
            .ok_or_else(|| Error::PrincipalNotFound(user_name.clone()))?;

        let mut documents = details.documents_for_user(user);
        documents.extend(details.documents_for_groups(user));
        tracing::info!(documents = documents.len(), "collected policy documents");

        self.apply_documents(&documents)?;

        let report = AuditReport {
            principal: user_name,
            principal_arn: self.identity.arn.clone(),
            account: self.identity.account.clone(),
            required: self.checklist.len(),
            granted: self
                .checklist
                .granted()
                .into_iter()
                .map(str::to_string)
                .collect(),
            missing: self
                .checklist
                .missing()
                .into_iter()
                .map(str::to_string)
                .collect(),
            checked_at: Utc::now(),
        };

        if report.passed() {
            tracing::info!(required = report.required, "IAM permissions check passed");
        } else {
            tracing::warn!(
                missing = report.missing.len(),
                required = report.required,
                "IAM permissions check found missing permissions"
            );
        }

        Ok(report)
    }

    fn apply_documents(&mut self, documents: &[PolicySource]) -> Result<()> {
        for doc in documents {
            let actions = policy::allowed_actions(&doc.name, &doc.document)?;
            tracing::debug!(policy = %doc.name, grants = actions.len(), "extracted grants");

            for action in &actions {
                let newly = self.checklist.check_off(action)?;
                if newly > 0 {
                    tracing::debug!(grant = %action, newly, "checked off required actions");
                }
            }
        }
        Ok(())
    }
}
