//! Required-action checklist.
//!
//! The checklist maps each required IAM action to a granted flag. It is
//! initialized all-false from the compiled-in [`REQUIRED_ACTIONS`] list and
//! mutated in place as discovered grants are matched against it. The key set
//! never changes after construction and flags only ever flip false to true:
//! repeated check-offs are idempotent and never revoke an earlier match.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

/// IAM actions the calling principal must hold for a provisioning run.
///
/// This is the compiled-in default; `--require` and the `[check]` config
/// section can append to it, never remove from it.
pub const REQUIRED_ACTIONS: &[&str] = &[
    // EC2 instance and network provisioning
    "ec2:AllocateAddress",
    "ec2:AssociateRouteTable",
    "ec2:AttachInternetGateway",
    "ec2:AuthorizeSecurityGroupIngress",
    "ec2:CreateInternetGateway",
    "ec2:CreateNatGateway",
    "ec2:CreateRoute",
    "ec2:CreateRouteTable",
    "ec2:CreateSecurityGroup",
    "ec2:CreateSubnet",
    "ec2:CreateTags",
    "ec2:CreateVpc",
    "ec2:DeleteSecurityGroup",
    "ec2:DescribeAvailabilityZones",
    "ec2:DescribeInstances",
    "ec2:DescribeSecurityGroups",
    "ec2:DescribeSubnets",
    "ec2:DescribeVpcs",
    "ec2:RunInstances",
    "ec2:TerminateInstances",
    // IAM roles and instance profiles for cluster machines
    "iam:AddRoleToInstanceProfile",
    "iam:CreateInstanceProfile",
    "iam:CreateRole",
    "iam:GetRole",
    "iam:GetUser",
    "iam:ListRoles",
    "iam:PassRole",
    "iam:PutRolePolicy",
    // Cluster state and image storage
    "s3:CreateBucket",
    "s3:DeleteBucket",
    "s3:GetObject",
    "s3:PutObject",
    // Load balancing and DNS
    "elasticloadbalancing:CreateLoadBalancer",
    "elasticloadbalancing:DescribeLoadBalancers",
    "route53:ChangeResourceRecordSets",
    "route53:ListHostedZones",
    // Resource tagging
    "tag:GetResources",
];

/// Mapping from required action name to a granted flag.
///
/// Insertion order is preserved so reports are stable and match the order of
/// [`REQUIRED_ACTIONS`].
#[derive(Debug, Clone, Serialize)]
pub struct Checklist {
    entries: IndexMap<String, bool>,
}

impl Checklist {
    /// Creates a checklist over the compiled-in required actions, all
    /// initially ungranted.
    pub fn new() -> Self {
        Self::from_actions(REQUIRED_ACTIONS.iter().copied())
    }

    /// Creates a checklist over an explicit action list. Duplicates collapse
    /// into a single entry.
    pub fn from_actions<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = actions.into_iter().map(|a| (a.into(), false)).collect();
        Self { entries }
    }

    /// Creates the default checklist extended with additional required
    /// actions.
    pub fn with_additional<I, S>(additional: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut checklist = Self::new();
        for action in additional {
            checklist.entries.entry(action.into()).or_insert(false);
        }
        checklist
    }

    /// Marks every checklist entry covered by the granted action as held.
    ///
    /// The grant uses IAM wildcard syntax: `*` matches any sequence, `?` a
    /// single character, and the bare grant `"*"` covers everything. Entries
    /// already granted stay granted.
    pub fn check_off(&mut self, grant: &str) -> Result<usize> {
        if grant == "*" {
            let newly = self.entries.values().filter(|granted| !**granted).count();
            for granted in self.entries.values_mut() {
                *granted = true;
            }
            return Ok(newly);
        }

        let pattern = grant_regex(grant)?;
        let mut newly = 0;
        for (action, granted) in &mut self.entries {
            if !*granted && pattern.is_match(action) {
                *granted = true;
                newly += 1;
            }
        }
        Ok(newly)
    }

    /// Returns the still-ungranted action names in checklist order.
    pub fn missing(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, granted)| !**granted)
            .map(|(action, _)| action.as_str())
            .collect()
    }

    /// Returns the granted action names in checklist order.
    pub fn granted(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(action, _)| action.as_str())
            .collect()
    }

    /// True when every required action has been granted.
    pub fn is_satisfied(&self) -> bool {
        self.entries.values().all(|granted| *granted)
    }

    /// Number of required actions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the checklist has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of granted actions.
    pub fn granted_count(&self) -> usize {
        self.entries.values().filter(|granted| **granted).count()
    }

    /// Iterates `(action, granted)` pairs in checklist order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(action, granted)| (action.as_str(), *granted))
    }
}

impl Default for Checklist {
    fn default() -> Self {
        Self::new()
    }
}

/// Translates an IAM wildcard grant into an anchored regex.
///
/// `*` becomes `.*`, `?` becomes `.`, and every other character is escaped
/// literally, so grants containing regex metacharacters cannot over-match.
fn grant_regex(grant: &str) -> Result<Regex> {
    let mut pattern = String::with_capacity(grant.len() + 8);
    pattern.push('^');
    for ch in grant.chars() {
        match ch {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');

    Regex::new(&pattern).map_err(|source| Error::InvalidGrant {
        pattern: grant.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_all_ungranted() {
        let checklist = Checklist::new();
        assert_eq!(checklist.len(), REQUIRED_ACTIONS.len());
        assert_eq!(checklist.granted_count(), 0);
        assert!(!checklist.is_satisfied());
    }

    #[test]
    fn test_global_wildcard_grants_everything() {
        let mut checklist = Checklist::new();
        let newly = checklist.check_off("*").unwrap();
        assert_eq!(newly, REQUIRED_ACTIONS.len());
        assert!(checklist.is_satisfied());
        assert!(checklist.missing().is_empty());
    }

    #[test]
    fn test_service_wildcard_grants_only_that_service() {
        let mut checklist =
            Checklist::from_actions(["s3:DeleteBucket", "s3:GetObject", "iam:GetRole"]);
        checklist.check_off("s3:*").unwrap();
        assert_eq!(checklist.granted(), vec!["s3:DeleteBucket", "s3:GetObject"]);
        assert_eq!(checklist.missing(), vec!["iam:GetRole"]);
    }

    #[test]
    fn test_exact_action_grants_only_itself() {
        let mut checklist = Checklist::from_actions(["ec2:RunInstances", "ec2:RunScheduledInstances"]);
        checklist.check_off("ec2:RunInstances").unwrap();
        assert_eq!(checklist.granted(), vec!["ec2:RunInstances"]);
        assert_eq!(checklist.missing(), vec!["ec2:RunScheduledInstances"]);
    }

    #[test]
    fn test_question_mark_matches_single_character() {
        let mut checklist = Checklist::from_actions(["s3:GetObject", "s3:GetObjects"]);
        checklist.check_off("s3:GetObject?").unwrap();
        assert_eq!(checklist.granted(), vec!["s3:GetObjects"]);
    }

    #[test]
    fn test_check_off_is_idempotent_and_monotonic() {
        let mut checklist = Checklist::from_actions(["s3:DeleteBucket", "iam:GetRole"]);
        checklist.check_off("s3:*").unwrap();
        assert_eq!(checklist.granted_count(), 1);

        // Re-applying previously seen grants must never unset an entry.
        checklist.check_off("s3:*").unwrap();
        checklist.check_off("s3:DeleteBucket").unwrap();
        assert_eq!(checklist.granted(), vec!["s3:DeleteBucket"]);
        assert_eq!(checklist.missing(), vec!["iam:GetRole"]);

        checklist.check_off("iam:GetRole").unwrap();
        let newly = checklist.check_off("*").unwrap();
        assert_eq!(newly, 0);
        assert!(checklist.is_satisfied());
    }

    #[test]
    fn test_key_set_fixed_after_construction() {
        let mut checklist = Checklist::from_actions(["s3:GetObject"]);
        checklist.check_off("ec2:RunInstances").unwrap();
        assert_eq!(checklist.len(), 1);
        assert_eq!(checklist.missing(), vec!["s3:GetObject"]);
    }

    #[test]
    fn test_with_additional_appends_and_dedupes() {
        let checklist = Checklist::with_additional(["kms:CreateKey", "ec2:RunInstances"]);
        assert_eq!(checklist.len(), REQUIRED_ACTIONS.len() + 1);
        assert!(checklist.iter().any(|(action, _)| action == "kms:CreateKey"));
    }

    #[test]
    fn test_regex_metacharacters_in_grant_stay_literal() {
        let mut checklist = Checklist::from_actions(["s3:GetObject", "s3+GetObject"]);
        // A '+' in a grant must not be interpreted as a regex quantifier.
        checklist.check_off("s3+GetObject").unwrap();
        assert_eq!(checklist.granted(), vec!["s3+GetObject"]);
        assert_eq!(checklist.missing(), vec!["s3:GetObject"]);
    }
}
