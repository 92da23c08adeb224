//! # iam-preflight — AWS IAM effective-permission auditor
//!
//! `iam-preflight` answers one question before an expensive provisioning run
//! starts: does the AWS principal invoking the tool hold every permission in
//! a required-action list?
//!
//! Grants are aggregated from three places:
//!
//! - managed policies attached directly to the user,
//! - inline policies embedded on the user,
//! - inline and attached policies of every group the user belongs to.
//!
//! The account's users, groups and managed policies are fetched in one
//! paginated `GetAccountAuthorizationDetails` pass and never refetched; the
//! audit itself is a synchronous top-to-bottom walk over that snapshot.
//!
//! ## Deliberate narrowness
//!
//! Only `Allow` statements whose `Resource` is exactly the global wildcard
//! `"*"` contribute grants. Policies scoped to specific ARNs are invisible
//! to the checker, so a "missing permission" report can be a false negative
//! for principals that hold scoped grants. This matches the original
//! checker's behavior and keeps the tool's answer conservative: a pass means
//! the permission is definitely held account-wide.
//!
//! ## Failure posture
//!
//! Every AWS API error is fatal. The tool is a preflight check: failing
//! fast and loudly before the expensive operation is the point, so there is
//! no retry, no backoff and no partial-result reporting.
//!
//! ## Quick example
//!
//! ```rust,ignore
//! use iam_preflight::auditor::PermissionAuditor;
//! use iam_preflight::checklist::Checklist;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let auditor = PermissionAuditor::connect(None, None, Checklist::new()).await?;
//!     let report = auditor.run().await?;
//!
//!     for action in &report.missing {
//!         eprintln!("missing: {action}");
//!     }
//!     std::process::exit(if report.passed() { 0 } else { 1 });
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auditor;
pub mod aws;
pub mod checklist;
pub mod error;
pub mod policy;

pub use auditor::{AuditReport, PermissionAuditor};
pub use checklist::{Checklist, REQUIRED_ACTIONS};
pub use error::{Error, Result};
