//! AWS client construction and caller-identity resolution.
//!
//! The SDK config comes from the default credential chain (environment,
//! shared config, instance profile), with optional region and profile
//! overrides. A single `sts:GetCallerIdentity` call doubles as the
//! credential preflight and as the source of the principal's ARN.

pub mod identity;

use crate::error::{Error, Result};
use aws_config::BehaviorVersion;
use aws_sdk_iam::config::Region;

/// Loads an AWS SDK config from the default chain, applying optional region
/// and profile overrides.
pub async fn load_sdk_config(
    region: Option<&str>,
    profile: Option<&str>,
) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region_str) = region {
        loader = loader.region(Region::new(region_str.to_string()));
    }
    if let Some(profile_name) = profile {
        loader = loader.profile_name(profile_name);
    }

    loader.load().await
}

/// The resolved identity of the calling principal.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    /// Full principal ARN, e.g. `arn:aws:iam::123456789012:user/alice`.
    pub arn: String,
    /// Account id, when the API returned one.
    pub account: Option<String>,
}

impl CallerIdentity {
    /// Extracts the IAM user name from the principal ARN.
    ///
    /// Only `user/...` principals can be audited against the account's user
    /// list; assumed roles and the account root are rejected with an
    /// explicit error rather than a downstream crash.
    pub fn user_name(&self) -> Result<&str> {
        // ARN layout: arn:partition:service:region:account:resource
        let resource = self
            .arn
            .splitn(6, ':')
            .nth(5)
            .ok_or_else(|| Error::UnsupportedPrincipal(self.arn.clone()))?;

        match resource.strip_prefix("user/") {
            // The resource may carry a path: user/division/team/alice.
            Some(path) => path
                .rsplit('/')
                .next()
                .filter(|name| !name.is_empty())
                .ok_or_else(|| Error::UnsupportedPrincipal(self.arn.clone())),
            None => Err(Error::UnsupportedPrincipal(self.arn.clone())),
        }
    }
}

/// Resolves the calling principal via `sts:GetCallerIdentity`.
///
/// A failure here means the default credential chain produced nothing
/// usable, which aborts the whole preflight.
pub async fn caller_identity(config: &aws_config::SdkConfig) -> Result<CallerIdentity> {
    let client = aws_sdk_sts::Client::new(config);

    let resp = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| Error::CredentialsUnavailable(e.to_string()))?;

    let arn = resp
        .arn()
        .map(str::to_string)
        .ok_or_else(|| Error::CredentialsUnavailable("caller identity has no ARN".to_string()))?;

    tracing::debug!(%arn, account = ?resp.account(), "resolved caller identity");

    Ok(CallerIdentity {
        arn,
        account: resp.account().map(str::to_string),
    })
}
