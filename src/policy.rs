//! IAM policy document parsing.
//!
//! Policy documents come back from `GetAccountAuthorizationDetails`
//! URL-encoded. After decoding, a document is a JSON object with a
//! `Statement` list; each statement carries an `Effect`, an `Action` (string
//! or list of strings) and a `Resource` (string or list).
//!
//! Only `Allow` statements whose resource is exactly the global wildcard
//! contribute granted actions. Statements scoped to specific ARNs are
//! ignored, which can under-report grants that are actually held; this is a
//! deliberate narrow heuristic carried over from the original checker, not
//! something to silently widen.

use crate::error::{Error, Result};
use serde::Deserialize;

/// A parsed IAM policy document.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyDocument {
    /// Statement list. IAM always emits a list for generated documents.
    #[serde(rename = "Statement", default)]
    pub statements: Vec<Statement>,
}

/// A single policy statement.
#[derive(Debug, Clone, Deserialize)]
pub struct Statement {
    /// `"Allow"` or `"Deny"`.
    #[serde(rename = "Effect", default)]
    pub effect: String,

    /// Granted or denied action names.
    #[serde(rename = "Action", default)]
    pub action: StringOrVec,

    /// Resources the statement applies to.
    #[serde(rename = "Resource", default)]
    pub resource: StringOrVec,
}

/// A JSON value that may be a single string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrVec {
    /// Single string form.
    One(String),
    /// List form.
    Many(Vec<String>),
}

impl Default for StringOrVec {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl StringOrVec {
    /// Returns the values as a slice regardless of wire form.
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values.as_slice(),
        }
    }

    /// True when the value is exactly the global wildcard `"*"`, in either
    /// wire form.
    pub fn is_global_wildcard(&self) -> bool {
        matches!(self.as_slice(), [only] if only == "*")
    }
}

impl Statement {
    /// True for `Effect: Allow`.
    pub fn is_allow(&self) -> bool {
        self.effect == "Allow"
    }
}

impl PolicyDocument {
    /// Parses a URL-encoded policy document as returned by the IAM API.
    ///
    /// `name` is used only for error reporting.
    pub fn from_encoded(name: &str, encoded: &str) -> Result<Self> {
        let decoded = urlencoding::decode(encoded).map_err(|e| Error::PolicyDecode {
            policy: name.to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&decoded).map_err(|source| Error::PolicyParse {
            policy: name.to_string(),
            source,
        })
    }

    /// Collects the action strings granted by this document.
    ///
    /// Only `Allow` statements with an unrestricted resource contribute.
    pub fn allowed_actions(&self) -> Vec<String> {
        self.statements
            .iter()
            .filter(|stmt| stmt.is_allow() && stmt.resource.is_global_wildcard())
            .flat_map(|stmt| stmt.action.as_slice().iter().cloned())
            .collect()
    }
}

/// Decodes and parses an encoded policy document, returning its granted
/// actions.
pub fn allowed_actions(name: &str, encoded: &str) -> Result<Vec<String>> {
    Ok(PolicyDocument::from_encoded(name, encoded)?.allowed_actions())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encode(document: &str) -> String {
        urlencoding::encode(document).into_owned()
    }

    #[test]
    fn test_global_wildcard_action() {
        let doc = r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"*","Resource":"*"}]}"#;
        let actions = allowed_actions("admin", &encode(doc)).unwrap();
        assert_eq!(actions, vec!["*"]);
    }

    #[test]
    fn test_service_wildcard_action() {
        let doc = r#"{"Statement":[{"Effect":"Allow","Action":"s3:*","Resource":"*"}]}"#;
        let actions = allowed_actions("s3-admin", &encode(doc)).unwrap();
        assert_eq!(actions, vec!["s3:*"]);
    }

    #[test]
    fn test_action_list_flattens() {
        let doc = r#"{"Statement":[{"Effect":"Allow","Action":["ec2:RunInstances","ec2:CreateTags"],"Resource":"*"}]}"#;
        let actions = allowed_actions("ec2", &encode(doc)).unwrap();
        assert_eq!(actions, vec!["ec2:RunInstances", "ec2:CreateTags"]);
    }

    #[test]
    fn test_scoped_resource_is_ignored() {
        let doc = r#"{"Statement":[
            {"Effect":"Allow","Action":"s3:GetObject","Resource":"arn:aws:s3:::my-bucket/*"},
            {"Effect":"Allow","Action":"s3:ListAllMyBuckets","Resource":"*"}
        ]}"#;
        let actions = allowed_actions("scoped", &encode(doc)).unwrap();
        assert_eq!(actions, vec!["s3:ListAllMyBuckets"]);
    }

    #[test]
    fn test_resource_list_with_single_wildcard_counts() {
        let doc = r#"{"Statement":[{"Effect":"Allow","Action":"iam:GetRole","Resource":["*"]}]}"#;
        let actions = allowed_actions("list-form", &encode(doc)).unwrap();
        assert_eq!(actions, vec!["iam:GetRole"]);
    }

    #[test]
    fn test_deny_statements_contribute_nothing() {
        let doc = r#"{"Statement":[{"Effect":"Deny","Action":"*","Resource":"*"}]}"#;
        let actions = allowed_actions("deny-all", &encode(doc)).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn test_empty_statement_list() {
        let doc = r#"{"Version":"2012-10-17","Statement":[]}"#;
        let actions = allowed_actions("empty", &encode(doc)).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = allowed_actions("broken", &encode("{not json")).unwrap_err();
        assert!(matches!(err, Error::PolicyParse { .. }));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_unencoded_plain_document_still_parses() {
        // urlencoding::decode passes unreserved characters through, so a
        // document without percent-escapes decodes to itself.
        let doc = r#"{"Statement":[{"Effect":"Allow","Action":"tag:GetResources","Resource":"*"}]}"#;
        let actions = allowed_actions("plain", doc).unwrap();
        assert_eq!(actions, vec!["tag:GetResources"]);
    }
}
