//! Application declarations and their normalized form
//!
//! Callers hand the compiler raw [`AppSpec`] declarations in which the
//! tunable fields are optional. Normalization is a distinct, total step that
//! fills in the defaults and yields an immutable [`App`] value; everything
//! downstream of it works only with fully-populated apps.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_APP_MEMORY_MB, DEFAULT_APP_PORT};

/// Raw declaration of one containerized application
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSpec {
    /// Application name, used verbatim as the naming root for every
    /// resource in its sub-topology
    pub name: String,

    /// Container image reference (opaque to this crate)
    pub image: String,

    /// Log group the container's logs are directed to
    pub log_group_name: String,

    /// Container listening port (default: 8000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Memory limit in MB (default: 256)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u32>,

    /// Extra managed policy ARNs attached to the cluster instance role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_policies: Option<Vec<String>>,
}

impl AppSpec {
    /// Normalize this declaration into a fully-populated [`App`]
    ///
    /// Pure and total: fills the defaults for absent optional fields and
    /// nothing else. No validation happens here.
    pub fn normalize(self) -> App {
        App {
            name: self.name,
            image: self.image,
            log_group_name: self.log_group_name,
            port: self.port.unwrap_or(DEFAULT_APP_PORT),
            memory: self.memory.unwrap_or(DEFAULT_APP_MEMORY_MB),
            managed_policies: self.managed_policies.unwrap_or_default(),
        }
    }
}

/// Fully-populated application value
///
/// Produced only by [`AppSpec::normalize`]; immutable once constructed.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct App {
    /// Application name
    pub name: String,
    /// Container image reference
    pub image: String,
    /// Log group name
    pub log_group_name: String,
    /// Container listening port
    pub port: u16,
    /// Memory limit in MB
    pub memory: u32,
    /// Extra managed policy ARNs, in declaration order
    pub managed_policies: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_spec() -> AppSpec {
        AppSpec {
            name: "web".to_string(),
            image: "registry/web:1.0".to_string(),
            log_group_name: "web-logs".to_string(),
            port: None,
            memory: None,
            managed_policies: None,
        }
    }

    // =========================================================================
    // Story: Omitted Fields Get Their Defaults
    // =========================================================================

    #[test]
    fn story_omitted_fields_are_defaulted() {
        let app = minimal_spec().normalize();
        assert_eq!(app.port, 8000);
        assert_eq!(app.memory, 256);
        assert!(app.managed_policies.is_empty());
    }

    #[test]
    fn story_declared_values_pass_through_unchanged() {
        let app = AppSpec {
            port: Some(9000),
            memory: Some(1024),
            managed_policies: Some(vec![
                "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess".to_string(),
                "arn:aws:iam::aws:policy/AmazonSQSFullAccess".to_string(),
            ]),
            ..minimal_spec()
        };
        let app = app.normalize();
        assert_eq!(app.port, 9000);
        assert_eq!(app.memory, 1024);
        // Declaration order is preserved, not sorted
        assert_eq!(
            app.managed_policies,
            vec![
                "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess".to_string(),
                "arn:aws:iam::aws:policy/AmazonSQSFullAccess".to_string(),
            ]
        );
    }

    #[test]
    fn story_required_fields_are_never_touched() {
        let app = minimal_spec().normalize();
        assert_eq!(app.name, "web");
        assert_eq!(app.image, "registry/web:1.0");
        assert_eq!(app.log_group_name, "web-logs");
    }

    // =========================================================================
    // Story: Declarations Deserialize With Optional Fields Absent
    // =========================================================================

    #[test]
    fn story_declaration_deserializes_without_optional_fields() {
        let spec: AppSpec = serde_json::from_str(
            r#"{"name": "a", "image": "img", "logGroupName": "lg"}"#,
        )
        .unwrap();
        assert_eq!(spec.port, None);
        assert_eq!(spec.memory, None);

        let app = spec.normalize();
        assert_eq!(app.port, 8000);
        assert_eq!(app.memory, 256);
    }
}
