//! IAM role types and the fixed policy documents
//!
//! Two roles exist in a compiled topology: the shared cluster instance role
//! (assumed by the instances themselves) and one service role per
//! application (assumed by the container scheduler to register targets with
//! the load balancer). The policy documents are fixed data the provisioning
//! layer must reproduce verbatim.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Baseline managed policy for cluster instances
pub const ECS_INSTANCE_POLICY_ARN: &str =
    "arn:aws:iam::aws:policy/service-role/AmazonEC2ContainerServiceforEC2Role";

/// Fixed managed policy for per-application service roles
pub const ECS_SERVICE_POLICY_ARN: &str =
    "arn:aws:iam::aws:policy/service-role/AmazonEC2ContainerServiceRole";

/// Trust document letting EC2 instances assume a role
pub fn ec2_trust_policy() -> serde_json::Value {
    json!({
        "Version": "2008-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": {"Service": "ec2.amazonaws.com"},
            "Action": "sts:AssumeRole"
        }]
    })
}

/// Trust document letting the container scheduler assume a role
pub fn ecs_trust_policy() -> serde_json::Value {
    json!({
        "Version": "2008-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": {"Service": "ecs.amazonaws.com"},
            "Action": "sts:AssumeRole"
        }]
    })
}

/// Permission document granting `DescribeInstanceHealth` on all resources
pub fn describe_instance_health_policy() -> serde_json::Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Action": ["elasticloadbalancing:DescribeInstanceHealth"],
            "Resource": ["*"]
        }]
    })
}

/// Inline policy attached directly to a role
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlinePolicy {
    /// Policy name
    pub name: String,
    /// Policy document (untyped JSON)
    pub document: serde_json::Value,
}

/// Declarative IAM role
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Role name
    pub name: String,
    /// Trust document controlling who may assume the role
    pub assume_role_policy: serde_json::Value,
    /// Managed policy ARNs, in attachment order
    pub managed_policy_arns: Vec<String>,
    /// Inline policies
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inline_policies: Vec<InlinePolicy>,
}

/// Instance profile wrapping a role for attachment to instances
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceProfile {
    /// Profile name
    pub name: String,
    /// Wrapped role
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Story: Policy Documents Are Fixed Data
    // =========================================================================

    #[test]
    fn story_trust_documents_name_their_principals() {
        let ec2 = ec2_trust_policy();
        assert_eq!(
            ec2["Statement"][0]["Principal"]["Service"],
            "ec2.amazonaws.com"
        );
        assert_eq!(ec2["Statement"][0]["Action"], "sts:AssumeRole");

        let ecs = ecs_trust_policy();
        assert_eq!(
            ecs["Statement"][0]["Principal"]["Service"],
            "ecs.amazonaws.com"
        );
    }

    #[test]
    fn story_permission_document_grants_instance_health_on_everything() {
        let doc = describe_instance_health_policy();
        assert_eq!(
            doc["Statement"][0]["Action"][0],
            "elasticloadbalancing:DescribeInstanceHealth"
        );
        assert_eq!(doc["Statement"][0]["Resource"][0], "*");
    }

    #[test]
    fn policy_documents_are_identical_across_calls() {
        assert_eq!(ec2_trust_policy(), ec2_trust_policy());
        assert_eq!(ecs_trust_policy(), ecs_trust_policy());
        assert_eq!(
            describe_instance_health_policy(),
            describe_instance_health_policy()
        );
    }

    // =========================================================================
    // Story: Roles Serialize In The Handoff Wire Form
    // =========================================================================

    #[test]
    fn story_role_serializes_with_camel_case_keys() {
        let role = Role {
            name: "web-service-role".to_string(),
            assume_role_policy: ecs_trust_policy(),
            managed_policy_arns: vec![ECS_SERVICE_POLICY_ARN.to_string()],
            inline_policies: vec![InlinePolicy {
                name: "web-describe-instance-health".to_string(),
                document: describe_instance_health_policy(),
            }],
        };
        let json = serde_json::to_value(&role).unwrap();
        assert!(json.get("assumeRolePolicy").is_some());
        assert!(json.get("managedPolicyArns").is_some());
        assert_eq!(json["inlinePolicies"][0]["name"], "web-describe-instance-health");
    }
}
