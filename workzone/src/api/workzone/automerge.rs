//! Branch automerge policy payload

use serde::{Deserialize, Serialize};

use super::WorkzonePolicy;
use crate::api::common::{is_false, is_zero, string_or_number};
use crate::api::users::User;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutomergeSettings {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub repo_slug: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ref_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub src_ref_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub merge_condition: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub merge_strategy_id: String,
    /// Some server versions send this as a number
    #[serde(
        deserialize_with = "string_or_number",
        skip_serializing_if = "String::is_empty"
    )]
    pub approval_quota: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub approval_count: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub mandatory_approval_count: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub group_quota: i64,
    #[serde(skip_serializing_if = "is_false")]
    pub auto_merge_enabled: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub approval_quota_enabled: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub delete_source_branch: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub watch_build_result: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub watch_task_completion: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub required_signatures_count: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub required_builds_count: i64,
    #[serde(skip_serializing_if = "is_false")]
    pub ignore_contributing_reviewers_approval: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub enable_needs_work_veto: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub automerge_users: Vec<User>,
}

impl WorkzonePolicy for AutomergeSettings {
    const DELETE_WITH_BODY: bool = true;

    fn api_path() -> &'static str {
        "/rest/workzoneresource/1.0/branch/automerge"
    }
}
