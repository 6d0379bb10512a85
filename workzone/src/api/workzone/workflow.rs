//! Repository workflow policy payload

use serde::{Deserialize, Serialize};

use super::WorkzonePolicy;
use crate::api::common::is_false;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowSettings {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub repo_slug: String,
    /// Always sent; `false` is meaningful here
    pub push_after_pull_req: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub unapprove_pull_req: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub unapprove_pull_req_target_ref_change: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub enable_merge_condition_veto: bool,
}

impl WorkzonePolicy for WorkflowSettings {
    const DELETE_WITH_BODY: bool = false;

    fn api_path() -> &'static str {
        "/rest/workzoneresource/1.0/workflow"
    }
}
