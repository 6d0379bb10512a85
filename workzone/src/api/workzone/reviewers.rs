//! Branch reviewers policy payload

use serde::{Deserialize, Serialize};

use super::WorkzonePolicy;
use crate::api::common::{is_false, is_zero};
use crate::api::users::User;

/// Reviewer lists shared by the repository level and file path entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewerAssignment {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<User>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mandatory_users: Vec<User>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mandatory_groups: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilePathReviewers {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file_path_pattern: String,
    #[serde(skip_serializing_if = "is_false")]
    pub include_exclude_enabled: bool,
    #[serde(rename = "excludeFilePathPattern", skip_serializing_if = "Vec::is_empty")]
    pub exclude_file_paths: Vec<String>,
    #[serde(flatten)]
    pub reviewers: ReviewerAssignment,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewersSettings {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub repo_slug: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ref_name: String,
    #[serde(flatten)]
    pub reviewers: ReviewerAssignment,
    #[serde(skip_serializing_if = "is_zero")]
    pub top_suggested_reviewers: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub days_in_past: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub file_path_reviewers: Vec<FilePathReviewers>,
}

impl WorkzonePolicy for ReviewersSettings {
    const DELETE_WITH_BODY: bool = true;

    fn api_path() -> &'static str {
        "/rest/workzoneresource/1.0/branch/reviewers"
    }
}
